//! Configuration commands.

use crate::config::{AppConfig, StravaOverrides};
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &AppConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", AppConfig::default_path().display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &AppConfig, overrides: &StravaOverrides) -> ClientResult<()> {
    let report = check(config, overrides)?;
    for line in report {
        println!("{}", line);
    }
    Ok(())
}

/// Runs every check and returns the lines to report.
fn check(config: &AppConfig, overrides: &StravaOverrides) -> ClientResult<Vec<String>> {
    let strava = config
        .strava
        .with_overrides(overrides)
        .to_strava_config()
        .map_err(|e| ClientError::Config(format!("invalid Strava settings: {}", e)))?;

    config
        .output
        .format_options(&strava.club_id)
        .map_err(|e| ClientError::Config(format!("invalid output settings: {}", e)))?;

    let token_path = config.token_path();
    let mut report = vec!["Strava credentials are valid.".to_string()];
    if !token_path.exists() {
        report.push(format!(
            "warning: token file {} does not exist yet",
            token_path.display()
        ));
    }
    report.push("Configuration is valid.".to_string());
    Ok(report)
}

/// Show the configuration and token file paths.
pub fn path(config: &AppConfig) -> ClientResult<()> {
    println!("config: {}", AppConfig::default_path().display());
    println!("tokens: {}", config.token_path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config(dir: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.strava.client_id = Some("12345".to_string());
        config.strava.client_secret = Some("shh".to_string());
        config.strava.club_id = Some("678".to_string());
        config.strava.token_path = Some(dir.join("stravaTokens.json"));
        config
    }

    #[test]
    fn valid_config_warns_about_missing_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let report = check(&valid_config(dir.path()), &StravaOverrides::default()).unwrap();
        assert!(report.iter().any(|l| l.starts_with("warning: token file")));
        assert_eq!(report.last().map(String::as_str), Some("Configuration is valid."));
    }

    #[test]
    fn existing_token_file_is_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stravaTokens.json"), "{}").unwrap();
        let report = check(&valid_config(dir.path()), &StravaOverrides::default()).unwrap();
        assert!(!report.iter().any(|l| l.starts_with("warning")));
    }

    #[test]
    fn overrides_fill_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid_config(dir.path());
        config.strava.club_id = None;

        assert!(check(&config, &StravaOverrides::default()).is_err());

        let overrides = StravaOverrides {
            club_id: Some("678".to_string()),
            ..Default::default()
        };
        assert!(check(&config, &overrides).is_ok());
    }

    #[test]
    fn bad_timezone_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid_config(dir.path());
        config.output.timezone = "Nowhere/Special".to_string();

        let err = check(&config, &StravaOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("invalid output settings"));
    }

    #[test]
    fn dump_serializes_defaults() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).unwrap();
        assert!(toml_str.contains("[strava]"));
        assert!(toml_str.contains("window_hours = 4"));
    }
}
