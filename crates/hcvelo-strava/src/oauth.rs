//! Refresh-token exchange against Strava's OAuth endpoint.
//!
//! Only the `refresh_token` grant is implemented; initial authorization is
//! done once, out of band, and its result written to the token file.

use tracing::debug;

use crate::config::{OAuthCredentials, StravaConfig};
use crate::error::{StravaError, StravaResult, transport_error};
use crate::tokens::{BoxFuture, Credential, TokenRefresher};

/// Path of the token endpoint relative to the API base.
const TOKEN_PATH: &str = "/api/v3/oauth/token";

/// OAuth client for Strava.
#[derive(Debug)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    token_url: url::Url,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Creates a client for the configured application and upstream.
    pub fn new(config: &StravaConfig) -> StravaResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                StravaError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            credentials: config.credentials.clone(),
            token_url: config.endpoint(TOKEN_PATH)?,
            http_client,
        })
    }

    /// Exchanges `refresh_token` for a new credential record.
    ///
    /// Anything but HTTP 200 is an error; the new refresh token from the
    /// response always replaces the old one.
    pub async fn refresh_token(&self, refresh_token: &str) -> StravaResult<Credential> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let response = self
            .http_client
            .post(self.token_url.clone())
            .form(&params)
            .send()
            .await
            .map_err(|e| transport_error("token refresh request failed", e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            debug!(%status, body = %body, "token refresh rejected");
            return Err(StravaError::upstream_status(
                status.as_u16(),
                format!("token refresh failed: unexpected status code: {}", status),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error("failed to read token response", e))?;

        let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            StravaError::decode(format!("invalid token response: {}", e)).with_source(e)
        })?;

        debug!(
            token_type = token_response.token_type.as_deref().unwrap_or("unknown"),
            expires_in = token_response.expires_in.unwrap_or_default(),
            "token refresh succeeded"
        );

        Ok(token_response.into_credential())
    }
}

impl TokenRefresher for OAuthClient {
    fn refresh<'a>(&'a self, refresh_token: &'a str) -> BoxFuture<'a, StravaResult<Credential>> {
        Box::pin(self.refresh_token(refresh_token))
    }
}

/// Response from Strava's token endpoint.
#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_at: i64,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_credential(self) -> Credential {
        Credential::new(self.access_token, self.refresh_token, self.expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StravaErrorCode;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> StravaConfig {
        StravaConfig::new(OAuthCredentials::new("12345", "s3cret"), "678")
            .with_api_base_url(&server.uri())
            .unwrap()
    }

    #[test]
    fn parse_token_response_ignores_extra_fields() {
        let json = r#"{
            "token_type": "Bearer",
            "access_token": "a9b723",
            "expires_at": 1568775134,
            "expires_in": 20566,
            "refresh_token": "b5c569"
        }"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();
        let cred = response.into_credential();
        assert_eq!(cred, Credential::new("a9b723", "b5c569", 1568775134));
    }

    #[tokio::test]
    async fn refresh_posts_form_and_returns_rotated_credential() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v3/oauth/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("client_id=12345"))
            .and(body_string_contains("client_secret=s3cret"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=old-refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_type": "Bearer",
                "access_token": "new-access",
                "refresh_token": "new-refresh",
                "expires_at": 1717264800,
                "expires_in": 21600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OAuthClient::new(&config_for(&server)).unwrap();
        let cred = client.refresh_token("old-refresh").await.unwrap();

        assert_eq!(cred.access_token, "new-access");
        assert_eq!(cred.refresh_token, "new-refresh");
        assert_eq!(cred.expires_at, 1717264800);
    }

    #[tokio::test]
    async fn refresh_non_200_is_upstream_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v3/oauth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "Authorization Error"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OAuthClient::new(&config_for(&server)).unwrap();
        let err = client.refresh_token("revoked").await.unwrap_err();

        assert_eq!(err.code(), StravaErrorCode::UpstreamStatus);
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn refresh_other_success_codes_are_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v3/oauth/token"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "access_token": "a", "refresh_token": "r", "expires_at": 1
            })))
            .mount(&server)
            .await;

        let client = OAuthClient::new(&config_for(&server)).unwrap();
        let err = client.refresh_token("r").await.unwrap_err();
        assert_eq!(err.status(), Some(201));
    }

    #[tokio::test]
    async fn refresh_malformed_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v3/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = OAuthClient::new(&config_for(&server)).unwrap();
        let err = client.refresh_token("r").await.unwrap_err();
        assert_eq!(err.code(), StravaErrorCode::Decode);
    }

    #[tokio::test]
    async fn refresh_missing_expiry_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v3/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "a", "refresh_token": "r"
            })))
            .mount(&server)
            .await;

        let client = OAuthClient::new(&config_for(&server)).unwrap();
        let err = client.refresh_token("r").await.unwrap_err();
        assert_eq!(err.code(), StravaErrorCode::Decode);
    }

    #[tokio::test]
    async fn refresh_unreachable_host_is_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = StravaConfig::new(OAuthCredentials::new("1", "s"), "2")
            .with_api_base_url(&format!("http://127.0.0.1:{}", port))
            .unwrap();

        let client = OAuthClient::new(&config).unwrap();
        let err = client.refresh_token("r").await.unwrap_err();
        assert_eq!(err.code(), StravaErrorCode::Transport);
    }
}
