//! Strava API client.
//!
//! Low-level access to the club `group_events` listing. Filtering happens in
//! [`crate::events`]; this module only builds the request and decodes the
//! response.

use hcvelo_core::ClubEvent;
use tracing::debug;

use crate::config::StravaConfig;
use crate::error::{StravaError, StravaResult, transport_error};

/// Events requested per page.
pub const GROUP_EVENTS_PER_PAGE: u32 = 10;

/// Only the first page is ever consulted.
pub const GROUP_EVENTS_PAGE: u32 = 1;

/// Strava API client.
#[derive(Debug, Clone)]
pub struct StravaClient {
    http_client: reqwest::Client,
    config: StravaConfig,
}

impl StravaClient {
    pub fn new(config: StravaConfig) -> StravaResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                StravaError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &StravaConfig {
        &self.config
    }

    /// Lists the first page of a club's group events, unfiltered.
    pub async fn list_group_events(
        &self,
        club_id: &str,
        access_token: &str,
    ) -> StravaResult<Vec<ClubEvent>> {
        let url = self.config.endpoint(&format!(
            "api/v3/clubs/{}/group_events",
            urlencoding::encode(club_id)
        ))?;

        let response = self
            .http_client
            .get(url)
            .bearer_auth(access_token)
            .query(&[
                ("per_page", GROUP_EVENTS_PER_PAGE),
                ("page", GROUP_EVENTS_PAGE),
            ])
            .send()
            .await
            .map_err(|e| transport_error("group events request failed", e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            debug!(%status, body = %body, "group events request rejected");
            return Err(StravaError::upstream_status(
                status.as_u16(),
                format!("group events: unexpected status code: {}", status),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error("failed to read group events response", e))?;

        let events: Vec<ClubEvent> = serde_json::from_str(&body).map_err(|e| {
            StravaError::decode(format!("failed to parse group events: {}", e)).with_source(e)
        })?;

        debug!("fetched {} group events for club {}", events.len(), club_id);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StravaErrorCode;
    use crate::config::OAuthCredentials;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> StravaClient {
        let config = StravaConfig::new(OAuthCredentials::new("1", "s"), "678")
            .with_api_base_url(&server.uri())
            .unwrap();
        StravaClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn lists_first_page_with_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v3/clubs/678/group_events"))
            .and(query_param("per_page", "10"))
            .and(query_param("page", "1"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 1,
                    "title": "Chain Gang",
                    "description": "",
                    "address": "Holmes Chapel",
                    "upcoming_occurrences": ["2024-06-05T18:30:00Z"]
                },
                {
                    "id": 2,
                    "title": "Sunday Club Run",
                    "upcoming_occurrences": []
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let events = client_for(&server)
            .list_group_events("678", "tok")
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "Chain Gang");
        assert_eq!(events[1].id, 2);
    }

    #[tokio::test]
    async fn unauthorized_is_upstream_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v3/clubs/678/group_events"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .list_group_events("678", "expired")
            .await
            .unwrap_err();
        assert_eq!(err.code(), StravaErrorCode::UpstreamStatus);
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn non_array_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v3/clubs/678/group_events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "nope"})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .list_group_events("678", "tok")
            .await
            .unwrap_err();
        assert_eq!(err.code(), StravaErrorCode::Decode);
    }
}
