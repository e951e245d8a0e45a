//! Refresh-token exchange against the broker login endpoint.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{AuthError, AuthResult};

/// Default timeout for token endpoint requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    api_server: String,
    expires_in: i64,
}

/// A freshly granted credential pair.
///
/// `refresh_token` replaces the previous one (refresh tokens are
/// single-use at the broker).
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub api_server: String,
    pub expires_at: DateTime<Utc>,
}

/// Client for the OAuth token endpoint.
pub struct TokenClient {
    client: Client,
    login_url: String,
}

impl TokenClient {
    /// Create a new token client.
    ///
    /// # Arguments
    /// * `login_url` - Base login URL (e.g. "https://login.questrade.com")
    pub fn new(login_url: impl Into<String>, timeout: Option<Duration>) -> AuthResult<Self> {
        let client = Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(|e| AuthError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            login_url: login_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Exchange a refresh token for a new credential pair.
    ///
    /// A non-2xx response is surfaced as `TokenRejected` and the caller's
    /// stored credential is left untouched. The token value is never logged.
    pub async fn exchange(&self, refresh_token: &str) -> AuthResult<TokenGrant> {
        let url = format!("{}/oauth2/token", self.login_url);
        debug!(url = %url, "Exchanging refresh token");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Http(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::TokenRejected {
                status: status.as_u16(),
            });
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Http(format!("failed to parse token response: {e}")))?;

        let expires_at = Utc::now() + ChronoDuration::seconds(parsed.expires_in);
        info!(
            api_server = %parsed.api_server,
            expires_at = %expires_at,
            "Token exchange succeeded"
        );

        Ok(TokenGrant {
            access_token: parsed.access_token,
            refresh_token: parsed.refresh_token,
            api_server: parsed.api_server,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn grant_body() -> serde_json::Value {
        serde_json::json!({
            "access_token": "at-1",
            "refresh_token": "rt-2",
            "api_server": "https://api01.example.com/",
            "expires_in": 1800,
            "token_type": "Bearer"
        })
    }

    #[tokio::test]
    async fn test_exchange_parses_grant() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(query_param("refresh_token", "seed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(grant_body()))
            .mount(&server)
            .await;

        let client = TokenClient::new(server.uri(), None).unwrap();
        let grant = client.exchange("seed").await.unwrap();

        assert_eq!(grant.access_token, "at-1");
        assert_eq!(grant.refresh_token, "rt-2");
        assert_eq!(grant.api_server, "https://api01.example.com/");
        assert!(grant.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn test_rejection_is_surfaced_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let client = TokenClient::new(server.uri(), None).unwrap();
        let err = client.exchange("bad").await.unwrap_err();
        assert!(matches!(err, AuthError::TokenRejected { status: 400 }));
    }
}
