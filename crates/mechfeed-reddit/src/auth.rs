// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-credential bearer tokens for the listing endpoint.

use chrono::{DateTime, TimeDelta, Utc};
use mechfeed_core::MechfeedError;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    value: SecretString,
    refresh_at: DateTime<Utc>,
}

/// Fetches and caches a bearer token, refreshing it once 90% of its
/// lifetime has passed.
pub struct TokenProvider {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: SecretString,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(
        client: reqwest::Client,
        token_url: String,
        client_id: String,
        client_secret: SecretString,
    ) -> Self {
        Self {
            client,
            token_url,
            client_id,
            client_secret,
            cached: Mutex::new(None),
        }
    }

    /// Returns a valid token, exchanging credentials first if needed.
    pub async fn bearer(&self) -> Result<String, MechfeedError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && Utc::now() < token.refresh_at
        {
            return Ok(token.value.expose_secret().to_owned());
        }

        let acquired = Utc::now();
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(self.client_secret.expose_secret()))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await
            .map_err(|e| MechfeedError::transport("token request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MechfeedError::Fetch {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| MechfeedError::decode("malformed token response", e))?;

        let refresh_at = acquired
            .checked_add_signed(refresh_after(body.expires_in))
            .unwrap_or(acquired);
        debug!(expires_in = body.expires_in, %refresh_at, "obtained bearer token");

        let value = body.access_token;
        *cached = Some(CachedToken {
            value: SecretString::from(value.clone()),
            refresh_at,
        });
        Ok(value)
    }
}

/// Longest lifetime taken at face value (one year).
const MAX_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

/// 90% of the stated lifetime.
fn refresh_after(expires_in_secs: i64) -> TimeDelta {
    TimeDelta::milliseconds(expires_in_secs.clamp(0, MAX_LIFETIME_SECS) * 900)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn refresh_is_ninety_percent_of_lifetime() {
        assert_eq!(refresh_after(86400), TimeDelta::seconds(77760));
        assert_eq!(refresh_after(-5), TimeDelta::zero());
        assert_eq!(
            refresh_after(i64::MAX),
            TimeDelta::seconds(MAX_LIFETIME_SECS / 10 * 9)
        );
    }

    #[tokio::test]
    async fn exchanges_credentials_once_while_valid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            // base64("id:secret")
            .and(header("authorization", "Basic aWQ6c2VjcmV0"))
            .and(body_string("grant_type=client_credentials"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "tok-1", "expires_in": 3600})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = TokenProvider::new(
            reqwest::Client::new(),
            format!("{}/api/v1/access_token", server.uri()),
            "id".into(),
            SecretString::from("secret".to_string()),
        );

        assert_eq!(provider.bearer().await.unwrap(), "tok-1");
        assert_eq!(provider.bearer().await.unwrap(), "tok-1");
    }

    #[tokio::test]
    async fn expired_token_is_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "short", "expires_in": 0})),
            )
            .expect(2)
            .mount(&server)
            .await;

        let provider = TokenProvider::new(
            reqwest::Client::new(),
            server.uri(),
            "id".into(),
            SecretString::from("secret".to_string()),
        );
        provider.bearer().await.unwrap();
        provider.bearer().await.unwrap();
    }

    #[tokio::test]
    async fn absurd_lifetime_is_cached_without_overflow() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"access_token": "forever", "expires_in": i64::MAX}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let provider = TokenProvider::new(
            reqwest::Client::new(),
            server.uri(),
            "id".into(),
            SecretString::from("secret".to_string()),
        );
        assert_eq!(provider.bearer().await.unwrap(), "forever");
        assert_eq!(provider.bearer().await.unwrap(), "forever");
    }

    #[tokio::test]
    async fn rejected_credentials_are_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = TokenProvider::new(
            reqwest::Client::new(),
            server.uri(),
            "id".into(),
            SecretString::from("bad".to_string()),
        );
        assert!(matches!(
            provider.bearer().await,
            Err(MechfeedError::Fetch { status: 401, .. })
        ));
    }
}
