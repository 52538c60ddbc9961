//! OAuth2 authorization-code flow against Google.
//!
//! 1. [`OAuthClient::auth_url`] builds the consent URL the user visits
//! 2. Google redirects back with `?code=...`
//! 3. [`OAuthClient::exchange_code`] trades the code for tokens and keeps them
//!    in the client's credential slot for subsequent Calendar calls

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::check_status;
use crate::error::RemoteError;

/// Read-only calendar access plus event management.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar.readonly",
    "https://www.googleapis.com/auth/calendar.events",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub token_type: String,
    pub scope: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: Url,
    pub token_url: Url,
}

/// Token endpoint success body.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

/// OAuth client with a single credential slot.
///
/// Unauthenticated until tokens are stored by [`exchange_code`](Self::exchange_code)
/// or [`set_credentials`](Self::set_credentials); concurrent writers race and
/// the last one wins.
pub struct OAuthClient {
    config: OAuthConfig,
    http_client: Client,
    credentials: RwLock<Option<TokenSet>>,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Self {
        Self::with_http_client(config, Client::new())
    }

    pub fn with_http_client(config: OAuthConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
            credentials: RwLock::new(None),
        }
    }

    /// Consent URL requesting offline access with a forced consent prompt.
    pub fn auth_url(&self) -> String {
        let mut url = self.config.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &SCOPES.join(" "))
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        url.into()
    }

    /// Exchange an authorization code for tokens and store them.
    ///
    /// Nothing is stored when the exchange fails.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, RemoteError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        tracing::debug!(token_url = %self.config.token_url, "exchanging authorization code");
        let response = self
            .http_client
            .post(self.config.token_url.clone())
            .form(&params)
            .send()
            .await?;

        let body: TokenResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        let tokens = TokenSet {
            access_token: body.access_token,
            refresh_token: body.refresh_token,
            // Lifetimes past chrono's range leave the expiry unknown.
            expires_at: body
                .expires_in
                .and_then(Duration::try_seconds)
                .and_then(|ttl| Utc::now().checked_add_signed(ttl)),
            token_type: body.token_type.unwrap_or_else(|| "Bearer".to_string()),
            scope: body.scope,
        };
        self.set_credentials(tokens.clone());
        Ok(tokens)
    }

    pub fn set_credentials(&self, tokens: TokenSet) {
        *self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(tokens);
    }

    pub fn credentials(&self) -> Option<TokenSet> {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials().is_some()
    }

    /// Current access token; refresh is the caller's concern.
    pub fn access_token(&self) -> Result<String, RemoteError> {
        self.credentials()
            .map(|t| t.access_token)
            .ok_or(RemoteError::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use proptest::prelude::*;

    fn config(token_url: &str) -> OAuthConfig {
        OAuthConfig {
            client_id: "client-123.apps.googleusercontent.com".into(),
            client_secret: "shh".into(),
            redirect_uri: "http://localhost:5173/auth/google/callback".into(),
            auth_url: Url::parse("https://accounts.google.com/o/oauth2/v2/auth").unwrap(),
            token_url: Url::parse(token_url).unwrap(),
        }
    }

    #[test]
    fn test_auth_url_parameters() {
        let client = OAuthClient::new(config("https://oauth2.googleapis.com/token"));
        let url = Url::parse(&client.auth_url()).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |k: &str| pairs.iter().find(|(key, _)| key == k).map(|(_, v)| v.as_str());

        assert_eq!(get("access_type"), Some("offline"));
        assert_eq!(get("prompt"), Some("consent"));
        assert_eq!(get("response_type"), Some("code"));
        assert_eq!(
            get("redirect_uri"),
            Some("http://localhost:5173/auth/google/callback")
        );
        assert_eq!(get("scope"), Some(SCOPES.join(" ").as_str()));
    }

    proptest! {
        #[test]
        fn prop_auth_url_always_valid(client_id in ".*", redirect in "[a-z]{1,12}(:[0-9]{2,5})?(/[a-zA-Z0-9 &?=]{0,10}){0,3}") {
            let mut cfg = config("https://oauth2.googleapis.com/token");
            cfg.client_id = client_id.clone();
            cfg.redirect_uri = format!("http://{redirect}");
            let client = OAuthClient::new(cfg);

            let raw = client.auth_url();
            let url = Url::parse(&raw).unwrap();
            let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
            prop_assert!(raw.contains("access_type=offline"));
            prop_assert!(pairs.contains(&("client_id".to_string(), client_id)));
            let scope = pairs.iter().find(|(k, _)| k == "scope").map(|(_, v)| v.clone()).unwrap();
            for s in SCOPES {
                prop_assert!(scope.split(' ').any(|part| part == *s));
            }
        }
    }

    #[tokio::test]
    async fn test_exchange_code_stores_tokens() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code".into(), "good-code".into()),
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"access_token":"ya29.a0","refresh_token":"1//r","expires_in":3599,"token_type":"Bearer","scope":"https://www.googleapis.com/auth/calendar.events"}"#,
            )
            .create_async()
            .await;

        let client = OAuthClient::new(config(&format!("{}/token", server.url())));
        assert!(!client.is_authenticated());

        let tokens = client.exchange_code("good-code").await.unwrap();
        assert_eq!(tokens.access_token, "ya29.a0");
        assert_eq!(tokens.refresh_token.as_deref(), Some("1//r"));
        assert!(tokens.expires_at.unwrap() > Utc::now());
        assert_eq!(client.access_token().unwrap(), "ya29.a0");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_out_of_range_lifetime_has_no_expiry() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"a","expires_in":9223372036854775807}"#)
            .create_async()
            .await;

        let client = OAuthClient::new(config(&format!("{}/token", server.url())));
        let tokens = client.exchange_code("code").await.unwrap();
        assert_eq!(tokens.access_token, "a");
        assert_eq!(tokens.expires_at, None);
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn test_rejected_code_leaves_client_unauthenticated() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"invalid_grant","error_description":"Malformed auth code."}"#)
            .create_async()
            .await;

        let client = OAuthClient::new(config(&format!("{}/token", server.url())));
        let err = client.exchange_code("bad-code").await.unwrap_err();
        match err {
            RemoteError::Api { status, message } => {
                assert_eq!(status, 400);
                assert!(message.starts_with("invalid_grant"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(client.access_token(), Err(RemoteError::NotAuthenticated)));
    }

    #[test]
    fn test_last_writer_wins() {
        let client = OAuthClient::new(config("https://oauth2.googleapis.com/token"));
        for token in ["first", "second"] {
            client.set_credentials(TokenSet {
                access_token: token.into(),
                refresh_token: None,
                expires_at: None,
                token_type: "Bearer".into(),
                scope: None,
            });
        }
        assert_eq!(client.access_token().unwrap(), "second");
    }
}
