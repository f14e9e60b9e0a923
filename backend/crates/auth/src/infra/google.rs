//! Google OAuth 2.0 / OpenID Connect identity provider
//!
//! Authorization-code flow: authorize redirect, token exchange, userinfo.

use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

use crate::application::config::OAuthConfig;
use crate::domain::provider::IdentityProvider;
use crate::domain::value_object::provider_profile::ProviderProfile;
use crate::error::{AuthError, AuthResult};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct GoogleIdentityProvider {
    http: reqwest::Client,
    oauth: OAuthConfig,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UserInfo {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
    email_verified: Option<bool>,
}

impl GoogleIdentityProvider {
    pub fn new(oauth: OAuthConfig) -> AuthResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| AuthError::Internal(format!("HTTP client: {}", e)))?;
        Ok(Self { http, oauth })
    }

    async fn fetch_access_token(&self, code: &str) -> AuthResult<String> {
        let response = self
            .http
            .post(&self.oauth.token_endpoint)
            .form(&[
                ("code", code),
                ("client_id", self.oauth.client_id.as_str()),
                ("client_secret", self.oauth.client_secret.as_str()),
                ("redirect_uri", self.oauth.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(format!("token exchange: {}", e)))?;

        // 4xx: the code itself was refused (stale, reused, or forged)
        let status = response.status();
        if status.is_client_error() {
            return Err(AuthError::CodeRejected(format!("token exchange: {}", status)));
        }
        let response = response
            .error_for_status()
            .map_err(|e| AuthError::ProviderUnavailable(format!("token exchange: {}", e)))?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(format!("token response: {}", e)))?;
        Ok(token.access_token)
    }

    async fn fetch_userinfo(&self, access_token: &str) -> AuthResult<UserInfo> {
        self.http
            .get(&self.oauth.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::ProviderUnavailable(format!("userinfo: {}", e)))?
            .json()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(format!("userinfo response: {}", e)))
    }
}

impl IdentityProvider for GoogleIdentityProvider {
    fn authorize_url(&self, state: &str) -> AuthResult<String> {
        let scope = self.oauth.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.oauth.authorize_endpoint,
            &[
                ("client_id", self.oauth.client_id.as_str()),
                ("redirect_uri", self.oauth.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("state", state),
                ("prompt", "select_account"),
            ],
        )
        .map_err(|e| AuthError::Internal(format!("authorize endpoint: {}", e)))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> AuthResult<ProviderProfile> {
        let access_token = self.fetch_access_token(code).await?;
        let info = self.fetch_userinfo(&access_token).await?;

        let email = info.email.unwrap_or_default();
        let display_name = info
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        Ok(ProviderProfile {
            subject_id: info.sub,
            email,
            display_name,
            picture: info.picture,
            email_verified: info.email_verified.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Form;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::collections::HashMap;

    async fn spawn_fake_google() -> String {
        async fn token(Form(form): Form<HashMap<String, String>>) -> (StatusCode, Json<serde_json::Value>) {
            let code = form.get("code").map(String::as_str);
            if code == Some("flaky-code") {
                return (StatusCode::SERVICE_UNAVAILABLE, Json(serde_json::json!({})));
            }
            if code == Some("good-code")
                && form.get("grant_type").map(String::as_str) == Some("authorization_code")
            {
                (StatusCode::OK, Json(serde_json::json!({ "access_token": "at-1" })))
            } else {
                (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": "invalid_grant" })))
            }
        }

        async fn userinfo(headers: HeaderMap) -> (StatusCode, Json<serde_json::Value>) {
            let authorized = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                == Some("Bearer at-1");
            if !authorized {
                return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({})));
            }
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "sub": "1234567890",
                    "email": "priya@bmsce.ac.in",
                    "name": "Priya",
                    "picture": "https://example.com/priya.png",
                    "email_verified": true
                })),
            )
        }

        let app = Router::new()
            .route("/token", post(token))
            .route("/userinfo", get(userinfo));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn provider(base: &str) -> GoogleIdentityProvider {
        GoogleIdentityProvider::new(OAuthConfig {
            client_id: "client".into(),
            client_secret: "secret".into(),
            token_endpoint: format!("{base}/token"),
            userinfo_endpoint: format!("{base}/userinfo"),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_authorize_url_carries_state_and_scope() {
        let provider = GoogleIdentityProvider::new(OAuthConfig {
            client_id: "client-id".into(),
            ..Default::default()
        })
        .unwrap();
        let url = Url::parse(&provider.authorize_url("st@te").unwrap()).unwrap();
        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(params["client_id"], "client-id");
        assert_eq!(params["state"], "st@te");
        assert_eq!(params["scope"], "openid email profile");
        assert_eq!(params["prompt"], "select_account");
        assert_eq!(params["response_type"], "code");
    }

    #[tokio::test]
    async fn test_exchange_code_returns_profile() {
        let base = spawn_fake_google().await;
        let profile = provider(&base).exchange_code("good-code").await.unwrap();
        assert_eq!(profile.subject_id, "1234567890");
        assert_eq!(profile.email, "priya@bmsce.ac.in");
        assert_eq!(profile.display_name, "Priya");
        assert_eq!(profile.picture.as_deref(), Some("https://example.com/priya.png"));
        assert!(profile.email_verified);
    }

    #[tokio::test]
    async fn test_rejected_code_is_not_an_outage() {
        let base = spawn_fake_google().await;
        let err = provider(&base).exchange_code("stale-code").await.unwrap_err();
        assert!(matches!(err, AuthError::CodeRejected(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_token_endpoint_5xx_is_provider_error() {
        let base = spawn_fake_google().await;
        let err = provider(&base).exchange_code("flaky-code").await.unwrap_err();
        assert!(matches!(err, AuthError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_provider_error() {
        // Nothing listens on port 9 of the loopback
        let err = provider("http://127.0.0.1:9")
            .exchange_code("good-code")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::ProviderUnavailable(_)));
    }
}
