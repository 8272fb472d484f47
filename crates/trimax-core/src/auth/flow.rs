//! Credential login against the JWT auth endpoint.

use std::fmt;

use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::TokenStore;

/// Message used when the backend rejects a login without saying why
const LOGIN_FAILED_FALLBACK: &str = "Login failed";

/// Message used when a transport failure has no text of its own
const NETWORK_ERROR_FALLBACK: &str = "Network error";

/// Username/password pair. Only ever sent as a login request body.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: String,
}

/// Result of a login attempt. Login never fails with an error; every
/// outcome is reported here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum LoginOutcome {
    Success { token: String, user: AuthUser },
    Failure { error: String },
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoginOutcome::Success { .. } => None,
            LoginOutcome::Failure { error } => Some(error),
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        LoginOutcome::Failure {
            error: error.into(),
        }
    }
}

/// Raw JWT endpoint response. Success and failure share one shape.
#[derive(Debug, Default, Deserialize)]
struct JwtAuthResponse {
    token: Option<String>,
    user_id: Option<Value>,
    user_login: Option<String>,
    user_email: Option<String>,
    user_display_name: Option<String>,
    message: Option<String>,
}

impl JwtAuthResponse {
    fn user(&self) -> AuthUser {
        // Some installs send the id as a number, others as a string.
        let id = match &self.user_id {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        AuthUser {
            id,
            username: self.user_login.clone().unwrap_or_default(),
            email: self.user_email.clone().unwrap_or_default(),
            display_name: self.user_display_name.clone().unwrap_or_default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthClient {
    client: Client,
    auth_url: String,
    tokens: TokenStore,
}

impl AuthClient {
    pub fn new(client: Client, auth_url: impl Into<String>, tokens: TokenStore) -> Self {
        Self {
            client,
            auth_url: auth_url.into(),
            tokens,
        }
    }

    /// Exchange credentials for a token, storing it on success.
    pub async fn login(&self, credentials: &Credentials) -> LoginOutcome {
        let response = match self.request_token(credentials).await {
            Ok(response) => response,
            Err(message) => {
                warn!(username = %credentials.username, error = %message, "Login request failed");
                return LoginOutcome::failure(if message.is_empty() {
                    NETWORK_ERROR_FALLBACK.to_string()
                } else {
                    message
                });
            }
        };

        match response.token {
            Some(ref token) if !token.is_empty() => {
                let stored = self.tokens.set_token_default(token);
                info!(
                    username = %credentials.username,
                    expires_at = %stored.expires_at,
                    "Login succeeded"
                );
                LoginOutcome::Success {
                    token: token.clone(),
                    user: response.user(),
                }
            }
            _ => {
                let error = response
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| LOGIN_FAILED_FALLBACK.to_string());
                info!(username = %credentials.username, error = %error, "Login rejected");
                LoginOutcome::failure(error)
            }
        }
    }

    /// POST the credentials and decode the body, whatever the status.
    async fn request_token(&self, credentials: &Credentials) -> Result<JwtAuthResponse, String> {
        let response = self
            .client
            .post(&self.auth_url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(credentials)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        debug!(status = %response.status(), "Auth endpoint responded");

        let body = response.text().await.map_err(|e| e.to_string())?;
        serde_json::from_str(&body).map_err(|e| e.to_string())
    }

    pub fn logout(&self) {
        self.tokens.clear_token();
        info!("Logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.get_token().is_some()
    }
}
