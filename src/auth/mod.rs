//! Session context: bearer credentials plus the operator's theme preference.
//!
//! One `SessionContext` is created at startup, shared by reference with every
//! component that needs it, and torn down by `logout`. Token issuance and
//! expiry belong to the backend's auth service; this side only stores what
//! login hands back and attaches it to requests.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use url::Url;

use crate::error::ClientError;

const LOGIN_PATH: &str = "login/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub access: String,
    pub refresh: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials. Access denied.")]
    InvalidCredentials,

    #[error("Login response did not contain an access token")]
    MissingToken,

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Claims read from the access token for display only; the signature is not checked
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    pub fn decode_unverified(token: &str) -> Option<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|e| tracing::debug!("Could not read token claims: {}", e))
            .ok()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|ts| Utc.timestamp_opt(ts, 0).single())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|exp| exp <= now).unwrap_or(false)
    }
}

#[derive(Debug, Default)]
pub struct SessionContext {
    credentials: RwLock<Option<Credentials>>,
    theme: RwLock<Theme>,
}

impl SessionContext {
    pub fn new(credentials: Option<Credentials>, theme: Theme) -> Self {
        Self {
            credentials: RwLock::new(credentials),
            theme: RwLock::new(theme),
        }
    }

    pub async fn bearer(&self) -> Option<String> {
        self.credentials.read().await.as_ref().map(|c| c.access.clone())
    }

    pub async fn credentials(&self) -> Option<Credentials> {
        self.credentials.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    pub async fn sign_in(&self, credentials: Credentials) {
        tracing::info!(
            "Signed in{}",
            credentials.username.as_deref().map(|u| format!(" as {}", u)).unwrap_or_default()
        );
        *self.credentials.write().await = Some(credentials);
    }

    /// Teardown: drop the credential pair. Theme survives logout.
    pub async fn logout(&self) {
        *self.credentials.write().await = None;
        tracing::info!("Signed out");
    }

    pub async fn claims(&self) -> Option<TokenClaims> {
        let token = self.bearer().await?;
        TokenClaims::decode_unverified(&token)
    }

    pub async fn theme(&self) -> Theme {
        *self.theme.read().await
    }

    pub async fn toggle_theme(&self) -> Theme {
        let mut theme = self.theme.write().await;
        *theme = theme.toggled();
        *theme
    }
}

/// Exchange username/password for an access/refresh pair.
///
/// The backend answers `{ "code": "LOGIN_SUCCESS", "data": { "access", "refresh" } }`;
/// a bare `{ "access", "refresh" }` body is accepted as well.
pub async fn login(http: &Client, base_url: &Url, username: &str, password: &str) -> Result<Credentials, AuthError> {
    let url = base_url
        .join(LOGIN_PATH)
        .map_err(|e| ClientError::transport(format!("invalid login URL: {}", e)))?;

    let response = http
        .post(url)
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .map_err(ClientError::from)?;

    let status = response.status();
    if status.as_u16() == 400 || status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(AuthError::InvalidCredentials);
    }

    let body: Value = response.json().await.map_err(ClientError::from)?;
    if !status.is_success() {
        return Err(ClientError::from_status(status.as_u16(), Some(&body), status.canonical_reason()).into());
    }

    credentials_from_body(&body, username).ok_or(AuthError::MissingToken)
}

fn credentials_from_body(body: &Value, username: &str) -> Option<Credentials> {
    let tokens = match body.get("data") {
        Some(data @ Value::Object(_)) => data,
        _ => body,
    };
    let access = tokens.get("access").and_then(Value::as_str)?.to_string();
    let refresh = tokens.get("refresh").and_then(Value::as_str).map(str::to_string);
    Some(Credentials {
        access,
        refresh,
        username: Some(username.to_string()),
    })
}
