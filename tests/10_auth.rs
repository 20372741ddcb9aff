mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;

use folio_console::auth::{self, AuthError, SessionContext};
use folio_console::client::{OutboundPayload, ResourceClient};
use folio_console::error::ClientError;
use folio_console::types::ResourceType;
use url::Url;

fn http() -> reqwest::Client {
    reqwest::Client::builder().timeout(Duration::from_secs(5)).build().expect("http client")
}

#[tokio::test]
async fn login_returns_credential_pair() -> Result<()> {
    let backend = common::FakeBackend::start().await?;
    let base = Url::parse(&backend.base_url)?;

    let creds = auth::login(&http(), &base, common::USERNAME, common::PASSWORD).await?;
    assert_eq!(creds.access, backend.token());
    assert_eq!(creds.refresh.as_deref(), Some("refresh-token"));

    let session = SessionContext::default();
    session.sign_in(creds).await;
    let claims = session.claims().await.expect("claims readable");
    assert_eq!(claims.user_id, Some(json!(1)));
    assert!(claims.expires_at().is_some());
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_denied() -> Result<()> {
    let backend = common::FakeBackend::start().await?;
    let base = Url::parse(&backend.base_url)?;

    let err = auth::login(&http(), &base, common::USERNAME, "nope").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
    assert_eq!(err.to_string(), "Invalid credentials. Access denied.");
    Ok(())
}

#[tokio::test]
async fn writes_carry_the_session_bearer() -> Result<()> {
    let backend = common::FakeBackend::start().await?;
    let session = Arc::new(SessionContext::default());
    let client = backend.client(session.clone());

    let mut fields = serde_json::Map::new();
    fields.insert("title".into(), json!("Folio"));

    let denied = client.create(ResourceType::Project, OutboundPayload::json(fields.clone())).await.unwrap_err();
    assert!(matches!(denied, ClientError::Unauthorized { status: 401, .. }));
    assert_eq!(denied.message(), "Authentication credentials were not provided.");

    // Same client, token picked up from the shared session
    let creds = auth::login(client.http(), client.base_url(), common::USERNAME, common::PASSWORD).await?;
    session.sign_in(creds).await;
    client.create(ResourceType::Project, OutboundPayload::json(fields.clone())).await?;
    assert_eq!(backend.rows("projects").len(), 1);

    session.logout().await;
    assert!(client.create(ResourceType::Project, OutboundPayload::json(fields)).await.is_err());
    Ok(())
}
