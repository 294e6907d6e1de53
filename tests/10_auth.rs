mod common;

use anyhow::Result;
use std::time::Duration;

use stockroom::auth::{Authorization, CredentialStore, SessionGuard};
use stockroom::error::ErrorKind;
use stockroom::notify::Notifier;
use stockroom::shell::{Navigation, Page, PublicPage, Shell};

#[tokio::test]
async fn login_issues_a_usable_credential() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    server.add_user("clerk", "s3cret");
    let (client, store) = server.client(None)?;

    let credential = client.login("clerk", "s3cret").await?;
    client.session().establish(credential.clone())?;

    assert_eq!(store.load()?, Some(credential));
    let guard = SessionGuard::new(client);
    assert_eq!(guard.authorize().await, Authorization::Authorized);
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    server.add_user("clerk", "s3cret");
    let (client, store) = server.client(None)?;

    let err = client.login("clerk", "wrong").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert!(store.is_empty());
    Ok(())
}

#[tokio::test]
async fn register_then_login() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (client, _) = server.client(None)?;

    client.register("newbie", "pw").await?;
    let duplicate = client.register("newbie", "pw").await.unwrap_err();
    assert_eq!(duplicate.kind(), ErrorKind::Validation);

    client.login("newbie", "pw").await?;
    Ok(())
}

#[tokio::test]
async fn expired_access_is_refreshed_over_http() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let stale = server.stale_credential();
    let (client, store) = server.client(Some(stale.clone()))?;

    let guard = SessionGuard::new(client);
    assert_eq!(guard.authorize().await, Authorization::Authorized);

    let stored = store.load()?.expect("credential kept");
    assert_ne!(stored.access, stale.access);
    assert_eq!(stored.refresh, stale.refresh);
    assert_eq!(
        server.calls(),
        vec![("POST".to_string(), "token/refresh".to_string())]
    );
    Ok(())
}

#[tokio::test]
async fn rejected_refresh_redirects_to_login() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let mut stale = server.stale_credential();
    stale.refresh = "revoked".to_string();
    let (client, store) = server.client(Some(stale))?;

    let mut shell = Shell::new(client, Notifier::new(Duration::from_secs(3)));
    let nav = shell.navigate(Page::Suppliers).await;

    assert_eq!(nav, Navigation::Redirect(PublicPage::Login));
    assert!(shell.active().is_none());
    assert!(store.is_empty());
    Ok(())
}
