//! Integration tests for the authentication system.
//!
//! Tests registration, login, refresh, revocation and credential updates
//! against the in-memory store.

use chirpy::auth::{
    AuthError, AuthManager, LoginRequest, RefreshTokenRepository, RegisterRequest, TokenError,
    UpdateUserRequest, password, refresh, token,
};
use chirpy::db::MemoryStore;
use chrono::{Duration, Utc};
use std::sync::Arc;
use std::time::Instant;

const SECRET: &str = "test_secret_key_for_jwt_signing_0123456789";

/// Helper to create test auth manager and the store behind it
fn setup_auth_manager() -> (AuthManager, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let auth = AuthManager::new(store.clone(), store.clone(), SECRET.to_string());
    (auth, store)
}

fn register_request(email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_register_new_user() {
    let (auth, _) = setup_auth_manager();

    let user = auth
        .register(register_request("walt@breakingbad.com", "04234"))
        .await
        .expect("Registration should succeed");

    assert_eq!(user.email, "walt@breakingbad.com");
    assert!(!user.is_chirpy_red);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (auth, _) = setup_auth_manager();

    auth.register(register_request("walt@breakingbad.com", "04234"))
        .await
        .expect("First registration should succeed");

    let result = auth
        .register(register_request("walt@breakingbad.com", "other"))
        .await;

    assert!(
        matches!(result, Err(AuthError::EmailTaken)),
        "Should return EmailTaken error"
    );
}

#[tokio::test]
async fn test_register_rejects_empty_password() {
    let (auth, store) = setup_auth_manager();

    let result = auth.register(register_request("a@b.io", "")).await;

    assert!(matches!(result, Err(AuthError::WeakPassword(_))));
    assert_eq!(store.user_count().await, 0);
}

#[tokio::test]
async fn test_login_issues_usable_tokens() {
    let (auth, _) = setup_auth_manager();
    let registered = auth
        .register(register_request("saul@bettercall.com", "123456"))
        .await
        .unwrap();

    let (user, tokens) = auth
        .login(login_request("saul@bettercall.com", "123456"))
        .await
        .expect("Login should succeed");

    assert_eq!(user.id, registered.id);
    assert_eq!(auth.verify_access_token(&tokens.access_token).unwrap(), user.id);
    assert!(refresh::is_well_formed(&tokens.refresh_token));
}

#[tokio::test]
async fn test_login_failures_share_client_message() {
    let (auth, _) = setup_auth_manager();
    auth.register(register_request("saul@bettercall.com", "123456"))
        .await
        .unwrap();

    let wrong_password = auth
        .login(login_request("saul@bettercall.com", "654321"))
        .await
        .unwrap_err();
    let unknown_email = auth
        .login(login_request("kim@bettercall.com", "123456"))
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, AuthError::InvalidPassword));
    assert!(matches!(unknown_email, AuthError::UserNotFound));
    assert_eq!(wrong_password.client_message(), unknown_email.client_message());
}

#[tokio::test]
async fn test_unknown_email_login_pays_verify_cost() {
    let (auth, _) = setup_auth_manager();
    auth.register(register_request("saul@bettercall.com", "123456"))
        .await
        .unwrap();

    let reference = password::hash("123456").unwrap();
    let started = Instant::now();
    assert!(password::verify(&reference, "654321").is_err());
    let verify_cost = started.elapsed();

    let started = Instant::now();
    let result = auth.login(login_request("kim@bettercall.com", "123456")).await;
    let unknown_email_cost = started.elapsed();

    assert!(matches!(result, Err(AuthError::UserNotFound)));
    assert!(
        unknown_email_cost >= verify_cost / 4,
        "unknown email took {unknown_email_cost:?}, one verify takes {verify_cost:?}"
    );
}

#[tokio::test]
async fn test_refresh_mints_new_access_token() {
    let (auth, _) = setup_auth_manager();
    let user = auth
        .register(register_request("a@b.io", "pw"))
        .await
        .unwrap();
    let (_, tokens) = auth.login(login_request("a@b.io", "pw")).await.unwrap();

    let access = auth.refresh(&tokens.refresh_token).await.unwrap();
    assert_eq!(auth.verify_access_token(&access).unwrap(), user.id);

    // Refreshing does not consume the refresh token
    assert!(auth.refresh(&tokens.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_revoked_refresh_token_is_rejected() {
    let (auth, _) = setup_auth_manager();
    auth.register(register_request("a@b.io", "pw")).await.unwrap();
    let (_, tokens) = auth.login(login_request("a@b.io", "pw")).await.unwrap();

    auth.revoke(&tokens.refresh_token).await.unwrap();
    // Revoking twice succeeds
    auth.revoke(&tokens.refresh_token).await.unwrap();

    let result = auth.refresh(&tokens.refresh_token).await;
    assert!(matches!(result, Err(AuthError::RefreshTokenRevoked)));
}

#[tokio::test]
async fn test_expired_refresh_token_is_rejected() {
    let (auth, store) = setup_auth_manager();
    let user = auth
        .register(register_request("a@b.io", "pw"))
        .await
        .unwrap();

    let stale = refresh::generate().unwrap();
    store
        .store(&stale, user.id, Utc::now() - Duration::minutes(1))
        .await
        .unwrap();

    let result = auth.refresh(&stale).await;
    assert!(matches!(result, Err(AuthError::RefreshTokenExpired)));
}

#[tokio::test]
async fn test_unknown_refresh_token_is_rejected() {
    let (auth, _) = setup_auth_manager();

    let never_issued = refresh::generate().unwrap();
    assert!(matches!(
        auth.refresh(&never_issued).await,
        Err(AuthError::RefreshTokenNotFound)
    ));
    assert!(matches!(
        auth.refresh("not-a-token").await,
        Err(AuthError::RefreshTokenNotFound)
    ));
    assert!(matches!(
        auth.revoke(&never_issued).await,
        Err(AuthError::RefreshTokenNotFound)
    ));
}

#[tokio::test]
async fn test_authenticate_bearer_header() {
    let (auth, _) = setup_auth_manager();
    auth.register(register_request("a@b.io", "pw")).await.unwrap();
    let (user, tokens) = auth.login(login_request("a@b.io", "pw")).await.unwrap();

    let header = format!("Bearer {}", tokens.access_token);
    assert_eq!(auth.authenticate(Some(&header)).unwrap(), user.id);

    assert!(matches!(auth.authenticate(None), Err(AuthError::Header(_))));
    assert!(matches!(
        auth.authenticate(Some(&tokens.access_token)),
        Err(AuthError::Header(_))
    ));
}

#[tokio::test]
async fn test_token_from_other_secret_is_rejected() {
    let (auth, _) = setup_auth_manager();
    let user = auth
        .register(register_request("a@b.io", "pw"))
        .await
        .unwrap();

    let forged = token::mint(user.id, b"some_other_secret", Duration::hours(1)).unwrap();
    assert!(matches!(
        auth.verify_access_token(&forged),
        Err(AuthError::Token(TokenError::SignatureInvalid))
    ));
}

#[tokio::test]
async fn test_short_access_token_lifetime() {
    let (auth, _) = setup_auth_manager();
    let auth = auth.with_access_token_duration(Duration::seconds(-1));
    auth.register(register_request("a@b.io", "pw")).await.unwrap();

    let (_, tokens) = auth.login(login_request("a@b.io", "pw")).await.unwrap();
    assert!(matches!(
        auth.verify_access_token(&tokens.access_token),
        Err(AuthError::Token(TokenError::Expired))
    ));
}

#[tokio::test]
async fn test_update_credentials() {
    let (auth, _) = setup_auth_manager();
    let user = auth
        .register(register_request("old@b.io", "old"))
        .await
        .unwrap();

    let updated = auth
        .update_credentials(
            user.id,
            UpdateUserRequest {
                email: "new@b.io".to_string(),
                password: "new".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.email, "new@b.io");

    assert!(auth.login(login_request("old@b.io", "old")).await.is_err());
    assert!(auth.login(login_request("new@b.io", "old")).await.is_err());
    assert!(auth.login(login_request("new@b.io", "new")).await.is_ok());
}

#[tokio::test]
async fn test_upgrade_and_reset() {
    let (auth, store) = setup_auth_manager();
    let user = auth
        .register(register_request("a@b.io", "pw"))
        .await
        .unwrap();

    auth.upgrade_to_red(user.id).await.unwrap();
    let (user, _) = auth.login(login_request("a@b.io", "pw")).await.unwrap();
    assert!(user.is_chirpy_red);

    auth.reset().await.unwrap();
    assert_eq!(store.user_count().await, 0);
    assert!(matches!(
        auth.upgrade_to_red(user.id).await,
        Err(AuthError::UserNotFound)
    ));
}
