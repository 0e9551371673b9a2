mod common;

use chrono::{Duration, Utc};

use course_auth::auth::gate::TokenSource;
use course_auth::auth::user::Role;
use course_auth::error::AuthError;

#[tokio::test]
async fn test_no_token_is_unauthenticated() {
    let h = common::harness();
    let err = h.gate.authenticate(TokenSource::NoToken).await.unwrap_err();

    assert!(matches!(err, AuthError::AuthenticationError(_)));
    assert_eq!(err.status_code(), 401);
}

#[tokio::test]
async fn test_valid_token_resolves_identity_without_secret() {
    let h = common::harness();
    let identity = common::register(&h, "ada@example.com", "5550100").await;
    let token = h.tokens.issue_session_token(&identity).unwrap();

    let resolved = h
        .gate
        .authenticate(TokenSource::Bearer(token))
        .await
        .unwrap();

    assert_eq!(resolved.id, identity.id);
    assert!(resolved.password_hash.is_none());
    assert!(resolved.reset.is_none());
}

#[tokio::test]
async fn test_expired_and_garbage_tokens_are_unauthenticated() {
    let h = common::harness();
    let identity = common::register(&h, "ada@example.com", "5550100").await;
    let expired = h
        .tokens
        .issue_session_token_at(&identity, Utc::now() - Duration::days(1))
        .unwrap();

    for token in [expired, "garbage".to_string(), "a\u{0}b".to_string()] {
        let err = h
            .gate
            .authenticate(TokenSource::Bearer(token))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 401);
    }
}

#[tokio::test]
async fn test_token_for_missing_identity_is_invalid() {
    let h = common::harness();
    let identity = common::register(&h, "ada@example.com", "5550100").await;

    // Same claims, but the identity lives in a different store
    let other = common::harness();
    let token = other.tokens.issue_session_token(&identity).unwrap();

    let err = other
        .gate
        .authenticate(TokenSource::Bearer(token))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AuthError::AuthenticationError("Invalid Access Token.".to_string())
    );
}

#[tokio::test]
async fn test_role_gate() {
    let h = common::harness();
    let user = common::register(&h, "ada@example.com", "5550100").await;
    let admin = common::register_admin(&h, "grace@example.com", "5550101").await;

    let denied = h.gate.authorize(&user, &[Role::Admin]).unwrap_err();
    assert!(matches!(denied, AuthError::AuthorizationError(_)));
    assert_eq!(denied.status_code(), 403);

    assert!(h.gate.authorize(&admin, &[Role::Admin]).is_ok());
    assert!(h.gate.authorize(&user, &[Role::User, Role::Admin]).is_ok());
    // No inheritance: ADMIN is not implicitly USER
    assert!(h.gate.authorize(&admin, &[Role::User]).is_err());
}

#[tokio::test]
async fn test_role_read_from_store_not_token() {
    let h = common::harness();
    let identity = common::register(&h, "ada@example.com", "5550100").await;
    let token = h.tokens.issue_session_token(&identity).unwrap();

    h.store.set_role(&identity.id, Role::Admin).await.unwrap();

    let resolved = h
        .gate
        .authenticate_with_roles(TokenSource::Bearer(token), &[Role::Admin])
        .await
        .unwrap();
    assert_eq!(resolved.role, Role::Admin);
}
