#![allow(dead_code)]

use std::sync::Arc;

use course_auth::auth::gate::AuthGate;
use course_auth::auth::service::{AccountService, RegisterRequest};
use course_auth::auth::token::TokenManager;
use course_auth::auth::user::{Identity, Role};
use course_auth::config::AuthConfig;
use course_auth::handlers::AppState;
use course_auth::mailer::{MemoryMailer, OutgoingMail};
use course_auth::storage::{CredentialStore, MemoryCredentialStore};

pub const PASSWORD: &str = "s3cure-passw0rd";

pub struct Harness {
    pub config: AuthConfig,
    pub store: MemoryCredentialStore,
    pub mailer: MemoryMailer,
    pub tokens: Arc<TokenManager>,
    pub accounts: AccountService,
    pub gate: AuthGate,
}

pub fn harness() -> Harness {
    let config = AuthConfig::for_testing();
    let store = MemoryCredentialStore::new();
    let mailer = MemoryMailer::new();
    let tokens = Arc::new(TokenManager::from_config(&config));
    let accounts = AccountService::new(
        &config,
        Arc::new(store.clone()),
        tokens.clone(),
        Arc::new(mailer.clone()),
    );
    let gate = AuthGate::new(tokens.clone(), Arc::new(store.clone()));

    Harness {
        config,
        store,
        mailer,
        tokens,
        accounts,
        gate,
    }
}

/// App state sharing the harness store and mailer
pub fn app_state(h: &Harness) -> Arc<AppState> {
    Arc::new(AppState::new(
        &h.config,
        Arc::new(h.store.clone()),
        Arc::new(h.mailer.clone()),
    ))
}

pub fn register_request(email: &str, mobile: &str) -> RegisterRequest {
    RegisterRequest {
        name: "Ada Lovelace".to_string(),
        bio: "Writes notes on engines".to_string(),
        email: email.to_string(),
        mobile: mobile.to_string(),
        password: PASSWORD.to_string(),
        confirm_password: PASSWORD.to_string(),
    }
}

pub async fn register(h: &Harness, email: &str, mobile: &str) -> Identity {
    h.accounts
        .register(register_request(email, mobile))
        .await
        .expect("registration should succeed")
}

pub async fn register_admin(h: &Harness, email: &str, mobile: &str) -> Identity {
    let identity = register(h, email, mobile).await;
    h.store.set_role(&identity.id, Role::Admin).await.unwrap()
}

/// Pull the raw token out of a reset mail's link
pub fn reset_token_from(mail: &OutgoingMail) -> String {
    let start = mail
        .html_body
        .find("/reset-password/")
        .expect("mail should contain a reset link")
        + "/reset-password/".len();
    mail.html_body[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect()
}

/// The persisted password digest of an identity
pub async fn stored_hash(h: &Harness, id: &str) -> Option<String> {
    h.store
        .find_by_id(id, true)
        .await
        .unwrap()
        .and_then(|identity| identity.password_hash)
        .map(|digest| digest.as_str().to_string())
}
