use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use course_auth::auth::service::{AccountService, RegisterRequest};
use course_auth::auth::token::TokenManager;
use course_auth::auth::user::Role;
use course_auth::config::AuthConfig;
use course_auth::handlers::{routes, AppState};
use course_auth::mailer::LogMailer;
use course_auth::storage::MemoryCredentialStore;

#[tokio::main]
async fn main() {
    // Initialize env
    let dotenv_result = dotenvy::dotenv();

    // Initialize logging
    env_logger::init();

    match dotenv_result {
        Ok(path) => info!("Environment variables loaded from {}", path.display()),
        Err(e) => warn!("Failed to load .env file: {}", e),
    }

    // Secrets are mandatory; refuse to start without them
    let config = match AuthConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Configuration: host={}, port={}, token_ttl={}s, tls={}",
        config.host,
        config.port,
        config.jwt_ttl.as_secs(),
        config.enable_tls
    );

    let store = MemoryCredentialStore::new();
    if let Err(e) = seed_admin(&config, &store).await {
        error!("Failed to seed administrator: {}", e);
        std::process::exit(1);
    }

    let state = Arc::new(AppState::new(
        &config,
        Arc::new(store),
        Arc::new(LogMailer),
    ));

    let cors = warp::cors()
        .allow_origin(config.client_origin.as_str())
        .allow_credentials(true)
        .allow_methods(vec!["GET", "POST", "PUT"])
        .allow_headers(vec!["content-type", "authorization"]);

    let app = routes(state)
        .with(cors)
        .with(warp::log("course_auth::http"));

    // Build the server address
    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to parse server address: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting Course Auth server on {}", addr);

    match (config.enable_tls, &config.tls_cert_path, &config.tls_key_path) {
        (true, Some(cert_path), Some(key_path)) => {
            warp::serve(app)
                .tls()
                .cert_path(cert_path)
                .key_path(key_path)
                .run(addr)
                .await;
        }
        _ => {
            warn!("TLS disabled: session cookies are marked Secure and need an HTTPS front proxy");
            warp::serve(app).run(addr).await;
        }
    }
}

/// Create an administrator from COURSE_AUTH_ADMIN_* variables, if present
async fn seed_admin(
    config: &AuthConfig,
    store: &MemoryCredentialStore,
) -> course_auth::error::Result<()> {
    let (email, password) = match (
        std::env::var("COURSE_AUTH_ADMIN_EMAIL"),
        std::env::var("COURSE_AUTH_ADMIN_PASSWORD"),
    ) {
        (Ok(email), Ok(password)) => (email, password),
        _ => return Ok(()),
    };
    let mobile = std::env::var("COURSE_AUTH_ADMIN_MOBILE").unwrap_or_else(|_| "0000000000".to_string());

    let accounts = AccountService::new(
        config,
        Arc::new(store.clone()),
        Arc::new(TokenManager::from_config(config)),
        Arc::new(LogMailer),
    );
    let admin = accounts
        .register(RegisterRequest {
            name: "administrator".to_string(),
            bio: "platform administrator".to_string(),
            email,
            mobile,
            confirm_password: password.clone(),
            password,
        })
        .await?;
    store.set_role(&admin.id, Role::Admin).await?;

    info!("Seeded administrator {}", admin.id);
    Ok(())
}
