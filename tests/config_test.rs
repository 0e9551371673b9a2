use std::env;
use std::time::Duration;

use course_auth::config::AuthConfig;
use course_auth::error::AuthError;

const VARS: &[&str] = &[
    "COURSE_AUTH_JWT_SECRET",
    "JWT_SECRET",
    "COURSE_AUTH_JWT_EXPIRY",
    "JWT_EXPIRY",
    "COURSE_AUTH_CLIENT_ORIGIN",
    "CORS_ORIGIN",
    "COURSE_AUTH_ENABLE_TLS",
];

fn clear() {
    for var in VARS {
        env::remove_var(var);
    }
}

fn config_error(err: AuthError) -> String {
    match err {
        AuthError::ConfigError(msg) => msg,
        other => panic!("expected a configuration error, got {:?}", other),
    }
}

// Environment is process-global, so every case runs in this one test
#[test]
fn test_from_env() {
    clear();
    let missing = config_error(AuthConfig::from_env().unwrap_err());
    assert!(missing.contains("JWT_SECRET"));

    env::set_var("COURSE_AUTH_JWT_SECRET", "k7#Qp9!vR2@xL5$wN8^zT4&mB1*cF6(h");
    let missing_expiry = config_error(AuthConfig::from_env().unwrap_err());
    assert!(missing_expiry.contains("JWT_EXPIRY"));

    env::set_var("COURSE_AUTH_JWT_EXPIRY", "12h");
    let missing_origin = config_error(AuthConfig::from_env().unwrap_err());
    assert!(missing_origin.contains("CORS_ORIGIN"));

    env::set_var("COURSE_AUTH_CLIENT_ORIGIN", "https://learn.example.com/");
    let config = AuthConfig::from_env().expect("complete environment should load");
    assert_eq!(config.jwt_ttl, Duration::from_secs(12 * 3600));
    assert_eq!(config.client_origin, "https://learn.example.com");
    assert!(!config.enable_tls);

    env::set_var("COURSE_AUTH_CLIENT_ORIGIN", "not a url");
    assert!(AuthConfig::from_env().is_err());
    env::set_var("COURSE_AUTH_CLIENT_ORIGIN", "https://learn.example.com/app");
    assert!(AuthConfig::from_env().is_err());
    env::set_var("COURSE_AUTH_CLIENT_ORIGIN", "https://learn.example.com");

    env::set_var("COURSE_AUTH_JWT_SECRET", "short");
    assert!(AuthConfig::from_env().is_err());
    env::set_var("COURSE_AUTH_JWT_SECRET", "my-super-secret-value-for-the-api-1");
    assert!(AuthConfig::from_env().is_err());
    env::set_var("COURSE_AUTH_JWT_SECRET", "abcdefghijklmnopqrstuvwxyzABCDEFGH");
    assert!(AuthConfig::from_env().is_err());

    // Fallback names are honoured
    env::remove_var("COURSE_AUTH_JWT_SECRET");
    env::set_var("JWT_SECRET", "k7#Qp9!vR2@xL5$wN8^zT4&mB1*cF6(h");
    env::set_var("COURSE_AUTH_JWT_EXPIRY", "0");
    assert!(AuthConfig::from_env().is_err());
    env::set_var("COURSE_AUTH_JWT_EXPIRY", "30m");
    assert_eq!(
        AuthConfig::from_env().unwrap().jwt_ttl,
        Duration::from_secs(1800)
    );

    env::set_var("COURSE_AUTH_ENABLE_TLS", "true");
    assert!(AuthConfig::from_env().is_err());

    clear();
}
