//! HTTP routes for the account service

pub mod account;
pub mod auth;
pub mod response;

use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

use crate::auth::gate::AuthGate;
use crate::auth::service::AccountService;
use crate::auth::token::TokenManager;
use crate::auth::user::Role;
use crate::config::AuthConfig;
use crate::constants::{API_PREFIX, MAX_BODY_BYTES};
use crate::mailer::Mailer;
use crate::storage::CredentialStore;

pub use auth::{authenticated, with_roles};
pub use response::{handle_rejection, ApiRejection, ApiResponse};

const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Shared request state, built once at startup
pub struct AppState {
    pub accounts: AccountService,
    pub gate: AuthGate,
}

impl AppState {
    pub fn new(
        config: &AuthConfig,
        store: Arc<dyn CredentialStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let tokens = Arc::new(TokenManager::from_config(config));
        Self {
            accounts: AccountService::new(config, store.clone(), tokens.clone(), mailer),
            gate: AuthGate::new(tokens, store),
        }
    }
}

fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn api() -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::path("api")
        .and(warp::path("v1"))
        .and(warp::path(API_PREFIX))
}

/// All routes, with rejections rendered as JSON failures
pub fn routes(state: Arc<AppState>) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let gate = state.gate.clone();

    let register = api()
        .and(warp::path("register"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(json_body())
        .and_then(account::register);

    let login = api()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(json_body())
        .and_then(account::login);

    let logout = api()
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(warp::get())
        .and(authenticated(gate.clone()))
        .and(with_state(state.clone()))
        .and_then(account::logout);

    let change_password = api()
        .and(warp::path("change-password"))
        .and(warp::path::end())
        .and(warp::post())
        .and(authenticated(gate.clone()))
        .and(with_state(state.clone()))
        .and(json_body())
        .and_then(account::change_password);

    let forgot_password = api()
        .and(warp::path("forgot-password"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(json_body())
        .and_then(account::forgot_password);

    let reset_password = api()
        .and(warp::path("reset-password"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(json_body())
        .and_then(account::reset_password);

    let user_details = api()
        .and(warp::path("user-details"))
        .and(warp::path::end())
        .and(warp::get())
        .and(authenticated(gate.clone()))
        .and(with_state(state.clone()))
        .and_then(account::user_details);

    let update_user = api()
        .and(warp::path("update-user"))
        .and(warp::path::end())
        .and(warp::put())
        .and(authenticated(gate.clone()))
        .and(with_state(state.clone()))
        .and(json_body())
        .and_then(account::update_user);

    let list_users = api()
        .and(warp::path("admin"))
        .and(warp::path("users"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_roles(gate, ADMIN_ONLY))
        .and(with_state(state))
        .and_then(account::list_users);

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| "OK");

    register
        .or(login)
        .or(logout)
        .or(change_password)
        .or(forgot_password)
        .or(reset_password)
        .or(user_details)
        .or(update_user)
        .or(list_users)
        .or(health)
        .recover(handle_rejection)
}
