//! Account endpoints

use std::sync::Arc;
use warp::http::header::SET_COOKIE;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Rejection, Reply};

use crate::auth::service::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest, UpdateProfileRequest,
};
use crate::auth::user::Identity;
use crate::handlers::response::{reject, respond};
use crate::handlers::AppState;

pub async fn register(
    state: Arc<AppState>,
    body: RegisterRequest,
) -> Result<Response, Rejection> {
    let identity = state.accounts.register(body).await.map_err(reject)?;
    Ok(respond(
        StatusCode::CREATED,
        identity,
        "User successfully registered.",
    ))
}

pub async fn login(state: Arc<AppState>, body: LoginRequest) -> Result<Response, Rejection> {
    let outcome = state.accounts.login(body).await.map_err(reject)?;
    let reply = respond(
        StatusCode::OK,
        outcome.identity,
        "User logged in successfully.",
    );
    Ok(warp::reply::with_header(reply, SET_COOKIE, outcome.cookie.header_value()).into_response())
}

pub async fn logout(identity: Identity, state: Arc<AppState>) -> Result<Response, Rejection> {
    let cookie = state.accounts.logout(&identity).await.map_err(reject)?;
    let reply = respond(
        StatusCode::OK,
        serde_json::json!({}),
        "User logged out successfully.",
    );
    Ok(warp::reply::with_header(reply, SET_COOKIE, cookie.header_value()).into_response())
}

pub async fn change_password(
    identity: Identity,
    state: Arc<AppState>,
    body: ChangePasswordRequest,
) -> Result<Response, Rejection> {
    let updated = state
        .accounts
        .change_password(&identity, body)
        .await
        .map_err(reject)?;
    Ok(respond(StatusCode::OK, updated, "Password changed successfully."))
}

pub async fn forgot_password(
    state: Arc<AppState>,
    body: ForgotPasswordRequest,
) -> Result<Response, Rejection> {
    let email = state.accounts.forgot_password(body).await.map_err(reject)?;
    Ok(respond(
        StatusCode::OK,
        serde_json::json!({}),
        format!(
            "A password reset link has been sent successfully to {}. Please check your email inbox.",
            email
        ),
    ))
}

pub async fn reset_password(
    token: String,
    state: Arc<AppState>,
    body: ResetPasswordRequest,
) -> Result<Response, Rejection> {
    let updated = state
        .accounts
        .reset_password(&token, body)
        .await
        .map_err(reject)?;
    Ok(respond(StatusCode::OK, updated, "Password reset successfully."))
}

pub async fn user_details(identity: Identity, state: Arc<AppState>) -> Result<Response, Rejection> {
    let current = state.accounts.user_details(&identity).await.map_err(reject)?;
    let message = format!("Hello {}, This is your details.", current.name);
    Ok(respond(StatusCode::OK, current, message))
}

pub async fn update_user(
    identity: Identity,
    state: Arc<AppState>,
    body: UpdateProfileRequest,
) -> Result<Response, Rejection> {
    let updated = state
        .accounts
        .update_profile(&identity, body)
        .await
        .map_err(reject)?;
    Ok(respond(StatusCode::OK, updated, "User details updated successfully."))
}

pub async fn list_users(identity: Identity, state: Arc<AppState>) -> Result<Response, Rejection> {
    let identities = state.accounts.list_identities().await.map_err(reject)?;
    log::debug!("Administrator {} listed {} identities", identity.id, identities.len());
    Ok(respond(StatusCode::OK, identities, "Users fetched successfully."))
}
