//! Warp filters that run the auth gate in front of protected routes

use warp::{Filter, Rejection};

use crate::auth::gate::{AuthGate, TokenSource};
use crate::auth::user::{Identity, Role};
use crate::constants::SESSION_COOKIE_NAME;
use crate::handlers::response::reject;

/// Extract the caller's token from the session cookie or Authorization header
pub fn token_source() -> impl Filter<Extract = (TokenSource,), Error = Rejection> + Clone {
    warp::cookie::optional::<String>(SESSION_COOKIE_NAME)
        .and(warp::header::optional::<String>("authorization"))
        .map(TokenSource::from_request)
}

/// Require a valid session and hand the identity to the handler
pub fn authenticated(gate: AuthGate) -> impl Filter<Extract = (Identity,), Error = Rejection> + Clone {
    token_source()
        .and(warp::any().map(move || gate.clone()))
        .and_then(|source: TokenSource, gate: AuthGate| async move {
            gate.authenticate(source).await.map_err(reject)
        })
}

/// Require a valid session whose role is one of `allowed`
pub fn with_roles(
    gate: AuthGate,
    allowed: &'static [Role],
) -> impl Filter<Extract = (Identity,), Error = Rejection> + Clone {
    authenticated(gate.clone()).and_then(move |identity: Identity| {
        let gate = gate.clone();
        async move {
            gate.authorize(&identity, allowed)
                .map(|_| identity)
                .map_err(reject)
        }
    })
}
