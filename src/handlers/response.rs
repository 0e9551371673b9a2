//! Response envelopes and rejection recovery

use serde::Serialize;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::reject::Reject;
use warp::reply::Response;
use warp::{Rejection, Reply};

use crate::error::AuthError;

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub success: bool,
    pub data: T,
    pub message: String,
}

/// Failure envelope
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

/// Domain error carried through warp's rejection system
#[derive(Debug)]
pub struct ApiRejection(pub AuthError);

impl Reject for ApiRejection {}

pub fn reject(err: AuthError) -> Rejection {
    warp::reject::custom(ApiRejection(err))
}

/// JSON success reply with the given status
pub fn respond<T: Serialize>(status: StatusCode, data: T, message: impl Into<String>) -> Response {
    let body = ApiResponse {
        status_code: status.as_u16(),
        success: status.as_u16() < 400,
        data,
        message: message.into(),
    };
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

fn failure(status: StatusCode, message: String) -> Response {
    warp::reply::with_status(
        warp::reply::json(&ErrorBody {
            success: false,
            message,
        }),
        status,
    )
    .into_response()
}

/// Turn any rejection into `{success: false, message}`
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if let Some(ApiRejection(e)) = err.find::<ApiRejection>() {
        let status =
            StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            log::error!("Request failed: {}", e);
        } else {
            log::debug!("Request rejected: {}", e);
        }
        return Ok(failure(status, e.public_message()));
    }

    if err.is_not_found() {
        return Ok(failure(StatusCode::NOT_FOUND, "404 - Page not found.".to_string()));
    }
    if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        return Ok(failure(
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", e),
        ));
    }
    if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(failure(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body is too large.".to_string(),
        ));
    }
    if err.find::<warp::reject::LengthRequired>().is_some() {
        return Ok(failure(
            StatusCode::LENGTH_REQUIRED,
            "Content-Length header is required.".to_string(),
        ));
    }
    if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        return Ok(failure(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected an application/json body.".to_string(),
        ));
    }
    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(failure(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed.".to_string(),
        ));
    }

    log::error!("Unhandled rejection: {:?}", err);
    Ok(failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Something went wrong.".to_string(),
    ))
}
