use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    if let Some(rejected) = err.find::<ApiReject>() {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            rejected.code.clone(),
            rejected.message.clone(),
        ));
        Ok(warp::reply::with_status(json, rejected.code.status()))
    } else if err.is_not_found() {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            ApiErrorCode::NotFound,
            "no such route",
        ));
        Ok(warp::reply::with_status(json, StatusCode::NOT_FOUND))
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
    {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            ApiErrorCode::Validation,
            "request body is not valid",
        ));
        Ok(warp::reply::with_status(json, StatusCode::BAD_REQUEST))
    } else {
        let json = warp::reply::json(&ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(ApiError {
                code: ApiErrorCode::InternalError,
                message: format!("Unhandled error: {:?}", err),
            }),
        });
        Ok(warp::reply::with_status(
            json,
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("request is not valid")]
    Validation,
    #[error("verification code does not match")]
    WrongCode,
    #[error("administrator authentication required")]
    Unauthorized,
    #[error("unknown token")]
    NotFound,
    #[error("this link has expired")]
    Expired,
    #[error("verification provider is unavailable")]
    Provider,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::Validation => StatusCode::BAD_REQUEST,
            ApiErrorCode::WrongCode | ApiErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::Expired => StatusCode::GONE,
            ApiErrorCode::Provider => StatusCode::BAD_GATEWAY,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn storage<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        error!("Store error: {}", error);
        ApiErrorCode::InternalError
    }
}

/// Carries the user-facing message alongside the code; store and
/// internal details are logged here and never leave the process.
#[derive(Debug)]
pub struct ApiReject {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiReject {
    pub fn of(code: ApiErrorCode) -> ApiReject {
        let message = code.to_string();
        ApiReject { code, message }
    }
}

impl reject::Reject for ApiReject {}

impl From<AccessError> for ApiReject {
    fn from(error: AccessError) -> Self {
        let message = error.to_string();
        let code = match error {
            AccessError::Validation(_) => ApiErrorCode::Validation,
            AccessError::WrongCode => ApiErrorCode::WrongCode,
            AccessError::NotFound => ApiErrorCode::NotFound,
            AccessError::Expired => ApiErrorCode::Expired,
            AccessError::Provider(_) => ApiErrorCode::Provider,
            AccessError::Store(e) => return ApiReject::of(ApiErrorCode::storage(e)),
            AccessError::Internal(e) => return ApiReject::of(ApiErrorCode::internal(e)),
        };
        ApiReject { code, message }
    }
}

impl From<AdminError> for ApiReject {
    fn from(error: AdminError) -> Self {
        let message = error.to_string();
        let code = match error {
            AdminError::Unauthorized => ApiErrorCode::Unauthorized,
            // message passes through verbatim, unlike Store/Internal
            AdminError::Misconfigured => ApiErrorCode::InternalError,
            AdminError::Store(e) => return ApiReject::of(ApiErrorCode::storage(e)),
            AdminError::Internal(e) => return ApiReject::of(ApiErrorCode::internal(e)),
        };
        ApiReject { code, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiReject::from(AccessError::Validation("bad".to_owned()))
                .code
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiReject::from(AccessError::WrongCode).code.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiReject::from(AccessError::NotFound).code.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiReject::from(AccessError::Expired).code.status(),
            StatusCode::GONE
        );
        assert_eq!(
            ApiReject::from(AccessError::Provider("down".to_owned()))
                .code
                .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiReject::from(AdminError::Unauthorized).code.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_store_details_never_reach_the_message() {
        let rejected = ApiReject::from(AccessError::Store(
            "redis://user:pw@host refused".to_owned(),
        ));
        assert_eq!(rejected.code.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!rejected.message.contains("redis://"));
    }

    #[test]
    fn test_safe_messages_pass_through() {
        let rejected = ApiReject::from(AccessError::Validation(
            "enter a valid phone number".to_owned(),
        ));
        assert_eq!(rejected.message, "enter a valid phone number");

        let rejected = ApiReject::from(AccessError::Expired);
        assert_eq!(rejected.message, "this link has expired");
    }
}
