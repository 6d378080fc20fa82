use super::error::*;
use crate::application_port::{
    AccessService, AdminService, CheckInput, ReportContent, ReportView, SessionProofCodec,
    StartInput,
};
use crate::domain_model::{ProofScope, ReportDraft, ReportKind, Token};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::header::SET_COOKIE;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse;

pub async fn admin_login(
    body: AdminLoginRequest,
    admin_service: Arc<dyn AdminService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let directive = admin_service
        .login(&body.password)
        .await
        .map_err(ApiReject::from)
        .map_err(reject::custom)?;

    let json = warp::reply::json(&ApiResponse::ok(AdminLoginResponse));
    Ok(warp::reply::with_header(
        json,
        SET_COOKIE,
        directive.header_value,
    ))
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub authenticated: bool,
}

pub async fn admin_session(
    cookie_header: Option<String>,
    proof_codec: Arc<dyn SessionProofCodec>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let authenticated = proof_codec
        .verify(cookie_header.as_deref(), &ProofScope::Admin)
        .await;
    Ok(warp::reply::json(&ApiResponse::ok(SessionStatusResponse {
        authenticated,
    })))
}

#[derive(Debug, Deserialize)]
pub struct IssueTokenRequest {
    pub kind: Option<ReportKind>,
    pub report_title: Option<String>,
    pub report_body: Option<String>,
    pub report_url: Option<String>,
    pub identity_hint: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IssueTokenResponse {
    pub token: Token,
    pub verify_url: String,
}

pub async fn issue_token(
    body: IssueTokenRequest,
    admin_service: Arc<dyn AdminService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let draft = ReportDraft {
        kind: body.kind,
        report_title: body.report_title,
        report_body: body.report_body,
        report_url: body.report_url,
        customer_identity_hint: body.identity_hint,
    };
    let issued = admin_service
        .issue_token(draft)
        .await
        .map_err(ApiReject::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(IssueTokenResponse {
        token: issued.token,
        verify_url: issued.verify_url,
    })))
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_hint: Option<String>,
}

pub async fn read_report(
    token: Token,
    cookie_header: Option<String>,
    access_service: Arc<dyn AccessService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let view = access_service
        .report_view(&token, cookie_header.as_deref())
        .await
        .map_err(ApiReject::from)
        .map_err(reject::custom)?;

    let response = match view {
        ReportView::Ok(report) => ReportResponse {
            status: "ok",
            report: Some(report),
            identity_hint: None,
        },
        ReportView::NeedsVerification { identity_hint } => ReportResponse {
            status: "needs_verification",
            report: None,
            identity_hint,
        },
    };
    Ok(warp::reply::json(&ApiResponse::ok(response)))
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub phone: String,
}

pub async fn start_verification(
    body: StartRequest,
    access_service: Arc<dyn AccessService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let started = access_service
        .start_verification(StartInput { phone: body.phone })
        .await
        .map_err(ApiReject::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(StartResponse {
        phone: started.phone.to_string(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub phone: String,
    pub code: String,
    pub identity_hint: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse;

pub async fn check_code(
    token: Token,
    body: CheckRequest,
    access_service: Arc<dyn AccessService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = CheckInput {
        phone: body.phone,
        code: body.code,
        identity_hint: body.identity_hint,
    };
    let result = access_service
        .check_code(&token, input)
        .await
        .map_err(ApiReject::from)
        .map_err(reject::custom)?;

    let json = warp::reply::json(&ApiResponse::ok(CheckResponse));
    Ok(warp::reply::with_header(
        json,
        SET_COOKIE,
        result.proof.header_value,
    ))
}

pub async fn check_code_global(
    body: CheckRequest,
    access_service: Arc<dyn AccessService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = CheckInput {
        phone: body.phone,
        code: body.code,
        identity_hint: body.identity_hint,
    };
    let result = access_service
        .check_code_global(input)
        .await
        .map_err(ApiReject::from)
        .map_err(reject::custom)?;

    let json = warp::reply::json(&ApiResponse::ok(CheckResponse));
    Ok(warp::reply::with_header(
        json,
        SET_COOKIE,
        result.proof.header_value,
    ))
}

pub async fn verify_status(
    cookie_header: Option<String>,
    proof_codec: Arc<dyn SessionProofCodec>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let authenticated = proof_codec
        .verify(cookie_header.as_deref(), &ProofScope::Global)
        .await;
    Ok(warp::reply::json(&ApiResponse::ok(SessionStatusResponse {
        authenticated,
    })))
}

pub async fn verify_status_scoped(
    token: Token,
    cookie_header: Option<String>,
    proof_codec: Arc<dyn SessionProofCodec>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let authenticated = proof_codec
        .verify(cookie_header.as_deref(), &ProofScope::Report(token))
        .await;
    Ok(warp::reply::json(&ApiResponse::ok(SessionStatusResponse {
        authenticated,
    })))
}
