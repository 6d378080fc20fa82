use super::error::*;
use super::handler;
use crate::application_port::SessionProofCodec;
use crate::domain_model::{ProofScope, Token};
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let admin_login = warp::post()
        .and(warp::path("admin"))
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.admin_service.clone()))
        .and_then(handler::admin_login);

    let admin_session = warp::get()
        .and(warp::path("admin"))
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::header::optional::<String>("cookie"))
        .and(with(server.proof_codec.clone()))
        .and_then(handler::admin_session);

    let issue_token = warp::post()
        .and(warp::path("admin"))
        .and(warp::path("token"))
        .and(warp::path::end())
        .and(with_admin(server.proof_codec.clone()))
        .and(warp::body::json())
        .and(with(server.admin_service.clone()))
        .and_then(handler::issue_token);

    let report = warp::get()
        .and(warp::path("report"))
        .and(warp::path::param::<Token>())
        .and(warp::path::end())
        .and(warp::header::optional::<String>("cookie"))
        .and(with(server.access_service.clone()))
        .and_then(handler::read_report);

    let verify_start = warp::post()
        .and(warp::path("verify"))
        .and(warp::path("start"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.access_service.clone()))
        .and_then(handler::start_verification);

    let verify_check_global = warp::post()
        .and(warp::path("verify"))
        .and(warp::path("check"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.access_service.clone()))
        .and_then(handler::check_code_global);

    let verify_status_global = warp::get()
        .and(warp::path("verify"))
        .and(warp::path("status"))
        .and(warp::path::end())
        .and(warp::header::optional::<String>("cookie"))
        .and(with(server.proof_codec.clone()))
        .and_then(handler::verify_status);

    // parameterized verify routes come after the literal ones; a token
    // segment would otherwise swallow "start", "check" and "status"
    let verify_check = warp::post()
        .and(warp::path("verify"))
        .and(warp::path::param::<Token>())
        .and(warp::path("check"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.access_service.clone()))
        .and_then(handler::check_code);

    let verify_status_scoped = warp::get()
        .and(warp::path("verify"))
        .and(warp::path::param::<Token>())
        .and(warp::path("status"))
        .and(warp::path::end())
        .and(warp::header::optional::<String>("cookie"))
        .and(with(server.proof_codec.clone()))
        .and_then(handler::verify_status_scoped);

    admin_login
        .or(admin_session)
        .or(issue_token)
        .or(report)
        .or(verify_start)
        .or(verify_check_global)
        .or(verify_status_global)
        .or(verify_check)
        .or(verify_status_scoped)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_admin(
    proof_codec: Arc<dyn SessionProofCodec>,
) -> impl Filter<Extract = (), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("cookie")
        .and_then(move |cookie: Option<String>| {
            let proof_codec = proof_codec.clone();
            async move {
                if proof_codec
                    .verify(cookie.as_deref(), &ProofScope::Admin)
                    .await
                {
                    Ok(())
                } else {
                    Err(reject::custom(ApiReject::of(ApiErrorCode::Unauthorized)))
                }
            }
        })
        .untuple_one()
}
