use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use pixelift_checkout::{
    AttachImage, BeginCheckout, CheckoutCommand, CloseSession, CompleteCheckout, EnterEmail,
    FailCheckout, FailureCause, RemoveImage, Retry, SelectResolution, UploadPolicy, UploadedFile,
    DEFAULT_MAX_FILE_SIZE_MB,
};
use pixelift_core::SessionId;
use pixelift_jobs::Resolution;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/sessions", post(open_session))
        .route("/sessions/:id", get(get_session))
        .route("/sessions/:id/image", post(attach_image).delete(remove_image))
        .route("/sessions/:id/resolution", post(select_resolution))
        .route("/sessions/:id/email", post(enter_email))
        .route("/sessions/:id/submit", post(submit))
        .route("/sessions/:id/result", post(report_result))
        .route("/sessions/:id/retry", post(retry))
        .route("/sessions/:id/close", post(close_session))
}

pub async fn open_session(
    Extension(services): Extension<Arc<AppServices>>,
    body: Option<Json<dto::OpenSessionRequest>>,
) -> axum::response::Response {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    let policy = UploadPolicy::new(req.max_file_size_mb.unwrap_or(DEFAULT_MAX_FILE_SIZE_MB));

    match services.open_session(policy) {
        Ok(flow) => (
            StatusCode::CREATED,
            Json(dto::SessionResponse::from_flow(&flow)),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_session(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let session_id: SessionId = match id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let flow = match services.snapshot(session_id) {
        Ok(flow) => flow,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let events = match services.event_log(session_id) {
        Ok(events) => events,
        Err(e) => return errors::domain_error_to_response(e),
    };

    Json(dto::SessionResponse::from_flow(&flow).with_events(events)).into_response()
}

pub async fn attach_image(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::AttachImageRequest>,
) -> axum::response::Response {
    dispatch(&services, &id, body.expected_version, |session_id| {
        CheckoutCommand::AttachImage(AttachImage {
            session_id,
            file: UploadedFile::new(body.file_name.clone(), body.mime_type.clone(), body.size_bytes),
            occurred_at: Utc::now(),
        })
    })
}

pub async fn remove_image(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Option<Json<dto::VersionedRequest>>,
) -> axum::response::Response {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    dispatch(&services, &id, req.expected_version, |session_id| {
        CheckoutCommand::RemoveImage(RemoveImage {
            session_id,
            occurred_at: Utc::now(),
        })
    })
}

pub async fn select_resolution(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::SelectResolutionRequest>,
) -> axum::response::Response {
    let resolution: Resolution = match body.resolution.parse() {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    dispatch(&services, &id, body.expected_version, |session_id| {
        CheckoutCommand::SelectResolution(SelectResolution {
            session_id,
            resolution,
            occurred_at: Utc::now(),
        })
    })
}

pub async fn enter_email(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::EnterEmailRequest>,
) -> axum::response::Response {
    dispatch(&services, &id, body.expected_version, |session_id| {
        CheckoutCommand::EnterEmail(EnterEmail {
            session_id,
            email: body.email.clone(),
            occurred_at: Utc::now(),
        })
    })
}

pub async fn submit(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Option<Json<dto::VersionedRequest>>,
) -> axum::response::Response {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    dispatch(&services, &id, req.expected_version, |session_id| {
        CheckoutCommand::BeginCheckout(BeginCheckout {
            session_id,
            occurred_at: Utc::now(),
        })
    })
}

/// The payment collaborator reports how the submit ended.
pub async fn report_result(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::CheckoutResultRequest>,
) -> axum::response::Response {
    dispatch(&services, &id, body.expected_version, |session_id| {
        match body.outcome {
            dto::ResultOutcome::Succeeded => {
                CheckoutCommand::CompleteCheckout(CompleteCheckout {
                    session_id,
                    occurred_at: Utc::now(),
                })
            }
            dto::ResultOutcome::Failed => CheckoutCommand::FailCheckout(FailCheckout {
                session_id,
                cause: body.cause.unwrap_or(FailureCause::Upstream),
                reason: body
                    .reason
                    .clone()
                    .unwrap_or_else(|| "checkout failed".to_string()),
                occurred_at: Utc::now(),
            }),
        }
    })
}

pub async fn retry(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Option<Json<dto::VersionedRequest>>,
) -> axum::response::Response {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    dispatch(&services, &id, req.expected_version, |session_id| {
        CheckoutCommand::Retry(Retry {
            session_id,
            occurred_at: Utc::now(),
        })
    })
}

pub async fn close_session(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Option<Json<dto::VersionedRequest>>,
) -> axum::response::Response {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    dispatch(&services, &id, req.expected_version, |session_id| {
        CheckoutCommand::CloseSession(CloseSession {
            session_id,
            occurred_at: Utc::now(),
        })
    })
}

fn dispatch(
    services: &AppServices,
    raw_id: &str,
    expected_version: Option<u64>,
    build: impl FnOnce(SessionId) -> CheckoutCommand,
) -> axum::response::Response {
    let session_id: SessionId = match raw_id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.execute(session_id, dto::expected(expected_version), build(session_id)) {
        Ok(flow) => Json(dto::SessionResponse::from_flow(&flow)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
