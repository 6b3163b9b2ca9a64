use axum::{response::IntoResponse, routing::post, Json, Router};

use pixelift_notifications::{compose, ContextParts, NotificationContext};

use crate::app::errors;

pub fn router() -> Router {
    Router::new().route("/compose", post(compose_notification))
}

/// Compose the download email for a completed job.
///
/// The request body is the raw notification context; validation happens in
/// the domain constructor, so a missing field comes back as a 400 naming it.
pub async fn compose_notification(Json(parts): Json<ContextParts>) -> axum::response::Response {
    match NotificationContext::from_parts(parts) {
        Ok(ctx) => Json(compose(&ctx)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
