use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use pixelift_render::{BlockRenderer, BlockAttributes, HtmlEscape, IdentityTranslator};

use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/uploader", get(uploader))
}

/// Render the uploader block for the given attributes.
///
/// Query parameters override the block-attribute defaults, mirroring what an
/// editor configures per block instance.
pub async fn uploader(
    Extension(services): Extension<Arc<AppServices>>,
    Query(attrs): Query<BlockAttributes>,
) -> axum::response::Response {
    let renderer = BlockRenderer::new(&IdentityTranslator, &HtmlEscape, services.options());
    let html = renderer.render_uploader(&attrs);
    Json(serde_json::json!({ "html": html })).into_response()
}
