use axum::Router;

pub mod blocks;
pub mod checkout;
pub mod notifications;
pub mod system;

pub fn router() -> Router {
    Router::new()
        .nest("/v1/notifications", notifications::router())
        .nest("/v1/blocks", blocks::router())
        .nest("/v1/checkout", checkout::router())
}
