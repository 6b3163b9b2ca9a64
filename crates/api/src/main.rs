#[tokio::main]
async fn main() {
    pixelift_observability::init();

    let terms_url = std::env::var("PIXELIFT_TERMS_URL").ok();
    if terms_url.is_none() {
        tracing::info!("PIXELIFT_TERMS_URL not set; terms link disabled");
    }

    let app = pixelift_api::app::build_app(terms_url);

    let addr =
        std::env::var("PIXELIFT_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
