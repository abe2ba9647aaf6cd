use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use axum_prometheus::PrometheusMetricLayer;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use caption_server::config::Config;
use caption_server::handlers;
use caption_server::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing — JSON in production, human-readable in dev.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "caption_server=info,tower_http=info".parse().unwrap());

    if std::env::var("APP_ENV").as_deref() == Ok("production") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("🚀 Caption server starting...");

    // Vision credentials may legitimately be absent here; the caption
    // endpoint answers 500 per request until they are configured.
    let config = Config::from_env();
    info!("📝 Configuration loaded");

    // CORS: permissive in dev, restrictive in production.
    // Set APP_ENV=production to switch modes.
    let cors = if config.is_dev {
        info!("🔓 CORS: permissive (dev mode)");
        CorsLayer::permissive()
    } else {
        tracing::warn!(
            "🔒 CORS: restrictive (production mode). \
             Cross-origin requests will be denied."
        );
        CorsLayer::new()
    };

    let addr = config.server_addr();

    let app_state = AppState {
        vision: config.vision.clone(),
        http_client: reqwest::Client::new(),
    };

    // Prometheus metrics layer
    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    // Build router
    let app = Router::new()
        // Health check + metrics
        .route("/health", get(handlers::health_check))
        .route(
            "/metrics",
            get(move || async move { metric_handle.render() }),
        )
        // Caption endpoint
        .route(
            "/api/caption",
            post(handlers::caption::generate_caption)
                .layer(DefaultBodyLimit::max(8 * 1024 * 1024)), // 5 MiB image ≈ 6.7 MiB as base64, plus JSON framing
        )
        // Demo page
        .fallback_service(ServeDir::new(&config.static_dir))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(prometheus_layer)
        .layer(cors)
        .with_state(app_state);

    // Start server
    info!("🎧 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
