use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Router,
};
use log::{error, info};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::api::{lookup_handler, method_not_allowed, upload_handler};
use crate::config::ServerConfig;
use crate::credentials::Credentials;
use crate::db::DynError;
use crate::profile::{collections, profiles, EndpointProfile};
use crate::storage::LocalStorage;
use crate::store::AssetStore;

// State shared by all handlers
pub struct AppState {
    pub store: AssetStore,
    pub storage: LocalStorage,
}

/// Run the API server until Ctrl-C (for serve command)
pub fn serve_assets(
    config: ServerConfig,
    credentials: Option<Credentials>,
) -> Result<(), DynError> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_server(config, credentials))
}

/// Connect the store, prepare the upload directory and serve until shutdown.
///
/// The store is closed after the server stops accepting requests.
pub async fn run_server(
    config: ServerConfig,
    credentials: Option<Credentials>,
) -> Result<(), DynError> {
    let store = AssetStore::connect(&config.database, &credentials).await?;
    store.init_schema(&collections()).await?;

    let storage = LocalStorage::new(config.upload_dir(), config.public_url_prefix());
    storage.ensure_dir().await.map_err(|e| {
        format!(
            "Failed to create upload directory '{}': {}",
            storage.dir().display(),
            e
        )
    })?;

    println!("Upload directory: {}", storage.dir().display());
    println!("Listening on: http://[::]:{} (IPv4 + IPv6)", config.port);
    println!("Endpoints:");
    println!("  GET /health  - Health check");
    for profile in profiles() {
        println!(
            "  POST {}  - Upload audio (multipart: audioFile, language)",
            profile.route
        );
        println!(
            "  GET {}?{}=<tag>  - Look up audio URL by language",
            profile.route, profile.lookup_param
        );
    }
    println!("  GET {}/<file>  - Uploaded audio files", storage.url_prefix());

    let app_state = Arc::new(AppState {
        store: store.clone(),
        storage,
    });
    let app = build_router(app_state, config.max_upload_bytes());

    let listener = tokio::net::TcpListener::bind(format!("[::]:{}", config.port))
        .await
        .map_err(|e| format!("Failed to bind to port {}: {}", config.port, e))?;

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    store.close().await;
    info!("Database connections closed");

    result.map_err(|e| format!("Server error: {}", e).into())
}

/// Build the full router: profile endpoints, health check and uploaded file serving
pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut api_routes = Router::new().route("/health", get(health_handler));
    for profile in profiles() {
        api_routes = api_routes.merge(profile_routes(profile));
    }

    let uploads = ServeDir::new(state.storage.dir());

    api_routes
        .nest_service(state.storage.url_prefix(), uploads)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

fn profile_routes(profile: EndpointProfile) -> Router<Arc<AppState>> {
    let route = profile.route;
    Router::new()
        .route(
            route,
            get(lookup_handler)
                .post(upload_handler)
                .fallback(method_not_allowed),
        )
        .layer(Extension(Arc::new(profile)))
}

// Health check endpoint - returns 200 OK if server is running
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
