use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    http::HeaderName,
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod accounts;
pub mod config;
pub mod credentials;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod storage;

// Routers, one per actor prefix.
pub mod routes;
use routes::{admin, customer};

// --- Public Re-exports ---

pub use accounts::AccountService;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{LocalAssetStore, MockAssetStore, StorageState};

/// Upper bound on request bodies; multipart image uploads are the only large ones.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and response schema into one
/// OpenAPI document, served as JSON at `/api-docs/openapi.json` and browsable
/// through the Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::customer::signup, handlers::customer::login, handlers::customer::update_user,
        handlers::customer::delete_user, handlers::customer::list_users,
        handlers::admin::signup, handlers::admin::login, handlers::admin::add_vendor,
        handlers::admin::update_vendor, handlers::admin::delete_vendor,
        handlers::admin::list_vendors, handlers::admin::get_vendor,
    ),
    components(
        schemas(
            models::Role, models::PublicAccount, models::UpdatedUser, models::VendorView,
            models::UpdatedVendor, models::MessageResponse, models::LoginRequest,
            models::SignupForm, models::AddVendorForm, models::UpdateUserForm,
            models::UpdateVendorForm,
        )
    ),
    tags(
        (name = "customer", description = "Customer signup, login and account maintenance"),
        (name = "admin", description = "Admin identity and vendor management")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single, cloneable container for everything a handler may need. Shared by
/// every request; the services inside are `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Persistence: accounts, roles and vendor profiles.
    pub repo: RepositoryState,
    /// Image files referenced by accounts.
    pub storage: StorageState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// The orchestrator over this state's repository and asset store.
    pub fn accounts(&self) -> AccountService {
        AccountService::new(self.repo.clone(), self.storage.clone())
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing tree, applies the global middleware and registers the state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // Stored images are served straight from disk; their URL is `{DOMAIN}/uploads/{path}`.
    let uploads = ServeDir::new(&state.config.uploads_dir);

    // 2. Base Router Assembly
    let base_router = Router::new()
        .route("/health", get(handlers::health))
        // Documentation: Swagger UI plus the raw OpenAPI JSON it loads.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/customer", customer::customer_routes())
        .nest("/admin", admin::admin_routes())
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Every incoming request gets a UUID unless the caller sent one.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. One tracing span per request, tagged with that id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span used by `TraceLayer`, so every log line for a
/// request carries its method, URI and request id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
