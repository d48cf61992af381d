//! HTTP handlers. Each one extracts its input, delegates to the `AccountService`
//! and maps the result onto a response projection; `AppError` renders failures.

pub mod admin;
pub mod customer;
pub mod extract;
pub mod forms;

/// health
///
/// Liveness probe for load balancers. Does not touch the database.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}
