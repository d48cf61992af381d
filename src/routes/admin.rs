use crate::{AppState, handlers::admin};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Admin Router Module
///
/// Admin signup/login and the vendor management endpoints. Nested under `/admin`.
///
/// Vendor accounts are only ever created here; they carry no password, so the
/// login endpoints never accept them.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /admin/signup
        .route("/signup", post(admin::signup))
        // POST /admin/login
        // Also requires the admin role on the account.
        .route("/login", post(admin::login))
        // POST /admin/add-vendor
        // Account, vendor role and vendor profile are written in one transaction.
        .route("/add-vendor", post(admin::add_vendor))
        // PUT /admin/update-vendor/{id}
        .route("/update-vendor/{id}", put(admin::update_vendor))
        // DELETE /admin/delete/{id}
        .route("/delete/{id}", delete(admin::delete_vendor))
        // GET /admin/list-vendors
        .route("/list-vendors", get(admin::list_vendors))
        // GET /admin/vendor/{id}
        .route("/vendor/{id}", get(admin::get_vendor))
}
