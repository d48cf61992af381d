use crate::{AppState, handlers::customer};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Customer Router Module
///
/// Self-service signup and login for customers, plus the account maintenance
/// endpoints. Nested under `/customer`.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        // POST /customer/signup (multipart, optional `img`)
        .route("/signup", post(customer::signup))
        // POST /customer/login (url-encoded)
        .route("/login", post(customer::login))
        // PUT /customer/update/{id}
        // Blank fields keep their stored values.
        .route("/update/{id}", put(customer::update_user))
        // DELETE /customer/delete/{id}
        .route("/delete/{id}", delete(customer::delete_user))
        // GET /customer/users
        .route("/users", get(customer::list_users))
}
