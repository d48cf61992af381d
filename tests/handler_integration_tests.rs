use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use restaurant_accounts::{
    AppConfig, AppState, create_router,
    models::{AddVendorRequest, SignupRequest, Upload},
    repository::{InMemoryRepository, RepositoryState},
    storage::{MockAssetStore, StorageState},
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

const BOUNDARY: &str = "----restaurant-accounts-boundary";

// --- Test Harness ---

fn test_state() -> AppState {
    AppState {
        repo: Arc::new(InMemoryRepository::new()) as RepositoryState,
        storage: Arc::new(MockAssetStore::new()) as StorageState,
        config: AppConfig::default(),
    }
}

fn app(state: &AppState) -> Router {
    create_router(state.clone())
}

/// Hand-built `multipart/form-data` body; the optional file goes in the `img` part.
fn multipart(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Body {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"img\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    Body::from(body)
}

fn multipart_request(method: &str, uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body)
        .unwrap()
}

fn form_request(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn customer(email: &str) -> SignupRequest {
    SignupRequest {
        username: "Ann".to_string(),
        email: email.to_string(),
        phone: "555".to_string(),
        password: "secret123".to_string(),
        image: None,
    }
}

// --- Tests ---

#[tokio::test]
async fn test_health_check() {
    let state = test_state();
    let response = app(&state).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_customer_signup_returns_201_without_password() {
    let state = test_state();
    let body = multipart(
        &[
            ("username", "Ann"),
            ("email", "c@x.com"),
            ("phone", "555"),
            ("password", "secret123"),
        ],
        None,
    );

    let response = app(&state)
        .oneshot(multipart_request("POST", "/customer/signup", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = json_body(response).await;
    assert!(Uuid::parse_str(json["id"].as_str().unwrap()).is_ok());
    assert_eq!(json["email"], "c@x.com");
    assert!(json.get("password").is_none());
    assert!(json["img"].is_null());
}

#[tokio::test]
async fn test_signup_with_image_returns_public_uri() {
    let state = test_state();
    let body = multipart(
        &[
            ("username", "Ann"),
            ("email", "a@x.com"),
            ("phone", "555"),
            ("password", "secret123"),
        ],
        Some(("avatar.png", b"\x89PNG")),
    );

    let response = app(&state)
        .oneshot(multipart_request("POST", "/admin/signup", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = json_body(response).await;
    let img = json["img"].as_str().unwrap();
    assert!(img.starts_with("http://localhost:8000/uploads/admins/admins_"));
    assert!(img.ends_with(".png"));
}

#[tokio::test]
async fn test_signup_missing_fields_is_400_with_envelope() {
    let state = test_state();
    let body = multipart(&[("username", "Ann"), ("email", "c@x.com")], None);

    let response = app(&state)
        .oneshot(multipart_request("POST", "/customer/signup", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "Make sure you fill all fields");
}

#[tokio::test]
async fn test_duplicate_customer_signup_is_409() {
    let state = test_state();
    state.accounts().signup_customer(customer("c@x.com")).await.unwrap();

    let body = multipart(
        &[
            ("username", "Other"),
            ("email", "c@x.com"),
            ("phone", "556"),
            ("password", "another1"),
        ],
        None,
    );
    let response = app(&state)
        .oneshot(multipart_request("POST", "/customer/signup", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = json_body(response).await;
    assert_eq!(json["message"], "User is already signed up");
}

#[tokio::test]
async fn test_customer_login_with_form() {
    let state = test_state();
    state.accounts().signup_customer(customer("c@x.com")).await.unwrap();

    let response = app(&state)
        .oneshot(form_request(
            "/customer/login",
            "email=c%40x.com&password=secret123",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["email"], "c@x.com");
    assert!(json.get("password").is_none());
}

#[tokio::test]
async fn test_login_wrong_password_is_401() {
    let state = test_state();
    state.accounts().signup_customer(customer("c@x.com")).await.unwrap();

    let response = app(&state)
        .oneshot(form_request("/customer/login", "email=c%40x.com&password=wrong"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = json_body(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_missing_password_is_400() {
    let state = test_state();

    let response = app(&state)
        .oneshot(form_request("/admin/login", "email=a%40x.com"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["message"], "Email and password are required");
}

#[tokio::test]
async fn test_admin_login_rejects_customer() {
    let state = test_state();
    state.accounts().signup_customer(customer("c@x.com")).await.unwrap();

    let response = app(&state)
        .oneshot(form_request("/admin/login", "email=c%40x.com&password=secret123"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = json_body(response).await;
    assert_eq!(json["message"], "You do not have admin privileges");
}

#[tokio::test]
async fn test_update_user_returns_id_name_img() {
    let state = test_state();
    let created = state.accounts().signup_customer(customer("c@x.com")).await.unwrap();

    let body = multipart(&[("username", "Annie")], None);
    let response = app(&state)
        .oneshot(multipart_request(
            "PUT",
            &format!("/customer/update/{}", created.id),
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 3);
    assert_eq!(json["id"], created.id.to_string());
    assert_eq!(json["name"], "Annie");
    assert!(json["img"].is_null());
}

#[tokio::test]
async fn test_update_vendor_returns_description() {
    let state = test_state();
    let created = state
        .accounts()
        .add_vendor(AddVendorRequest {
            username: "Taco Stand".to_string(),
            email: "v@x.com".to_string(),
            phone: "555".to_string(),
            description: "Tacos".to_string(),
            image: None,
        })
        .await
        .unwrap();

    let body = multipart(
        &[("description", "Tacos and burritos")],
        Some(("logo.jpg", b"jpeg")),
    );
    let response = app(&state)
        .oneshot(multipart_request(
            "PUT",
            &format!("/admin/update-vendor/{}", created.id),
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["name"], "Taco Stand");
    assert_eq!(json["description"], "Tacos and burritos");
    assert!(
        json["img"]
            .as_str()
            .unwrap()
            .starts_with("http://localhost:8000/uploads/vendors/")
    );
}

#[tokio::test]
async fn test_get_unknown_vendor_is_404() {
    let state = test_state();

    let response = app(&state)
        .oneshot(get(&format!("/admin/vendor/{}", Uuid::new_v4())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["message"], "Vendor not found");
}

#[tokio::test]
async fn test_malformed_id_is_400() {
    let state = test_state();

    let response = app(&state)
        .oneshot(get("/admin/vendor/not-a-uuid"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn test_login_with_json_body_is_400_with_envelope() {
    let state = test_state();
    let request = Request::builder()
        .method("POST")
        .uri("/customer/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"email":"a@x.com","password":"secret123"}"#))
        .unwrap();

    let response = app(&state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_customer_delete_of_vendor_account_succeeds() {
    let state = test_state();
    let created = state
        .accounts()
        .add_vendor(AddVendorRequest {
            username: "Taco Stand".to_string(),
            email: "v@x.com".to_string(),
            phone: "555".to_string(),
            description: "Tacos".to_string(),
            image: None,
        })
        .await
        .unwrap();

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/customer/delete/{}", created.id))
        .body(Body::empty())
        .unwrap();
    let response = app(&state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app(&state)
        .oneshot(get(&format!("/admin/vendor/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_vendors_resolves_image_uri() {
    let state = test_state();
    let created = state
        .accounts()
        .add_vendor(AddVendorRequest {
            username: "Taco Stand".to_string(),
            email: "v@x.com".to_string(),
            phone: "555".to_string(),
            description: "Tacos".to_string(),
            image: Some(Upload {
                filename: "logo.png".to_string(),
                bytes: axum::body::Bytes::from_static(b"png"),
            }),
        })
        .await
        .unwrap();

    let response = app(&state).oneshot(get("/admin/list-vendors")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let vendors = json.as_array().unwrap();
    assert_eq!(vendors.len(), 1);
    assert_eq!(vendors[0]["id"], created.id.to_string());
    assert_eq!(vendors[0]["description"], "Tacos");
    assert_eq!(
        vendors[0]["img"],
        format!("http://localhost:8000/uploads/{}", created.img.unwrap())
    );
}

#[tokio::test]
async fn test_delete_user_then_404() {
    let state = test_state();
    let created = state.accounts().signup_customer(customer("c@x.com")).await.unwrap();
    let uri = format!("/customer/delete/{}", created.id);

    let delete = || Request::builder().method("DELETE").uri(&uri).body(Body::empty()).unwrap();

    let response = app(&state).oneshot(delete()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["message"], "User deleted successfully");

    let response = app(&state).oneshot(delete()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["message"], "User not found");
}

#[tokio::test]
async fn test_list_users_never_exposes_passwords() {
    let state = test_state();
    state.accounts().signup_customer(customer("c@x.com")).await.unwrap();
    state.accounts().signup_admin(customer("a@x.com")).await.unwrap();

    let response = app(&state).oneshot(get("/customer/users")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let users = json.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|user| user.get("password").is_none()));
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let state = test_state();

    let response = app(&state).oneshot(get("/api-docs/openapi.json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let paths = json["paths"].as_object().unwrap();
    for path in [
        "/customer/signup",
        "/customer/login",
        "/customer/update/{id}",
        "/admin/add-vendor",
        "/admin/vendor/{id}",
    ] {
        assert!(paths.contains_key(path), "missing {path}");
    }
}

#[tokio::test]
async fn test_swagger_ui_is_served() {
    let state = test_state();

    let response = app(&state).oneshot(get("/swagger-ui/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
