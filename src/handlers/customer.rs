use super::{
    extract::{ApiForm, ApiPath},
    forms::MultipartForm,
};
use crate::{
    AppState,
    error::AppResult,
    models::{LoginRequest, MessageResponse, PublicAccount, UpdatedUser},
};
use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

/// signup
///
/// [Customer Route] Registers a new customer account. The password is hashed before
/// storage and an optional `img` file part becomes the account image.
#[utoipa::path(
    post,
    path = "/customer/signup",
    operation_id = "customer_signup",
    tag = "customer",
    request_body(content = crate::models::SignupForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Customer created", body = PublicAccount),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "User is already signed up")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    form: MultipartForm,
) -> AppResult<(StatusCode, Json<PublicAccount>)> {
    let account = state.accounts().signup_customer(form.into_signup()).await?;
    Ok((
        StatusCode::CREATED,
        Json(PublicAccount::from_account(account, &state.config)),
    ))
}

/// login
///
/// [Customer Route] Checks an email/password pair submitted as a url-encoded form.
#[utoipa::path(
    post,
    path = "/customer/login",
    operation_id = "customer_login",
    tag = "customer",
    request_body(content = LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Logged in", body = PublicAccount),
        (status = 400, description = "Email and password are required"),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiForm(payload): ApiForm<LoginRequest>,
) -> AppResult<Json<PublicAccount>> {
    let account = state.accounts().login(payload).await?;
    Ok(Json(PublicAccount::from_account(account, &state.config)))
}

/// update_user
///
/// [Customer Route] Partial update: a blank or absent `username` keeps the current
/// name, and a new `img` replaces (and deletes) the previous file.
#[utoipa::path(
    put,
    path = "/customer/update/{id}",
    tag = "customer",
    params(("id" = Uuid, Path, description = "Account ID")),
    request_body(content = crate::models::UpdateUserForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated", body = UpdatedUser),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    form: MultipartForm,
) -> AppResult<Json<UpdatedUser>> {
    let account = state.accounts().update_user(id, form.into_user_update()).await?;
    Ok(Json(UpdatedUser::from_account(&account, &state.config)))
}

/// delete_user
///
/// [Customer Route] Removes the account, all of its roles and its image.
#[utoipa::path(
    delete,
    path = "/customer/delete/{id}",
    tag = "customer",
    params(("id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.accounts().delete_user(id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// list_users
///
/// [Customer Route] Every account, whatever its roles, oldest first.
#[utoipa::path(
    get,
    path = "/customer/users",
    tag = "customer",
    responses((status = 200, description = "All accounts", body = [PublicAccount]))
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<PublicAccount>>> {
    let accounts = state.accounts().list_users().await?;
    Ok(Json(
        accounts
            .into_iter()
            .map(|account| PublicAccount::from_account(account, &state.config))
            .collect(),
    ))
}
