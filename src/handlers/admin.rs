use super::{
    extract::{ApiForm, ApiPath},
    forms::MultipartForm,
};
use crate::{
    AppState,
    error::AppResult,
    models::{LoginRequest, MessageResponse, PublicAccount, UpdatedVendor, VendorView},
};
use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

/// signup
///
/// [Admin Route] Registers a new admin account.
#[utoipa::path(
    post,
    path = "/admin/signup",
    operation_id = "admin_signup",
    tag = "admin",
    request_body(content = crate::models::SignupForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Admin created", body = PublicAccount),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "Admin with this email already exists")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    form: MultipartForm,
) -> AppResult<(StatusCode, Json<PublicAccount>)> {
    let account = state.accounts().signup_admin(form.into_signup()).await?;
    Ok((
        StatusCode::CREATED,
        Json(PublicAccount::from_account(account, &state.config)),
    ))
}

/// login
///
/// [Admin Route] As the customer login, plus the account must hold the admin role.
#[utoipa::path(
    post,
    path = "/admin/login",
    operation_id = "admin_login",
    tag = "admin",
    request_body(content = LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Logged in", body = PublicAccount),
        (status = 400, description = "Email and password are required"),
        (status = 401, description = "Invalid credentials or not an admin")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiForm(payload): ApiForm<LoginRequest>,
) -> AppResult<Json<PublicAccount>> {
    let account = state.accounts().admin_login(payload).await?;
    Ok(Json(PublicAccount::from_account(account, &state.config)))
}

/// add_vendor
///
/// [Admin Route] Creates a vendor: account, vendor role and vendor profile, all or nothing.
/// Vendors get no password and cannot log in.
#[utoipa::path(
    post,
    path = "/admin/add-vendor",
    tag = "admin",
    request_body(content = crate::models::AddVendorForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Vendor created", body = PublicAccount),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "Vendor with this email already exists")
    )
)]
pub async fn add_vendor(
    State(state): State<AppState>,
    form: MultipartForm,
) -> AppResult<(StatusCode, Json<PublicAccount>)> {
    let account = state.accounts().add_vendor(form.into_add_vendor()).await?;
    Ok((
        StatusCode::CREATED,
        Json(PublicAccount::from_account(account, &state.config)),
    ))
}

/// update_vendor
///
/// [Admin Route] Partial update of a vendor's name, phone, description and image.
#[utoipa::path(
    put,
    path = "/admin/update-vendor/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Vendor account ID")),
    request_body(content = crate::models::UpdateVendorForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated", body = UpdatedVendor),
        (status = 404, description = "Vendor not found")
    )
)]
pub async fn update_vendor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    form: MultipartForm,
) -> AppResult<Json<UpdatedVendor>> {
    let profile = state
        .accounts()
        .update_vendor(id, form.into_vendor_update())
        .await?;
    Ok(Json(UpdatedVendor::from_profile(&profile, &state.config)))
}

/// delete_vendor
///
/// [Admin Route] Removes the vendor profile, the vendor role, the account and the image.
#[utoipa::path(
    delete,
    path = "/admin/delete/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Vendor account ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Vendor not found")
    )
)]
pub async fn delete_vendor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.accounts().delete_vendor(id).await?;
    Ok(Json(MessageResponse::new(
        "Vendor and all associated data deleted successfully",
    )))
}

#[utoipa::path(
    get,
    path = "/admin/list-vendors",
    tag = "admin",
    responses((status = 200, description = "All vendors", body = [VendorView]))
)]
pub async fn list_vendors(State(state): State<AppState>) -> AppResult<Json<Vec<VendorView>>> {
    let vendors = state.accounts().list_vendors().await?;
    Ok(Json(
        vendors
            .into_iter()
            .map(|profile| VendorView::from_profile(profile, &state.config))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/admin/vendor/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Vendor account ID")),
    responses(
        (status = 200, description = "Vendor", body = VendorView),
        (status = 404, description = "Vendor not found")
    )
)]
pub async fn get_vendor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<VendorView>> {
    let profile = state.accounts().get_vendor(id).await?;
    Ok(Json(VendorView::from_profile(profile, &state.config)))
}
