use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;

// --- Core Records (Mapped to Database) ---

/// Role
///
/// The fixed capability tags an account can hold. The numeric ids are the seeded
/// primary keys of the `roles` table and are only used at the repository boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Vendor,
    Customer,
}

impl Role {
    pub fn id(self) -> i32 {
        match self {
            Role::Admin => 1,
            Role::Vendor => 2,
            Role::Customer => 3,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Vendor),
            3 => Some(Role::Customer),
            _ => None,
        }
    }

    /// Directory under the uploads root where this role's images live.
    pub fn asset_category(self) -> &'static str {
        match self {
            Role::Admin => "admins",
            Role::Vendor => "vendors",
            Role::Customer => "users",
        }
    }
}

/// Account
///
/// A row of the `users` table: any platform identity regardless of role.
/// `img` holds the asset path relative to the uploads root, never a full URL.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    // Unique across every role (enforced by the `users_email_key` constraint).
    pub email: String,
    pub phone: String,
    // Argon2 PHC string. Vendors created by an admin have none.
    pub password: Option<String>,
    pub img: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// VendorProfile
///
/// The join of a `users` row with its 1:1 `vendors` extension.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct VendorProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub img: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// NewAccount
///
/// Insert payload for the `users` table. Built by the orchestrator once every
/// check has passed and the password (if any) has been hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: Option<String>,
    pub img: Option<String>,
}

/// AccountChanges
///
/// Partial update of the mutable account columns. `None` keeps the stored value.
/// Email and password are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub img: Option<String>,
}

/// Upload
///
/// An image received in a multipart form, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}

// --- Request Payloads (Input Schemas) ---

/// SignupRequest
///
/// Customer and admin signup input (POST /customer/signup, POST /admin/signup).
#[derive(Debug, Clone, Default)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub image: Option<Upload>,
}

/// AddVendorRequest
///
/// Admin-created vendor input (POST /admin/add-vendor). Vendors get no password.
#[derive(Debug, Clone, Default)]
pub struct AddVendorRequest {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub description: String,
    pub image: Option<Upload>,
}

/// LoginRequest
///
/// URL-encoded login form. Missing fields deserialize as empty strings so the
/// orchestrator can answer with its own validation message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "a@x.com")]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// UpdateUserRequest
///
/// Customer update input (PUT /customer/update/{id}).
#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub image: Option<Upload>,
}

/// UpdateVendorRequest
///
/// Vendor update input (PUT /admin/update-vendor/{id}).
#[derive(Debug, Clone, Default)]
pub struct UpdateVendorRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub image: Option<Upload>,
}

/// SignupForm
///
/// OpenAPI description of the multipart signup body. Not used for parsing.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct SignupForm {
    username: String,
    email: String,
    phone: String,
    password: String,
    #[schema(value_type = Option<String>, format = Binary)]
    img: Option<Vec<u8>>,
}

/// AddVendorForm
///
/// OpenAPI description of the multipart add-vendor body.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct AddVendorForm {
    username: String,
    email: String,
    phone: String,
    description: String,
    #[schema(value_type = Option<String>, format = Binary)]
    img: Option<Vec<u8>>,
}

/// UpdateUserForm
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UpdateUserForm {
    username: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    img: Option<Vec<u8>>,
}

/// UpdateVendorForm
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UpdateVendorForm {
    name: Option<String>,
    description: Option<String>,
    phone: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    img: Option<Vec<u8>>,
}

// --- Response Projections (Output Schemas) ---

/// PublicAccount
///
/// The account as clients see it: no password field at all, and `img` resolved
/// to a public URI against the configured domain.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[ts(export)]
pub struct PublicAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub img: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl PublicAccount {
    pub fn from_account(account: Account, config: &AppConfig) -> Self {
        Self {
            img: account.img.as_deref().map(|path| config.asset_url(path)),
            id: account.id,
            name: account.name,
            email: account.email,
            phone: account.phone,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// UpdatedUser
///
/// Response of the customer update endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[ts(export)]
pub struct UpdatedUser {
    pub id: Uuid,
    pub name: String,
    pub img: Option<String>,
}

impl UpdatedUser {
    pub fn from_account(account: &Account, config: &AppConfig) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            img: account.img.as_deref().map(|path| config.asset_url(path)),
        }
    }
}

/// VendorView
///
/// A vendor as listed by the admin endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[ts(export)]
pub struct VendorView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub img: Option<String>,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl VendorView {
    pub fn from_profile(profile: VendorProfile, config: &AppConfig) -> Self {
        Self {
            img: profile.img.as_deref().map(|path| config.asset_url(path)),
            id: profile.id,
            name: profile.name,
            email: profile.email,
            phone: profile.phone,
            description: profile.description,
            created_at: profile.created_at,
        }
    }
}

/// UpdatedVendor
///
/// Response of the vendor update endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[ts(export)]
pub struct UpdatedVendor {
    pub id: Uuid,
    pub name: String,
    pub img: Option<String>,
    pub description: String,
}

impl UpdatedVendor {
    pub fn from_profile(profile: &VendorProfile, config: &AppConfig) -> Self {
        Self {
            id: profile.id,
            name: profile.name.clone(),
            img: profile.img.as_deref().map(|path| config.asset_url(path)),
            description: profile.description.clone(),
        }
    }
}

/// MessageResponse
///
/// Plain confirmation body, e.g. after a delete.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
