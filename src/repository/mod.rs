use crate::models::{Account, AccountChanges, NewAccount, Role, VendorProfile};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub mod identity;
pub mod memory;
pub mod postgres;
pub mod vendor;

pub use memory::{FailPoint, InMemoryRepository};
pub use postgres::PostgresRepository;

#[derive(Error, Debug)]
pub enum RepositoryError {
    /// A unique constraint rejected the write (in practice: duplicate email).
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    /// A reference constraint rejected the write, e.g. deleting an account that
    /// still has role or vendor rows.
    #[error("reference constraint violated: {0}")]
    Constraint(String),
    #[error("stored value is invalid: {0}")]
    Corrupt(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository Trait
///
/// Read access to accounts, roles and vendor profiles, plus the entry point for
/// writes. Every write goes through an [`AccountTransaction`] so a multi-table
/// sequence either commits as a whole or leaves nothing behind.
///
/// **Send + Sync + async_trait** are required to share the trait object
/// (`Arc<dyn Repository>`) across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Identity (users + user_roles) ---
    async fn find_account(&self, id: Uuid) -> RepoResult<Option<Account>>;
    async fn find_account_by_email(&self, email: &str) -> RepoResult<Option<Account>>;
    async fn has_role(&self, account_id: Uuid, role: Role) -> RepoResult<bool>;
    async fn account_roles(&self, account_id: Uuid) -> RepoResult<Vec<Role>>;
    // Ordered by creation time.
    async fn list_accounts(&self) -> RepoResult<Vec<Account>>;

    // --- Vendor profiles (users ⋈ vendors) ---
    async fn get_vendor(&self, account_id: Uuid) -> RepoResult<Option<VendorProfile>>;
    // Inner join: accounts without a vendors row are excluded.
    async fn list_vendors(&self) -> RepoResult<Vec<VendorProfile>>;

    /// Opens a write transaction.
    async fn begin(&self) -> RepoResult<Box<dyn AccountTransaction>>;
}

/// AccountTransaction
///
/// A unit of work over `users`, `user_roles` and `vendors`. Nothing is visible to
/// other readers until [`AccountTransaction::commit`] succeeds; dropping the value
/// without committing rolls everything back.
#[async_trait]
pub trait AccountTransaction: Send {
    /// Inserts the account. A taken email yields `RepositoryError::Conflict`.
    async fn create_account(&mut self, account: &NewAccount) -> RepoResult<Account>;
    async fn attach_role(&mut self, account_id: Uuid, role: Role) -> RepoResult<()>;
    /// Partial update of name/phone/img; returns false when no such account exists.
    async fn update_account(&mut self, account_id: Uuid, changes: &AccountChanges) -> RepoResult<bool>;
    /// Removes one role, or every role when `role` is `None`. Returns the rows removed.
    async fn detach_roles(&mut self, account_id: Uuid, role: Option<Role>) -> RepoResult<u64>;
    /// Must run after the account's role and vendor rows are gone.
    async fn delete_account(&mut self, account_id: Uuid) -> RepoResult<bool>;

    async fn create_vendor_profile(&mut self, account_id: Uuid, description: &str) -> RepoResult<()>;
    async fn update_vendor_profile(&mut self, account_id: Uuid, description: Option<&str>) -> RepoResult<bool>;
    async fn delete_vendor_profile(&mut self, account_id: Uuid) -> RepoResult<bool>;

    async fn commit(self: Box<Self>) -> RepoResult<()>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
