use super::{AccountTransaction, RepoResult, Repository, RepositoryError, identity, vendor};
use crate::models::{Account, AccountChanges, NewAccount, Role, VendorProfile};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// The pool is injected at startup and shared by every request.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translates constraint violations into the repository's own vocabulary so the
/// orchestrator never has to inspect driver errors.
fn map_write_err(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(db_err.message().to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::Constraint(db_err.message().to_owned());
        }
    }
    RepositoryError::Database(e)
}

fn roles_from_ids(ids: Vec<i32>) -> RepoResult<Vec<Role>> {
    ids.into_iter()
        .map(|id| Role::from_id(id).ok_or_else(|| RepositoryError::Corrupt(format!("unknown role id {id}"))))
        .collect()
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_account(&self, id: Uuid) -> RepoResult<Option<Account>> {
        Ok(identity::find_by_id(&self.pool, id).await?)
    }

    async fn find_account_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        Ok(identity::find_by_email(&self.pool, email).await?)
    }

    async fn has_role(&self, account_id: Uuid, role: Role) -> RepoResult<bool> {
        Ok(identity::has_role(&self.pool, account_id, role.id()).await?)
    }

    async fn account_roles(&self, account_id: Uuid) -> RepoResult<Vec<Role>> {
        roles_from_ids(identity::role_ids(&self.pool, account_id).await?)
    }

    async fn list_accounts(&self) -> RepoResult<Vec<Account>> {
        Ok(identity::list(&self.pool).await?)
    }

    async fn get_vendor(&self, account_id: Uuid) -> RepoResult<Option<VendorProfile>> {
        Ok(vendor::get(&self.pool, account_id).await?)
    }

    async fn list_vendors(&self) -> RepoResult<Vec<VendorProfile>> {
        Ok(vendor::list(&self.pool).await?)
    }

    async fn begin(&self) -> RepoResult<Box<dyn AccountTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgAccountTransaction { tx }))
    }
}

/// PgAccountTransaction
///
/// Wraps a `sqlx` transaction. sqlx rolls the transaction back when it is dropped
/// uncommitted, which is what makes an early `?` in the orchestrator safe.
pub struct PgAccountTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl AccountTransaction for PgAccountTransaction {
    async fn create_account(&mut self, account: &NewAccount) -> RepoResult<Account> {
        identity::insert(&mut *self.tx, account).await.map_err(map_write_err)
    }

    async fn attach_role(&mut self, account_id: Uuid, role: Role) -> RepoResult<()> {
        identity::attach_role(&mut *self.tx, account_id, role.id())
            .await
            .map_err(map_write_err)
    }

    async fn update_account(&mut self, account_id: Uuid, changes: &AccountChanges) -> RepoResult<bool> {
        identity::update(&mut *self.tx, account_id, changes)
            .await
            .map_err(map_write_err)
    }

    async fn detach_roles(&mut self, account_id: Uuid, role: Option<Role>) -> RepoResult<u64> {
        identity::detach_roles(&mut *self.tx, account_id, role.map(Role::id))
            .await
            .map_err(map_write_err)
    }

    async fn delete_account(&mut self, account_id: Uuid) -> RepoResult<bool> {
        identity::delete(&mut *self.tx, account_id).await.map_err(map_write_err)
    }

    async fn create_vendor_profile(&mut self, account_id: Uuid, description: &str) -> RepoResult<()> {
        vendor::insert(&mut *self.tx, account_id, description)
            .await
            .map_err(map_write_err)
    }

    async fn update_vendor_profile(&mut self, account_id: Uuid, description: Option<&str>) -> RepoResult<bool> {
        vendor::update(&mut *self.tx, account_id, description)
            .await
            .map_err(map_write_err)
    }

    async fn delete_vendor_profile(&mut self, account_id: Uuid) -> RepoResult<bool> {
        vendor::delete(&mut *self.tx, account_id).await.map_err(map_write_err)
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        self.tx.commit().await.map_err(map_write_err)
    }
}
