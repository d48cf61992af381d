use super::{AccountTransaction, RepoResult, Repository, RepositoryError};
use crate::models::{Account, AccountChanges, NewAccount, Role, VendorProfile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{
    collections::{BTreeSet, HashMap},
    sync::{Arc, Mutex, MutexGuard},
};
use uuid::Uuid;

/// FailPoint
///
/// A write at which an [`InMemoryRepository`] built with `failing_on` returns a
/// simulated database error, for exercising rollback paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    CreateAccount,
    AttachRole,
    UpdateAccount,
    DetachRoles,
    DeleteAccount,
    CreateVendorProfile,
    UpdateVendorProfile,
    DeleteVendorProfile,
    Commit,
}

#[derive(Debug, Clone)]
struct VendorRow {
    description: String,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    // Insertion order doubles as creation order.
    accounts: Vec<Account>,
    roles: BTreeSet<(Uuid, Role)>,
    vendors: HashMap<Uuid, VendorRow>,
}

impl MemoryState {
    fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    fn profile(&self, account: &Account) -> Option<VendorProfile> {
        self.vendors.get(&account.id).map(|row| VendorProfile {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            phone: account.phone.clone(),
            img: account.img.clone(),
            description: row.description.clone(),
            created_at: account.created_at,
        })
    }

    /// Applies one write with the schema's checks. The returned count is the
    /// number of rows the write touched.
    fn apply(&mut self, write: &Write) -> RepoResult<u64> {
        match write {
            Write::CreateAccount(row) => {
                if self.accounts.iter().any(|a| a.email == row.email) {
                    return Err(RepositoryError::Conflict("users_email_key".to_string()));
                }
                if self.account(row.id).is_some() {
                    return Err(RepositoryError::Conflict("users_pkey".to_string()));
                }
                self.accounts.push(row.clone());
                Ok(1)
            }
            Write::AttachRole(account_id, role) => {
                if self.account(*account_id).is_none() {
                    return Err(RepositoryError::Constraint("user_roles_user_id_fkey".to_string()));
                }
                self.roles.insert((*account_id, *role));
                Ok(1)
            }
            Write::UpdateAccount(account_id, changes, at) => {
                let Some(account) = self.accounts.iter_mut().find(|a| a.id == *account_id) else {
                    return Ok(0);
                };
                if let Some(name) = &changes.name {
                    account.name = name.clone();
                }
                if let Some(phone) = &changes.phone {
                    account.phone = phone.clone();
                }
                if let Some(img) = &changes.img {
                    account.img = Some(img.clone());
                }
                account.updated_at = *at;
                Ok(1)
            }
            Write::DetachRoles(account_id, role) => {
                let before = self.roles.len();
                self.roles
                    .retain(|(id, r)| !(*id == *account_id && role.is_none_or(|wanted| wanted == *r)));
                Ok((before - self.roles.len()) as u64)
            }
            Write::DeleteAccount(account_id) => {
                if self.roles.iter().any(|(id, _)| id == account_id) {
                    return Err(RepositoryError::Constraint("user_roles_user_id_fkey".to_string()));
                }
                if self.vendors.contains_key(account_id) {
                    return Err(RepositoryError::Constraint("vendors_vendor_id_fkey".to_string()));
                }
                let before = self.accounts.len();
                self.accounts.retain(|a| a.id != *account_id);
                Ok((before - self.accounts.len()) as u64)
            }
            Write::CreateVendorProfile(account_id, description) => {
                if self.account(*account_id).is_none() {
                    return Err(RepositoryError::Constraint("vendors_vendor_id_fkey".to_string()));
                }
                if self.vendors.contains_key(account_id) {
                    return Err(RepositoryError::Conflict("vendors_pkey".to_string()));
                }
                self.vendors.insert(
                    *account_id,
                    VendorRow {
                        description: description.clone(),
                    },
                );
                Ok(1)
            }
            Write::UpdateVendorProfile(account_id, description) => {
                let Some(row) = self.vendors.get_mut(account_id) else {
                    return Ok(0);
                };
                if let Some(description) = description {
                    row.description = description.clone();
                }
                Ok(1)
            }
            Write::DeleteVendorProfile(account_id) => Ok(self.vendors.remove(account_id).map_or(0, |_| 1)),
        }
    }
}

/// One statement of a transaction, kept so it can be replayed at commit.
#[derive(Debug, Clone)]
enum Write {
    CreateAccount(Account),
    AttachRole(Uuid, Role),
    UpdateAccount(Uuid, AccountChanges, DateTime<Utc>),
    DetachRoles(Uuid, Option<Role>),
    DeleteAccount(Uuid),
    CreateVendorProfile(Uuid, String),
    UpdateVendorProfile(Uuid, Option<String>),
    DeleteVendorProfile(Uuid),
}

/// InMemoryRepository
///
/// A `Repository` held entirely in process memory. It enforces the same rules the
/// Postgres schema does (unique email, role and vendor rows must reference an
/// existing account, an account cannot be deleted while referenced), which makes it
/// a faithful stand-in for handler and orchestrator tests.
///
/// A transaction reads and writes a private snapshot and records each write. On
/// commit the recorded writes are replayed against the current shared state under
/// the lock, so a transaction that raced another one (two sign-ups with the same
/// email, a role attached to an account deleted meanwhile) fails with the same
/// `Conflict`/`Constraint` error Postgres would raise, and nothing it wrote lands.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
    fail_on: Option<FailPoint>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository whose transactions fail at `point`.
    pub fn failing_on(point: FailPoint) -> Self {
        Self {
            fail_on: Some(point),
            ..Self::default()
        }
    }

    /// Another handle on the same data with a different (or no) fail point.
    pub fn with_fail_point(&self, point: Option<FailPoint>) -> Self {
        Self {
            state: Arc::clone(&self.state),
            fail_on: point,
        }
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Corrupt("in-memory state lock poisoned".to_string()))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_account(&self, id: Uuid) -> RepoResult<Option<Account>> {
        Ok(self.lock()?.account(id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        Ok(self.lock()?.accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn has_role(&self, account_id: Uuid, role: Role) -> RepoResult<bool> {
        Ok(self.lock()?.roles.contains(&(account_id, role)))
    }

    async fn account_roles(&self, account_id: Uuid) -> RepoResult<Vec<Role>> {
        Ok(self
            .lock()?
            .roles
            .iter()
            .filter(|(id, _)| *id == account_id)
            .map(|(_, role)| *role)
            .collect())
    }

    async fn list_accounts(&self) -> RepoResult<Vec<Account>> {
        Ok(self.lock()?.accounts.clone())
    }

    async fn get_vendor(&self, account_id: Uuid) -> RepoResult<Option<VendorProfile>> {
        let state = self.lock()?;
        Ok(state.account(account_id).and_then(|a| state.profile(a)))
    }

    async fn list_vendors(&self) -> RepoResult<Vec<VendorProfile>> {
        let state = self.lock()?;
        Ok(state.accounts.iter().filter_map(|a| state.profile(a)).collect())
    }

    async fn begin(&self) -> RepoResult<Box<dyn AccountTransaction>> {
        let staged = self.lock()?.clone();
        Ok(Box::new(MemoryTransaction {
            shared: Arc::clone(&self.state),
            staged,
            writes: Vec::new(),
            fail_on: self.fail_on,
        }))
    }
}

struct MemoryTransaction {
    shared: Arc<Mutex<MemoryState>>,
    staged: MemoryState,
    writes: Vec<Write>,
    fail_on: Option<FailPoint>,
}

impl MemoryTransaction {
    fn check(&self, point: FailPoint) -> RepoResult<()> {
        if self.fail_on == Some(point) {
            return Err(RepositoryError::Database(sqlx::Error::Protocol(format!(
                "simulated failure at {point:?}"
            ))));
        }
        Ok(())
    }

    fn write(&mut self, point: FailPoint, write: Write) -> RepoResult<u64> {
        self.check(point)?;
        let touched = self.staged.apply(&write)?;
        self.writes.push(write);
        Ok(touched)
    }
}

#[async_trait]
impl AccountTransaction for MemoryTransaction {
    async fn create_account(&mut self, account: &NewAccount) -> RepoResult<Account> {
        let now = Utc::now();
        let row = Account {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            phone: account.phone.clone(),
            password: account.password.clone(),
            img: account.img.clone(),
            created_at: now,
            updated_at: now,
        };
        self.write(FailPoint::CreateAccount, Write::CreateAccount(row.clone()))?;
        Ok(row)
    }

    async fn attach_role(&mut self, account_id: Uuid, role: Role) -> RepoResult<()> {
        self.write(FailPoint::AttachRole, Write::AttachRole(account_id, role))?;
        Ok(())
    }

    async fn update_account(&mut self, account_id: Uuid, changes: &AccountChanges) -> RepoResult<bool> {
        let write = Write::UpdateAccount(account_id, changes.clone(), Utc::now());
        Ok(self.write(FailPoint::UpdateAccount, write)? > 0)
    }

    async fn detach_roles(&mut self, account_id: Uuid, role: Option<Role>) -> RepoResult<u64> {
        self.write(FailPoint::DetachRoles, Write::DetachRoles(account_id, role))
    }

    async fn delete_account(&mut self, account_id: Uuid) -> RepoResult<bool> {
        Ok(self.write(FailPoint::DeleteAccount, Write::DeleteAccount(account_id))? > 0)
    }

    async fn create_vendor_profile(&mut self, account_id: Uuid, description: &str) -> RepoResult<()> {
        let write = Write::CreateVendorProfile(account_id, description.to_string());
        self.write(FailPoint::CreateVendorProfile, write)?;
        Ok(())
    }

    async fn update_vendor_profile(&mut self, account_id: Uuid, description: Option<&str>) -> RepoResult<bool> {
        let write = Write::UpdateVendorProfile(account_id, description.map(str::to_string));
        Ok(self.write(FailPoint::UpdateVendorProfile, write)? > 0)
    }

    async fn delete_vendor_profile(&mut self, account_id: Uuid) -> RepoResult<bool> {
        Ok(self.write(FailPoint::DeleteVendorProfile, Write::DeleteVendorProfile(account_id))? > 0)
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        self.check(FailPoint::Commit)?;
        let mut guard = self
            .shared
            .lock()
            .map_err(|_| RepositoryError::Corrupt("in-memory state lock poisoned".to_string()))?;
        // Replay onto a copy so a failed commit leaves the shared state untouched.
        let mut next = guard.clone();
        for write in &self.writes {
            next.apply(write)?;
        }
        *guard = next;
        Ok(())
    }
}
