//! Account lifecycle orchestration.
//!
//! Each public operation validates its input, talks to the repository and the asset
//! store, and runs all of its row changes inside a single repository transaction.
//! Asset files cannot take part in that transaction, so they are ordered around it:
//!
//! - new files are written before the transaction opens and removed again if it fails;
//! - old files are removed just before commit, so a failed removal still rolls back.

use crate::{
    credentials,
    error::{AppError, AppResult},
    models::{
        Account, AccountChanges, AddVendorRequest, LoginRequest, NewAccount, Role, SignupRequest,
        UpdateUserRequest, UpdateVendorRequest, Upload, VendorProfile,
    },
    repository::{AccountTransaction, RepositoryError, RepositoryState},
    storage::StorageState,
};
use uuid::Uuid;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const USER_NOT_FOUND: &str = "User not found";
const VENDOR_NOT_FOUND: &str = "Vendor not found";

/// AccountService
///
/// The orchestrator. Cheap to construct: it only holds the two shared handles.
#[derive(Clone)]
pub struct AccountService {
    repo: RepositoryState,
    assets: StorageState,
}

/// What a signup path inserts, after its own validation.
struct AccountDraft {
    role: Role,
    name: String,
    email: String,
    phone: String,
    password: Option<String>,
    description: Option<String>,
    image: Option<Upload>,
    conflict_message: &'static str,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Blank optional form fields mean "keep the current value".
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AccountService {
    pub fn new(repo: RepositoryState, assets: StorageState) -> Self {
        Self { repo, assets }
    }

    // --- Signup ---

    /// signup_customer
    ///
    /// POST /customer/signup: creates an account holding exactly the Customer role.
    pub async fn signup_customer(&self, req: SignupRequest) -> AppResult<Account> {
        if [&req.username, &req.email, &req.phone, &req.password]
            .iter()
            .any(|field| is_blank(field))
        {
            return Err(AppError::validation("Make sure you fill all fields"));
        }
        self.create(AccountDraft {
            role: Role::Customer,
            name: req.username,
            email: req.email,
            phone: req.phone,
            password: Some(req.password),
            description: None,
            image: req.image,
            conflict_message: "User is already signed up",
        })
        .await
    }

    /// signup_admin
    ///
    /// POST /admin/signup: creates an account holding exactly the Admin role.
    pub async fn signup_admin(&self, req: SignupRequest) -> AppResult<Account> {
        if [&req.username, &req.email, &req.phone, &req.password]
            .iter()
            .any(|field| is_blank(field))
        {
            return Err(AppError::validation("Make sure you fill all fields"));
        }
        self.create(AccountDraft {
            role: Role::Admin,
            name: req.username,
            email: req.email,
            phone: req.phone,
            password: Some(req.password),
            description: None,
            image: req.image,
            conflict_message: "Admin with this email already exists",
        })
        .await
    }

    /// add_vendor
    ///
    /// POST /admin/add-vendor: creates a password-less account, its Vendor role and
    /// its vendor profile in one transaction.
    pub async fn add_vendor(&self, req: AddVendorRequest) -> AppResult<Account> {
        if [&req.username, &req.email, &req.phone, &req.description]
            .iter()
            .any(|field| is_blank(field))
        {
            return Err(AppError::validation(
                "Username, email, phone, and description are required",
            ));
        }
        self.create(AccountDraft {
            role: Role::Vendor,
            name: req.username,
            email: req.email,
            phone: req.phone,
            password: None,
            description: Some(req.description),
            image: req.image,
            conflict_message: "Vendor with this email already exists",
        })
        .await
    }

    async fn create(&self, draft: AccountDraft) -> AppResult<Account> {
        let email = draft.email.trim().to_string();

        // Fast path for a friendly message; the unique index is what actually guarantees it.
        let existing = self
            .repo
            .find_account_by_email(&email)
            .await
            .map_err(|e| AppError::internal("Internal server error", e))?;
        if existing.is_some() {
            return Err(AppError::conflict(draft.conflict_message));
        }

        let password = match draft.password {
            Some(plain) => Some(hash_password(plain).await?),
            None => None,
        };

        // Must happen before any row is written: a failed upload leaves nothing behind.
        let img = match &draft.image {
            Some(upload) => Some(
                self.assets
                    .store(&upload.bytes, draft.role.asset_category(), &upload.filename)
                    .await
                    .map_err(|e| AppError::internal("Failed to save image", e))?,
            ),
            None => None,
        };

        let new_account = NewAccount {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            email,
            phone: draft.phone.trim().to_string(),
            password,
            img: img.clone(),
        };

        let result: AppResult<Account> = async {
            let mut tx = self.begin().await?;
            let account = tx.create_account(&new_account).await.map_err(|e| match e {
                RepositoryError::Conflict(_) => AppError::conflict(draft.conflict_message),
                e => AppError::internal("Failed to create account", e),
            })?;
            tx.attach_role(account.id, draft.role)
                .await
                .map_err(|e| AppError::internal("Failed to assign role", e))?;
            if let Some(description) = &draft.description {
                tx.create_vendor_profile(account.id, description.trim())
                    .await
                    .map_err(|e| AppError::internal("Failed to insert vendor data", e))?;
            }
            tx.commit()
                .await
                .map_err(|e| AppError::internal("Failed to create account", e))?;
            Ok(account)
        }
        .await;

        match result {
            Ok(account) => {
                tracing::info!(account_id = %account.id, role = ?draft.role, "account created");
                Ok(account)
            }
            Err(e) => {
                if let Some(path) = &img {
                    self.discard_asset(path).await;
                }
                Err(e)
            }
        }
    }

    // --- Login ---

    /// login
    ///
    /// POST /customer/login: any account with a matching password. Unknown email
    /// and wrong password produce the same error.
    pub async fn login(&self, req: LoginRequest) -> AppResult<Account> {
        self.authenticate(&req).await
    }

    /// admin_login
    ///
    /// POST /admin/login: as `login`, and the account must also hold the Admin role.
    pub async fn admin_login(&self, req: LoginRequest) -> AppResult<Account> {
        let account = self.authenticate(&req).await?;
        let is_admin = self
            .repo
            .has_role(account.id, Role::Admin)
            .await
            .map_err(|e| AppError::internal("Failed to check user role", e))?;
        if !is_admin {
            return Err(AppError::unauthorized("You do not have admin privileges"));
        }
        Ok(account)
    }

    async fn authenticate(&self, req: &LoginRequest) -> AppResult<Account> {
        if is_blank(&req.email) || req.password.is_empty() {
            return Err(AppError::validation("Email and password are required"));
        }
        let account = self
            .repo
            .find_account_by_email(req.email.trim())
            .await
            .map_err(|e| AppError::internal("Internal server error", e))?
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

        // Vendor accounts carry no password and can never log in.
        let Some(hash) = account.password.clone() else {
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };
        if !verify_password(hash, req.password.clone()).await? {
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(account)
    }

    // --- Update ---

    /// update_user
    ///
    /// PUT /customer/update/{id}: partial update of the name and image.
    pub async fn update_user(&self, id: Uuid, req: UpdateUserRequest) -> AppResult<Account> {
        let current = self
            .repo
            .find_account(id)
            .await
            .map_err(|e| AppError::internal("Failed to load user", e))?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;

        let changes = AccountChanges {
            name: non_blank(req.username),
            ..AccountChanges::default()
        };
        self.apply_update(id, current.img, Role::Customer, changes, None, req.image, USER_NOT_FOUND)
            .await?;

        self.repo
            .find_account(id)
            .await
            .map_err(|e| AppError::internal("Failed to load user", e))?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))
    }

    /// update_vendor
    ///
    /// PUT /admin/update-vendor/{id}: partial update of name, phone, image and description.
    pub async fn update_vendor(&self, id: Uuid, req: UpdateVendorRequest) -> AppResult<VendorProfile> {
        let current = self.get_vendor(id).await?;

        let changes = AccountChanges {
            name: non_blank(req.name),
            phone: non_blank(req.phone),
            img: None,
        };
        let description = non_blank(req.description);
        self.apply_update(
            id,
            current.img,
            Role::Vendor,
            changes,
            Some(description.as_deref()),
            req.image,
            VENDOR_NOT_FOUND,
        )
        .await?;

        self.get_vendor(id).await
    }

    /// apply_update
    ///
    /// Shared update sequence. `vendor_description` is `Some(..)` on the vendor path,
    /// where the `vendors` row is updated in the same transaction.
    #[allow(clippy::too_many_arguments)]
    async fn apply_update(
        &self,
        id: Uuid,
        current_img: Option<String>,
        role: Role,
        mut changes: AccountChanges,
        vendor_description: Option<Option<&str>>,
        image: Option<Upload>,
        not_found: &'static str,
    ) -> AppResult<()> {
        let new_img = match &image {
            Some(upload) => Some(
                self.assets
                    .store(&upload.bytes, role.asset_category(), &upload.filename)
                    .await
                    .map_err(|e| AppError::internal("Failed to save new image", e))?,
            ),
            None => None,
        };
        changes.img = new_img.clone();

        let result: AppResult<()> = async {
            let mut tx = self.begin().await?;
            let found = tx
                .update_account(id, &changes)
                .await
                .map_err(|e| AppError::internal("Failed to update account", e))?;
            if !found {
                return Err(AppError::not_found(not_found));
            }
            if let Some(description) = vendor_description {
                let found = tx
                    .update_vendor_profile(id, description)
                    .await
                    .map_err(|e| AppError::internal("Failed to update vendor description", e))?;
                if !found {
                    return Err(AppError::not_found(not_found));
                }
            }
            if new_img.is_some()
                && let Some(old) = &current_img
            {
                self.remove_asset(old, "Failed to delete old image").await?;
            }
            tx.commit()
                .await
                .map_err(|e| AppError::internal("Failed to update account", e))
        }
        .await;

        if result.is_err()
            && let Some(path) = &new_img
        {
            self.discard_asset(path).await;
        }
        result
    }

    // --- Delete ---

    /// delete_user
    ///
    /// DELETE /customer/delete/{id}: removes the vendor profile (if the account has
    /// one), every role row, then the account, then its image.
    pub async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        let account = self
            .repo
            .find_account(id)
            .await
            .map_err(|e| AppError::internal("Failed to load user", e))?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;

        let mut tx = self.begin().await?;
        tx.delete_vendor_profile(id)
            .await
            .map_err(|e| AppError::internal("Failed to delete vendor data from vendors table", e))?;
        tx.detach_roles(id, None)
            .await
            .map_err(|e| AppError::internal("Failed to delete user roles", e))?;
        let deleted = tx
            .delete_account(id)
            .await
            .map_err(|e| AppError::internal("Failed to delete user", e))?;
        if !deleted {
            return Err(AppError::not_found(USER_NOT_FOUND));
        }
        if let Some(img) = &account.img {
            self.remove_asset(img, "Failed to delete user image").await?;
        }
        tx.commit()
            .await
            .map_err(|e| AppError::internal("Failed to delete user", e))?;

        tracing::info!(account_id = %id, "user deleted");
        Ok(())
    }

    /// delete_vendor
    ///
    /// DELETE /admin/delete/{id}: removes the vendor profile, the Vendor role and the
    /// account together, then the image.
    pub async fn delete_vendor(&self, id: Uuid) -> AppResult<()> {
        let vendor = self.get_vendor(id).await?;

        let mut tx = self.begin().await?;
        tx.delete_vendor_profile(id)
            .await
            .map_err(|e| AppError::internal("Failed to delete vendor data from vendors table", e))?;
        tx.detach_roles(id, Some(Role::Vendor))
            .await
            .map_err(|e| AppError::internal("Failed to delete vendor role from user_roles table", e))?;
        let deleted = tx
            .delete_account(id)
            .await
            .map_err(|e| AppError::internal("Failed to delete vendor from users table", e))?;
        if !deleted {
            return Err(AppError::not_found(VENDOR_NOT_FOUND));
        }
        if let Some(img) = &vendor.img {
            self.remove_asset(img, "Failed to delete vendor image").await?;
        }
        tx.commit()
            .await
            .map_err(|e| AppError::internal("Failed to delete vendor", e))?;

        tracing::info!(account_id = %id, "vendor deleted");
        Ok(())
    }

    // --- Reads ---

    pub async fn list_users(&self) -> AppResult<Vec<Account>> {
        self.repo
            .list_accounts()
            .await
            .map_err(|e| AppError::internal("Failed to fetch users", e))
    }

    pub async fn list_vendors(&self) -> AppResult<Vec<VendorProfile>> {
        self.repo
            .list_vendors()
            .await
            .map_err(|e| AppError::internal("Failed to fetch vendors", e))
    }

    pub async fn get_vendor(&self, id: Uuid) -> AppResult<VendorProfile> {
        self.repo
            .get_vendor(id)
            .await
            .map_err(|e| AppError::internal("Failed to fetch vendor", e))?
            .ok_or_else(|| AppError::not_found(VENDOR_NOT_FOUND))
    }

    // --- Helpers ---

    async fn begin(&self) -> AppResult<Box<dyn AccountTransaction>> {
        self.repo
            .begin()
            .await
            .map_err(|e| AppError::internal("Internal server error", e))
    }

    /// remove_asset
    ///
    /// A file that is already gone counts as removed; any other failure aborts.
    async fn remove_asset(&self, path: &str, context: &'static str) -> AppResult<()> {
        match self.assets.delete(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                tracing::warn!(path = %path, "asset already missing, continuing");
                Ok(())
            }
            Err(e) => Err(AppError::internal(context, e)),
        }
    }

    /// discard_asset
    ///
    /// Best-effort cleanup of a file written for an operation that did not commit.
    async fn discard_asset(&self, path: &str) {
        if let Err(e) = self.assets.delete(path).await {
            tracing::warn!(path = %path, error = %e, "failed to remove orphaned asset");
        }
    }
}

async fn hash_password(plain: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || credentials::hash_password(&plain))
        .await
        .map_err(|e| AppError::internal("Failed to hash password", e))?
        .map_err(|e| AppError::internal("Failed to hash password", e))
}

async fn verify_password(hash: String, plain: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || credentials::verify_password(&hash, &plain))
        .await
        .map_err(|e| AppError::internal("Failed to verify password", e))?
        .map_err(|e| AppError::internal("Failed to verify password", e))
}
