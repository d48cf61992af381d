//! SQL for the `users` and `user_roles` tables.
//!
//! Every function takes any Postgres executor, so the same statement runs against
//! the pool for reads and against an open transaction for writes.

use crate::models::{Account, AccountChanges, NewAccount};
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str = "id, name, email, phone, password, img, created_at, updated_at";

pub async fn find_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(&format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_email<'e>(
    executor: impl PgExecutor<'e>,
    email: &str,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(&format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(executor)
        .await
}

pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM users ORDER BY created_at ASC, id ASC"
    ))
    .fetch_all(executor)
    .await
}

/// insert
///
/// Relies on the `users_email_key` unique index for duplicate emails; the caller
/// maps the resulting unique violation to a conflict.
pub async fn insert<'e>(executor: impl PgExecutor<'e>, account: &NewAccount) -> Result<Account, sqlx::Error> {
    sqlx::query_as::<_, Account>(&format!(
        r#"
        INSERT INTO users (id, name, email, phone, password, img, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
        RETURNING {ACCOUNT_COLUMNS}
        "#
    ))
    .bind(account.id)
    .bind(&account.name)
    .bind(&account.email)
    .bind(&account.phone)
    .bind(&account.password)
    .bind(&account.img)
    .fetch_one(executor)
    .await
}

/// update
///
/// Uses `COALESCE` so only the `Some` fields of `changes` overwrite stored values.
pub async fn update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    changes: &AccountChanges,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET name = COALESCE($2, name),
            phone = COALESCE($3, phone),
            img = COALESCE($4, img),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&changes.name)
    .bind(&changes.phone)
    .bind(&changes.img)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

// --- user_roles ---

/// attach_role
///
/// Idempotent: attaching a role the account already holds is a no-op.
pub async fn attach_role<'e>(executor: impl PgExecutor<'e>, user_id: Uuid, role_id: i32) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
        .bind(user_id)
        .bind(role_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn has_role<'e>(executor: impl PgExecutor<'e>, user_id: Uuid, role_id: i32) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM user_roles WHERE user_id = $1 AND role_id = $2)",
    )
    .bind(user_id)
    .bind(role_id)
    .fetch_one(executor)
    .await
}

pub async fn role_ids<'e>(executor: impl PgExecutor<'e>, user_id: Uuid) -> Result<Vec<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT role_id FROM user_roles WHERE user_id = $1 ORDER BY role_id")
        .bind(user_id)
        .fetch_all(executor)
        .await
}

/// detach_roles
///
/// Deletes the given role, or all of the account's roles when `role_id` is `None`.
pub async fn detach_roles<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    role_id: Option<i32>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND ($2::INT IS NULL OR role_id = $2)")
        .bind(user_id)
        .bind(role_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
