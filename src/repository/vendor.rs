//! SQL for the `vendors` table, the 1:1 extension of a vendor's `users` row.

use crate::models::VendorProfile;
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

const PROFILE_SELECT: &str = r#"
    SELECT u.id, u.name, u.email, u.phone, u.img, u.created_at, v.description
    FROM users u
    JOIN vendors v ON u.id = v.vendor_id
"#;

pub async fn get<'e>(executor: impl PgExecutor<'e>, vendor_id: Uuid) -> Result<Option<VendorProfile>, sqlx::Error> {
    sqlx::query_as::<_, VendorProfile>(&format!("{PROFILE_SELECT} WHERE u.id = $1"))
        .bind(vendor_id)
        .fetch_optional(executor)
        .await
}

pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<VendorProfile>, sqlx::Error> {
    sqlx::query_as::<_, VendorProfile>(&format!("{PROFILE_SELECT} ORDER BY u.created_at ASC, u.id ASC"))
        .fetch_all(executor)
        .await
}

pub async fn insert<'e>(executor: impl PgExecutor<'e>, vendor_id: Uuid, description: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO vendors (vendor_id, description, created_at, updated_at) VALUES ($1, $2, NOW(), NOW())",
    )
    .bind(vendor_id)
    .bind(description)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn update<'e>(
    executor: impl PgExecutor<'e>,
    vendor_id: Uuid,
    description: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE vendors SET description = COALESCE($2, description), updated_at = NOW() WHERE vendor_id = $1",
    )
    .bind(vendor_id)
    .bind(description)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, vendor_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM vendors WHERE vendor_id = $1")
        .bind(vendor_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
