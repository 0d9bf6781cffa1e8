//! Control Record Repository
//!
//! One row per kind. The `order_numbering` row is the counter of the current
//! numbering epoch.

use super::RepoResult;
use sqlx::SqliteConnection;

/// Kind of the order numbering control record
pub const ORDER_NUMBERING: &str = "order_numbering";

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ControlRecord {
    pub kind: String,
    pub epoch: i64,
    pub last_number: i64,
    pub reset_at: Option<i64>,
}

pub async fn find(conn: &mut SqliteConnection, kind: &str) -> RepoResult<Option<ControlRecord>> {
    let row = sqlx::query_as::<_, ControlRecord>(
        "SELECT kind, epoch, last_number, reset_at FROM control_record WHERE kind = ?",
    )
    .bind(kind)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Increment the counter and return the new value, `None` if the record is missing
pub async fn increment(conn: &mut SqliteConnection, kind: &str) -> RepoResult<Option<i64>> {
    let next: Option<i64> = sqlx::query_scalar(
        "UPDATE control_record SET last_number = last_number + 1 WHERE kind = ? RETURNING last_number",
    )
    .bind(kind)
    .fetch_optional(conn)
    .await?;
    Ok(next)
}

/// Create the record with a given last number (bootstrap)
pub async fn insert(conn: &mut SqliteConnection, kind: &str, last_number: i64) -> RepoResult<()> {
    sqlx::query("INSERT INTO control_record (kind, epoch, last_number, reset_at) VALUES (?1, 0, ?2, NULL)")
        .bind(kind)
        .bind(last_number)
        .execute(conn)
        .await?;
    Ok(())
}

/// Raise the counter to at least `floor`
pub async fn advance_to(conn: &mut SqliteConnection, kind: &str, floor: i64) -> RepoResult<()> {
    sqlx::query("UPDATE control_record SET last_number = MAX(last_number, ?1) WHERE kind = ?2")
        .bind(floor)
        .bind(kind)
        .execute(conn)
        .await?;
    Ok(())
}

/// Start a new epoch at 0, creating the record if needed
pub async fn reset(conn: &mut SqliteConnection, kind: &str, now: i64) -> RepoResult<ControlRecord> {
    let record = sqlx::query_as::<_, ControlRecord>(
        "INSERT INTO control_record (kind, epoch, last_number, reset_at) VALUES (?1, 1, 0, ?2) \
         ON CONFLICT(kind) DO UPDATE SET epoch = epoch + 1, last_number = 0, reset_at = excluded.reset_at \
         RETURNING kind, epoch, last_number, reset_at",
    )
    .bind(kind)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(record)
}
