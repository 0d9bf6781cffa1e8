//! User Repository

use super::{RepoResult, parse_column};
use shared::models::{User, UserRole};
use sqlx::SqlitePool;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    phone: Option<String>,
    address: Option<String>,
    role: String,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

impl UserRow {
    fn into_parts(self) -> RepoResult<(User, String)> {
        let user = User {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            role: parse_column("users.role", &self.role)?,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        Ok((user, self.password_hash))
    }
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, phone, address, role, is_active, created_at, updated_at";

/// New account row (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub role: UserRole,
}

/// Find a user by (lowercased) email, together with the stored password hash
pub async fn find_with_hash_by_email(
    pool: &SqlitePool,
    email: &str,
) -> RepoResult<Option<(User, String)>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
    let row = sqlx::query_as::<_, UserRow>(&sql)
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;
    row.map(UserRow::into_parts).transpose()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    let row = sqlx::query_as::<_, UserRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row
        .map(UserRow::into_parts)
        .transpose()?
        .map(|(user, _)| user))
}

pub async fn insert(pool: &SqlitePool, data: NewUser<'_>) -> RepoResult<User> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let email = data.email.trim().to_lowercase();
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, phone, address, role, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)",
    )
    .bind(id)
    .bind(data.name)
    .bind(&email)
    .bind(data.password_hash)
    .bind(data.phone)
    .bind(data.address)
    .bind(data.role.as_str())
    .bind(now)
    .execute(pool)
    .await?;

    Ok(User {
        id,
        name: data.name.to_string(),
        email,
        phone: data.phone.map(str::to_string),
        address: data.address.map(str::to_string),
        role: data.role,
        is_active: true,
        created_at: now,
        updated_at: now,
    })
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
