//! Admin accounts: login, token verification, bootstrap admin

use shared::error::{AppError, ErrorCode};
use shared::models::{LoginRequest, LoginResponse, User, UserCreate, UserRole};
use sqlx::SqlitePool;
use thiserror::Error;

use super::jwt::{CurrentUser, JwtError, JwtService};
use super::password::{hash_password, verify_password};
use crate::db::repository::{RepoError, user as user_repo};
use crate::security_log;
use crate::utils::validation::{MAX_PASSWORD_LEN, validate_payload};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Administrator role required")]
    NotAdmin,

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Invalid(AppError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::invalid_credentials(),
            AuthError::AccountDisabled => AppError::new(ErrorCode::AccountDisabled),
            AuthError::NotAdmin => AppError::admin_required(),
            AuthError::Token(JwtError::ExpiredToken) => AppError::token_expired(),
            AuthError::Token(JwtError::GenerationFailed(msg)) => AppError::internal(msg),
            AuthError::Token(e) => AppError::invalid_token(e.to_string()),
            AuthError::Hash(msg) => AppError::internal(msg),
            AuthError::Invalid(app) => app,
            AuthError::Repo(e) => e.into(),
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

fn ensure_admin(user: &User) -> AuthResult<()> {
    if !user.is_active {
        return Err(AuthError::AccountDisabled);
    }
    if user.role != UserRole::Admin {
        return Err(AuthError::NotAdmin);
    }
    Ok(())
}

/// Check credentials of an admin account and issue a token
pub async fn login(
    pool: &SqlitePool,
    jwt: &JwtService,
    req: LoginRequest,
) -> AuthResult<LoginResponse> {
    if req.password.len() > MAX_PASSWORD_LEN {
        return Err(AuthError::InvalidCredentials);
    }

    let Some((user, hash)) = user_repo::find_with_hash_by_email(pool, &req.email).await? else {
        security_log!("WARN", "login_unknown_email", email = req.email.clone());
        return Err(AuthError::InvalidCredentials);
    };
    if !verify_password(&req.password, &hash) {
        security_log!("WARN", "login_bad_password", user_id = user.id);
        return Err(AuthError::InvalidCredentials);
    }
    ensure_admin(&user)?;

    let token = jwt.generate_token(&user)?;
    tracing::info!(user_id = user.id, email = %user.email, "Admin logged in");
    Ok(LoginResponse { token, user })
}

/// Validate a token and return the (still active) admin it belongs to
pub async fn verify(pool: &SqlitePool, jwt: &JwtService, token: &str) -> AuthResult<User> {
    let claims = jwt.validate_token(token)?;
    let current = CurrentUser::try_from(claims)?;
    let user = user_repo::find_by_id(pool, current.id)
        .await?
        .ok_or_else(|| AuthError::Token(JwtError::InvalidToken("unknown user".into())))?;
    ensure_admin(&user)?;
    Ok(user)
}

/// Create a user account with a hashed password
pub async fn create_user(pool: &SqlitePool, data: UserCreate) -> AuthResult<User> {
    validate_payload(&data).map_err(AuthError::Invalid)?;
    if data.password.len() > MAX_PASSWORD_LEN {
        return Err(AuthError::Invalid(AppError::validation(format!(
            "Password must be at most {MAX_PASSWORD_LEN} characters"
        ))));
    }
    let hash = hash_password(&data.password).map_err(|e| AuthError::Hash(e.to_string()))?;
    let user = user_repo::insert(
        pool,
        user_repo::NewUser {
            name: data.name.trim(),
            email: &data.email,
            password_hash: &hash,
            phone: data.phone.as_deref(),
            address: data.address.as_deref(),
            role: data.role,
        },
    )
    .await?;
    Ok(user)
}

/// Ensure the configured admin account exists. Returns it when it was created.
pub async fn bootstrap_admin(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password: &str,
) -> AuthResult<Option<User>> {
    if user_repo::find_with_hash_by_email(pool, email)
        .await?
        .is_some()
    {
        return Ok(None);
    }

    let user = create_user(
        pool,
        UserCreate {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: None,
            address: None,
            role: UserRole::Admin,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, email = %user.email, "Bootstrap admin account created");
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtConfig;
    use crate::db::DbService;

    fn jwt() -> JwtService {
        JwtService::with_config(&JwtConfig {
            secret: "unit-test-secret-unit-test-secret!!".into(),
            expiry_hours: 1,
        })
    }

    fn login_req(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_bootstrap_then_login_and_verify() {
        let db = DbService::in_memory().await.unwrap();
        let jwt = jwt();

        let created = bootstrap_admin(&db.pool, "Admin", "admin@apicola.com", "admin123")
            .await
            .unwrap();
        assert!(created.is_some());
        let again = bootstrap_admin(&db.pool, "Admin", "admin@apicola.com", "admin123")
            .await
            .unwrap();
        assert!(again.is_none());

        let resp = login(&db.pool, &jwt, login_req("ADMIN@apicola.com", "admin123"))
            .await
            .unwrap();
        assert_eq!(resp.user.role, UserRole::Admin);

        let user = verify(&db.pool, &jwt, &resp.token).await.unwrap();
        assert_eq!(user.id, resp.user.id);
    }

    #[tokio::test]
    async fn test_login_failures() {
        let db = DbService::in_memory().await.unwrap();
        let jwt = jwt();
        bootstrap_admin(&db.pool, "Admin", "admin@apicola.com", "admin123")
            .await
            .unwrap();
        create_user(
            &db.pool,
            UserCreate {
                name: "Cliente".into(),
                email: "cliente@example.com".into(),
                password: "secreto1".into(),
                phone: None,
                address: None,
                role: UserRole::Customer,
            },
        )
        .await
        .unwrap();

        let err = login(&db.pool, &jwt, login_req("admin@apicola.com", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = login(&db.pool, &jwt, login_req("nobody@apicola.com", "admin123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = login(&db.pool, &jwt, login_req("cliente@example.com", "secreto1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotAdmin));
        assert_eq!(AppError::from(err).code, ErrorCode::AdminRequired);

        let err = verify(&db.pool, &jwt, "garbage").await.unwrap_err();
        assert_eq!(AppError::from(err).code, ErrorCode::TokenInvalid);
    }
}
