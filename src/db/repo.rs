use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;
use uuid::Uuid;

use crate::db::error::{Result, StoreError};
use crate::db::models::{NewUser, StoredUser};

/// Verified against when a username is unknown, so a miss costs the same
/// argon2 work as a wrong password.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("lab-auth-dummy-password").unwrap_or_default());

pub async fn create_user_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT UNIQUE NOT NULL,
            email TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Validate, hash and persist a new user.
pub async fn create_user(pool: &SqlitePool, new_user: &NewUser) -> Result<StoredUser> {
    let username = required("username", new_user.username.as_deref())?;
    let password = required("password", new_user.password.as_deref())?;
    let email = required("email", new_user.email.as_deref())?;

    let user = StoredUser {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        email: email.to_string(),
        password_hash: hash_password(password)?,
        created_at: unix_now(),
    };

    let inserted = sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .execute(pool)
    .await;

    match inserted {
        Ok(_) => {
            debug!(user_id = %user.id, "user created");
            Ok(user)
        }
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            Err(StoreError::Duplicate {
                username: user.username,
            })
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<StoredUser>> {
    let user = sqlx::query_as::<_, StoredUser>(
        "SELECT id, username, email, password_hash, created_at FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Look up `username` and check `password`. Unknown users and wrong passwords
/// both come back as `None`.
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Option<StoredUser>> {
    match find_by_username(pool, username).await? {
        Some(user) if verify_password(&user, password) => Ok(Some(user)),
        Some(_) => Ok(None),
        None => {
            verify_hash(&DUMMY_HASH, password);
            Ok(None)
        }
    }
}

/// Check a candidate password against the stored PHC hash. A hash that fails
/// to parse never matches.
pub fn verify_password(user: &StoredUser, candidate: &str) -> bool {
    verify_hash(&user.password_hash, candidate)
}

fn verify_hash(phc: &str, candidate: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(StoreError::Validation { field })
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::Hash(e.to_string()))
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}
