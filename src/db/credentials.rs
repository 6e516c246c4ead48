use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::auth::{DbCredential, DbUser, User};
use crate::error::AppError;

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

#[instrument(skip(pool))]
pub async fn get_user(pool: &Pool<Sqlite>, id: i64) -> Result<User, AppError> {
    info!("Fetching user by ID");
    let row = sqlx::query_as::<_, DbUser>("SELECT id, username FROM user_credentials WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(user) => Ok(User::from(user)),
        _ => Err(AppError::NotFound(format!(
            "User with id {} not found in database",
            id
        ))),
    }
}

#[instrument(skip(pool))]
pub async fn find_credential_by_username(
    pool: &Pool<Sqlite>,
    username: &str,
) -> Result<Option<DbCredential>, AppError> {
    info!("Looking up credentials by username");
    let row = sqlx::query_as::<_, DbCredential>(
        "SELECT id, username, password_hash FROM user_credentials WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

#[instrument(skip_all, fields(username))]
pub async fn create_credential(
    pool: &Pool<Sqlite>,
    username: &str,
    password: &str,
) -> Result<i64, AppError> {
    info!("Registering new user");

    if find_credential_by_username(pool, username).await?.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let password_hash = bcrypt::hash(password, HASH_COST)?;

    let res = sqlx::query("INSERT INTO user_credentials (username, password_hash) VALUES (?, ?)")
        .bind(username)
        .bind(&password_hash)
        .execute(pool)
        .await;

    match res {
        Ok(res) => Ok(res.last_insert_rowid()),
        // Lost a race with a concurrent registration of the same name
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(AppError::Conflict("User already exists".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Unknown usernames are NotFound, wrong passwords a Validation failure.
#[instrument(skip_all, fields(username))]
pub async fn authenticate_user(
    pool: &Pool<Sqlite>,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    info!("Authenticating user");
    let credential = find_credential_by_username(pool, username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let valid = bcrypt::verify(password, &credential.password_hash).unwrap_or(false);
    if !valid {
        return Err(AppError::Validation("Invalid credentials".to_string()));
    }

    Ok(User {
        id: credential.id,
        username: credential.username,
    })
}
