use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{field} is required")]
    Validation { field: &'static str },

    #[error("username already taken: {username}")]
    Duplicate { username: String },

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
