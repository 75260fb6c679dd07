use serde::{Deserialize, Serialize};

/// Signup payload as it arrives on the wire. Every field is optional here so
/// that a partial body reaches store validation instead of failing to decode.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl NewUser {
    pub fn new(username: &str, password: &str, email: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            email: Some(email.to_string()),
        }
    }

    /// True when the body decoded but carried none of the user fields.
    pub fn is_blank(&self) -> bool {
        self.username.is_none() && self.password.is_none() && self.email.is_none()
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoredUser {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: i64,
}
