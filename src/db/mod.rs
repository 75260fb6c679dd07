pub mod error;
pub mod models;
pub mod repo;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use tracing::info;

pub use error::StoreError;
pub use models::{NewUser, StoredUser};

/// Open the user store and make sure its schema exists.
///
/// A `:memory:` database lives only as long as its connection, so memory DSNs
/// get a single connection that is never recycled.
pub async fn connect(db_url: &str, max_connections: u32) -> error::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);

    let pool = if is_memory(db_url) {
        SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?
    };

    repo::create_user_table(&pool).await?;
    info!(db_url, "user store ready");

    Ok(pool)
}

fn is_memory(db_url: &str) -> bool {
    db_url.contains(":memory:") || db_url.contains("mode=memory")
}
