use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "lab-auth", version, about = "Signup/signin web service")]
pub struct Config {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// SQLite DSN for the user store
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite::memory:")]
    pub database_url: String,

    /// Pool size for file-backed stores (memory stores always use one)
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Verbosity: -v DEBUG, -vv TRACE (RUST_LOG wins when set)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
