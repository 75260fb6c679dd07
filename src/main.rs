use anyhow::Result;
use clap::Parser;
use lab_auth::{api, config::Config, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    telemetry::init(config.verbose)?;

    api::server::start_server(&config).await
}
