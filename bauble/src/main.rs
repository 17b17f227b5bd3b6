//! Entry point of the Bauble server.

use std::{env, path::PathBuf};

use bauble::{BaubleServer, logger};
use bauble_core::ServerConfig;
use tokio::signal;

const CONFIG_PATH: &str = "bauble_config.json5";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_PATH), PathBuf::from);
    let config = ServerConfig::load_or_create(&path)?;
    logger::init(&config.log_level)?;
    log::info!("Loaded config from {}", path.display());

    let mut server = BaubleServer::new(&config);
    server.start().await?;

    signal::ctrl_c().await?;
    server.stop();
    Ok(())
}
