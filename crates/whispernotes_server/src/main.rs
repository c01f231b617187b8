use clap::Parser;
use whispernotes_core::init_logging;
use whispernotes_server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::parse();
    init_logging(&config.logging())?;

    whispernotes_server::serve(&config).await
}
