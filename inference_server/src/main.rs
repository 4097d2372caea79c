use anyhow::Result;
use data_ingestion::config::AppConfig;
use data_ingestion::logger::init_logger;
use inference_server::server::Server;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logger();

    let config = AppConfig::from_env()?;
    info!(
        "Model: {} hidden units, {} dense units, {} epochs, batch size {}",
        config.model.hidden_units,
        config.model.dense_units,
        config.model.epochs,
        config.model.batch_size
    );

    let server = Server::init(config);
    server.run().await?;

    info!("Server has been shut down gracefully");

    Ok(())
}
