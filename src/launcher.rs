use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use crate::{
    cli_args::CliArgs,
    seed,
    server::{Server, ServerConfig},
    service::Service,
    store::mongo::MongoBookStore,
};

fn init_tracing() -> anyhow::Result<()> {
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt::Subscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .finish(),
    )
    .context("Failed to set global tracing subscriber")?;

    Ok(())
}

/// Runs one of the services until it is shut down.
///
/// Every failure before the server is listening is fatal: configuration, database
/// connection, collection setup and seeding.
pub async fn launch(service: Service) -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var(
            "RUST_LOG",
            "bookshelf=debug,books_get=debug,books_post=debug,books_put=debug,books_delete=debug,frontend=debug,tower_http=debug",
        );
    }

    init_tracing()?;

    let cli_args = CliArgs::parse();

    tracing::info!(%service, "Starting ...");

    let mut config = match &cli_args.config_file {
        Some(config_file) => ServerConfig::from_config_file(config_file).await?,
        None => ServerConfig::default(),
    };

    if let Some(socket_address) = cli_args.socket_address {
        config = config.with_socket_address(socket_address);
    }

    let database = config.database();

    let store = MongoBookStore::connect(
        &cli_args.database_uri,
        &database.name,
        &database.collection,
        database.connect_timeout(),
    )
    .await
    .context("Failed to prepare the books collection")?;

    let report = seed::ensure_seed_books(&store)
        .await
        .context("Failed to seed the books collection")?;

    tracing::info!(
        inserted = report.inserted,
        present = report.present,
        "Seed books ready"
    );

    let server = Server::new(service, config, Arc::new(store));

    server.run().await?;

    Ok(())
}
