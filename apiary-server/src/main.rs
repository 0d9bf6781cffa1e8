use apiary_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. .env + logging
    setup_environment();

    print_banner();

    // 2. Configuration
    let config = Config::from_env()?;
    tracing::info!(
        environment = %config.environment,
        database = %config.database_path,
        port = config.http_port,
        "Apiary server starting..."
    );

    // 3. Database, bootstrap admin, optional demo catalog
    let state = ServerState::initialize(&config).await?;

    // 4. HTTP server
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
