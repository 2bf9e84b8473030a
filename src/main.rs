use clap::Parser;
use cookichef::{
    api::{routes, AppState},
    cache::RecipeCache,
    chat::ChatService,
    cli::{commands, Cli, Commands},
    completion::{CompletionClient, OpenAiClient},
    config::Settings,
    store::{source_from_config, RefreshScheduler},
    Error, Result,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cookichef=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::from_env()?;
    settings.validate()?;

    // Handle commands
    match cli.command {
        Commands::Serve { port, host } => {
            serve(settings, port, host).await?;
        }
        Commands::Match { query, explain } => {
            commands::match_query(&settings, &query, explain).await?;
        }
        Commands::Tables { names } => {
            commands::tables(&settings, &names).await?;
        }
    }

    Ok(())
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    // Override settings with CLI arguments
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }
    settings.require_completion()?;

    info!("Starting CookiChef server");
    info!("Server: {}:{}", settings.server.host, settings.server.port);

    // Initial recipe load; the server still starts when the store is down
    let source = source_from_config(&settings.store)?;
    let cache = Arc::new(RecipeCache::new());
    if let Err(e) = cache.refresh(source.as_ref()).await {
        warn!(
            "Initial recipe load failed, starting with an empty cache: {}",
            e.log_safe()
        );
    }

    let _refresh_handle = RefreshScheduler::new(
        cache.clone(),
        source,
        settings.store.refresh_interval_seconds,
    )
    .start();

    let completion: Arc<dyn CompletionClient> = Arc::new(OpenAiClient::new(&settings.completion)?);
    info!(
        "Completion provider: {} ({})",
        completion.provider_name(),
        settings.completion.model
    );

    let chat = Arc::new(ChatService::from_settings(
        &settings,
        cache.clone(),
        completion,
    ));

    // Create application state
    let state = AppState { chat, cache };

    let app = routes::create_router(state, &settings)?;

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    info!("🍪 CookiChef listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}
