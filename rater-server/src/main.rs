use std::sync::Arc;

use clap::Parser;
use rater_core::{PgSampleStore, RaterConfig, SampleStore};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use rater_server::conversation::{ConversationEngine, SessionRegistry};
use rater_server::http::HttpState;
use rater_server::poller::Dispatcher;
use rater_server::router::Router;
use rater_server::subsystems::admin::{AdminGate, AdminOps};
use rater_server::telegram::TelegramClient;
use rater_server::transport::Transport;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "rater.toml")]
    config: String,

    /// Check database connectivity and exit
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = match RaterConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level));
    fmt().with_env_filter(filter).init();

    let pool = match rater_core::db::create_pool(&config.database).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if args.health {
        match rater_core::db::health_check(&pool).await {
            Ok(v) => println!("✅ PostgreSQL connected: {}", v),
            Err(e) => {
                println!("❌ PostgreSQL connection failed: {}", e);
                std::process::exit(1);
            }
        }
        println!("✅ Rater DB health check passed");
        return Ok(());
    }

    rater_core::db::migrate(&pool).await?;

    let store: Arc<dyn SampleStore> = Arc::new(PgSampleStore::new(pool));
    let client = Arc::new(TelegramClient::with_base_url(
        config.bot.token.clone(),
        config.bot.api_base_url.clone(),
        config.bot.poll_timeout_seconds,
    )?);
    let me = client.get_me().await?;
    tracing::info!(bot = ?me.username, "Authorized with the Bot API");
    let transport: Arc<dyn Transport> = client.clone();
    let sessions = Arc::new(SessionRegistry::new());

    let engine = ConversationEngine::new(
        store.clone(),
        transport.clone(),
        sessions.clone(),
        config.bot.filler_image_url.clone(),
    );
    let router = Router::new(
        engine,
        AdminOps::new(store.clone(), transport.clone()),
        AdminGate::new(config.bot.admin_id),
        transport,
        config.bot.filler_image_url.clone(),
    );

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    tokio::spawn(rater_server::subsystems::sweeper::run_session_sweeper(
        sessions.clone(),
        config.conversation.clone(),
        tx.subscribe(),
    ));

    if config.http.enabled {
        let http_state = HttpState {
            store: store.clone(),
            sessions: sessions.clone(),
        };
        let http_config = config.http.clone();
        let http_shutdown = tx.subscribe();
        tokio::spawn(async move {
            if let Err(e) =
                rater_server::http::start_http_server(http_state, http_config, http_shutdown).await
            {
                tracing::error!("HTTP server error: {}", e);
            }
        });
    }

    tracing::info!(admin_id = config.bot.admin_id, "Rater bot started");
    let dispatcher = Dispatcher::new(router, me.username);
    rater_server::poller::run_polling(client, dispatcher, tx.subscribe()).await;

    Ok(())
}
