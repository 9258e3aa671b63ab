use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use codenames_server::{
    config::Config,
    create_router,
    db::{self, PgStore},
    dictionary::WordList,
    models::WordPack,
    oracle::{DisabledOracle, HintOracle, HttpHintOracle},
    store::{GameStore, MemoryGameStore, MemoryWordPackStore, WordPackStore},
    AppState,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often idle session locks and listener-less channels are dropped
const CLEANUP_INTERVAL: Duration = Duration::from_secs(15);
/// How long a room may sit without any human player before it is dropped
const EMPTY_ROOM_GRACE_SECS: i64 = 120;
/// How long a finished game stays around for late viewers
const FINISHED_GAME_GRACE_SECS: i64 = 30 * 60;

const DEFAULT_PACK_NAME: &str = "Standard";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codenames_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Codenames server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Load word list
    let words = match WordList::load(&config.game.word_list_path).await {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!("Failed to load word list: {:#}. Using built-in words.", e);
            tracing::warn!(
                "Put one word per line in {} for a fuller default pack",
                config.game.word_list_path
            );
            WordList::builtin()
        }
    };

    // Storage: Postgres when configured, memory otherwise
    let (store, word_packs): (Arc<dyn GameStore>, Arc<dyn WordPackStore>) =
        match config.database_url() {
            Some(url) => {
                let pool = db::create_pool(url, config.database.max_connections)
                    .await
                    .context("connecting to database")?;
                tracing::info!("Connected to database");

                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("running migrations")?;
                tracing::info!("Database migrations completed");

                let pg = Arc::new(PgStore::new(pool));
                pg.ensure_default_pack(DEFAULT_PACK_NAME, words.words())
                    .await
                    .context("seeding default word pack")?;
                (pg.clone() as Arc<dyn GameStore>, pg as Arc<dyn WordPackStore>)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, games are kept in memory only");
                let pack = WordPack::default_pack(DEFAULT_PACK_NAME, "en");
                let store: Arc<dyn GameStore> = Arc::new(MemoryGameStore::new());
                let word_packs: Arc<dyn WordPackStore> =
                    Arc::new(MemoryWordPackStore::with_pack(pack, words.into_words()));
                (store, word_packs)
            }
        };

    // Hint oracle for automated codegivers
    let oracle: Arc<dyn HintOracle> = match &config.oracle.url {
        Some(url) => {
            let http_client = reqwest::Client::builder()
                .timeout(config.oracle.timeout())
                .build()?;
            tracing::info!("Hint oracle enabled at {}", url);
            Arc::new(HttpHintOracle::new(
                http_client,
                url.clone(),
                config.oracle.api_key.clone(),
                config.oracle.timeout(),
            ))
        }
        None => {
            tracing::info!("ORACLE_URL not set, automated codegivers are disabled");
            Arc::new(DisabledOracle)
        }
    };

    let state = Arc::new(AppState::new(
        store,
        word_packs,
        oracle,
        config.game.max_players,
    ));

    // Spawn background task to drop idle locks and channels
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        cleanup_task(cleanup_state).await;
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Serve frontend static files
    let frontend_service = ServeDir::new("../frontend");

    let app = create_router(state)
        .fallback_service(frontend_service)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws/{{game_id}}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Frontend origin: {}", config.server.frontend_url);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Background task that periodically drops abandoned rooms and the
/// per-session bookkeeping nobody uses any more
async fn cleanup_task(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        interval.tick().await;

        if let Err(e) = state
            .service
            .evict_abandoned_sessions(
                chrono::Duration::seconds(EMPTY_ROOM_GRACE_SECS),
                chrono::Duration::seconds(FINISHED_GAME_GRACE_SECS),
            )
            .await
        {
            tracing::warn!("Evicting abandoned rooms failed: {}", e);
        }

        let locks = state.service.prune_locks();
        let channels = state.events.prune();
        if locks > 0 || channels > 0 {
            tracing::debug!(
                "Cleanup released {} session locks and {} event channels",
                locks,
                channels
            );
        }
    }
}
