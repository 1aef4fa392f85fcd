use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue};
use clap::Parser;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use devhabit_api::app::{router, AppState};
use devhabit_api::config::{config, DatabaseConfig, SecurityConfig};
use devhabit_api::database::{schema, seed, DatabaseManager, MemoryStore, PgStore, Store};
use devhabit_api::links::parse_base_url;

#[derive(Parser)]
#[command(name = "devhabit-api")]
#[command(about = "DevHabit API server")]
#[command(version)]
struct Args {
    #[arg(long, help = "Bind address (overrides HOST)")]
    host: Option<String>,

    #[arg(long, short, help = "Listen port (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Postgres connection URL (overrides DATABASE_URL)")]
    database_url: Option<String>,

    #[arg(long, help = "Use the in-memory store even when a database URL is configured")]
    memory: bool,

    #[arg(long, help = "Insert the demo habits on startup (overrides DATABASE_SEED)")]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the config singleton reads the environment
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = config();
    tracing::info!("Starting DevHabit API in {:?} mode", config.environment);
    if devhabit_api::is_development!() {
        tracing::debug!("Configuration: {:?}", config);
    }

    let mut database = config.database.clone();
    if let Some(url) = args.database_url {
        database.url = Some(url);
    }
    if args.memory {
        database.url = None;
    }
    if args.seed {
        database.seed_on_startup = true;
    }
    let store = open_store(&database).await?;

    let base_url = config
        .api
        .public_base_url
        .as_deref()
        .map(parse_base_url)
        .transpose()
        .context("API_PUBLIC_BASE_URL cannot be used as a link base")?;

    let state = AppState::new(store, base_url).context("invalid sort mapping registration")?;
    state.warm_field_tables().context("invalid response field declaration")?;

    let mut app = router(state);
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }
    if let Some(cors) = cors_layer(&config.security)? {
        app = app.layer(cors);
    }

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("DevHabit API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn open_store(database: &DatabaseConfig) -> anyhow::Result<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match database.url {
        None => {
            tracing::warn!("No DATABASE_URL configured, using the in-memory store");
            Arc::new(MemoryStore::new())
        }
        Some(_) => {
            let pool = DatabaseManager::connect(database).await?;
            if database.apply_schema_on_startup {
                schema::apply(&pool).await?;
                tracing::info!("Database schema applied");
            }
            Arc::new(PgStore::new(pool))
        }
    };

    if database.seed_on_startup {
        seed::apply(store.as_ref()).await.context("failed to seed the database")?;
    }
    Ok(store)
}

fn cors_layer(security: &SecurityConfig) -> anyhow::Result<Option<CorsLayer>> {
    if !security.enable_cors {
        return Ok(None);
    }

    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::LOCATION]);

    if security.cors_origins.iter().any(|origin| origin == "*") {
        return Ok(Some(layer.allow_origin(Any)));
    }

    let origins = security
        .cors_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("invalid CORS origin '{}'", origin))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Some(layer.allow_origin(AllowOrigin::list(origins))))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
