use std::sync::Arc;

use valore_tracker::api::router::create_router;
use valore_tracker::auth::{AdminAuth, AuthProvider, GoTrueAdmin, GoTrueClient, MemoryAuth};
use valore_tracker::config::AppConfig;
use valore_tracker::db::{self, MemoryStore, PgStore};
use valore_tracker::store::TrackerStore;
use valore_tracker::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);
    let metrics_handle = valore_tracker::metrics::init_metrics();

    // --- Record store ---
    let store: Arc<dyn TrackerStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = db::init_pool(url).await?;
            if config.run_migrations {
                db::run_migrations(&pool).await?;
                tracing::info!("Migrations applied");
            }
            tracing::info!("Database connected");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store (data is lost on restart)");
            Arc::new(MemoryStore::new())
        }
    };

    // --- Auth backend ---
    let (auth, admin): (Arc<dyn AuthProvider>, Option<Arc<dyn AdminAuth>>) =
        match (&config.supabase_url, &config.supabase_anon_key) {
            (Some(url), Some(anon_key)) => {
                let http = reqwest::Client::new();
                let auth: Arc<dyn AuthProvider> =
                    Arc::new(GoTrueClient::new(http.clone(), url, anon_key.clone()));
                if !config.has_service_role_key() {
                    tracing::warn!("SUPABASE_SERVICE_ROLE_KEY not set, provisioning endpoints disabled");
                }
                let admin = config.supabase_service_role_key.as_ref().map(|key| {
                    Arc::new(GoTrueAdmin::new(http.clone(), url, key.clone())) as Arc<dyn AdminAuth>
                });
                (auth, admin)
            }
            _ => {
                tracing::warn!("Auth backend not configured, running in preview mode with in-memory identities");
                let memory = Arc::new(MemoryAuth::new());
                let admin: Arc<dyn AdminAuth> = memory.clone();
                let auth: Arc<dyn AuthProvider> = memory;
                (auth, Some(admin))
            }
        };

    tracing::info!(
        persist_policy = config.persist_policy.as_str(),
        preview = config.is_preview_mode(),
        "Tracker configured"
    );

    let state = AppState::new(config, store, auth, admin, metrics_handle);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
