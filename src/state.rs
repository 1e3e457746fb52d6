use crate::config::AppConfig;
use crate::users::{memory::MemoryUserStore, repo::PgUserStore, repo::UserStore};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let store = match config.database_url.as_deref() {
            Some(url) => {
                let db = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect(url)
                    .await
                    .context("connect to database")?;

                sqlx::migrate!("./migrations")
                    .run(&db)
                    .await
                    .context("apply migrations")?;

                tracing::info!(max_connections = config.max_connections, "connected to postgres");
                Arc::new(PgUserStore::new(db)) as Arc<dyn UserStore>
            }
            None => {
                tracing::warn!("DATABASE_URL not set; users are kept in memory and lost on exit");
                Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>
            }
        };

        Self::connect(store, config).await
    }

    /// Wraps an already built store, refusing to start if it can't be reached.
    pub async fn connect(store: Arc<dyn UserStore>, config: Arc<AppConfig>) -> anyhow::Result<Self> {
        store.ping().await.context("user store is not reachable")?;
        Ok(Self { store, config })
    }

    /// Fresh in-memory state with default config.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self {
            store: Arc::new(MemoryUserStore::new()),
            config: Arc::new(AppConfig::default()),
        }
    }
}
