use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::{
    attendance::repo::{LedgerStore, PgLedgerStore},
    auth::repo::{PgUserStore, UserStore},
    config::{AppConfig, StoreBackend},
    events::repo::{EventStore, PgEventStore},
    memory::MemoryStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub events: Arc<dyn EventStore>,
    pub ledger: Arc<dyn LedgerStore>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        match config.store {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .clone()
                    .context("DATABASE_URL is required for the postgres store")?;
                let db = PgPoolOptions::new()
                    .max_connections(10)
                    .connect(&url)
                    .await
                    .context("connect to database")?;

                sqlx::migrate!("./migrations")
                    .run(&db)
                    .await
                    .context("run migrations")?;

                info!("using postgres store");
                Ok(Self::from_pool(db, config))
            }
            StoreBackend::Memory => {
                info!("using in-memory store; data is lost on restart");
                Ok(Self::in_memory(config))
            }
        }
    }

    pub fn from_pool(db: PgPool, config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            users: Arc::new(PgUserStore::new(db.clone())),
            events: Arc::new(PgEventStore::new(db.clone())),
            ledger: Arc::new(PgLedgerStore::new(db)),
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            config: Arc::new(config),
            users: store.clone(),
            events: store.clone(),
            ledger: store,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::in_memory(AppConfig::for_tests())
    }
}
