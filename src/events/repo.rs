use async_trait::async_trait;
use sqlx::PgPool;

use crate::{error::StoreError, events::repo_types::Event};

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert(&self, event: &Event) -> Result<(), StoreError>;
    /// All events, oldest first.
    async fn list(&self) -> Result<Vec<Event>, StoreError>;
}

#[derive(Clone)]
pub struct PgEventStore {
    db: PgPool,
}

impl PgEventStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn insert(&self, event: &Event) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO events (id, event_title, due_date, time_limit, release_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.id)
        .bind(&event.event_title)
        .bind(event.due_date)
        .bind(&event.time_limit)
        .bind(event.release_date)
        .bind(event.created_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Event>, StoreError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, event_title, due_date, time_limit, release_date, created_at
            FROM events
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(events)
    }
}
