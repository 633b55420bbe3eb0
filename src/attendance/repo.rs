use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    attendance::ledger::{LedgerEntry, Participant},
    error::StoreError,
};

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Record `participant` in the ledger for `event_title`, creating the
    /// ledger on first use. Lookup, duplicate check and append run under one
    /// lock per title.
    async fn scan(
        &self,
        event_title: &str,
        participant: Participant,
    ) -> Result<LedgerEntry, StoreError>;
    async fn find_by_title(&self, event_title: &str) -> Result<Option<LedgerEntry>, StoreError>;
    async fn list(&self) -> Result<Vec<LedgerEntry>, StoreError>;
}

#[derive(Clone)]
pub struct PgLedgerStore {
    db: PgPool,
}

impl PgLedgerStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(FromRow)]
struct ScanEventRow {
    id: Uuid,
    event_title: String,
}

#[derive(FromRow)]
struct ParticipantRow {
    scan_event_id: Uuid,
    #[sqlx(flatten)]
    participant: Participant,
}

const PARTICIPANT_COLUMNS: &str =
    "scan_event_id, name, course, gender, student_id, year, scan_time AS time";

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn scan(
        &self,
        event_title: &str,
        participant: Participant,
    ) -> Result<LedgerEntry, StoreError> {
        let mut tx = self.db.begin().await.context("begin scan tx")?;

        sqlx::query(
            r#"
            INSERT INTO scan_events (id, event_title)
            VALUES ($1, $2)
            ON CONFLICT (event_title) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event_title)
        .execute(&mut *tx)
        .await
        .context("ensure scan event")?;

        // Row lock serializes concurrent scans for the same title.
        let row = sqlx::query_as::<_, ScanEventRow>(
            "SELECT id, event_title FROM scan_events WHERE event_title = $1 FOR UPDATE",
        )
        .bind(event_title)
        .fetch_one(&mut *tx)
        .await
        .context("lock scan event")?;

        let participants = sqlx::query_as::<_, ParticipantRow>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM scan_participants WHERE scan_event_id = $1 ORDER BY seq ASC"
        ))
        .bind(row.id)
        .fetch_all(&mut *tx)
        .await
        .context("load participants")?;

        let mut entry = LedgerEntry {
            id: row.id,
            event_title: row.event_title,
            participants: participants.into_iter().map(|r| r.participant).collect(),
        };
        let admitted = entry.admit(participant)?.clone();

        let inserted = sqlx::query(
            r#"
            INSERT INTO scan_participants
                (scan_event_id, name, course, gender, student_id, year, scan_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(&admitted.name)
        .bind(&admitted.course)
        .bind(&admitted.gender)
        .bind(&admitted.student_id)
        .bind(&admitted.year)
        .bind(&admitted.time)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(StoreError::AlreadyScanned)
            }
            Err(e) => return Err(anyhow::Error::new(e).context("insert participant").into()),
        }

        tx.commit().await.context("commit scan tx")?;
        Ok(entry)
    }

    async fn find_by_title(&self, event_title: &str) -> Result<Option<LedgerEntry>, StoreError> {
        let Some(row) = sqlx::query_as::<_, ScanEventRow>(
            "SELECT id, event_title FROM scan_events WHERE event_title = $1",
        )
        .bind(event_title)
        .fetch_optional(&self.db)
        .await?
        else {
            return Ok(None);
        };

        let participants = sqlx::query_as::<_, ParticipantRow>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM scan_participants WHERE scan_event_id = $1 ORDER BY seq ASC"
        ))
        .bind(row.id)
        .fetch_all(&self.db)
        .await?;

        Ok(Some(LedgerEntry {
            id: row.id,
            event_title: row.event_title,
            participants: participants.into_iter().map(|r| r.participant).collect(),
        }))
    }

    async fn list(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        let rows = sqlx::query_as::<_, ScanEventRow>(
            "SELECT id, event_title FROM scan_events ORDER BY created_at ASC",
        )
        .fetch_all(&self.db)
        .await?;

        let participants = sqlx::query_as::<_, ParticipantRow>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM scan_participants ORDER BY seq ASC"
        ))
        .fetch_all(&self.db)
        .await?;

        let mut by_event: HashMap<Uuid, Vec<Participant>> = HashMap::new();
        for p in participants {
            by_event.entry(p.scan_event_id).or_default().push(p.participant);
        }

        Ok(rows
            .into_iter()
            .map(|row| LedgerEntry {
                participants: by_event.remove(&row.id).unwrap_or_default(),
                id: row.id,
                event_title: row.event_title,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(student_id: &str, name: &str) -> Participant {
        Participant {
            name: name.into(),
            course: "BSIT".into(),
            gender: "female".into(),
            student_id: student_id.into(),
            year: "1".into(),
            time: "08:00".into(),
        }
    }

    #[sqlx::test]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn concurrent_duplicate_scans_admit_one_row(db: PgPool) {
        let store = PgLedgerStore::new(db.clone());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .scan("Orientation", participant("S1", &format!("A{i}")))
                        .await
                })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(StoreError::AlreadyScanned) => {}
                Err(e) => panic!("unexpected scan error: {e}"),
            }
        }
        assert_eq!(admitted, 1);

        let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM scan_participants")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[sqlx::test]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn ledger_keeps_scan_order_and_gender(db: PgPool) {
        let store = PgLedgerStore::new(db);
        store.scan("Seminar", participant("S2", "B")).await.unwrap();
        store.scan("Seminar", participant("S1", "A")).await.unwrap();

        let entry = store.find_by_title("Seminar").await.unwrap().unwrap();
        let ids: Vec<_> = entry.participants.iter().map(|p| p.student_id.as_str()).collect();
        assert_eq!(ids, ["S2", "S1"]);
        assert_eq!(entry.participants[0].gender, "female");
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
