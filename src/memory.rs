//! In-process store used with `STORE_BACKEND=memory` and in tests. Each
//! collection sits behind its own lock; the ledger lock is held across the
//! whole lookup/check/append sequence of a scan.

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{
    attendance::{
        ledger::{LedgerEntry, Participant},
        repo::LedgerStore,
    },
    auth::{
        repo::UserStore,
        repo_types::{determine_initial_role, NewUser, Role, User},
    },
    error::StoreError,
    events::{repo::EventStore, repo_types::Event},
};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    events: RwLock<Vec<Event>>,
    ledgers: Mutex<Vec<LedgerEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(StoreError::EmailTaken);
        }
        let admins = users.iter().filter(|u| u.role == Role::Admin).count() as i64;
        let user = new_user.into_user(
            Uuid::new_v4(),
            determine_initial_role(admins),
            OffsetDateTime::now_utc(),
        );
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert(&self, event: &Event) -> Result<(), StoreError> {
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.events.read().await.clone())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn scan(
        &self,
        event_title: &str,
        participant: Participant,
    ) -> Result<LedgerEntry, StoreError> {
        let mut ledgers = self.ledgers.lock().await;
        let idx = match ledgers.iter().position(|e| e.event_title == event_title) {
            Some(idx) => idx,
            None => {
                // Only kept once the first participant is admitted.
                let mut fresh = LedgerEntry::new(event_title);
                fresh.admit(participant)?;
                ledgers.push(fresh.clone());
                return Ok(fresh);
            }
        };

        let entry = &mut ledgers[idx];
        entry.admit(participant)?;
        Ok(entry.clone())
    }

    async fn find_by_title(&self, event_title: &str) -> Result<Option<LedgerEntry>, StoreError> {
        Ok(self
            .ledgers
            .lock()
            .await
            .iter()
            .find(|e| e.event_title == event_title)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(self.ledgers.lock().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "hash".into(),
            fullname: "Name".into(),
            course: "BSED".into(),
            year: "4".into(),
            age: None,
            student_id: "S".into(),
            gender: "".into(),
        }
    }

    fn participant(student_id: &str) -> Participant {
        Participant {
            name: "N".into(),
            course: "C".into(),
            gender: "G".into(),
            student_id: student_id.into(),
            year: "1".into(),
            time: "t".into(),
        }
    }

    #[tokio::test]
    async fn only_first_account_is_admin() {
        let store = MemoryStore::new();
        let a = store.create(new_user("a@x.io")).await.unwrap();
        let b = store.create(new_user("b@x.io")).await.unwrap();
        assert_eq!(a.role, Role::Admin);
        assert_eq!(b.role, Role::User);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        store.create(new_user("a@x.io")).await.unwrap();
        let err = store.create(new_user("a@x.io")).await.unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));
        assert_eq!(UserStore::list(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ledger_reuses_entry_per_title() {
        let store = MemoryStore::new();
        let first = store.scan("Orientation", participant("S1")).await.unwrap();
        let second = store.scan("Orientation", participant("S2")).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.participants.len(), 2);
        assert_eq!(LedgerStore::list(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn titles_match_exactly() {
        let store = MemoryStore::new();
        store.scan("Orientation", participant("S1")).await.unwrap();
        assert!(store.find_by_title("orientation").await.unwrap().is_none());
        assert!(store.find_by_title("Orientation").await.unwrap().is_some());
    }
}
