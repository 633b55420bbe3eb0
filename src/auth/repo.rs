use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::repo_types::{determine_initial_role, NewUser, User},
    error::StoreError,
};

/// Serializes signups so the admin bootstrap check cannot race.
const SIGNUP_LOCK_KEY: i64 = 0x5353_4301;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account, deciding its role inside the same critical
    /// section as the admin-count check.
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn list(&self) -> Result<Vec<User>, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut tx = self.db.begin().await.context("begin signup tx")?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SIGNUP_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .context("acquire signup lock")?;

        let taken: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(&new_user.email)
            .fetch_optional(&mut *tx)
            .await
            .context("check email")?;
        if taken.is_some() {
            return Err(StoreError::EmailTaken);
        }

        let (admins,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'admin'")
                .fetch_one(&mut *tx)
                .await
                .context("count admins")?;
        let role = determine_initial_role(admins);

        let user = new_user.into_user(Uuid::new_v4(), role, OffsetDateTime::now_utc());
        let inserted = sqlx::query(
            r#"
            INSERT INTO users
                (id, email, password_hash, fullname, course, year, age, student_id, gender, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.fullname)
        .bind(&user.course)
        .bind(&user.year)
        .bind(user.age)
        .bind(&user.student_id)
        .bind(&user.gender)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(StoreError::EmailTaken)
            }
            Err(e) => return Err(anyhow::Error::new(e).context("insert user").into()),
        }

        tx.commit().await.context("commit signup tx")?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, fullname, course, year, age, student_id, gender, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, fullname, course, year, age, student_id, gender, role, created_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "$argon2id$placeholder".into(),
            fullname: "Student".into(),
            course: "BSCS".into(),
            year: "1".into(),
            age: Some(18),
            student_id: email.into(),
            gender: "".into(),
        }
    }

    #[sqlx::test]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn concurrent_first_signups_bootstrap_one_admin(db: PgPool) {
        let store = PgUserStore::new(db);
        let handles: Vec<_> = (0..6)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.create(new_user(&format!("u{i}@x.io"))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let users = store.list().await.unwrap();
        assert_eq!(users.len(), 6);
        assert_eq!(users.iter().filter(|u| u.role == Role::Admin).count(), 1);
    }

    #[sqlx::test]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn duplicate_email_maps_to_email_taken(db: PgPool) {
        let store = PgUserStore::new(db);
        store.create(new_user("dup@x.io")).await.unwrap();
        let err = store.create(new_user("dup@x.io")).await.unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));
    }
}
