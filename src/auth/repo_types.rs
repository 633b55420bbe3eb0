use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Access level carried by every account and session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role {0:?}")]
pub struct UnknownRole(String);

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownRole(value)),
        }
    }
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "userId")]
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 PHC string, never exposed
    pub fullname: String,
    pub course: String,
    pub year: String,
    pub age: Option<i32>,
    pub student_id: String,
    pub gender: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Everything needed to insert an account. The role is decided by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub fullname: String,
    pub course: String,
    pub year: String,
    pub age: Option<i32>,
    pub student_id: String,
    pub gender: String,
}

impl NewUser {
    pub fn into_user(self, id: Uuid, role: Role, created_at: OffsetDateTime) -> User {
        User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            fullname: self.fullname,
            course: self.course,
            year: self.year,
            age: self.age,
            student_id: self.student_id,
            gender: self.gender,
            role,
            created_at,
        }
    }
}

/// Role for a freshly registered account: the first account bootstraps as
/// admin, everyone after that is a plain user.
pub fn determine_initial_role(existing_admin_count: i64) -> Role {
    if existing_admin_count <= 0 {
        Role::Admin
    } else {
        Role::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_account_becomes_admin() {
        assert_eq!(determine_initial_role(0), Role::Admin);
    }

    #[test]
    fn later_accounts_are_users() {
        assert_eq!(determine_initial_role(1), Role::User);
        assert_eq!(determine_initial_role(7), Role::User);
    }

    #[test]
    fn user_serialization_hides_password_hash() {
        let user = NewUser {
            email: "a@b.co".into(),
            password_hash: "$argon2id$secret".into(),
            fullname: "Ana".into(),
            course: "BSIT".into(),
            year: "2".into(),
            age: Some(19),
            student_id: "S1".into(),
            gender: "female".into(),
        }
        .into_user(Uuid::new_v4(), Role::User, OffsetDateTime::now_utc());

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(!json.to_string().contains("argon2"));
        assert_eq!(json["studentId"], "S1");
        assert_eq!(json["role"], "user");
        assert!(json.get("userId").is_some());
    }
}
