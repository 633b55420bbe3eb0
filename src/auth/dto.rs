use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::repo_types::{Role, User},
    serde_ext::{optional_int, string_or_number},
};

/// Request body for `POST /api/signup`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub course: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: String,
    #[serde(default, deserialize_with = "optional_int")]
    pub age: Option<i32>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub student_id: String,
    #[serde(default)]
    pub gender: String,
    /// Accepted for compatibility; the server always decides the role.
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedResponse {
    pub message: &'static str,
    pub user_id: Uuid,
    pub role: Role,
}
