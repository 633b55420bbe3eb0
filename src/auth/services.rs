use std::time::Duration;

use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::SignupRequest,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo_types::{NewUser, User},
    },
    error::AppError,
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A freshly issued session token and the account it belongs to.
pub struct Session {
    pub token: String,
    pub ttl: Duration,
    pub user: User,
}

pub async fn register(state: &AppState, req: SignupRequest) -> Result<User, AppError> {
    let email = normalize_email(&req.email);

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::Validation("Password too short".into()));
    }

    let password_hash = hash_password(&req.password)?;
    let user = state
        .users
        .create(NewUser {
            email,
            password_hash,
            fullname: req.fullname.trim().to_string(),
            course: req.course.trim().to_string(),
            year: req.year.trim().to_string(),
            age: req.age,
            student_id: req.student_id.trim().to_string(),
            gender: req.gender.trim().to_string(),
        })
        .await?;

    info!(
        user_id = %user.id,
        email = %user.email,
        role = user.role.as_str(),
        requested_role = ?req.role,
        "user registered"
    );
    Ok(user)
}

pub async fn authenticate(state: &AppState, email: &str, password: &str) -> Result<Session, AppError> {
    let email = normalize_email(email);

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(state);
    let token = keys.sign(user.id, user.role)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Session {
        token,
        ttl: keys.ttl,
        user,
    })
}

pub async fn list_users(state: &AppState) -> Result<Vec<User>, AppError> {
    Ok(state.users.list().await?)
}
