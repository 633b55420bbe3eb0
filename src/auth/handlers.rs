use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MessageResponse, ProtectedResponse, SignupRequest},
        extractors::AuthSession,
        repo_types::User,
        services,
        session::{clear_session_cookie, session_cookie},
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/users", get(list_users))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/protected", get(protected))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(payload) = payload?;
    services::register(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully!",
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(services::list_users(&state).await?))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let session = services::authenticate(&state, &payload.email, &payload.password).await?;
    let cookie = session_cookie(&session.token, session.ttl, state.config.cookie_secure);

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(LoginResponse {
            message: "Login successfully",
            user: session.user,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        AppendHeaders([(
            header::SET_COOKIE,
            clear_session_cookie(state.config.cookie_secure),
        )]),
        Json(MessageResponse {
            message: "Logged out successfully",
        }),
    )
}

#[instrument(skip_all)]
pub async fn protected(AuthSession(claims): AuthSession) -> Json<ProtectedResponse> {
    info!(user_id = %claims.sub, role = claims.role.as_str(), "protected route accessed");
    Json(ProtectedResponse {
        message: "You have access to this protected route",
        user_id: claims.sub,
        role: claims.role,
    })
}
