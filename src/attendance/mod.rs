use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod ledger;
pub mod repo;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::scan_routes()
}
