// Read-only HTTP view of the hosted session.

use crate::interface_adapters::protocol::SessionStatusDto;
use crate::interface_adapters::state::AppState;
use axum::{Json, extract::State};
use std::sync::Arc;

pub async fn session_status_handler(State(state): State<Arc<AppState>>) -> Json<SessionStatusDto> {
    let status = state.status_rx.borrow().clone();
    Json(SessionStatusDto::from(&status))
}
