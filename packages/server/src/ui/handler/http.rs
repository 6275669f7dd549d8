//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::ui::state::AppState;

/// Response body of `GET /api/users`
#[derive(Debug, Serialize)]
pub struct UserListDto {
    pub users: Vec<String>,
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Names of the users who have joined, sorted
pub async fn list_users(State(state): State<Arc<AppState>>) -> Json<UserListDto> {
    let users = state.list_users_usecase.execute().await;
    Json(UserListDto { users })
}
