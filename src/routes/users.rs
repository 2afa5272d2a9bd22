// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile and weight-progress routes.

use crate::error::{AppError, ResultExt, Result};
use crate::models::{ProfileUpdate, User, WeightEntry};
use crate::routes::MessageResponse;
use crate::time_utils::today_key;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Map;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", post(create_user))
        .route("/api/users/{user_id}", get(get_user))
        .route("/api/users/{user_id}/profile", put(update_profile))
        .route(
            "/api/users/{user_id}/weight-progress",
            post(add_weight_progress).get(list_weight_progress),
        )
        .route(
            "/api/users/{user_id}/weight-progress/{progress_id}",
            delete(delete_weight_progress),
        )
}

// ─── User Profile ────────────────────────────────────────────

/// Sign-up payload. `uid` comes from the auth provider and becomes the
/// document ID.
#[derive(Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CreateUserRequest {
    pub uid: String,
    #[serde(flatten)]
    pub user: User,
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<User>> {
    let user = state
        .db
        .get_user(&user_id)
        .await
        .or_fail("Failed to retrieve user")?
        .ok_or(AppError::NotFound("User not found"))?;

    Ok(Json(user))
}

/// Create the user document, replacing any existing one with the same uid.
/// Only the profile fields are stored.
async fn create_user(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    const FAILED: &str = "Failed to add user API Response";

    let Json(body) = body.or_fail(FAILED)?;
    let user = User {
        id: None,
        extra: Map::new(),
        ..body.user
    };

    state
        .db
        .set_user(&body.uid, &user)
        .await
        .or_fail(FAILED)?;

    tracing::info!(user_id = %body.uid, "User created");

    Ok((
        StatusCode::CREATED,
        MessageResponse::new("User added successfully"),
    ))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    profile: std::result::Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    const FAILED: &str = "Failed to update profile";

    let Json(profile) = profile.or_fail(FAILED)?;
    state
        .db
        .update_profile(&user_id, &profile)
        .await
        .or_fail(FAILED)?;

    Ok(MessageResponse::new("Profile updated successfully"))
}

// ─── Weight Progress ─────────────────────────────────────────

/// Record today's weight. The entry is keyed by the UTC date, so a second
/// post on the same day replaces the first.
async fn add_weight_progress(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    body: std::result::Result<Json<WeightEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    const FAILED: &str = "Failed to add weight progress";

    let Json(body) = body.or_fail(FAILED)?;
    let date = today_key();
    let entry = WeightEntry {
        id: None,
        weight: body.weight,
        extra: Map::new(),
    };

    state
        .db
        .set_weight_progress(&user_id, &date, &entry)
        .await
        .or_fail(FAILED)?;

    tracing::debug!(user_id = %user_id, date = %date, "Weight progress recorded");

    Ok((
        StatusCode::CREATED,
        MessageResponse::with_id(date, "Weight progress added successfully"),
    ))
}

async fn list_weight_progress(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<WeightEntry>>> {
    let entries = state
        .db
        .list_weight_progress(&user_id)
        .await
        .or_fail("Failed to retrieve weight progress")?;

    Ok(Json(entries))
}

async fn delete_weight_progress(
    State(state): State<Arc<AppState>>,
    Path((user_id, progress_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    state
        .db
        .delete_weight_progress(&user_id, &progress_id)
        .await
        .or_fail("Failed to delete weight progress record")?;

    Ok(MessageResponse::new(
        "Weight progress record deleted successfully",
    ))
}
