// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout routes: workouts, their schedule, history and progress.

use crate::error::{AppError, ResultExt, Result};
use crate::models::{
    HistoryEntry, ProgressEntry, Workout, WorkoutEntry, WorkoutSchedule, WorkoutUpdate,
};
use crate::routes::MessageResponse;
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use futures_util::future::try_join_all;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/users/{user_id}/workouts",
            post(create_workout).get(list_workouts),
        )
        .route(
            "/api/users/{user_id}/workouts/progress",
            get(progress_by_muscle_group),
        )
        .route(
            "/api/users/{user_id}/workouts/{workout_id}",
            put(update_workout).delete(delete_workout),
        )
        .route(
            "/api/users/{user_id}/workouts/{workout_id}/schedule",
            post(schedule_workout),
        )
        .route(
            "/api/users/{user_id}/workouts/{workout_id}/history",
            post(add_history).get(list_history),
        )
        .route(
            "/api/users/{user_id}/workouts/{workout_id}/progress",
            post(add_progress),
        )
}

// ─── Workouts ────────────────────────────────────────────────

/// New workout. `exercises` are stored as child documents, not inline.
#[derive(Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkoutRequest {
    pub name: Option<Value>,
    pub muscle_group: Option<Value>,
    #[serde(default)]
    pub exercises: Vec<WorkoutEntry>,
}

/// Create a workout, then write its exercises in one atomic batch.
///
/// The workout document is written first and on its own: if the batch
/// fails, the workout remains without exercises and the caller gets a 500.
async fn create_workout(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    body: std::result::Result<Json<CreateWorkoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    const FAILED: &str = "Failed to add workout and exercises";

    let Json(body) = body.or_fail(FAILED)?;
    let workout = Workout {
        name: body.name,
        muscle_group: body.muscle_group,
        ..Default::default()
    };

    let workout_id = state
        .db
        .add_workout(&user_id, &workout)
        .await
        .or_fail(FAILED)?;

    if !body.exercises.is_empty() {
        state
            .db
            .add_workout_entries(&user_id, &workout_id, &body.exercises)
            .await
            .inspect_err(|_| {
                tracing::warn!(
                    user_id = %user_id,
                    workout_id = %workout_id,
                    "Workout stored without its exercises"
                )
            })
            .or_fail(FAILED)?;
    }

    tracing::info!(
        user_id = %user_id,
        workout_id = %workout_id,
        exercises = body.exercises.len(),
        "Workout created"
    );

    Ok((
        StatusCode::CREATED,
        MessageResponse::with_id(workout_id, "Workout and exercises added successfully"),
    ))
}

async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Workout>>> {
    let workouts = state
        .db
        .list_workouts(&user_id, None)
        .await
        .or_fail("Failed to retrieve workouts")?;

    Ok(Json(workouts))
}

/// Replace the workout's `exercises` and `name`. Other fields are kept.
async fn update_workout(
    State(state): State<Arc<AppState>>,
    Path((user_id, workout_id)): Path<(String, String)>,
    update: std::result::Result<Json<WorkoutUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    const FAILED: &str = "Failed to update workout";

    let Json(update) = update.or_fail(FAILED)?;
    state
        .db
        .update_workout(&user_id, &workout_id, &update)
        .await
        .or_fail(FAILED)?;

    Ok(MessageResponse::new("Workout updated successfully"))
}

async fn delete_workout(
    State(state): State<Arc<AppState>>,
    Path((user_id, workout_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    state
        .db
        .delete_workout(&user_id, &workout_id)
        .await
        .or_fail("Failed to delete workout")?;

    Ok(MessageResponse::new("Workout deleted successfully"))
}

async fn schedule_workout(
    State(state): State<Arc<AppState>>,
    Path((user_id, workout_id)): Path<(String, String)>,
    schedule: std::result::Result<Json<WorkoutSchedule>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    const FAILED: &str = "Failed to schedule workout";

    let Json(schedule) = schedule.or_fail(FAILED)?;
    state
        .db
        .schedule_workout(&user_id, &workout_id, &schedule)
        .await
        .or_fail(FAILED)?;

    Ok(MessageResponse::new("Workout scheduled successfully"))
}

// ─── History ─────────────────────────────────────────────────

async fn add_history(
    State(state): State<Arc<AppState>>,
    Path((user_id, workout_id)): Path<(String, String)>,
    body: std::result::Result<Json<HistoryEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    const FAILED: &str = "Failed to record workout history";

    let Json(body) = body.or_fail(FAILED)?;
    let entry = HistoryEntry {
        id: None,
        extra: Map::new(),
        ..body
    };
    let history_id = state
        .db
        .add_history(&user_id, &workout_id, &entry)
        .await
        .or_fail(FAILED)?;

    Ok((
        StatusCode::CREATED,
        MessageResponse::with_id(history_id, "Workout history recorded successfully"),
    ))
}

async fn list_history(
    State(state): State<Arc<AppState>>,
    Path((user_id, workout_id)): Path<(String, String)>,
) -> Result<Json<Vec<HistoryEntry>>> {
    let history = state
        .db
        .list_history(&user_id, &workout_id)
        .await
        .or_fail("Failed to retrieve workout history")?;

    Ok(Json(history))
}

// ─── Progress ────────────────────────────────────────────────

async fn add_progress(
    State(state): State<Arc<AppState>>,
    Path((user_id, workout_id)): Path<(String, String)>,
    body: std::result::Result<Json<ProgressEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    const FAILED: &str = "Failed to add workout progress";

    let Json(body) = body.or_fail(FAILED)?;
    let entry = ProgressEntry {
        id: None,
        extra: Map::new(),
        ..body
    };
    let progress_id = state
        .db
        .add_workout_progress(&user_id, &workout_id, &entry)
        .await
        .or_fail(FAILED)?;

    Ok((
        StatusCode::CREATED,
        MessageResponse::with_id(progress_id, "Workout progress added successfully"),
    ))
}

#[derive(Deserialize)]
struct ProgressQuery {
    #[serde(rename = "muscleGroup")]
    muscle_group: String,
}

/// Progress entries of every workout for one muscle group, concatenated in
/// workout order.
///
/// 404 when no workout matches; matching workouts without progress give an
/// empty list.
async fn progress_by_muscle_group(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    params: std::result::Result<Query<ProgressQuery>, QueryRejection>,
) -> Result<Json<Vec<ProgressEntry>>> {
    const FAILED: &str = "Failed to retrieve workout progress";

    let Query(params) = params.or_fail(FAILED)?;
    let workouts = state
        .db
        .list_workouts(&user_id, Some(&params.muscle_group))
        .await
        .or_fail(FAILED)?;

    if workouts.is_empty() {
        return Err(AppError::NotFound(
            "No workouts found for the specified muscle group",
        ));
    }

    tracing::debug!(
        user_id = %user_id,
        muscle_group = %params.muscle_group,
        workouts = workouts.len(),
        "Fetching workout progress"
    );

    let reads = workouts
        .iter()
        .filter_map(|workout| workout.id.as_deref())
        .map(|workout_id| state.db.list_workout_progress(&user_id, workout_id));

    let progress = try_join_all(reads).await.or_fail(FAILED)?;

    Ok(Json(progress.into_iter().flatten().collect()))
}
