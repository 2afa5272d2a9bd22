// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise routes, including workouts nested under an exercise.

use crate::error::{ResultExt, Result};
use crate::models::{Exercise, ExerciseWorkout};
use crate::routes::MessageResponse;
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Map;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/users/{user_id}/exercises",
            post(add_exercise).get(list_exercises),
        )
        .route(
            "/api/users/{user_id}/exercises/{exercise_id}",
            put(update_exercise).delete(delete_exercise),
        )
        .route(
            "/api/users/{user_id}/exercises/{exercise_id}/workouts",
            post(add_exercise_workout),
        )
}

#[derive(Deserialize)]
struct ExercisesQuery {
    /// Only exercises for this muscle group; empty means no filter
    #[serde(rename = "muscleGroup")]
    muscle_group: Option<String>,
}

/// The stored part of an exercise body: `name` and `muscleGroup` only.
fn submitted_exercise(body: Exercise) -> Exercise {
    Exercise {
        id: None,
        extra: Map::new(),
        ..body
    }
}

async fn add_exercise(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    body: std::result::Result<Json<Exercise>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    const FAILED: &str = "Failed to add exercise";

    let Json(body) = body.or_fail(FAILED)?;
    let exercise = submitted_exercise(body);
    let exercise_id = state
        .db
        .add_exercise(&user_id, &exercise)
        .await
        .or_fail(FAILED)?;

    Ok((
        StatusCode::CREATED,
        MessageResponse::with_id(exercise_id, "Exercise added successfully"),
    ))
}

async fn list_exercises(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    params: std::result::Result<Query<ExercisesQuery>, QueryRejection>,
) -> Result<Json<Vec<Exercise>>> {
    const FAILED: &str = "Failed to retrieve exercises";

    let Query(params) = params.or_fail(FAILED)?;
    let muscle_group = params.muscle_group.as_deref().filter(|g| !g.is_empty());

    tracing::debug!(user_id = %user_id, muscle_group = ?muscle_group, "Fetching exercises");

    let exercises = state
        .db
        .list_exercises(&user_id, muscle_group)
        .await
        .or_fail(FAILED)?;

    Ok(Json(exercises))
}

async fn update_exercise(
    State(state): State<Arc<AppState>>,
    Path((user_id, exercise_id)): Path<(String, String)>,
    body: std::result::Result<Json<Exercise>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    const FAILED: &str = "Failed to update exercise";

    let Json(body) = body.or_fail(FAILED)?;
    let exercise = submitted_exercise(body);
    state
        .db
        .update_exercise(&user_id, &exercise_id, &exercise)
        .await
        .or_fail(FAILED)?;

    Ok(MessageResponse::new("Exercise updated successfully"))
}

async fn delete_exercise(
    State(state): State<Arc<AppState>>,
    Path((user_id, exercise_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    state
        .db
        .delete_exercise(&user_id, &exercise_id)
        .await
        .or_fail("Failed to delete exercise")?;

    Ok(MessageResponse::new("Exercise deleted successfully"))
}

async fn add_exercise_workout(
    State(state): State<Arc<AppState>>,
    Path((user_id, exercise_id)): Path<(String, String)>,
    body: std::result::Result<Json<ExerciseWorkout>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    const FAILED: &str = "Failed to add workout";

    let Json(body) = body.or_fail(FAILED)?;
    let workout = ExerciseWorkout {
        id: None,
        extra: Map::new(),
        ..body
    };
    let workout_id = state
        .db
        .add_exercise_workout(&user_id, &exercise_id, &workout)
        .await
        .or_fail(FAILED)?;

    Ok((
        StatusCode::CREATED,
        MessageResponse::with_id(workout_id, "Workout added successfully"),
    ))
}
