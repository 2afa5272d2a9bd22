// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout, schedule, history and progress API tests (in-memory backend).

use axum::http::{Method, StatusCode};
use fittrack_api::db::MAX_BATCH_WRITES;
use serde_json::{json, Value};

mod common;
use common::{create_test_app, send};

async fn create_workout(app: &axum::Router, body: Value) -> String {
    let (status, response) = send(app, Method::POST, "/api/users/u1/workouts", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        response["message"],
        "Workout and exercises added successfully"
    );
    response["id"].as_str().unwrap().to_string()
}

async fn add_progress(app: &axum::Router, workout_id: &str, body: Value) -> String {
    let (status, response) = send(
        app,
        Method::POST,
        &format!("/api/users/u1/workouts/{}/progress", workout_id),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["message"], "Workout progress added successfully");
    response["id"].as_str().unwrap().to_string()
}

// ═══════════════════════════════════════════════════════════════════════════
// CREATION
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_exercises_are_written_as_children() {
    let (app, db) = create_test_app();

    let workout_id = create_workout(
        &app,
        json!({
            "name": "Push day",
            "muscleGroup": "chest",
            "exercises": [
                { "name": "Bench press", "sets": 4, "reps": 8, "weight": 80.0 },
                { "name": "Dips", "sets": 3, "reps": 12 },
            ],
        }),
    )
    .await;

    let chain = [("users", "u1"), ("workouts", workout_id.as_str())];
    assert_eq!(db.count(&chain, "exercises"), 2);

    let (status, list) = send(&app, Method::GET, "/api/users/u1/workouts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        list,
        json!([{ "id": workout_id, "name": "Push day", "muscleGroup": "chest" }])
    );
}

#[tokio::test]
async fn test_failed_batch_leaves_workout_without_exercises() {
    let (app, db) = create_test_app();
    let exercises = vec![json!({ "name": "Burpee", "reps": 10 }); MAX_BATCH_WRITES + 1];

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users/u1/workouts",
        Some(json!({ "name": "Too big", "muscleGroup": "full", "exercises": exercises })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to add workout and exercises" }));

    // The parent workout was written before the batch and is not rolled back.
    let (_, list) = send(&app, Method::GET, "/api/users/u1/workouts", None).await;
    let workouts = list.as_array().unwrap();
    assert_eq!(workouts.len(), 1);
    assert_eq!(workouts[0]["name"], "Too big");

    let orphan_id = workouts[0]["id"].as_str().unwrap();
    let chain = [("users", "u1"), ("workouts", orphan_id)];
    assert_eq!(db.count(&chain, "exercises"), 0);
}

#[tokio::test]
async fn test_workout_without_exercise_list() {
    let (app, _db) = create_test_app();

    let id = create_workout(&app, json!({ "name": "Rest", "muscleGroup": "none" })).await;

    let (_, list) = send(&app, Method::GET, "/api/users/u1/workouts", None).await;
    assert_eq!(list[0]["id"], json!(id));
}

// ═══════════════════════════════════════════════════════════════════════════
// UPDATE / SCHEDULE / DELETE
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_update_replaces_exercises_and_name() {
    let (app, _db) = create_test_app();
    let id = create_workout(&app, json!({ "name": "Legs", "muscleGroup": "legs" })).await;
    let uri = format!("/api/users/u1/workouts/{}", id);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({
            "name": "Legs A",
            "exercises": [
                { "name": "Squat", "sets": 5, "reps": 5 },
                { "name": "Lunge", "sets": 3, "reps": 10 },
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Workout updated successfully" }));

    send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({
            "name": "Legs B",
            "exercises": [{ "name": "Leg press", "sets": 4, "reps": 12 }],
        })),
    )
    .await;

    let (_, list) = send(&app, Method::GET, "/api/users/u1/workouts", None).await;
    assert_eq!(
        list,
        json!([{
            "id": id,
            "name": "Legs B",
            "muscleGroup": "legs",
            "exercises": [{ "name": "Leg press", "sets": 4, "reps": 12 }],
        }])
    );
}

#[tokio::test]
async fn test_update_without_name_clears_it() {
    let (app, _db) = create_test_app();
    let id = create_workout(&app, json!({ "name": "Arms", "muscleGroup": "arms" })).await;

    send(
        &app,
        Method::PUT,
        &format!("/api/users/u1/workouts/{}", id),
        Some(json!({ "exercises": [] })),
    )
    .await;

    let (_, list) = send(&app, Method::GET, "/api/users/u1/workouts", None).await;
    assert_eq!(
        list,
        json!([{ "id": id, "muscleGroup": "arms", "exercises": [] }])
    );
}

#[tokio::test]
async fn test_update_missing_workout_fails() {
    let (app, _db) = create_test_app();

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/users/u1/workouts/missing",
        Some(json!({ "name": "X", "exercises": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to update workout" }));
}

#[tokio::test]
async fn test_schedule_workout() {
    let (app, _db) = create_test_app();
    let id = create_workout(&app, json!({ "name": "Cardio", "muscleGroup": "heart" })).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/users/u1/workouts/{}/schedule", id),
        Some(json!({ "scheduledDate": "2024-07-01T07:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Workout scheduled successfully" }));

    let (_, list) = send(&app, Method::GET, "/api/users/u1/workouts", None).await;
    assert_eq!(list[0]["scheduledDate"], "2024-07-01T07:00:00Z");
    assert_eq!(list[0]["name"], "Cardio");
}

#[tokio::test]
async fn test_delete_workout_is_unconditional() {
    let (app, _db) = create_test_app();
    let id = create_workout(&app, json!({ "name": "Core", "muscleGroup": "abs" })).await;

    for uri in [
        format!("/api/users/u1/workouts/{}", id),
        format!("/api/users/u1/workouts/{}", id),
        "/api/users/u1/workouts/never-existed".to_string(),
    ] {
        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Workout deleted successfully" }));
    }

    let (_, list) = send(&app, Method::GET, "/api/users/u1/workouts", None).await;
    assert_eq!(list, json!([]));
}

// ═══════════════════════════════════════════════════════════════════════════
// HISTORY
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_history_round_trip() {
    let (app, _db) = create_test_app();
    let id = create_workout(&app, json!({ "name": "Run", "muscleGroup": "legs" })).await;
    let uri = format!("/api/users/u1/workouts/{}/history", id);

    let (status, created) = send(
        &app,
        Method::POST,
        &uri,
        Some(json!({ "completedAt": "2024-07-01T08:00:00Z", "duration": 45 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["message"], "Workout history recorded successfully");

    let (status, history) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        history,
        json!([{
            "id": created["id"],
            "completedAt": "2024-07-01T08:00:00Z",
            "duration": 45,
        }])
    );
}

#[tokio::test]
async fn test_history_of_unknown_workout_is_empty() {
    let (app, _db) = create_test_app();

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/users/u1/workouts/unknown/history",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

// ═══════════════════════════════════════════════════════════════════════════
// PROGRESS BY MUSCLE GROUP
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_progress_for_unmatched_muscle_group_is_404() {
    let (app, _db) = create_test_app();
    create_workout(&app, json!({ "name": "Push", "muscleGroup": "chest" })).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/users/u1/workouts/progress?muscleGroup=legs",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "error": "No workouts found for the specified muscle group" })
    );
}

#[tokio::test]
async fn test_progress_for_workouts_without_entries_is_empty() {
    let (app, _db) = create_test_app();
    create_workout(&app, json!({ "name": "Legs", "muscleGroup": "legs" })).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/users/u1/workouts/progress?muscleGroup=legs",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_progress_is_flattened_in_workout_order() {
    let (app, _db) = create_test_app();
    let legs_a = create_workout(&app, json!({ "name": "Legs A", "muscleGroup": "legs" })).await;
    let chest = create_workout(&app, json!({ "name": "Chest", "muscleGroup": "chest" })).await;
    let legs_b = create_workout(&app, json!({ "name": "Legs B", "muscleGroup": "legs" })).await;

    let a1 = add_progress(
        &app,
        &legs_a,
        json!({ "date": "2024-01-01", "sets": 5, "reps": 5, "weight": 100.0 }),
    )
    .await;
    add_progress(
        &app,
        &chest,
        json!({ "date": "2024-01-02", "sets": 3, "reps": 8, "weight": 70.0 }),
    )
    .await;
    let b1 = add_progress(
        &app,
        &legs_b,
        json!({ "date": "2024-01-03", "sets": 4, "reps": 10, "weight": 60.0 }),
    )
    .await;
    let a2 = add_progress(
        &app,
        &legs_a,
        json!({ "date": "2024-01-08", "sets": 5, "reps": 5, "weight": 105.0 }),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/users/u1/workouts/progress?muscleGroup=legs",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["id"].as_str())
        .collect();
    assert_eq!(ids, [a1.as_str(), a2.as_str(), b1.as_str()]);
    assert_eq!(
        body[2],
        json!({ "id": b1, "date": "2024-01-03", "sets": 4, "reps": 10, "weight": 60.0 })
    );
}

#[tokio::test]
async fn test_progress_under_missing_workout_is_accepted() {
    let (app, db) = create_test_app();

    add_progress(&app, "no-such-workout", json!({ "date": "2024-02-02", "sets": 1 })).await;

    let chain = [("users", "u1"), ("workouts", "no-such-workout")];
    assert_eq!(db.count(&chain, "progress"), 1);
}

#[tokio::test]
async fn test_progress_query_without_muscle_group_fails() {
    let (app, _db) = create_test_app();
    create_workout(&app, json!({ "name": "Legs", "muscleGroup": "legs" })).await;

    let (status, body) = send(&app, Method::GET, "/api/users/u1/workouts/progress", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to retrieve workout progress" }));
}

// ═══════════════════════════════════════════════════════════════════════════
// PASS-THROUGH OF CLIENT VALUES
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_batched_exercises_are_stored_as_sent() {
    let (app, db) = create_test_app();
    let squat = json!({
        "name": "Squat",
        "sets": 5,
        "reps": "5-3-1",
        "notes": "slow",
        "restSeconds": 180,
        "tempo": [3, 1, 1],
    });

    let id = create_workout(
        &app,
        json!({ "name": "Legs", "muscleGroup": "legs", "exercises": [squat.clone(), { "name": "Lunge" }] }),
    )
    .await;

    let chain = [("users", "u1"), ("workouts", id.as_str())];
    let stored: Vec<Value> = db
        .documents(&chain, "exercises")
        .into_iter()
        .map(Value::Object)
        .collect();
    assert_eq!(stored, [squat, json!({ "name": "Lunge" })]);
}

#[tokio::test]
async fn test_non_object_exercise_item_fails() {
    let (app, _db) = create_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users/u1/workouts",
        Some(json!({ "name": "Odd", "muscleGroup": "legs", "exercises": [1, 2] })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to add workout and exercises" }));
}

#[tokio::test]
async fn test_inline_exercises_keep_unknown_fields() {
    let (app, _db) = create_test_app();
    let id = create_workout(&app, json!({ "name": "Legs", "muscleGroup": "legs" })).await;
    let exercises = json!([{ "name": "Squat", "notes": "slow", "restSeconds": 90 }]);

    send(
        &app,
        Method::PUT,
        &format!("/api/users/u1/workouts/{}", id),
        Some(json!({ "name": "Legs", "exercises": exercises.clone() })),
    )
    .await;

    let (_, list) = send(&app, Method::GET, "/api/users/u1/workouts", None).await;
    assert_eq!(list[0]["exercises"], exercises);
}

#[tokio::test]
async fn test_numeric_timestamps_round_trip() {
    let (app, _db) = create_test_app();
    let id = create_workout(&app, json!({ "name": "Run", "muscleGroup": "legs" })).await;

    send(
        &app,
        Method::POST,
        &format!("/api/users/u1/workouts/{}/schedule", id),
        Some(json!({ "scheduledDate": 1_719_817_200_000_u64 })),
    )
    .await;
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/users/u1/workouts/{}/history", id),
        Some(json!({ "completedAt": 1_700_000_000_000_u64, "duration": 45.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = send(&app, Method::GET, "/api/users/u1/workouts", None).await;
    assert_eq!(list[0]["scheduledDate"], json!(1_719_817_200_000_u64));

    let (_, history) = send(
        &app,
        Method::GET,
        &format!("/api/users/u1/workouts/{}/history", id),
        None,
    )
    .await;
    assert_eq!(history[0]["completedAt"], json!(1_700_000_000_000_u64));
    assert_eq!(history[0]["duration"], json!(45.5));
}
