// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout models for storage and API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Workout stored at `users/{userId}/workouts/{workoutId}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    /// Document ID (filled on read, never stored as a field)
    #[serde(alias = "_firestore_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    /// Matched as a string by the progress-by-muscle-group query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<Value>,
    /// Inline exercise list, written by workout updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Value>,
    /// Timestamp as sent by the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<Value>,
    #[serde(flatten)]
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    pub extra: Map<String, Value>,
}

/// One exercise inside a new workout, written as a child document of
/// `workouts/{workoutId}/exercises` exactly as the client sent it.
pub type WorkoutEntry = Map<String, Value>;

/// Fields replaced by a workout update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
}

impl WorkoutUpdate {
    pub const FIELDS: [&'static str; 2] = ["exercises", "name"];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSchedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<Value>,
}

impl WorkoutSchedule {
    pub const FIELDS: [&'static str; 1] = ["scheduledDate"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_fields_are_not_written() {
        let workout = Workout {
            name: Some("Push day".into()),
            muscle_group: Some("chest".into()),
            ..Default::default()
        };

        let json = serde_json::to_value(&workout).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "name": "Push day", "muscleGroup": "chest" })
        );
    }

    #[test]
    fn test_document_id_alias_is_read() {
        let workout: Workout = serde_json::from_value(serde_json::json!({
            "_firestore_id": "abc123",
            "name": "Legs",
            "scheduledDate": "2024-05-01",
        }))
        .unwrap();

        assert_eq!(workout.id.as_deref(), Some("abc123"));
        assert_eq!(workout.scheduled_date, Some("2024-05-01".into()));
        assert_eq!(
            serde_json::to_value(&workout).unwrap()["id"],
            serde_json::json!("abc123")
        );
    }
}
