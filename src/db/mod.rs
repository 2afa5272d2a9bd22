// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Handlers talk to storage through [`DatabaseProvider`]. Two backends
//! implement it: [`FirestoreDb`] for production (and the Firestore emulator),
//! and [`MemoryDb`] for local development and offline tests.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::models::{
    Exercise, ExerciseWorkout, HistoryEntry, ProfileUpdate, ProgressEntry, User, WeightEntry,
    Workout, WorkoutEntry, WorkoutSchedule, WorkoutUpdate,
};
use async_trait::async_trait;
use ring::rand::{SecureRandom, SystemRandom};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Keyed by `YYYY-MM-DD`, at most one entry per day
    pub const WEIGHT_PROGRESS: &str = "weight-progress";
    pub const EXERCISES: &str = "exercises";
    pub const WORKOUTS: &str = "workouts";
    pub const HISTORY: &str = "history";
    pub const PROGRESS: &str = "progress";
}

/// Firestore rejects batches and transactions above this many writes.
pub const MAX_BATCH_WRITES: usize = 500;

const AUTO_ID_LEN: usize = 20;
const AUTO_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Database errors
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database not connected (offline mode)")]
    Offline,

    #[error("Invalid document id: {0:?}")]
    InvalidId(String),

    #[error("No document to update: {0}")]
    NotFound(String),

    #[error("Batch of {0} writes exceeds the limit of {MAX_BATCH_WRITES}")]
    BatchTooLarge(usize),

    #[error("Random source unavailable")]
    Random,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Firestore error: {0}")]
    Backend(String),
}

/// Generate a document id the way Firestore client libraries do:
/// 20 characters drawn uniformly from `[A-Za-z0-9]`.
pub fn new_document_id() -> Result<String, DbError> {
    // Largest multiple of the alphabet size that fits in a byte; bytes at or
    // above it are rejected so every character is equally likely.
    let max_multiple = (256 / AUTO_ID_ALPHABET.len()) * AUTO_ID_ALPHABET.len();
    let rng = SystemRandom::new();
    let mut id = String::with_capacity(AUTO_ID_LEN);
    let mut buf = [0u8; 40];

    while id.len() < AUTO_ID_LEN {
        rng.fill(&mut buf).map_err(|_| DbError::Random)?;
        for &b in buf.iter().filter(|&&b| (b as usize) < max_multiple) {
            if id.len() == AUTO_ID_LEN {
                break;
            }
            id.push(AUTO_ID_ALPHABET[b as usize % AUTO_ID_ALPHABET.len()] as char);
        }
    }

    Ok(id)
}

/// Field a document's id is read back under. The models alias `id` to it.
pub(crate) const ID_FIELD: &str = "_firestore_id";

/// Prefix of the metadata fields the Firestore client adds on read.
const METADATA_PREFIX: &str = "_firestore_";

/// Decode stored fields into a model. Store metadata other than the
/// document id is dropped; every other field reaches the model.
pub(crate) fn decode_document<T: DeserializeOwned>(
    mut fields: Map<String, Value>,
) -> Result<T, DbError> {
    fields.retain(|key, _| key == ID_FIELD || !key.starts_with(METADATA_PREFIX));
    Ok(serde_json::from_value(Value::Object(fields))?)
}

/// Storage operations used by the HTTP handlers.
///
/// Every method is a single database call, except
/// [`add_workout_entries`](Self::add_workout_entries) which commits one
/// atomic batch.
#[async_trait]
pub trait DatabaseProvider: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    /// Get a user profile by id.
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, DbError>;

    /// Create or overwrite a user profile.
    async fn set_user(&self, user_id: &str, user: &User) -> Result<(), DbError>;

    /// Replace `height` and `currentWeight` on an existing user.
    async fn update_profile(&self, user_id: &str, profile: &ProfileUpdate)
        -> Result<(), DbError>;

    // ─── Weight Progress ─────────────────────────────────────────

    /// Write the weight entry for a day, overwriting any earlier one.
    async fn set_weight_progress(
        &self,
        user_id: &str,
        date: &str,
        entry: &WeightEntry,
    ) -> Result<(), DbError>;

    async fn list_weight_progress(&self, user_id: &str) -> Result<Vec<WeightEntry>, DbError>;

    async fn delete_weight_progress(&self, user_id: &str, progress_id: &str)
        -> Result<(), DbError>;

    // ─── Exercises ───────────────────────────────────────────────

    /// Store a new exercise and return its generated id.
    async fn add_exercise(&self, user_id: &str, exercise: &Exercise) -> Result<String, DbError>;

    /// List exercises, optionally only those for one muscle group.
    async fn list_exercises(
        &self,
        user_id: &str,
        muscle_group: Option<&str>,
    ) -> Result<Vec<Exercise>, DbError>;

    async fn update_exercise(
        &self,
        user_id: &str,
        exercise_id: &str,
        exercise: &Exercise,
    ) -> Result<(), DbError>;

    async fn delete_exercise(&self, user_id: &str, exercise_id: &str) -> Result<(), DbError>;

    /// Store a workout nested under an exercise and return its generated id.
    async fn add_exercise_workout(
        &self,
        user_id: &str,
        exercise_id: &str,
        workout: &ExerciseWorkout,
    ) -> Result<String, DbError>;

    // ─── Workouts ────────────────────────────────────────────────

    /// Store a new workout and return its generated id.
    async fn add_workout(&self, user_id: &str, workout: &Workout) -> Result<String, DbError>;

    /// Write each entry as a child document of the workout, all or nothing.
    async fn add_workout_entries(
        &self,
        user_id: &str,
        workout_id: &str,
        entries: &[WorkoutEntry],
    ) -> Result<(), DbError>;

    /// List workouts, optionally only those for one muscle group.
    async fn list_workouts(
        &self,
        user_id: &str,
        muscle_group: Option<&str>,
    ) -> Result<Vec<Workout>, DbError>;

    /// Replace `exercises` and `name` on an existing workout.
    async fn update_workout(
        &self,
        user_id: &str,
        workout_id: &str,
        update: &WorkoutUpdate,
    ) -> Result<(), DbError>;

    /// Replace `scheduledDate` on an existing workout.
    async fn schedule_workout(
        &self,
        user_id: &str,
        workout_id: &str,
        schedule: &WorkoutSchedule,
    ) -> Result<(), DbError>;

    async fn delete_workout(&self, user_id: &str, workout_id: &str) -> Result<(), DbError>;

    // ─── Workout History & Progress ──────────────────────────────

    async fn add_history(
        &self,
        user_id: &str,
        workout_id: &str,
        entry: &HistoryEntry,
    ) -> Result<String, DbError>;

    async fn list_history(&self, user_id: &str, workout_id: &str)
        -> Result<Vec<HistoryEntry>, DbError>;

    async fn add_workout_progress(
        &self,
        user_id: &str,
        workout_id: &str,
        entry: &ProgressEntry,
    ) -> Result<String, DbError>;

    async fn list_workout_progress(
        &self,
        user_id: &str,
        workout_id: &str,
    ) -> Result<Vec<ProgressEntry>, DbError>;
}
