// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Everything lives under `users/{userId}`:
//! - `weight-progress` (one document per day)
//! - `exercises`, and `exercises/{id}/workouts`
//! - `workouts`, with `exercises`, `history` and `progress` subcollections

use crate::db::{
    collections, decode_document, new_document_id, DatabaseProvider, DbError, MAX_BATCH_WRITES,
};
use crate::models::{
    Exercise, ExerciseWorkout, HistoryEntry, ProfileUpdate, ProgressEntry, User, WeightEntry,
    Workout, WorkoutEntry, WorkoutSchedule, WorkoutUpdate,
};
use async_trait::async_trait;
use firestore::FirestoreWritePrecondition;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

fn backend(err: impl std::fmt::Display) -> DbError {
    DbError::Backend(err.to_string())
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, DbError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| DbError::Backend(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, DbError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // The emulator accepts any bearer token; an unsigned JWT keeps
        // gcloud-sdk from looking for local credentials.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJlbXVsYXRvciJ9."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| DbError::Backend(format!("Failed to connect to Firestore Emulator: {}", e)))?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, DbError> {
        self.client.as_ref().ok_or(DbError::Offline)
    }

    // ─── Path Helpers ──────────────────────────────────────────────

    /// Full parent path for a chain of `(collection, document)` pairs.
    /// An empty chain is the database root.
    fn parent_path(&self, chain: &[(&str, &str)]) -> Result<String, DbError> {
        let client = self.get_client()?;
        let mut links = chain.iter();

        let Some((collection, id)) = links.next() else {
            return Ok(client.get_documents_path().clone());
        };

        let mut path = client.parent_path(collection, *id).map_err(backend)?;
        for (collection, id) in links {
            path = path.at(collection, *id).map_err(backend)?;
        }

        Ok(AsRef::<str>::as_ref(&path).to_string())
    }

    fn user_path(&self, user_id: &str) -> Result<String, DbError> {
        self.parent_path(&[(collections::USERS, user_id)])
    }

    fn workout_path(&self, user_id: &str, workout_id: &str) -> Result<String, DbError> {
        self.parent_path(&[
            (collections::USERS, user_id),
            (collections::WORKOUTS, workout_id),
        ])
    }

    // ─── Document Helpers ──────────────────────────────────────────

    // Documents are read as raw field maps so values of any type, and
    // fields the models do not name, come back unchanged.

    async fn get_doc<T>(&self, parent: &str, collection: &str, id: &str) -> Result<Option<T>, DbError>
    where
        T: DeserializeOwned + Send,
    {
        let fields: Option<Map<String, Value>> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .parent(parent)
            .obj()
            .one(id)
            .await
            .map_err(backend)?;

        fields.map(decode_document::<T>).transpose()
    }

    /// Unconditional write; replaces the whole document.
    async fn set_doc<T>(&self, parent: &str, collection: &str, id: &str, doc: &T) -> Result<(), DbError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .parent(parent)
            .object(doc)
            .execute()
            .await
            .map_err(backend)?;
        Ok(())
    }

    /// Overwrite only `fields`; fails when the document does not exist.
    async fn update_doc<T>(
        &self,
        parent: &str,
        collection: &str,
        id: &str,
        fields: &[&str],
        doc: &T,
    ) -> Result<(), DbError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(fields.iter().copied())
            .in_col(collection)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(id)
            .parent(parent)
            .object(doc)
            .execute()
            .await
            .map_err(backend)?;
        Ok(())
    }

    /// Write under a freshly generated document ID and return it.
    async fn add_doc<T>(&self, parent: &str, collection: &str, doc: &T) -> Result<String, DbError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        let id = new_document_id()?;
        self.set_doc(parent, collection, &id, doc).await?;
        Ok(id)
    }

    async fn delete_doc(&self, parent: &str, collection: &str, id: &str) -> Result<(), DbError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(id)
            .parent(parent)
            .execute()
            .await
            .map_err(backend)?;
        Ok(())
    }

    /// All documents of a collection, optionally where `field == value`.
    async fn list_docs<T>(
        &self,
        parent: &str,
        collection: &str,
        field_eq: Option<(&str, &str)>,
    ) -> Result<Vec<T>, DbError>
    where
        T: DeserializeOwned + Send,
    {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collection)
            .parent(parent);

        let query = match field_eq {
            Some((field, value)) => query.filter(|q| q.field(field).eq(value)),
            None => query,
        };

        let docs: Vec<Map<String, Value>> = query.obj().query().await.map_err(backend)?;
        docs.into_iter().map(decode_document::<T>).collect()
    }
}

#[async_trait]
impl DatabaseProvider for FirestoreDb {
    // ─── User Operations ─────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, DbError> {
        let root = self.parent_path(&[])?;
        self.get_doc(&root, collections::USERS, user_id).await
    }

    async fn set_user(&self, user_id: &str, user: &User) -> Result<(), DbError> {
        let root = self.parent_path(&[])?;
        self.set_doc(&root, collections::USERS, user_id, user).await
    }

    async fn update_profile(
        &self,
        user_id: &str,
        profile: &ProfileUpdate,
    ) -> Result<(), DbError> {
        let root = self.parent_path(&[])?;
        self.update_doc(
            &root,
            collections::USERS,
            user_id,
            &ProfileUpdate::FIELDS,
            profile,
        )
        .await
    }

    // ─── Weight Progress Operations ──────────────────────────────

    async fn set_weight_progress(
        &self,
        user_id: &str,
        date: &str,
        entry: &WeightEntry,
    ) -> Result<(), DbError> {
        let parent = self.user_path(user_id)?;
        self.set_doc(&parent, collections::WEIGHT_PROGRESS, date, entry)
            .await
    }

    async fn list_weight_progress(&self, user_id: &str) -> Result<Vec<WeightEntry>, DbError> {
        let parent = self.user_path(user_id)?;
        self.list_docs(&parent, collections::WEIGHT_PROGRESS, None)
            .await
    }

    async fn delete_weight_progress(
        &self,
        user_id: &str,
        progress_id: &str,
    ) -> Result<(), DbError> {
        let parent = self.user_path(user_id)?;
        self.delete_doc(&parent, collections::WEIGHT_PROGRESS, progress_id)
            .await
    }

    // ─── Exercise Operations ─────────────────────────────────────

    async fn add_exercise(&self, user_id: &str, exercise: &Exercise) -> Result<String, DbError> {
        let parent = self.user_path(user_id)?;
        self.add_doc(&parent, collections::EXERCISES, exercise).await
    }

    async fn list_exercises(
        &self,
        user_id: &str,
        muscle_group: Option<&str>,
    ) -> Result<Vec<Exercise>, DbError> {
        let parent = self.user_path(user_id)?;
        let filter = muscle_group.map(|group| ("muscleGroup", group));
        self.list_docs(&parent, collections::EXERCISES, filter).await
    }

    async fn update_exercise(
        &self,
        user_id: &str,
        exercise_id: &str,
        exercise: &Exercise,
    ) -> Result<(), DbError> {
        let parent = self.user_path(user_id)?;
        self.update_doc(
            &parent,
            collections::EXERCISES,
            exercise_id,
            &Exercise::FIELDS,
            exercise,
        )
        .await
    }

    async fn delete_exercise(&self, user_id: &str, exercise_id: &str) -> Result<(), DbError> {
        let parent = self.user_path(user_id)?;
        self.delete_doc(&parent, collections::EXERCISES, exercise_id)
            .await
    }

    async fn add_exercise_workout(
        &self,
        user_id: &str,
        exercise_id: &str,
        workout: &ExerciseWorkout,
    ) -> Result<String, DbError> {
        let parent = self.parent_path(&[
            (collections::USERS, user_id),
            (collections::EXERCISES, exercise_id),
        ])?;
        self.add_doc(&parent, collections::WORKOUTS, workout).await
    }

    // ─── Workout Operations ──────────────────────────────────────

    async fn add_workout(&self, user_id: &str, workout: &Workout) -> Result<String, DbError> {
        let parent = self.user_path(user_id)?;
        self.add_doc(&parent, collections::WORKOUTS, workout).await
    }

    /// Commits all entries in a single transaction, so either every child
    /// document is written or none is.
    ///
    /// The transaction only writes, so it commits like a write batch with
    /// one extra round trip for `begin_transaction`.
    async fn add_workout_entries(
        &self,
        user_id: &str,
        workout_id: &str,
        entries: &[WorkoutEntry],
    ) -> Result<(), DbError> {
        if entries.len() > MAX_BATCH_WRITES {
            return Err(DbError::BatchTooLarge(entries.len()));
        }

        let client = self.get_client()?;
        let parent = self.workout_path(user_id, workout_id)?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| DbError::Backend(format!("Failed to begin transaction: {}", e)))?;

        for entry in entries {
            let entry_id = new_document_id()?;
            client
                .fluent()
                .update()
                .in_col(collections::EXERCISES)
                .document_id(&entry_id)
                .parent(&parent)
                .object(entry)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    DbError::Backend(format!("Failed to add exercise to transaction: {}", e))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| DbError::Backend(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(
            user_id,
            workout_id,
            count = entries.len(),
            "Workout exercises committed"
        );

        Ok(())
    }

    async fn list_workouts(
        &self,
        user_id: &str,
        muscle_group: Option<&str>,
    ) -> Result<Vec<Workout>, DbError> {
        let parent = self.user_path(user_id)?;
        let filter = muscle_group.map(|group| ("muscleGroup", group));
        self.list_docs(&parent, collections::WORKOUTS, filter).await
    }

    async fn update_workout(
        &self,
        user_id: &str,
        workout_id: &str,
        update: &WorkoutUpdate,
    ) -> Result<(), DbError> {
        let parent = self.user_path(user_id)?;
        self.update_doc(
            &parent,
            collections::WORKOUTS,
            workout_id,
            &WorkoutUpdate::FIELDS,
            update,
        )
        .await
    }

    async fn schedule_workout(
        &self,
        user_id: &str,
        workout_id: &str,
        schedule: &WorkoutSchedule,
    ) -> Result<(), DbError> {
        let parent = self.user_path(user_id)?;
        self.update_doc(
            &parent,
            collections::WORKOUTS,
            workout_id,
            &WorkoutSchedule::FIELDS,
            schedule,
        )
        .await
    }

    async fn delete_workout(&self, user_id: &str, workout_id: &str) -> Result<(), DbError> {
        let parent = self.user_path(user_id)?;
        self.delete_doc(&parent, collections::WORKOUTS, workout_id)
            .await
    }

    // ─── History & Progress Operations ───────────────────────────

    async fn add_history(
        &self,
        user_id: &str,
        workout_id: &str,
        entry: &HistoryEntry,
    ) -> Result<String, DbError> {
        let parent = self.workout_path(user_id, workout_id)?;
        self.add_doc(&parent, collections::HISTORY, entry).await
    }

    async fn list_history(
        &self,
        user_id: &str,
        workout_id: &str,
    ) -> Result<Vec<HistoryEntry>, DbError> {
        let parent = self.workout_path(user_id, workout_id)?;
        self.list_docs(&parent, collections::HISTORY, None).await
    }

    async fn add_workout_progress(
        &self,
        user_id: &str,
        workout_id: &str,
        entry: &ProgressEntry,
    ) -> Result<String, DbError> {
        let parent = self.workout_path(user_id, workout_id)?;
        self.add_doc(&parent, collections::PROGRESS, entry).await
    }

    async fn list_workout_progress(
        &self,
        user_id: &str,
        workout_id: &str,
    ) -> Result<Vec<ProgressEntry>, DbError> {
        let parent = self.workout_path(user_id, workout_id)?;
        self.list_docs(&parent, collections::PROGRESS, None).await
    }
}
