// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store.
//!
//! Mirrors the Firestore behaviour the handlers rely on: documents are
//! addressed by collection path and id, `set` overwrites, `update` fails on a
//! missing document and only touches the masked fields, `delete` never fails
//! on a missing document and leaves subcollections alone, and batches above
//! [`MAX_BATCH_WRITES`] are rejected whole. Collections keep insertion order.

use crate::db::{
    collections, decode_document, new_document_id, DatabaseProvider, DbError, ID_FIELD,
    MAX_BATCH_WRITES,
};
use crate::models::{
    Exercise, ExerciseWorkout, HistoryEntry, ProfileUpdate, ProgressEntry, User, WeightEntry,
    Workout, WorkoutEntry, WorkoutSchedule, WorkoutUpdate,
};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

type Collection = Vec<(String, Map<String, Value>)>;

/// Memory-backed database. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    collections: Arc<DashMap<String, Collection>>,
}

fn check_id(id: &str) -> Result<&str, DbError> {
    if id.is_empty() || id.contains('/') {
        return Err(DbError::InvalidId(id.to_string()));
    }
    Ok(id)
}

/// Path of `collection` under a chain of `(collection, document)` pairs.
fn collection_path(chain: &[(&str, &str)], collection: &str) -> Result<String, DbError> {
    let mut path = String::new();
    for (parent, id) in chain {
        path.push_str(parent);
        path.push('/');
        path.push_str(check_id(id)?);
        path.push('/');
    }
    path.push_str(collection);
    Ok(path)
}

fn to_fields<T: Serialize>(doc: &T) -> Result<Map<String, Value>, DbError> {
    match serde_json::to_value(doc)? {
        Value::Object(fields) => Ok(fields),
        other => Err(DbError::Backend(format!(
            "Document must be an object, got {}",
            other
        ))),
    }
}

fn from_fields<T: DeserializeOwned>(id: &str, fields: &Map<String, Value>) -> Result<T, DbError> {
    let mut fields = fields.clone();
    fields.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    decode_document(fields)
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents directly inside a collection.
    pub fn count(&self, chain: &[(&str, &str)], collection: &str) -> usize {
        collection_path(chain, collection)
            .ok()
            .and_then(|path| self.collections.get(&path).map(|docs| docs.len()))
            .unwrap_or(0)
    }

    /// Stored fields of every document in a collection, in insertion order.
    pub fn documents(&self, chain: &[(&str, &str)], collection: &str) -> Vec<Map<String, Value>> {
        let Ok(path) = collection_path(chain, collection) else {
            return Vec::new();
        };
        let docs = self
            .collections
            .get(&path)
            .map(|docs| docs.iter().map(|(_, fields)| fields.clone()).collect())
            .unwrap_or_default();
        docs
    }

    fn get_doc<T: DeserializeOwned>(&self, path: &str, id: &str) -> Result<Option<T>, DbError> {
        check_id(id)?;
        let Some(docs) = self.collections.get(path) else {
            return Ok(None);
        };
        let doc = docs
            .iter()
            .find(|(doc_id, _)| doc_id == id)
            .map(|(doc_id, fields)| from_fields(doc_id, fields))
            .transpose();
        doc
    }

    fn set_doc<T: Serialize>(&self, path: &str, id: &str, doc: &T) -> Result<(), DbError> {
        check_id(id)?;
        let fields = to_fields(doc)?;
        let mut docs = self.collections.entry(path.to_string()).or_default();
        match docs.iter_mut().find(|(doc_id, _)| doc_id == id) {
            Some((_, existing)) => *existing = fields,
            None => docs.push((id.to_string(), fields)),
        }
        Ok(())
    }

    fn update_doc<T: Serialize>(
        &self,
        path: &str,
        id: &str,
        mask: &[&str],
        doc: &T,
    ) -> Result<(), DbError> {
        check_id(id)?;
        let mut fields = to_fields(doc)?;
        let missing = || DbError::NotFound(format!("{}/{}", path, id));

        let mut docs = self.collections.get_mut(path).ok_or_else(missing)?;
        let (_, existing) = docs
            .iter_mut()
            .find(|(doc_id, _)| doc_id == id)
            .ok_or_else(missing)?;

        for &field in mask {
            match fields.remove(field) {
                Some(value) => {
                    existing.insert(field.to_string(), value);
                }
                None => {
                    existing.remove(field);
                }
            }
        }
        Ok(())
    }

    fn add_doc<T: Serialize>(&self, path: &str, doc: &T) -> Result<String, DbError> {
        let id = new_document_id()?;
        self.set_doc(path, &id, doc)?;
        Ok(id)
    }

    fn delete_doc(&self, path: &str, id: &str) -> Result<(), DbError> {
        check_id(id)?;
        if let Some(mut docs) = self.collections.get_mut(path) {
            docs.retain(|(doc_id, _)| doc_id != id);
        }
        Ok(())
    }

    fn list_docs<T: DeserializeOwned>(
        &self,
        path: &str,
        field_eq: Option<(&str, &str)>,
    ) -> Result<Vec<T>, DbError> {
        let Some(docs) = self.collections.get(path) else {
            return Ok(Vec::new());
        };
        let matching = docs
            .iter()
            .filter(|(_, fields)| match field_eq {
                Some((field, value)) => fields.get(field).and_then(Value::as_str) == Some(value),
                None => true,
            })
            .map(|(id, fields)| from_fields(id, fields))
            .collect();
        matching
    }
}

#[async_trait]
impl DatabaseProvider for MemoryDb {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, DbError> {
        self.get_doc(collections::USERS, user_id)
    }

    async fn set_user(&self, user_id: &str, user: &User) -> Result<(), DbError> {
        self.set_doc(collections::USERS, user_id, user)
    }

    async fn update_profile(
        &self,
        user_id: &str,
        profile: &ProfileUpdate,
    ) -> Result<(), DbError> {
        self.update_doc(collections::USERS, user_id, &ProfileUpdate::FIELDS, profile)
    }

    async fn set_weight_progress(
        &self,
        user_id: &str,
        date: &str,
        entry: &WeightEntry,
    ) -> Result<(), DbError> {
        let path = collection_path(&[(collections::USERS, user_id)], collections::WEIGHT_PROGRESS)?;
        self.set_doc(&path, date, entry)
    }

    async fn list_weight_progress(&self, user_id: &str) -> Result<Vec<WeightEntry>, DbError> {
        let path = collection_path(&[(collections::USERS, user_id)], collections::WEIGHT_PROGRESS)?;
        self.list_docs(&path, None)
    }

    async fn delete_weight_progress(
        &self,
        user_id: &str,
        progress_id: &str,
    ) -> Result<(), DbError> {
        let path = collection_path(&[(collections::USERS, user_id)], collections::WEIGHT_PROGRESS)?;
        self.delete_doc(&path, progress_id)
    }

    async fn add_exercise(&self, user_id: &str, exercise: &Exercise) -> Result<String, DbError> {
        let path = collection_path(&[(collections::USERS, user_id)], collections::EXERCISES)?;
        self.add_doc(&path, exercise)
    }

    async fn list_exercises(
        &self,
        user_id: &str,
        muscle_group: Option<&str>,
    ) -> Result<Vec<Exercise>, DbError> {
        let path = collection_path(&[(collections::USERS, user_id)], collections::EXERCISES)?;
        self.list_docs(&path, muscle_group.map(|group| ("muscleGroup", group)))
    }

    async fn update_exercise(
        &self,
        user_id: &str,
        exercise_id: &str,
        exercise: &Exercise,
    ) -> Result<(), DbError> {
        let path = collection_path(&[(collections::USERS, user_id)], collections::EXERCISES)?;
        self.update_doc(&path, exercise_id, &Exercise::FIELDS, exercise)
    }

    async fn delete_exercise(&self, user_id: &str, exercise_id: &str) -> Result<(), DbError> {
        let path = collection_path(&[(collections::USERS, user_id)], collections::EXERCISES)?;
        self.delete_doc(&path, exercise_id)
    }

    async fn add_exercise_workout(
        &self,
        user_id: &str,
        exercise_id: &str,
        workout: &ExerciseWorkout,
    ) -> Result<String, DbError> {
        let path = collection_path(
            &[
                (collections::USERS, user_id),
                (collections::EXERCISES, exercise_id),
            ],
            collections::WORKOUTS,
        )?;
        self.add_doc(&path, workout)
    }

    async fn add_workout(&self, user_id: &str, workout: &Workout) -> Result<String, DbError> {
        let path = collection_path(&[(collections::USERS, user_id)], collections::WORKOUTS)?;
        self.add_doc(&path, workout)
    }

    async fn add_workout_entries(
        &self,
        user_id: &str,
        workout_id: &str,
        entries: &[WorkoutEntry],
    ) -> Result<(), DbError> {
        if entries.len() > MAX_BATCH_WRITES {
            return Err(DbError::BatchTooLarge(entries.len()));
        }

        let path = collection_path(
            &[
                (collections::USERS, user_id),
                (collections::WORKOUTS, workout_id),
            ],
            collections::EXERCISES,
        )?;

        // Prepare everything before taking the shard lock so a failure
        // leaves the collection untouched.
        let mut staged = Vec::with_capacity(entries.len());
        for entry in entries {
            staged.push((new_document_id()?, to_fields(entry)?));
        }

        self.collections.entry(path).or_default().extend(staged);
        Ok(())
    }

    async fn list_workouts(
        &self,
        user_id: &str,
        muscle_group: Option<&str>,
    ) -> Result<Vec<Workout>, DbError> {
        let path = collection_path(&[(collections::USERS, user_id)], collections::WORKOUTS)?;
        self.list_docs(&path, muscle_group.map(|group| ("muscleGroup", group)))
    }

    async fn update_workout(
        &self,
        user_id: &str,
        workout_id: &str,
        update: &WorkoutUpdate,
    ) -> Result<(), DbError> {
        let path = collection_path(&[(collections::USERS, user_id)], collections::WORKOUTS)?;
        self.update_doc(&path, workout_id, &WorkoutUpdate::FIELDS, update)
    }

    async fn schedule_workout(
        &self,
        user_id: &str,
        workout_id: &str,
        schedule: &WorkoutSchedule,
    ) -> Result<(), DbError> {
        let path = collection_path(&[(collections::USERS, user_id)], collections::WORKOUTS)?;
        self.update_doc(&path, workout_id, &WorkoutSchedule::FIELDS, schedule)
    }

    async fn delete_workout(&self, user_id: &str, workout_id: &str) -> Result<(), DbError> {
        let path = collection_path(&[(collections::USERS, user_id)], collections::WORKOUTS)?;
        self.delete_doc(&path, workout_id)
    }

    async fn add_history(
        &self,
        user_id: &str,
        workout_id: &str,
        entry: &HistoryEntry,
    ) -> Result<String, DbError> {
        let path = collection_path(
            &[
                (collections::USERS, user_id),
                (collections::WORKOUTS, workout_id),
            ],
            collections::HISTORY,
        )?;
        self.add_doc(&path, entry)
    }

    async fn list_history(
        &self,
        user_id: &str,
        workout_id: &str,
    ) -> Result<Vec<HistoryEntry>, DbError> {
        let path = collection_path(
            &[
                (collections::USERS, user_id),
                (collections::WORKOUTS, workout_id),
            ],
            collections::HISTORY,
        )?;
        self.list_docs(&path, None)
    }

    async fn add_workout_progress(
        &self,
        user_id: &str,
        workout_id: &str,
        entry: &ProgressEntry,
    ) -> Result<String, DbError> {
        let path = collection_path(
            &[
                (collections::USERS, user_id),
                (collections::WORKOUTS, workout_id),
            ],
            collections::PROGRESS,
        )?;
        self.add_doc(&path, entry)
    }

    async fn list_workout_progress(
        &self,
        user_id: &str,
        workout_id: &str,
    ) -> Result<Vec<ProgressEntry>, DbError> {
        let path = collection_path(
            &[
                (collections::USERS, user_id),
                (collections::WORKOUTS, workout_id),
            ],
            collections::PROGRESS,
        )?;
        self.list_docs(&path, None)
    }
}
