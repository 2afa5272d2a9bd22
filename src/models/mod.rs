// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.
//!
//! Field names are camelCase both on the wire and in Firestore. Fields left
//! out of a request body are not written at all.

pub mod exercise;
pub mod progress;
pub mod user;
pub mod workout;

pub use exercise::{Exercise, ExerciseWorkout};
pub use progress::{HistoryEntry, ProgressEntry, WeightEntry};
pub use user::{ProfileUpdate, User};
pub use workout::{Workout, WorkoutEntry, WorkoutSchedule, WorkoutUpdate};
