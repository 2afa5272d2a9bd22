// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fittrack: document-backed API for a fitness-tracking app
//!
//! This crate provides the backend HTTP API that stores users, exercises,
//! workouts and progress records in Firestore.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod time_utils;

use config::Config;
use db::DatabaseProvider;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn DatabaseProvider>,
}
