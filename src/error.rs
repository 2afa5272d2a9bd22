// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Callers only ever see two kinds of failure: a missing resource (404) or a
//! failed operation (500). A request that cannot be read counts as a failed
//! operation. The 500 body carries a fixed message per endpoint; the
//! underlying error is logged, never returned.

use crate::db::DbError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{context}: {source}")]
    Database {
        context: &'static str,
        #[source]
        source: DbError,
    },

    #[error("{context}: {source}")]
    Request {
        context: &'static str,
        #[source]
        source: RequestRejection,
    },
}

/// Body or query string the extractors could not read.
#[derive(Debug, thiserror::Error)]
pub enum RequestRejection {
    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Query(#[from] QueryRejection),
}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database { .. } | AppError::Request { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::NotFound(msg) => msg,
            AppError::Database { context, source } => {
                tracing::error!(error = %source, context, "Database error");
                context
            }
            AppError::Request { context, source } => {
                tracing::warn!(error = %source, context, "Unreadable request");
                context
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Attach the endpoint's fixed failure message to a database or extractor
/// result.
pub trait ResultExt<T> {
    fn or_fail(self, context: &'static str) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, DbError> {
    fn or_fail(self, context: &'static str) -> Result<T> {
        self.map_err(|source| AppError::Database { context, source })
    }
}

impl<T> ResultExt<T> for std::result::Result<T, JsonRejection> {
    fn or_fail(self, context: &'static str) -> Result<T> {
        self.map_err(|rejection| AppError::Request {
            context,
            source: rejection.into(),
        })
    }
}

impl<T> ResultExt<T> for std::result::Result<T, QueryRejection> {
    fn or_fail(self, context: &'static str) -> Result<T> {
        self.map_err(|rejection| AppError::Request {
            context,
            source: rejection.into(),
        })
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
