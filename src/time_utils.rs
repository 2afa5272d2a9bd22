// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Utc};

/// Format a UTC timestamp as a calendar date key (`YYYY-MM-DD`).
pub fn date_key(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Today's date key in UTC.
pub fn today_key() -> String {
    date_key(Utc::now())
}
