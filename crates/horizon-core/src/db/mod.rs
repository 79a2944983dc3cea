//! Database operations and SQLite management for goals and plan items.
//!
//! This module provides low-level database operations for the Horizon
//! tracking system. It handles SQLite connections, schema management, and
//! specialized query interfaces for goals, plan items, the item tree and
//! date-window views.
//!
//! Every read-modify-write unit (status toggles, cascade deletes, occurrence
//! materialization) runs inside a single transaction, so concurrent readers
//! observe either the full before state or the full after state.

use std::path::Path;

use jiff::{civil, Timestamp};
use rusqlite::{types::Type, Connection};

use crate::error::{DatabaseResultExt, Result};

pub mod goal_queries;
pub mod item_queries;
pub mod migrations;
pub mod tree;
pub mod window_queries;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}

/// Reads a required timestamp column stored as ISO-8601 TEXT.
pub(crate) fn timestamp_col(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Timestamp> {
    let text: String = row.get(idx)?;
    text.parse::<Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads an optional timestamp column stored as ISO-8601 TEXT.
pub(crate) fn opt_timestamp_col(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<Option<Timestamp>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| {
        t.parse::<Timestamp>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

/// Reads a required calendar-date column stored as `YYYY-MM-DD` TEXT.
pub(crate) fn date_col(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<civil::Date> {
    let text: String = row.get(idx)?;
    text.parse::<civil::Date>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads an optional calendar-date column stored as `YYYY-MM-DD` TEXT.
pub(crate) fn opt_date_col(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<Option<civil::Date>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| {
        t.parse::<civil::Date>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

/// Parses an enum-like TEXT column via its `FromStr` implementation.
pub(crate) fn parsed_col<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let text: String = row.get(idx)?;
    text.parse::<T>().map_err(|reason| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, reason)),
        )
    })
}
