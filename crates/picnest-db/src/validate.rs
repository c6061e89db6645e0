use argon2::PasswordHash;
use chrono::{DateTime, Datelike, Utc};
use serde::de::DeserializeOwned;

use crate::clock::normalize;
use crate::error::{Result, StoreError};
use crate::schema::Schema;

/// Required text: must not be blank and must fit the column.
pub(crate) fn text(schema: &Schema, table: &str, column: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(
            format!("{}.{}", table, column),
            "is required",
        ));
    }
    within_limit(schema, table, column, value)
}

pub(crate) fn optional_text(
    schema: &Schema,
    table: &str,
    column: &str,
    value: Option<&str>,
) -> Result<()> {
    match value {
        Some(v) => within_limit(schema, table, column, v),
        None => Ok(()),
    }
}

/// Lengths are counted in chars, matching SQLite's `length()` on TEXT.
fn within_limit(schema: &Schema, table: &str, column: &str, value: &str) -> Result<()> {
    if let Some(max) = schema.max_len(table, column) {
        let len = value.chars().count();
        if len > max {
            return Err(StoreError::validation(
                format!("{}.{}", table, column),
                format!("{} characters exceeds the limit of {}", len, max),
            ));
        }
    }
    Ok(())
}

/// Passwords are stored hashed. Anything that is not a PHC string is
/// treated as plaintext and refused.
pub(crate) fn password_hash(schema: &Schema, value: &str) -> Result<()> {
    text(schema, "user", "password", value)?;
    PasswordHash::new(value)
        .map(|_| ())
        .map_err(|_| StoreError::validation("user.password", "must be a PHC-format hash"))
}

/// Caller-supplied timestamps must keep the four-digit-year text form the
/// store orders by. Returns the value truncated to stored precision.
pub(crate) fn timestamp(field: &str, ts: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if !(0..=9999).contains(&ts.year()) {
        return Err(StoreError::validation(
            field,
            format!("year {} is outside 0000-9999", ts.year()),
        ));
    }
    Ok(normalize(ts))
}

/// Decode a JSON patch. Patch types reject unknown keys, so naming an
/// immutable column (a foreign key, a timestamp) fails here.
pub fn parse_patch<T: DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| StoreError::validation("patch", e.to_string()))
}
