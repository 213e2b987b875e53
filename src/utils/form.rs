use std::collections::HashMap;

use crate::errors::{Error, Result};

/// Untyped form submission, keyed by input name.
pub type FormFields = HashMap<String, String>;

pub fn required_string(fields: &FormFields, key: &str) -> Result<String> {
    match fields.get(key).map(|value| value.trim()) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(Error::MissingField(key.to_string())),
    }
}

/// Blank and missing both become `None`, never `Some("")`.
pub fn optional_string(fields: &FormFields, key: &str) -> Option<String> {
    fields
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn parse_id(fields: &FormFields) -> Result<i64> {
    fields
        .get("id")
        .and_then(|value| value.trim().parse::<i64>().ok())
        .ok_or(Error::InvalidGroupId)
}
