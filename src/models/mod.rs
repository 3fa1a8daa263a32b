// src/models/mod.rs

pub mod task;
pub mod project;

use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// Keeps "field absent" (`None`) apart from "field sent as null" (`Some(None)`)
/// in partial update bodies. Pair it with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// Trims the value and checks the character count against max.
// Required fields must also be non-empty after trimming.
pub(crate) fn bounded_text(value: &str, field: &str, required: bool, max: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    if required && trimmed.is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    if trimmed.chars().count() > max {
        return Err(AppError::validation(format!(
            "{} cannot be longer than {} characters",
            field, max
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_before_checking() {
        assert_eq!(bounded_text("  hello ", "Title", true, 5).unwrap(), "hello");
        assert!(bounded_text("   ", "Title", true, 5).is_err());
        assert_eq!(bounded_text("   ", "Description", false, 5).unwrap(), "");
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert!(bounded_text("ééééé", "Title", true, 5).is_ok());
        assert!(bounded_text("éééééé", "Title", true, 5).is_err());
    }
}
