//! Parameter checks shared by the management and lookup paths.

use crate::error::{Error, Result};

/// Which checks [`check_parameter`] applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterCheck {
    /// Reject values that are empty after trimming.
    pub non_empty: bool,
    /// Reject values containing `,`.
    pub no_commas: bool,
    /// Reject values longer than this many characters. `0` disables the check.
    pub max_len: usize,
}

impl ParameterCheck {
    pub const fn required() -> Self {
        Self {
            non_empty: true,
            no_commas: false,
            max_len: 0,
        }
    }

    pub const fn with_max_len(self, max_len: usize) -> Self {
        Self { max_len, ..self }
    }

    pub const fn without_commas(self) -> Self {
        Self {
            no_commas: true,
            ..self
        }
    }
}

/// Trims `value` and applies `check`, naming `name` in the error.
pub fn check_parameter<'a>(value: &'a str, check: ParameterCheck, name: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if check.non_empty && trimmed.is_empty() {
        return Err(Error::InvalidInput(format!(
            "the parameter '{}' must not be empty",
            name
        )));
    }
    if check.max_len > 0 && trimmed.chars().count() > check.max_len {
        return Err(Error::InvalidInput(format!(
            "the parameter '{}' is too long: it must not exceed {} chars in length",
            name, check.max_len
        )));
    }
    if check.no_commas && trimmed.contains(',') {
        return Err(Error::InvalidInput(format!(
            "the parameter '{}' must not contain commas",
            name
        )));
    }
    Ok(trimmed)
}
