//! Culture identifiers and their fallback chain.
//!
//! A culture is a `-` separated tag such as `fr-FR` or `zh-Hant-TW`. Its
//! parent is the tag with the last segment removed; a single-segment tag
//! falls back to the invariant culture (the empty name), which has no
//! parent.

use std::fmt;

use crate::error::{Error, Result};

/// Display name reported for the invariant culture.
pub const INVARIANT_DISPLAY_NAME: &str = "Invariant Language (Invariant Country)";

const MAX_SEGMENT_LEN: usize = 8;

/// A culture name with an explicit parent chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Culture {
    name: String,
}

impl Culture {
    /// Parses a culture name. The empty name is the invariant culture.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !name.is_empty() {
            validate_name(&name)?;
        }
        Ok(Self { name })
    }

    /// The invariant culture.
    pub fn invariant() -> Self {
        Self::default()
    }

    /// The culture name as given, or `""` for the invariant culture.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_invariant(&self) -> bool {
        self.name.is_empty()
    }

    /// Name used in diagnostics.
    pub fn display_name(&self) -> &str {
        if self.is_invariant() {
            INVARIANT_DISPLAY_NAME
        } else {
            &self.name
        }
    }

    /// The next culture to try, or `None` for the invariant culture.
    pub fn parent(&self) -> Option<Culture> {
        if self.is_invariant() {
            return None;
        }
        let parent = match self.name.rfind('-') {
            Some(idx) => self.name[..idx].to_string(),
            None => String::new(),
        };
        Some(Culture { name: parent })
    }

    /// Returns `[self, parent, ..., invariant]`.
    pub fn fallback_chain(&self) -> Vec<Culture> {
        let mut chain = vec![self.clone()];
        let mut current = self.parent();
        while let Some(culture) = current {
            current = culture.parent();
            chain.push(culture);
        }
        chain
    }
}

impl fmt::Display for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

fn validate_name(name: &str) -> Result<()> {
    let valid = name.split('-').all(|segment| {
        !segment.is_empty()
            && segment.len() <= MAX_SEGMENT_LEN
            && segment.chars().all(|c| c.is_ascii_alphanumeric())
    });
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("invalid culture name: '{}'", name)))
    }
}
