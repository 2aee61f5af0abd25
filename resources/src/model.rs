//! Data types for resource operations.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};

use crate::codec::combine_to_key;
use crate::error::Result;
use crate::validate::{ParameterCheck, check_parameter};

/// Longest resource key the table accepts.
pub const MAX_RESOURCE_KEY_LEN: usize = 1024;

/// A localized string as stored in the resource table.
///
/// Entries are written by the management side and are never modified by
/// lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    pub culture_name: String,
    pub resource_set_name: String,
    pub resource_key: String,
    pub data: String,
}

impl ResourceEntry {
    pub fn new(
        culture_name: impl Into<String>,
        resource_set_name: impl Into<String>,
        resource_key: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            culture_name: culture_name.into(),
            resource_set_name: resource_set_name.into(),
            resource_key: resource_key.into(),
            data: data.into(),
        }
    }

    /// The resource set partition this entry belongs to.
    pub fn partition_key(&self) -> String {
        combine_to_key(&self.culture_name, &self.resource_set_name)
    }

    pub fn row_key(&self) -> &str {
        &self.resource_key
    }

    /// Checks that the entry can be addressed in the table.
    pub fn validate(&self) -> Result<()> {
        check_parameter(
            &self.resource_key,
            ParameterCheck::required().with_max_len(MAX_RESOURCE_KEY_LEN),
            "resource_key",
        )?;
        check_parameter(
            &self.resource_set_name,
            ParameterCheck::required(),
            "resource_set_name",
        )?;
        Ok(())
    }
}

/// A row returned by a partition listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRow {
    pub row_key: String,
    pub data: String,
}

impl ResourceRow {
    pub fn new(row_key: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            row_key: row_key.into(),
            data: data.into(),
        }
    }
}

/// Resolved values of one resource set, keyed by lower-cased resource key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceDictionary {
    values: HashMap<String, String>,
}

impl ResourceDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value unless the lower-cased key is already present.
    ///
    /// Returns `false` and keeps the existing value on a duplicate.
    pub fn insert_first(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.values.entry(key.to_lowercase()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
        }
    }

    /// Looks up a key case-insensitively.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All entries sorted by key.
    pub fn to_sorted_vec(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort();
        entries
    }
}
