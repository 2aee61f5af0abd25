//! Configuration options for resource lookups.

use serde::{Deserialize, Serialize};

/// Configuration for a [`ResourceResolver`](crate::ResourceResolver) and
/// the table it reads from.
///
/// # Example
///
/// ```ignore
/// use resources::Config;
///
/// let config: Config = serde_json::from_str(r#"{ "table_name": "SiteResources" }"#)?;
/// assert_eq!(config.invariant_culture_name, "en-gb");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Name of the resource table.
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Culture key used for class-name resource sets when the lookup has
    /// reached the invariant culture.
    #[serde(default = "default_invariant_culture_name")]
    pub invariant_culture_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_name: default_table_name(),
            invariant_culture_name: default_invariant_culture_name(),
        }
    }
}

fn default_table_name() -> String {
    "Resources".to_string()
}

fn default_invariant_culture_name() -> String {
    "en-gb".to_string()
}
