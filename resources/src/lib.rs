//! Resources - Localized string lookup over a partitioned key-value table.
//!
//! Localized strings are stored one row per resource key, grouped into
//! resource sets. A resource set is the partition holding every string of
//! one namespace (a page or view path, or a class name) in one culture. A
//! lookup starts at the requested culture and falls back through its parent
//! cultures to the invariant culture.
//!
//! # Architecture
//!
//! ```text
//! ResourceResolver -> codec (partition key) -> ResourceCache -> ResourceStore
//!        ^                                          |
//!        +------ next parent culture on miss <------+
//! ```
//!
//! The store is an external collaborator reached through the
//! [`ResourceStore`] trait; [`InMemoryResourceTable`] implements it for
//! tests and embedded use. The cache fetches each partition at most once
//! and keeps it for its own lifetime.
//!
//! # Key Concepts
//!
//! - **ResourceResolver**: resolves keys with culture fallback and implements
//!   [`ResourceProvider`].
//! - **ResourceCache**: shared, explicitly owned cache of resource sets.
//! - **Culture**: a culture name and its explicit parent chain.
//! - **codec**: partition key construction and reversible key escaping.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use resources::{Culture, InMemoryResourceTable, ResourceCache, ResourceEntry};
//! use resources::{ResourceProvider, ResourceResolver};
//!
//! let table = InMemoryResourceTable::new("Resources");
//! table.insert(ResourceEntry::new("", "home", "Title", "Home"))?;
//! table.insert(ResourceEntry::new("fr", "home", "Title", "Accueil"))?;
//!
//! let cache = Arc::new(ResourceCache::new(Arc::new(table)));
//! let resolver = ResourceResolver::for_namespace("/Home", cache);
//!
//! let fr_ca = Culture::new("fr-CA")?;
//! assert_eq!(resolver.get_object("title", Some(&fr_ca)).await?, "Accueil");
//! ```

mod cache;
pub mod codec;
mod config;
mod culture;
mod error;
mod model;
mod resolver;
mod storage;
mod validate;

pub use cache::ResourceCache;
pub use config::Config;
pub use culture::{Culture, INVARIANT_DISPLAY_NAME};
pub use error::{Error, Result};
pub use model::{MAX_RESOURCE_KEY_LEN, ResourceDictionary, ResourceEntry, ResourceRow};
pub use resolver::{ResourceProvider, ResourceResolver, ResourceScope};
pub use storage::{InMemoryResourceTable, ResourceStore, StoreError, StoreResult};
pub use validate::{ParameterCheck, check_parameter};
