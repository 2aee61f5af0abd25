//! Resource lookup with culture fallback and the [`ResourceProvider`] trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::ResourceCache;
use crate::codec::{combine_to_key, encode_for_table_storage};
use crate::config::Config;
use crate::culture::Culture;
use crate::error::{Error, Result};

/// Lookup operations a hosting framework needs from a resource provider.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Returns the value of `resource_key` for `culture`, walking parent
    /// cultures until one provides it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if `culture` is `None` or the key is empty.
    /// - [`Error::ResourceNotFound`] if no culture in the chain has the key.
    /// - [`Error::Storage`] if the store fails.
    async fn get_object(&self, resource_key: &str, culture: Option<&Culture>) -> Result<String>;

    /// Lists every entry of the invariant culture's resource set, sorted by key.
    ///
    /// Returns `None` if the store has no such resource set.
    async fn list_all_keys(&self) -> Result<Option<Vec<(String, String)>>>;
}

/// What names the resource sets of a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceScope {
    /// Local resources of a page or view path.
    Namespace(String),
    /// Global resources of a class.
    ClassName(String),
}

impl ResourceScope {
    /// Picks the scope from the hosting framework's constructor inputs.
    ///
    /// Both inputs are normalized with [`encode_for_table_storage`]. A
    /// non-empty namespace wins; otherwise the class name is used.
    pub fn from_parts(namespace: Option<&str>, class_name: Option<&str>) -> Self {
        let namespace = encode_for_table_storage(namespace);
        if namespace.is_empty() {
            ResourceScope::ClassName(encode_for_table_storage(class_name))
        } else {
            ResourceScope::Namespace(namespace)
        }
    }

    /// The normalized namespace or class name.
    pub fn name(&self) -> &str {
        match self {
            ResourceScope::Namespace(name) | ResourceScope::ClassName(name) => name,
        }
    }
}

/// Resolves resource keys against cached resource sets.
///
/// Cultures are tried strictly in order `culture, parent, ..., invariant`.
/// Each level is an independent resource set; levels are never merged.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use resources::{Culture, InMemoryResourceTable, ResourceCache, ResourceProvider, ResourceResolver};
///
/// let table = InMemoryResourceTable::new("Resources");
/// let cache = Arc::new(ResourceCache::new(Arc::new(table)));
/// let resolver = ResourceResolver::for_namespace("~/Views/Home/Index.cshtml", cache);
///
/// let fr = Culture::new("fr-FR")?;
/// let title = resolver.get_object("Title", Some(&fr)).await?;
/// ```
pub struct ResourceResolver {
    scope: ResourceScope,
    cache: Arc<ResourceCache>,
    invariant_culture_name: String,
}

impl ResourceResolver {
    pub fn new(scope: ResourceScope, cache: Arc<ResourceCache>) -> Self {
        Self::with_config(scope, cache, &Config::default())
    }

    pub fn with_config(scope: ResourceScope, cache: Arc<ResourceCache>, config: &Config) -> Self {
        Self {
            scope,
            cache,
            invariant_culture_name: config.invariant_culture_name.clone(),
        }
    }

    /// Creates a resolver for the local resources of a page or view path.
    pub fn for_namespace(namespace: &str, cache: Arc<ResourceCache>) -> Self {
        Self::new(ResourceScope::from_parts(Some(namespace), None), cache)
    }

    /// Creates a resolver for the global resources of a class.
    pub fn for_class(class_name: &str, cache: Arc<ResourceCache>) -> Self {
        Self::new(ResourceScope::from_parts(None, Some(class_name)), cache)
    }

    pub fn scope(&self) -> &ResourceScope {
        &self.scope
    }

    /// The partition key of this resolver's resource set for `culture`.
    ///
    /// Class-name sets use the configured invariant culture name in place of
    /// the invariant culture's empty name; namespace sets do not.
    pub fn resource_set_name(&self, culture: &Culture) -> String {
        match &self.scope {
            ResourceScope::Namespace(namespace) => combine_to_key(culture.name(), namespace),
            ResourceScope::ClassName(class_name) => {
                let culture_key = if culture.is_invariant() {
                    self.invariant_culture_name.as_str()
                } else {
                    culture.name()
                };
                combine_to_key(culture_key, class_name)
            }
        }
    }
}

#[async_trait]
impl ResourceProvider for ResourceResolver {
    #[tracing::instrument(level = "debug", skip_all, fields(key = %resource_key))]
    async fn get_object(&self, resource_key: &str, culture: Option<&Culture>) -> Result<String> {
        let culture =
            culture.ok_or_else(|| Error::InvalidInput("culture cannot be null".to_string()))?;
        if resource_key.is_empty() {
            return Err(Error::InvalidInput(
                "the parameter 'resource_key' must not be empty".to_string(),
            ));
        }

        let chain = culture.fallback_chain();
        for level in &chain {
            let resource_set = self.resource_set_name(level);
            let dictionary = self.cache.get_resources(&resource_set).await?;
            if let Some(value) = dictionary.as_deref().and_then(|d| d.get(resource_key)) {
                return Ok(value.to_string());
            }
            tracing::debug!(
                culture = %level.name(),
                resource_set = %resource_set,
                "resource not in culture, falling back"
            );
        }

        let terminal = chain.last().cloned().unwrap_or_default();
        Err(Error::ResourceNotFound {
            key: resource_key.to_string(),
            resource_set: self.scope.name().to_string(),
            culture: terminal.display_name().to_string(),
            requested_culture: culture.name().to_string(),
        })
    }

    #[tracing::instrument(level = "debug", skip_all)]
    async fn list_all_keys(&self) -> Result<Option<Vec<(String, String)>>> {
        let resource_set = self.resource_set_name(&Culture::invariant());
        let dictionary = self.cache.get_resources(&resource_set).await?;
        Ok(dictionary.map(|d| d.to_sorted_vec()))
    }
}
