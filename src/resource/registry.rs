//! Resource Registry - Load resource descriptors from JSON
//!
//! This module loads the known resource types from embedded JSON files and
//! provides lookup functions for the rest of the application.

use super::descriptor::{Operation, ResourceDescriptor, DEFAULT_UNIQUE_IDENTIFIERS};
use crate::client::Headers;
use crate::error::{ResourceError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[
    include_str!("../resources/networking.json"),
    include_str!("../resources/servers.json"),
    include_str!("../resources/activity.json"),
];

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    pub base_uri: String,
    #[serde(default)]
    pub unique_identifiers: Option<Vec<String>>,
    #[serde(default)]
    pub default_headers: Headers,
    /// Field name -> accepted string values
    #[serde(default)]
    pub allowed_values: HashMap<String, Vec<String>>,
    /// Field name -> inclusive `[min, max]`
    #[serde(default)]
    pub integer_ranges: HashMap<String, [i64; 2]>,
    /// Inherited operations this type refuses
    #[serde(default)]
    pub unavailable: Vec<Operation>,
}

impl ResourceDef {
    /// Build the descriptor for resource type `kind`
    pub fn descriptor(&self, kind: &str) -> ResourceDescriptor {
        let identifiers = self.unique_identifiers.clone().unwrap_or_else(|| {
            DEFAULT_UNIQUE_IDENTIFIERS
                .iter()
                .map(|s| s.to_string())
                .collect()
        });

        let mut descriptor = ResourceDescriptor::new(kind, &self.base_uri)
            .with_unique_identifiers(identifiers);

        for (name, value) in &self.default_headers {
            descriptor = descriptor.with_default_header(name, value);
        }
        for (field, values) in &self.allowed_values {
            descriptor = descriptor.with_allowed_values(field, values.iter().cloned());
        }
        for (field, [min, max]) in &self.integer_ranges {
            descriptor = descriptor.with_integer_range(field, *min, *max);
        }
        for operation in &self.unavailable {
            descriptor = descriptor.disable(*operation);
        }

        descriptor
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// A registered resource type
#[derive(Debug)]
pub struct RegisteredResource {
    pub def: ResourceDef,
    pub descriptor: Arc<ResourceDescriptor>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<HashMap<String, RegisteredResource>> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static HashMap<String, RegisteredResource> {
    REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            for (kind, def) in partial.resources {
                let descriptor = Arc::new(def.descriptor(&kind));
                registry.insert(kind, RegisteredResource { def, descriptor });
            }
        }

        registry
    })
}

/// Get a resource type by key
pub fn get_resource(kind: &str) -> Option<&'static RegisteredResource> {
    get_registry().get(kind)
}

/// Get the descriptor for a resource type
pub fn get_descriptor(kind: &str) -> Option<Arc<ResourceDescriptor>> {
    get_resource(kind).map(|r| r.descriptor.clone())
}

/// Like [`get_descriptor`], failing with [`ResourceError::UnknownKind`]
pub fn require_descriptor(kind: &str) -> Result<Arc<ResourceDescriptor>> {
    get_descriptor(kind).ok_or_else(|| ResourceError::UnknownKind(kind.to_string()))
}

/// Get all resource type keys, sorted
pub fn get_all_kinds() -> Vec<&'static str> {
    let mut kinds: Vec<&'static str> = get_registry().keys().map(|s| s.as_str()).collect();
    kinds.sort_unstable();
    kinds
}
