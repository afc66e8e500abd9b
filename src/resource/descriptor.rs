//! Resource descriptors
//!
//! A descriptor carries everything that varies between resource types:
//! where the collection lives, which attributes identify one entity, what
//! headers go out by default, which fields are validated and which
//! operations the type refuses.

use crate::client::Headers;
use crate::error::{ResourceError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Identifiers tried, in order, when a type does not declare its own
pub const DEFAULT_UNIQUE_IDENTIFIERS: &[&str] = &["name", "uri"];

/// Field validator: receives the candidate value, returns a rejection reason
pub type Validator = Arc<dyn Fn(&Value) -> std::result::Result<(), String> + Send + Sync>;

/// Operations a resource type can expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Retrieve,
    Exists,
    Refresh,
    Update,
    Delete,
    FindBy,
    GetAll,
    Schema,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Retrieve => "retrieve",
            Self::Exists => "exists",
            Self::Refresh => "refresh",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::FindBy => "find_by",
            Self::GetAll => "get_all",
            Self::Schema => "schema",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-type configuration shared by every [`Resource`](super::Resource) of that type
#[derive(Clone)]
pub struct ResourceDescriptor {
    kind: String,
    base_uri: String,
    unique_identifiers: Vec<String>,
    default_headers: Headers,
    validators: HashMap<String, Validator>,
    unavailable: HashSet<Operation>,
}

impl ResourceDescriptor {
    pub fn new(kind: impl Into<String>, base_uri: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            base_uri: base_uri.into(),
            unique_identifiers: DEFAULT_UNIQUE_IDENTIFIERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_headers: Headers::new(),
            validators: HashMap::new(),
            unavailable: HashSet::new(),
        }
    }

    /// Replace the ordered list of identifying attributes
    pub fn with_unique_identifiers<I, S>(mut self, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unique_identifiers = identifiers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Register a validator for `field`, replacing any previous one
    pub fn with_validator<F>(mut self, field: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.validators.insert(field.into(), Arc::new(validator));
        self
    }

    /// Restrict `field` to a fixed set of string values (or `null`)
    pub fn with_allowed_values<I, S>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = values.into_iter().map(Into::into).collect();
        self.with_validator(field, move |value| match value {
            Value::Null => Ok(()),
            Value::String(s) if allowed.iter().any(|a| a == s) => Ok(()),
            _ => Err(format!(
                "{} is not one of [{}]",
                value,
                allowed.join(", ")
            )),
        })
    }

    /// Restrict `field` to integers within `min..=max` (or `null`)
    pub fn with_integer_range(self, field: impl Into<String>, min: i64, max: i64) -> Self {
        self.with_validator(field, move |value| match value.as_i64() {
            _ if value.is_null() => Ok(()),
            Some(n) if (min..=max).contains(&n) => Ok(()),
            _ => Err(format!("{} is not an integer in {}..={}", value, min, max)),
        })
    }

    /// Mark an inherited operation as unsupported by this type
    pub fn disable(mut self, operation: Operation) -> Self {
        self.unavailable.insert(operation);
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn unique_identifiers(&self) -> &[String] {
        &self.unique_identifiers
    }

    /// Headers for one request: the caller's set when given, the type's default otherwise
    pub fn request_headers(&self, header: Option<&Headers>) -> Headers {
        header.unwrap_or(&self.default_headers).clone()
    }

    /// Run the validator registered for `key`, if any
    pub fn validate(&self, key: &str, value: &Value) -> Result<()> {
        let Some(validator) = self.validators.get(key) else {
            return Ok(());
        };
        validator(value).map_err(|reason| ResourceError::InvalidValue {
            key: key.to_string(),
            reason,
        })
    }

    pub fn is_available(&self, operation: Operation) -> bool {
        !self.unavailable.contains(&operation)
    }

    pub fn ensure_available(&self, operation: Operation) -> Result<()> {
        if self.is_available(operation) {
            Ok(())
        } else {
            Err(ResourceError::MethodUnavailable {
                kind: self.kind.clone(),
                operation,
            })
        }
    }
}

impl fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut validated: Vec<&String> = self.validators.keys().collect();
        validated.sort();
        f.debug_struct("ResourceDescriptor")
            .field("kind", &self.kind)
            .field("base_uri", &self.base_uri)
            .field("unique_identifiers", &self.unique_identifiers)
            .field("default_headers", &self.default_headers)
            .field("validated_fields", &validated)
            .field("unavailable", &self.unavailable)
            .finish()
    }
}
