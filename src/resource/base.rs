//! Generic REST resource
//!
//! A [`Resource`] is a mutable local projection of one remote entity. It is
//! bound to a [`RestClient`] and a [`ResourceDescriptor`], and translates
//! CRUD intents into client calls whose response bodies are merged back
//! into local data.

use super::compare::{recursive_like, Shape};
use super::descriptor::{Operation, ResourceDescriptor};
use super::pagination::find_with_pagination;
use super::query::build_query;
use crate::client::{Headers, RequestOptions, RestClient};
use crate::error::{ResourceError, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::Index;
use std::sync::Arc;
use url::Url;

/// Anything that can be read as a key-value attribute mapping
pub trait Attributes {
    fn attributes(&self) -> Result<&Map<String, Value>>;
}

impl Attributes for Map<String, Value> {
    fn attributes(&self) -> Result<&Map<String, Value>> {
        Ok(self)
    }
}

impl Attributes for Value {
    fn attributes(&self) -> Result<&Map<String, Value>> {
        match Shape::of(self) {
            Shape::Mapping(map) => Ok(map),
            other => Err(ResourceError::NotComparable(other.name())),
        }
    }
}

impl Attributes for Resource {
    fn attributes(&self) -> Result<&Map<String, Value>> {
        Ok(&self.data)
    }
}

/// Check the client can actually address an appliance
fn check_client(client: &dyn RestClient) -> Result<()> {
    let endpoint = client.endpoint();
    match Url::parse(endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        Ok(url) => Err(ResourceError::InvalidClient(format!(
            "endpoint '{}' must be an http(s) URL with a host (got scheme '{}')",
            endpoint,
            url.scheme()
        ))),
        Err(e) => Err(ResourceError::InvalidClient(format!(
            "endpoint '{}' is not a valid URL: {}",
            endpoint, e
        ))),
    }
}

#[derive(Clone)]
pub struct Resource {
    client: Arc<dyn RestClient>,
    descriptor: Arc<ResourceDescriptor>,
    data: Map<String, Value>,
}

impl Resource {
    /// Bind a new resource to `client`, applying `params` through [`Resource::set`]
    pub fn new(
        client: Arc<dyn RestClient>,
        descriptor: Arc<ResourceDescriptor>,
        params: &impl Attributes,
    ) -> Result<Self> {
        check_client(client.as_ref())?;

        let mut resource = Self {
            client,
            descriptor,
            data: Map::new(),
        };
        resource.set_all(params)?;
        Ok(resource)
    }

    pub fn kind(&self) -> &str {
        self.descriptor.kind()
    }

    pub fn descriptor(&self) -> &Arc<ResourceDescriptor> {
        &self.descriptor
    }

    pub fn client(&self) -> &Arc<dyn RestClient> {
        &self.client
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.data.iter()
    }

    pub fn uri(&self) -> Option<&str> {
        self.data.get("uri").and_then(|v| v.as_str())
    }

    /// Store one attribute after running the field's validator, if any.
    /// A rejected value leaves the data untouched.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Result<()> {
        let key = key.into();
        self.descriptor.validate(&key, &value)?;
        self.data.insert(key, value);
        Ok(())
    }

    /// Apply every pair of `params` through [`Resource::set`], in order.
    /// Shallow: nested values are replaced, absent keys are kept.
    pub fn set_all(&mut self, params: &impl Attributes) -> Result<()> {
        for (key, value) in params.attributes()? {
            self.set(key.clone(), value.clone())?;
        }
        Ok(())
    }

    /// Partial match: every field `other` declares must be satisfied here
    pub fn like(&self, other: &impl Attributes) -> Result<bool> {
        Ok(recursive_like(other.attributes()?, &self.data))
    }

    /// Identifier keys that currently carry a value, in lookup order
    fn retrieval_filters(&self) -> Result<Vec<Map<String, Value>>> {
        let filters: Vec<Map<String, Value>> = self
            .descriptor
            .unique_identifiers()
            .iter()
            .filter_map(|key| match self.data.get(key) {
                Some(Value::Null) | None => None,
                Some(value) => {
                    let mut filter = Map::new();
                    filter.insert(key.clone(), value.clone());
                    Some(filter)
                }
            })
            .collect();

        if filters.is_empty() {
            return Err(ResourceError::IncompleteResource(format!(
                "Must set resource {} before trying to retrieve",
                self.descriptor.unique_identifiers().join(" or ")
            )));
        }
        Ok(filters)
    }

    fn ensure_uri(&self) -> Result<String> {
        self.uri().map(str::to_string).ok_or_else(|| {
            ResourceError::IncompleteResource(
                "Please set uri attribute before interacting with this resource".to_string(),
            )
        })
    }

    fn merge_response(&mut self, body: Value) -> Result<()> {
        match body {
            Value::Object(map) => self.set_all(&map),
            Value::Null => Ok(()),
            other => {
                tracing::debug!(
                    "Ignoring non-mapping response body for {}: {}",
                    self.kind(),
                    Shape::of(&other).name()
                );
                Ok(())
            }
        }
    }

    /// Look the resource up by its unique identifiers and merge the match.
    ///
    /// Returns `Ok(false)` when no identifier yields exactly one result.
    pub async fn retrieve(&mut self, header: Option<&Headers>) -> Result<bool> {
        self.descriptor.ensure_available(Operation::Retrieve)?;

        for filter in self.retrieval_filters()? {
            let results = Self::find_by(&self.client, &self.descriptor, &filter, header).await?;
            if results.len() > 1 {
                tracing::warn!(
                    "{} lookup by {:?} is ambiguous ({} results), trying next identifier",
                    self.kind(),
                    filter.keys().next(),
                    results.len()
                );
                continue;
            }
            if let Some(found) = results.into_iter().next() {
                self.set_all(&found)?;
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Whether a unique remote match exists, without touching local data
    pub async fn exists(&self, header: Option<&Headers>) -> Result<bool> {
        self.descriptor.ensure_available(Operation::Exists)?;

        for filter in self.retrieval_filters()? {
            let results = Self::find_by(&self.client, &self.descriptor, &filter, header).await?;
            if results.len() == 1 {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// POST the full local data to the collection and merge the server's answer
    pub async fn create(&mut self, header: Option<&Headers>) -> Result<()> {
        self.descriptor.ensure_available(Operation::Create)?;

        let options = RequestOptions::with_headers(self.descriptor.request_headers(header))
            .body(Value::Object(self.data.clone()));

        tracing::info!("Creating {} at {}", self.kind(), self.descriptor.base_uri());
        let response = self
            .client
            .rest_post(self.descriptor.base_uri(), options)
            .await?;
        let body = self.client.response_handler(response)?;
        self.merge_response(body)
    }

    /// Create, deleting any existing remote match first.
    ///
    /// Destructive: a pre-existing entity is removed and recreated, so its
    /// server-assigned `uri` changes.
    pub async fn create_replacing(&mut self, header: Option<&Headers>) -> Result<()> {
        let mut existing = Self::new(self.client.clone(), self.descriptor.clone(), &self.data)?;
        if existing.retrieve(header).await? {
            tracing::warn!(
                "Replacing existing {} at {}",
                self.kind(),
                existing.uri().unwrap_or("-")
            );
            existing.delete(header).await?;
        }
        self.create(header).await
    }

    /// Re-fetch by `uri` and merge
    pub async fn refresh(&mut self, header: Option<&Headers>) -> Result<()> {
        self.descriptor.ensure_available(Operation::Refresh)?;
        let uri = self.ensure_uri()?;

        let response = self
            .client
            .rest_get(&uri, RequestOptions::with_headers(self.descriptor.request_headers(header)))
            .await?;
        let body = self.client.response_handler(response)?;
        self.merge_response(body)
    }

    /// Merge `attributes` locally, then PATCH the merged data to `uri`.
    ///
    /// Not atomic: local data keeps the new attributes even if the remote
    /// call fails or never happens.
    pub async fn update(&mut self, attributes: &impl Attributes, header: Option<&Headers>) -> Result<()> {
        self.descriptor.ensure_available(Operation::Update)?;
        self.set_all(attributes)?;
        let uri = self.ensure_uri()?;

        let options = RequestOptions::with_headers(self.descriptor.request_headers(header))
            .body(Value::Object(self.data.clone()));

        tracing::info!("Updating {} at {}", self.kind(), uri);
        let response = self.client.rest_patch(&uri, options).await?;
        let body = self.client.response_handler(response)?;
        self.merge_response(body)
    }

    /// DELETE the remote entity. Failures surface as errors, never `Ok(false)`.
    pub async fn delete(&self, header: Option<&Headers>) -> Result<bool> {
        self.descriptor.ensure_available(Operation::Delete)?;
        let uri = self.ensure_uri()?;

        tracing::info!("Deleting {} at {}", self.kind(), uri);
        let response = self
            .client
            .rest_delete(&uri, RequestOptions::with_headers(self.descriptor.request_headers(header)))
            .await?;
        self.client.response_handler(response)?;
        Ok(true)
    }

    /// Server-side filtered lookup against the type's collection
    pub async fn find_by(
        client: &Arc<dyn RestClient>,
        descriptor: &Arc<ResourceDescriptor>,
        attributes: &Map<String, Value>,
        header: Option<&Headers>,
    ) -> Result<Vec<Resource>> {
        descriptor.ensure_available(Operation::FindBy)?;

        let uri = format!("{}{}", descriptor.base_uri(), build_query(attributes));
        let members =
            find_with_pagination(client.as_ref(), &uri, &descriptor.request_headers(header)).await?;

        members
            .iter()
            .map(|member| Self::new(client.clone(), descriptor.clone(), member))
            .collect()
    }

    /// Every member of the type's collection
    pub async fn get_all(
        client: &Arc<dyn RestClient>,
        descriptor: &Arc<ResourceDescriptor>,
        header: Option<&Headers>,
    ) -> Result<Vec<Resource>> {
        descriptor.ensure_available(Operation::GetAll)?;
        Self::find_by(client, descriptor, &Map::new(), header).await
    }

    /// The collection's JSON schema
    pub async fn schema(
        client: &Arc<dyn RestClient>,
        descriptor: &Arc<ResourceDescriptor>,
        header: Option<&Headers>,
    ) -> Result<Value> {
        descriptor.ensure_available(Operation::Schema)?;

        let uri = format!("{}/schema", descriptor.base_uri());
        let response = client
            .rest_get(&uri, RequestOptions::with_headers(descriptor.request_headers(header)))
            .await?;
        Ok(client.response_handler(response)?)
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
            && std::ptr::addr_eq(Arc::as_ptr(&self.client), Arc::as_ptr(&other.client))
            && self.data == other.data
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("kind", &self.kind())
            .field("endpoint", &self.client.endpoint())
            .field("data", &self.data)
            .finish()
    }
}

static NULL: Value = Value::Null;

/// Missing keys read as `null`, like indexing a JSON object
impl Index<&str> for Resource {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.data.get(key).unwrap_or(&NULL)
    }
}

impl<'a> IntoIterator for &'a Resource {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
