//! Resource abstraction layer
//!
//! This module provides a generic, data-driven approach to remote REST
//! resources. Resource types differ only by their [`ResourceDescriptor`];
//! the CRUD, lookup and comparison logic lives once in [`Resource`].
//!
//! # Architecture
//!
//! - [`base`] - The [`Resource`] type and its CRUD operations
//! - [`descriptor`] - Per-type configuration (base URI, identifiers, validators)
//! - [`registry`] - Loads descriptors from embedded JSON
//! - [`pagination`] - Follows `nextPageUri` links across collection pages
//! - [`query`] - Filter query-string construction
//! - [`compare`] - Recursive partial matching (`like`)
//! - [`export`] - JSON/YAML import and export
//!
//! # Example
//!
//! ```ignore
//! use cloudres::resource::{require_descriptor, Resource};
//! use serde_json::json;
//!
//! async fn ensure_network(client: Arc<dyn RestClient>) -> cloudres::Result<()> {
//!     let descriptor = require_descriptor("ethernet-networks")?;
//!     let mut network = Resource::new(client, descriptor, &json!({"name": "prod", "vlanId": 10}))?;
//!     if !network.retrieve(None).await? {
//!         network.create(None).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod base;
pub mod compare;
pub mod descriptor;
pub mod export;
pub mod pagination;
pub mod query;
pub mod registry;

pub use base::{Attributes, Resource};
pub use compare::Shape;
pub use descriptor::{Operation, ResourceDescriptor, Validator};
pub use export::FileFormat;
pub use pagination::{find_with_pagination, Page};
pub use query::build_query;
pub use registry::{get_all_kinds, get_descriptor, get_resource, require_descriptor};
