//! cloudres - generic REST resources for cloud-management APIs
//!
//! # Module Structure
//!
//! - [`client`] - The [`RestClient`](client::RestClient) contract and its reqwest implementation
//! - [`resource`] - Generic resource CRUD, pagination and partial matching
//! - [`config`] - Persistent CLI configuration
//! - [`error`] - Error types

pub mod client;
pub mod config;
pub mod error;
pub mod resource;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{HttpClient, RestClient};
pub use error::{ClientError, ResourceError, Result};
pub use resource::{Resource, ResourceDescriptor};
