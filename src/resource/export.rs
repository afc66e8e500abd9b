//! Resource export and import
//!
//! Files hold `{"type": <kind>, "data": {...}}` as JSON or YAML.

use super::base::Resource;
use super::descriptor::ResourceDescriptor;
use crate::client::RestClient;
use crate::error::{ResourceError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    /// `.yml`/`.yaml` is YAML, anything else JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ResourceFile {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    data: Map<String, Value>,
}

impl Resource {
    /// Write this resource's data to `path`
    pub fn to_file(&self, path: impl AsRef<Path>, format: Option<FileFormat>) -> Result<()> {
        let path = path.as_ref();
        let format = format.unwrap_or_else(|| FileFormat::from_path(path));
        let file = ResourceFile {
            kind: Some(self.kind().to_string()),
            data: self.data().clone(),
        };

        let content = match format {
            FileFormat::Json => serde_json::to_string_pretty(&file)?,
            FileFormat::Yaml => serde_yaml::to_string(&file)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        tracing::debug!("Exported {} to {:?}", self.kind(), path);
        Ok(())
    }

    /// Load a resource from `path`, binding it to `client`
    pub fn from_file(
        client: Arc<dyn RestClient>,
        descriptor: Arc<ResourceDescriptor>,
        path: impl AsRef<Path>,
    ) -> Result<Resource> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let file: ResourceFile = match FileFormat::from_path(path) {
            FileFormat::Json => serde_json::from_str(&content)?,
            FileFormat::Yaml => serde_yaml::from_str(&content)?,
        };

        if let Some(kind) = file.kind.as_deref() {
            if kind != descriptor.kind() {
                return Err(ResourceError::Format(format!(
                    "{:?} holds a '{}' resource, expected '{}'",
                    path,
                    kind,
                    descriptor.kind()
                )));
            }
        }

        Resource::new(client, descriptor, &file.data)
    }
}
