//! Protocol schema sources
//!
//! The protocol description is loaded at connect time from a configured
//! location. The source sits behind a trait so the binding is swappable
//! (local file today, embedded or remote later) without touching dispatch.

use crate::error::BridgeError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parsed summary of the protocol description
#[derive(Debug, Clone)]
pub struct ProtocolSchema {
    /// Service name declared by the schema
    pub service: String,
    /// Where the schema came from, for diagnostics
    pub origin: String,
}

/// Source of the protocol schema description
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn load(&self) -> Result<ProtocolSchema, BridgeError>;
}

/// Schema loaded from a filesystem path (the default binding)
#[derive(Debug, Clone)]
pub struct FileSchemaSource {
    path: PathBuf,
}

impl FileSchemaSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SchemaSource for FileSchemaSource {
    async fn load(&self) -> Result<ProtocolSchema, BridgeError> {
        if !self.path.exists() {
            return Err(BridgeError::Connection(format!(
                "Protocol schema file not found at: {}",
                self.path.display()
            )));
        }

        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            BridgeError::Connection(format!(
                "Failed to read protocol schema {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let service = parse_service_name(&content).ok_or_else(|| {
            BridgeError::Connection(format!(
                "No service definition in protocol schema: {}",
                self.path.display()
            ))
        })?;

        debug!(service = %service, path = %self.path.display(), "Loaded protocol schema");
        Ok(ProtocolSchema {
            service,
            origin: self.path.display().to_string(),
        })
    }
}

/// In-memory schema for tests and embedded deployments
#[derive(Debug, Clone)]
pub struct StaticSchemaSource {
    schema: ProtocolSchema,
}

impl StaticSchemaSource {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            schema: ProtocolSchema {
                service: service.into(),
                origin: "static".to_string(),
            },
        }
    }
}

#[async_trait]
impl SchemaSource for StaticSchemaSource {
    async fn load(&self) -> Result<ProtocolSchema, BridgeError> {
        Ok(self.schema.clone())
    }
}

/// Extract the first `service <Name>` declaration from a proto-style schema.
fn parse_service_name(content: &str) -> Option<String> {
    for line in content.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("service ") {
            let name: String = rest
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            if !name.is_empty() {
                return Some(name);
            }
        }
    }
    None
}
