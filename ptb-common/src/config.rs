//! Configuration resolution for the automation bridge
//!
//! Resolution priority follows ENV → TOML → compiled default. The write
//! permission level is special: it is sourced from two environment
//! variables (the bridge's own and the legacy workstation-client variable)
//! which must agree. Disagreement is a startup error rather than a silent
//! preference for one of the two.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

/// Environment variable naming the protocol schema description file
pub const SCHEMA_PATH_ENV: &str = "PTSL_PROTO_PATH";

/// Environment variable naming the remote workstation address
pub const SERVER_ADDRESS_ENV: &str = "PTSL_SERVER_ADDRESS";

/// Primary write-permission environment variable
pub const ALLOW_WRITES_ENV: &str = "PTB_ALLOW_WRITES";

/// Legacy write-permission environment variable (must agree with primary)
pub const ALLOW_WRITES_LEGACY_ENV: &str = "PTSL_ALLOW_WRITES";

/// Default remote workstation address
pub const DEFAULT_SERVER_ADDRESS: &str = "localhost:31416";

/// Default HTTP port for the bridge service
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Write-permission policy for mutating workstation commands
///
/// `Memory` permits mutating commands that stay in session memory (a caller
/// contract, not enforced at this layer). `All` is unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePermission {
    /// All mutating commands rejected (read-only mode)
    None,
    /// Mutating commands allowed, no physical writes expected
    Memory,
    /// Unrestricted
    All,
}

impl WritePermission {
    /// Whether mutating commands may be issued at all
    pub fn allows_writes(self) -> bool {
        !matches!(self, WritePermission::None)
    }

    /// Read the write permission from process-wide configuration.
    ///
    /// Reads both environment variables fresh on every call (the policy is
    /// never cached beyond process lifetime) and fails if they disagree.
    pub fn from_env() -> Result<Self> {
        let primary = read_permission_var(ALLOW_WRITES_ENV)?;
        let legacy = read_permission_var(ALLOW_WRITES_LEGACY_ENV)?;

        match (primary, legacy) {
            (Some(a), Some(b)) if a != b => Err(Error::Config(format!(
                "{}={} disagrees with {}={}. Set both to the same value \
                 (none, memory, or all), or unset one.",
                ALLOW_WRITES_ENV, a, ALLOW_WRITES_LEGACY_ENV, b
            ))),
            (Some(level), _) | (None, Some(level)) => Ok(level),
            (None, None) => Ok(WritePermission::None),
        }
    }
}

impl FromStr for WritePermission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(WritePermission::None),
            "memory" => Ok(WritePermission::Memory),
            "all" => Ok(WritePermission::All),
            other => Err(Error::Config(format!(
                "Unknown write permission level '{}' (expected none, memory, or all)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for WritePermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WritePermission::None => "none",
            WritePermission::Memory => "memory",
            WritePermission::All => "all",
        };
        write!(f, "{}", name)
    }
}

fn read_permission_var(name: &str) -> Result<Option<WritePermission>> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value.parse()?)),
        Err(_) => Ok(None),
    }
}

/// TOML config file contents (all fields optional)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub schema_path: Option<PathBuf>,
    pub server_address: Option<String>,
    pub http_port: Option<u16>,
}

/// Resolved bridge configuration, read once at startup
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Filesystem path to the protocol schema description
    pub schema_path: PathBuf,
    /// Remote workstation `host:port`
    pub server_address: String,
    /// Port the bridge HTTP server listens on
    pub http_port: u16,
    /// Write-permission level validated at startup (re-read per request by
    /// the HTTP boundary; this copy exists for startup logging only)
    pub write_permission: WritePermission,
}

impl BridgeConfig {
    /// Resolve configuration from environment and the optional TOML file.
    pub fn load() -> Result<Self> {
        Self::load_with_toml(&load_toml_config())
    }

    fn load_with_toml(toml: &TomlConfig) -> Result<Self> {
        let schema_path = std::env::var(SCHEMA_PATH_ENV)
            .ok()
            .map(PathBuf::from)
            .or_else(|| toml.schema_path.clone())
            .ok_or_else(|| {
                Error::Config(format!(
                    "Protocol schema path not configured. Please either:\n\
                     1. Set the {} environment variable\n\
                     2. Add schema_path to {}",
                    SCHEMA_PATH_ENV,
                    config_file_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "the ptbridge config.toml".to_string())
                ))
            })?;

        let server_address = std::env::var(SERVER_ADDRESS_ENV)
            .ok()
            .or_else(|| toml.server_address.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string());

        let http_port = std::env::var("PTB_HTTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .or(toml.http_port)
            .unwrap_or(DEFAULT_HTTP_PORT);

        let write_permission = WritePermission::from_env()?;

        Ok(Self {
            schema_path,
            server_address,
            http_port,
            write_permission,
        })
    }
}

/// Platform config file path (`~/.config/ptbridge/config.toml` on Linux)
fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ptbridge").join("config.toml"))
}

fn load_toml_config() -> TomlConfig {
    let Some(path) = config_file_path() else {
        return TomlConfig::default();
    };
    let Ok(content) = std::fs::read_to_string(&path) else {
        return TomlConfig::default();
    };
    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unparseable config file");
            TomlConfig::default()
        }
    }
}
