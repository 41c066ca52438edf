//! Server configuration
//!
//! Values come from `PDFJSON_*` environment variables, falling back to
//! defaults. The public root is always an explicit path handed to the
//! router; the process working directory is never changed.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_UPLOAD_LIMIT: usize = 100 * 1024 * 1024;

pub const BIND_VAR: &str = "PDFJSON_BIND";
pub const PORT_VAR: &str = "PDFJSON_PORT";
pub const PUBLIC_DIR_VAR: &str = "PDFJSON_PUBLIC_DIR";
pub const UPLOAD_LIMIT_VAR: &str = "PDFJSON_UPLOAD_LIMIT";

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind: String,
    /// Port to listen on
    pub port: u16,
    /// Directory holding the web front-end
    pub public_root: PathBuf,
    /// Maximum request body size in bytes
    pub upload_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            public_root: default_public_root(),
            upload_limit: DEFAULT_UPLOAD_LIMIT,
        }
    }
}

/// `public/` in the workspace root, i.e. next to this crate's directory
pub fn default_public_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .unwrap_or(manifest_dir)
        .join("public")
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(bind) = lookup(BIND_VAR) {
            config.bind = bind;
        }
        if let Some(port) = lookup(PORT_VAR) {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("{PORT_VAR} must be a port number, got {port:?}"))?;
        }
        if let Some(dir) = lookup(PUBLIC_DIR_VAR) {
            config.public_root = PathBuf::from(dir);
        }
        if let Some(limit) = lookup(UPLOAD_LIMIT_VAR) {
            config.upload_limit = limit
                .trim()
                .parse()
                .with_context(|| format!("{UPLOAD_LIMIT_VAR} must be a byte count, got {limit:?}"))?;
        }

        Ok(config)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    pub fn with_public_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.public_root = root.into();
        self
    }

    pub fn with_upload_limit(mut self, limit: usize) -> Self {
        self.upload_limit = limit;
        self
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.bind, self.port))
    }
}
