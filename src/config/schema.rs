//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming the default repositories root.
pub const REPOSITORIES_DIRECTORY_ENV: &str = "REPOSITORIES_DIRECTORY";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 2215;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Port the listener binds.
    pub port: u16,

    /// Directory the served repositories live under.
    pub repositories_root: PathBuf,

    /// Identification reported in the `Server` response header.
    pub identity: ServerIdentity,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            repositories_root: std::env::var_os(REPOSITORIES_DIRECTORY_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            identity: ServerIdentity::default(),
        }
    }
}

/// Name/version pair identifying this server to clients.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerIdentity {
    pub name: String,
    pub version: String,
}

impl ServerIdentity {
    /// Identity of this crate, assembled at the composition root.
    pub fn from_crate() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// The `name/version` token written into the `Server` header.
    pub fn token(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

impl Default for ServerIdentity {
    fn default() -> Self {
        Self::from_crate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_token_joins_name_and_version() {
        let identity = ServerIdentity {
            name: "git-relay".to_string(),
            version: "1.2.3".to_string(),
        };
        assert_eq!(identity.token(), "git-relay/1.2.3");
    }

    #[test]
    fn default_port_is_kept() {
        assert_eq!(GatewayConfig::default().port, DEFAULT_PORT);
    }
}
