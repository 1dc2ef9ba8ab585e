//! HTTP server configuration settings.

use std::{net::SocketAddr, path::PathBuf};

use serde::{Deserialize, Deserializer};

/// HTTP server configuration settings.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// The socket address the server should listen on.
    pub listen_address: Option<SocketAddr>,
    /// TLS configuration for secure connections.
    pub tls: Option<TlsServerConfig>,
    /// Health endpoint configuration.
    pub health: HealthConfig,
    /// CORS configuration
    pub cors: Option<CorsConfig>,
}

/// TLS configuration for the HTTP listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TlsServerConfig {
    /// Path to the PEM encoded certificate chain.
    pub certificate: PathBuf,
    /// Path to the PEM encoded private key.
    pub key: PathBuf,
}

/// Health endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/health".to_string(),
        }
    }
}

/// Cross-origin settings for browser clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Origins allowed to call the API. `"*"` allows every origin.
    pub allow_origins: AllowedOrigins,
}

/// Either every origin, or an explicit list of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for AllowedOrigins {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
        }

        let origins = match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(origin) => vec![origin],
            OneOrMany::Many(origins) => origins,
        };

        if origins.iter().any(|origin| origin == "*") {
            Ok(Self::Any)
        } else {
            Ok(Self::List(origins))
        }
    }
}
