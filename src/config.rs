//! Server configuration from environment variables.

use std::net::SocketAddr;

const DEFAULT_PORT: u16 = 5174;
const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub addr: SocketAddr,
    /// Directory served for everything outside `/api`.
    pub static_dir: String,
}

impl ServerConfig {
    /// Load server config from `LIVEQA_ADDR` and `LIVEQA_STATIC_DIR`.
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let addr = match std::env::var("LIVEQA_ADDR") {
            Ok(raw) => match raw.parse() {
                Ok(addr) => addr,
                Err(_) => {
                    tracing::warn!("Invalid LIVEQA_ADDR {:?}, using default", raw);
                    default_addr()
                }
            },
            Err(_) => default_addr(),
        };
        let static_dir = std::env::var("LIVEQA_STATIC_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string());
        Self { addr, static_dir }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            static_dir: DEFAULT_STATIC_DIR.to_string(),
        }
    }
}

fn default_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT))
}
