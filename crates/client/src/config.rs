//! Client configuration loaded from environment variables.

/// Shell configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `PUSH_URL` — availability push endpoint (default:
///   `"ws://localhost:4010/availability"`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub push_endpoint: String,
    pub log_level: String,
}

impl ClientConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            push_endpoint: std::env::var("PUSH_URL")
                .unwrap_or_else(|_| "ws://localhost:4010/availability".to_string()),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            push_endpoint: "ws://localhost:4010/availability".to_string(),
            log_level: "info".to_string(),
        }
    }
}
