//! Configuration module for environment variables and adapter settings

use std::env;

use once_cell::sync::Lazy;

/// Global adapter configuration loaded from environment variables.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

#[derive(Debug, Clone)]
pub struct Config {
    /// JSON-RPC endpoint of the target cluster
    pub rpc_url: String,

    /// Transaction confirmation polling
    pub confirmation: ConfirmationConfig,
}

/// Poll-until-confirmed settings for submitted transactions.
///
/// Submission never sleeps blindly: the executor polls signature statuses
/// at `poll_interval_ms` until the commitment is reached or `max_polls`
/// attempts are spent.
#[derive(Debug, Clone)]
pub struct ConfirmationConfig {
    pub poll_interval_ms: u64,
    pub max_polls: u32,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            max_polls: 60,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to a
    /// local test-validator setup.
    pub fn from_env() -> Self {
        Self {
            rpc_url: env::var("SOLANA_RPC_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8899".to_string()),

            confirmation: ConfirmationConfig {
                poll_interval_ms: env::var("CONFIRMATION_POLL_INTERVAL_MS")
                    .unwrap_or_else(|_| "500".to_string())
                    .parse()
                    .unwrap_or(500),
                max_polls: env::var("CONFIRMATION_MAX_POLLS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .unwrap_or(60),
            },
        }
    }
}
