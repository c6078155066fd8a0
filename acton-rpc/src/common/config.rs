/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     you may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::path::Path;
use std::time::Duration;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Default `act` timeout in milliseconds.
pub const DEFAULT_ACT_TIMEOUT_MS: u64 = 2_000;

/// File-based configuration for Acton RPC.
///
/// Loaded from TOML in XDG-compliant directories. Explicit
/// [`RpcOption`](crate::common::RpcOption)s passed at construction take
/// precedence over these values.
///
/// # Example Configuration File
///
/// ```toml
/// [timeouts]
/// act_timeout_ms = 5000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
}

/// Timeout-related configuration values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long `act` waits for a reply, in milliseconds
    pub act_timeout_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            act_timeout_ms: DEFAULT_ACT_TIMEOUT_MS,
        }
    }
}

impl RpcConfig {
    /// Convert the act timeout to Duration
    #[must_use]
    pub const fn act_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.act_timeout_ms)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the document is malformed.
    pub fn from_toml_str(config_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Self>(config_str)
    }

    /// Load configuration from XDG-compliant locations
    ///
    /// Looks for `$XDG_CONFIG_HOME/acton/rpc.toml` (falling back to the
    /// platform's XDG config directories). If no file is found, or the file is
    /// unreadable or malformed, the error is logged and defaults are returned.
    #[must_use]
    pub fn load() -> Self {
        let xdg_dirs = match xdg::BaseDirectories::with_prefix("acton") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        match xdg_dirs.find_config_file("rpc.toml") {
            Some(path) => Self::load_from(&path),
            None => {
                info!("No RPC configuration file found, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit file path
    ///
    /// Falls back to defaults (and logs why) if the file cannot be read or
    /// parsed.
    #[must_use]
    pub fn load_from(path: &Path) -> Self {
        info!("Loading RPC configuration from: {}", path.display());
        match std::fs::read_to_string(path) {
            Ok(config_str) => match Self::from_toml_str(&config_str) {
                Ok(config) => config,
                Err(e) => {
                    error!("Failed to parse configuration file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read configuration file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations
    pub static ref CONFIG: RpcConfig = RpcConfig::load();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout() {
        let config = RpcConfig::default();
        assert_eq!(config.timeouts.act_timeout_ms, 2_000);
        assert_eq!(config.act_timeout(), Duration::from_millis(2_000));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RpcConfig::from_toml_str("").unwrap();
        assert_eq!(config, RpcConfig::default());

        let config = RpcConfig::from_toml_str("[timeouts]\n").unwrap();
        assert_eq!(config.timeouts.act_timeout_ms, DEFAULT_ACT_TIMEOUT_MS);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(RpcConfig::from_toml_str("[timeouts]\nact_timeout_ms = \"soon\"").is_err());
    }
}
