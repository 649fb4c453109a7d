// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::{PostbenchConfig, Transport};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &PostbenchConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    match config.server.transport {
        Transport::Unix => {
            if config.server.socket_path.trim().is_empty() {
                errors.push(ConfigError::Validation {
                    message: "server.socket_path must not be empty when transport is `unix`"
                        .to_string(),
                });
            }
        }
        Transport::Tcp => {
            let host = config.server.host.trim();
            let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
            let is_valid_hostname = !host.is_empty()
                && host
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
            if !is_valid_ip && !is_valid_hostname {
                errors.push(ConfigError::Validation {
                    message: format!(
                        "server.host `{host}` is not a valid IP address or hostname"
                    ),
                });
            }
        }
    }

    if config.writer.queue_capacity == 0 {
        errors.push(ConfigError::Validation {
            message: "writer.queue_capacity must be at least 1".to_string(),
        });
    }

    let level = config.log.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
