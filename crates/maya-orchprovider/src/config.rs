// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for maya-ctl and embedding callers.

use crate::engine::JIVA_ENGINE;

/// Settings that influence engine selection and output rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtlConfig {
    /// Engine used when a claim carries no volume type.
    pub default_engine: String,
    /// Pretty-print JSON output.
    pub pretty_output: bool,
}

impl Default for CtlConfig {
    fn default() -> Self {
        Self {
            default_engine: JIVA_ENGINE.to_string(),
            pretty_output: true,
        }
    }
}

impl CtlConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `MAYA_DEFAULT_ENGINE`: Engine for untyped claims (default: "jiva")
    /// - `MAYA_PRETTY_OUTPUT`: Pretty-print JSON output (default: "true")
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_engine = match lookup("MAYA_DEFAULT_ENGINE") {
            Some(engine) if engine.trim().is_empty() => {
                return Err(ConfigError::EmptyValue("MAYA_DEFAULT_ENGINE"));
            }
            Some(engine) => engine.trim().to_lowercase(),
            None => JIVA_ENGINE.to_string(),
        };

        let pretty_output = match lookup("MAYA_PRETTY_OUTPUT") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidBool {
                key: "MAYA_PRETTY_OUTPUT",
                value: raw,
            })?,
            None => true,
        };

        Ok(Self {
            default_engine,
            pretty_output,
        })
    }

    /// Set the engine used for untyped claims.
    pub fn with_default_engine(mut self, engine: impl Into<String>) -> Self {
        self.default_engine = engine.into();
        self
    }

    /// Enable or disable pretty-printed output.
    pub fn with_pretty_output(mut self, pretty: bool) -> Self {
        self.pretty_output = pretty;
        self
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but blank.
    #[error("environment variable {0} is set but empty")]
    EmptyValue(&'static str),
    /// A boolean variable holds something other than true/false.
    #[error("invalid boolean for {key}: {value}")]
    InvalidBool { key: &'static str, value: String },
}
