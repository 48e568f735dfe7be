// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error type for loading [`ScoreApiConfig`](crate::ScoreApiConfig) from the environment.

/// Errors that can occur while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable was set but its value could not be used.
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        /// Variable name
        var: &'static str,
        /// Raw value as read from the environment
        value: String,
        /// Why the value was rejected
        reason: String,
    },
}

impl ConfigError {
    /// Create an `InvalidValue` error.
    pub fn invalid_value(var: &'static str, value: impl Into<String>, reason: impl ToString) -> Self {
        ConfigError::InvalidValue {
            var,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}
