//! Centralized error handling with typed error enums.
//!
//! Validation errors fail fast at construction or configuration update and
//! carry `help()` text for client-visible messages. Runtime queries never
//! error on degenerate input (empty text, unknown session, no matches); they
//! return empty result sets instead.

use std::path::PathBuf;
use thiserror::Error;

/// A specialized Result type for suggest-mcp operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()`
/// at the binary boundary.
pub type Result<T> = anyhow::Result<T>;

/// Errors raised while validating engine configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The combine strategy string is not one of the supported values.
    #[error("combine_strategy must be 'max' or 'sum', got '{value}'")]
    InvalidCombineStrategy { value: String },

    /// A numeric parameter fell outside its permitted closed range.
    #[error("{param} must be between {min} and {max}, got {value}")]
    OutOfRange {
        param: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A numeric parameter fell below its permitted minimum.
    #[error("{param} must be at least {min}, got {value}")]
    BelowMinimum {
        param: &'static str,
        value: f64,
        min: f64,
    },
}

impl ConfigError {
    /// Get help text for this error.
    pub fn help(&self) -> Option<&'static str> {
        match self {
            Self::InvalidCombineStrategy { .. } => Some(
                "Supported strategies:\n\
                 • 'max' keeps the best per-window score for a tool\n\
                 • 'sum' accumulates decayed per-window scores",
            ),
            Self::OutOfRange { .. } | Self::BelowMinimum { .. } => {
                Some("Check the configure parameters against their documented ranges.")
            }
        }
    }

    /// Get a user-friendly message with optional help text appended.
    pub fn user_message(&self) -> String {
        match self.help() {
            Some(help) => format!("{self}\n\n{help}"),
            None => self.to_string(),
        }
    }
}

/// Errors raised while loading a tool catalog from disk.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not a valid JSON array of tool specs.
    #[error("failed to parse catalog file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    /// Get help text for this error.
    pub fn help(&self) -> Option<&'static str> {
        match self {
            Self::Io { .. } => Some("Check that the path exists and is readable."),
            Self::Parse { .. } => Some(
                "The catalog must be a JSON array of objects with a string\n\
                 'name' and optional 'description', 'keywords', 'aliases',\n\
                 'locales', and 'tags' fields.",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn invalid_strategy_message_names_the_value() {
        let err = ConfigError::InvalidCombineStrategy {
            value: "mean".to_string(),
        };
        check!(err.to_string().contains("mean"));
        check!(err.user_message().contains("'sum' accumulates"));
    }

    #[test]
    fn out_of_range_message_names_param_and_bounds() {
        let err = ConfigError::OutOfRange {
            param: "top_k",
            value: 50.0,
            min: 1.0,
            max: 20.0,
        };
        let msg = err.to_string();
        check!(msg.contains("top_k"));
        check!(msg.contains("20"));
    }

    #[test]
    fn catalog_errors_carry_help() {
        let err = CatalogError::Io {
            path: PathBuf::from("/nope/tools.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        check!(err.help().is_some());
        check!(err.to_string().contains("/nope/tools.json"));
    }
}
