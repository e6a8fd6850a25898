//! NFM-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, NofomoError>;

/// Top-level error type for the NOFOMO dashboard core.
#[derive(Debug, Error)]
pub enum NofomoError {
    #[error("[NFM-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[NFM-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[NFM-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[NFM-2001] fixture {key} failed to load: {details}")]
    Fixture { key: String, details: String },

    #[error("[NFM-2002] unknown view command: {input}")]
    UnknownCommand { input: String },

    #[error("[NFM-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[NFM-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[NFM-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl NofomoError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "NFM-1001",
            Self::MissingConfig { .. } => "NFM-1002",
            Self::ConfigParse { .. } => "NFM-1003",
            Self::Fixture { .. } => "NFM-2001",
            Self::UnknownCommand { .. } => "NFM-2002",
            Self::Serialization { .. } => "NFM-2101",
            Self::Io { .. } => "NFM-3002",
            Self::Runtime { .. } => "NFM-3900",
        }
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for NofomoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for NofomoError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_unique() {
        let errors: Vec<NofomoError> = vec![
            NofomoError::InvalidConfig {
                details: String::new(),
            },
            NofomoError::MissingConfig {
                path: PathBuf::new(),
            },
            NofomoError::ConfigParse {
                context: "",
                details: String::new(),
            },
            NofomoError::Fixture {
                key: String::new(),
                details: String::new(),
            },
            NofomoError::UnknownCommand {
                input: String::new(),
            },
            NofomoError::Serialization {
                context: "",
                details: String::new(),
            },
            NofomoError::Io {
                path: PathBuf::new(),
                source: std::io::Error::other("test"),
            },
            NofomoError::Runtime {
                details: String::new(),
            },
        ];

        let codes: Vec<&str> = errors.iter().map(NofomoError::code).collect();
        let unique: std::collections::HashSet<&&str> = codes.iter().collect();
        assert_eq!(
            codes.len(),
            unique.len(),
            "error codes must be unique: {codes:?}"
        );
    }

    #[test]
    fn display_carries_code_prefix() {
        let err = NofomoError::Fixture {
            key: "portfolio".to_string(),
            details: "backend offline".to_string(),
        };
        let text = err.to_string();
        assert!(text.starts_with("[NFM-2001]"), "{text}");
        assert!(text.contains("portfolio"));
    }

    #[test]
    fn io_helper_keeps_path_and_code() {
        let err = NofomoError::io("<stdin>", std::io::Error::other("bad bytes"));
        assert_eq!(err.code(), "NFM-3002");
        assert!(err.to_string().contains("<stdin>"));
    }

    #[test]
    fn toml_errors_convert_to_config_parse() {
        let parse: std::result::Result<toml::Value, _> = toml::from_str("= broken");
        let err: NofomoError = parse.unwrap_err().into();
        assert_eq!(err.code(), "NFM-1003");
    }
}
