// Copyright © 2024 WikiSEO. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Error Handling for WikiSEO
//!
//! This module defines the error type shared by the configuration layer,
//! the generators and the command-line interface. The `thiserror` crate is
//! used to keep the variants and their messages in one place.
//!
//! Expected absence of data (a page without categories, an unmatched
//! breadcrumb mapping, a title that cannot be resolved) is never an error:
//! generators simply emit nothing.

use std::path::PathBuf;
use thiserror::Error;

/// A unified result type for the WikiSEO library.
pub type Result<T> = std::result::Result<T, SeoError>;

/// The main error type for WikiSEO.
#[derive(Error, Debug)]
pub enum SeoError {
    /// Error related to configuration loading or validation.
    ///
    /// Raised for unreadable or unparsable configuration files, invalid
    /// site settings and unknown override keys.
    #[error("Configuration error: {message}.")]
    ConfigError {
        /// Detailed description of the configuration error.
        message: String,
        /// Optional path of the configuration file that caused the error.
        path: Option<PathBuf>,
    },

    /// Error raised while serializing a JSON-LD payload.
    #[error("Serialization error in `{fragment}`: {source}")]
    SerializationError {
        /// Key of the head fragment being built.
        fragment: String,
        /// The underlying serializer error.
        #[source]
        source: serde_json::Error,
    },

    /// IO error encountered while reading input files.
    #[error("File IO error at `{path:?}`: {source}")]
    IOError {
        /// Path associated with the IO error.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failure writing command output.
    #[error("Failed to write output: {source}")]
    OutputError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl SeoError {
    /// Creates a `ConfigError` with a specific message.
    ///
    /// # Parameters
    /// - `message`: A description of the configuration error.
    /// - `path`: Optional path of the configuration file causing the error.
    pub fn config_error<S: Into<String>>(
        message: S,
        path: Option<PathBuf>,
    ) -> Self {
        SeoError::ConfigError {
            message: message.into(),
            path,
        }
    }

    /// Creates a `SerializationError` for the named head fragment.
    pub fn serialization_error<S: Into<String>>(
        fragment: S,
        source: serde_json::Error,
    ) -> Self {
        SeoError::SerializationError {
            fragment: fragment.into(),
            source,
        }
    }

    /// Wraps an IO error as an `IOError` variant with the specified path.
    pub fn io_error(path: PathBuf, source: std::io::Error) -> Self {
        SeoError::IOError { path, source }
    }

    /// Wraps an IO error raised while writing command output.
    pub fn output_error(source: std::io::Error) -> Self {
        SeoError::OutputError { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err = SeoError::config_error(
            "article_path must contain `$1`",
            Some(PathBuf::from("seo.toml")),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: article_path must contain `$1`."
        );
        assert!(matches!(
            err,
            SeoError::ConfigError { path: Some(_), .. }
        ));
    }

    #[test]
    fn test_output_error_message() {
        let io = std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "pipe closed",
        );
        let err = SeoError::output_error(io);
        assert_eq!(err.to_string(), "Failed to write output: pipe closed");
    }

    #[test]
    fn test_serialization_error_names_fragment() {
        let source = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err();
        let err = SeoError::serialization_error("jsonld-metadata", source);
        assert!(err.to_string().contains("`jsonld-metadata`"));
    }
}
