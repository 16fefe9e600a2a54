//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or a value of the wrong shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// A service URL is not an absolute http(s) URL.
	#[error("invalid URL for '{field}': {url} (expected http or https)")]
	InvalidUrl {
		/// Dotted key of the offending field.
		field: String,
		/// The rejected URL.
		url: String,
	},

	/// A value parsed but is out of its allowed range.
	#[error("invalid value for '{field}': {reason}")]
	InvalidValue {
		/// Dotted key of the offending field.
		field: &'static str,
		/// What is wrong with it.
		reason: String,
	},
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
