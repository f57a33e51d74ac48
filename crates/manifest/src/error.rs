//! Error types for configuration loading and manifest resolution.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading a per-test configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("config parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},
}

/// Errors raised while resolving a manifest bundle.
#[derive(Debug, Error)]
pub enum ManifestError {
	/// The resolver cannot serve this environment; the coordinator tries the next one.
	#[error("manifest resolver {0} is not usable in this environment")]
	UnsuitablePlugin(&'static str),

	/// Every registered resolver declared itself unsuitable.
	#[error("no suitable manifest resolver (tried: {})", tried.join(", "))]
	NoSuitableResolver {
		/// Resolver names, in the order they were tried.
		tried: Vec<&'static str>,
	},

	/// An explicit override did not match any resource search root.
	#[error("couldn't find '{0}'")]
	ResourceNotFound(String),

	#[error("invalid resource URL {value:?}: {error}")]
	InvalidUrl {
		value: String,
		error: url::ParseError,
	},

	/// The build-system properties document exists but does not parse.
	#[error("malformed build-system properties {path}: {error}")]
	Properties {
		path: PathBuf,
		error: toml::de::Error,
	},

	#[error("I/O error reading {path}: {error}")]
	Io {
		path: PathBuf,
		error: std::io::Error,
	},
}

impl ManifestError {
	/// True for the recoverable "try the next resolver" condition.
	pub fn is_unsuitable(&self) -> bool {
		matches!(self, Self::UnsuitablePlugin(_))
	}
}

/// Result type for manifest resolution.
pub type Result<T> = std::result::Result<T, ManifestError>;
