use crate::ApiLevel;

/// Errors raised while resolving emulated SDK versions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SdkError {
	/// The level is not in the filtered matrix.
	#[error("{0} is not supported on this host")]
	UnsupportedApiLevel(ApiLevel),

	#[error("invalid toolchain version {0:?} (expected `major.minor`)")]
	InvalidToolchainVersion(String),
}

/// Result type for SDK resolution.
pub type Result<T> = std::result::Result<T, SdkError>;
