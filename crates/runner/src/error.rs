use thiserror::Error;
use umbra_dispatch::{RegistryError, ScopeError};
use umbra_manifest::ManifestError;
use umbra_sdk::SdkError;

/// Reasons a test cannot start; each aborts the test before its body runs.
#[derive(Debug, Error)]
pub enum SandboxError {
	#[error(transparent)]
	Sdk(#[from] SdkError),

	#[error(transparent)]
	Manifest(#[from] ManifestError),

	#[error(transparent)]
	Registry(#[from] RegistryError),

	#[error(transparent)]
	Scope(#[from] ScopeError),
}

pub type Result<T> = std::result::Result<T, SandboxError>;
