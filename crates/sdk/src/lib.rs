//! Emulated platform API levels.
//!
//! [`SdkVersionMatrix`] maps each supported [`ApiLevel`] to the platform
//! release it emulates, after dropping levels the host toolchain cannot run.

mod error;
mod level;
pub mod matrix;
mod toolchain;

pub use error::{Result, SdkError};
pub use level::ApiLevel;
pub use matrix::{
	BUILTIN_SDKS, ExcludedSdk, FALLBACK_SDK_VERSION, MAX_SDK_VERSION, PlatformArtifact, SdkDef, SdkVersion, SdkVersionMatrix,
};
pub use toolchain::{HOST_TOOLCHAIN_ENV, ToolchainVersion};
