//! Resolver plugin contract.

use crate::config::TestConfig;
use crate::descriptor::ManifestDescriptor;
use crate::error::Result;

pub const DEFAULT_PRIORITY: i32 = 0;
pub const BUCK_PRIORITY: i32 = DEFAULT_PRIORITY;
pub const GRADLE_PRIORITY: i32 = DEFAULT_PRIORITY;
pub const MAVEN_PRIORITY: i32 = -2;
/// Reported by resolvers that already know they cannot serve the environment.
pub const UNSUITABLE_PRIORITY: i32 = i32::MIN;

/// Detects one build system's output and describes the bundle under test.
pub trait ManifestFactory: Send + Sync {
	/// Short name used in diagnostics.
	fn name(&self) -> &'static str;

	/// Higher runs first.
	fn priority(&self) -> i32;

	/// Produces the descriptor for `config`.
	///
	/// Returns [`ManifestError::UnsuitablePlugin`](crate::ManifestError::UnsuitablePlugin)
	/// when this resolver does not apply to the current environment.
	fn identify(&self, config: &TestConfig) -> Result<ManifestDescriptor>;
}
