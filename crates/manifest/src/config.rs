//! Per-test configuration.
//!
//! Tests describe the emulated environment in a small TOML document:
//!
//! ```toml
//! sdk = 19
//! manifest = "none"          # or "default", or a path
//! resource_dir = "res-alt"   # omitted keys keep the build system's value
//! package_name = "com.example.test"
//! libraries = ["lib/a", "lib/b"]
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use umbra_sdk::ApiLevel;

use crate::error::ConfigError;

#[cfg(test)]
mod tests;

/// Manifest choice for one test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ManifestSetting {
	/// Whatever the resolver finds.
	#[default]
	Default,
	/// Run without a manifest.
	None,
	/// Explicit manifest name, looked up on the resource search roots.
	Path(String),
}

impl From<String> for ManifestSetting {
	fn from(value: String) -> Self {
		match value.as_str() {
			"default" => Self::Default,
			"none" => Self::None,
			_ => Self::Path(value),
		}
	}
}

/// Configuration consumed per test execution.
///
/// `None` in an override field means "keep the resolver's value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestConfig {
	/// Emulated API level; unset runs on the fallback level.
	pub sdk: Option<u16>,
	pub manifest: ManifestSetting,
	pub resource_dir: Option<String>,
	pub asset_dir: Option<String>,
	pub package_name: Option<String>,
	/// Library bundle directories, in declaration order.
	pub libraries: Vec<String>,
}

impl TestConfig {
	pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}

	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let source = fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml(&source)
	}

	pub fn api_level(&self) -> Option<ApiLevel> {
		self.sdk.map(ApiLevel::new)
	}

	pub fn with_sdk(mut self, level: ApiLevel) -> Self {
		self.sdk = Some(level.get());
		self
	}

	/// Layers `other` over `self`: every value `other` sets explicitly wins.
	pub fn overlay(&self, other: &TestConfig) -> TestConfig {
		fn pick<T: Clone>(base: &Option<T>, top: &Option<T>) -> Option<T> {
			top.clone().or_else(|| base.clone())
		}

		TestConfig {
			sdk: other.sdk.or(self.sdk),
			manifest: match &other.manifest {
				ManifestSetting::Default => self.manifest.clone(),
				explicit => explicit.clone(),
			},
			resource_dir: pick(&self.resource_dir, &other.resource_dir),
			asset_dir: pick(&self.asset_dir, &other.asset_dir),
			package_name: pick(&self.package_name, &other.package_name),
			libraries: if other.libraries.is_empty() {
				self.libraries.clone()
			} else {
				other.libraries.clone()
			},
		}
	}
}
