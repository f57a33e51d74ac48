//! Resolver backed by the properties document a build system drops next to
//! the test resources.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, info};

use crate::config::{ManifestSetting, TestConfig};
use crate::descriptor::{FsFile, ManifestDescriptor};
use crate::error::{ManifestError, Result};
use crate::factory::{DEFAULT_PRIORITY, ManifestFactory, UNSUITABLE_PRIORITY};


/// File name searched for on the resource roots.
pub const PROPERTIES_FILE: &str = "test_config.toml";

/// Merged bundle locations written by the build system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildSystemProperties {
	pub android_merged_manifest: Option<String>,
	pub android_merged_resources: Option<String>,
	pub android_merged_assets: Option<String>,
	pub android_custom_package: Option<String>,
}

impl BuildSystemProperties {
	pub fn parse(source: &str) -> std::result::Result<Self, toml::de::Error> {
		toml::from_str(source)
	}
}

pub struct BuildSystemManifestFactory {
	properties: Option<BuildSystemProperties>,
	search_roots: Vec<PathBuf>,
}

impl BuildSystemManifestFactory {
	pub fn new(properties: Option<BuildSystemProperties>, search_roots: Vec<PathBuf>) -> Self {
		Self { properties, search_roots }
	}

	/// Reads [`PROPERTIES_FILE`] from the first search root that has one.
	///
	/// Finding none leaves the factory unsuitable.
	pub fn discover(search_roots: Vec<PathBuf>) -> Result<Self> {
		let mut properties = None;
		for root in &search_roots {
			let path = root.join(PROPERTIES_FILE);
			let source = match fs::read_to_string(&path) {
				Ok(source) => source,
				Err(error) if error.kind() == ErrorKind::NotFound => continue,
				Err(error) => return Err(ManifestError::Io { path, error }),
			};
			debug!("build-system properties found at {}", path.display());
			properties = Some(BuildSystemProperties::parse(&source).map_err(|error| ManifestError::Properties { path, error })?);
			break;
		}
		Ok(Self::new(properties, search_roots))
	}

	pub fn properties(&self) -> Option<&BuildSystemProperties> {
		self.properties.as_ref()
	}

	fn resolve_file(&self, name: &str) -> Result<FsFile> {
		self.search_roots
			.iter()
			.map(|root| root.join(name))
			.find(|candidate| candidate.exists())
			.map(FsFile::Path)
			.ok_or_else(|| ManifestError::ResourceNotFound(name.to_string()))
	}
}

fn location(value: Option<&String>) -> Result<Option<FsFile>> {
	value.map(|v| FsFile::parse(v)).transpose()
}

impl ManifestFactory for BuildSystemManifestFactory {
	fn name(&self) -> &'static str {
		"build-system"
	}

	fn priority(&self) -> i32 {
		if self.properties.is_some() {
			DEFAULT_PRIORITY
		} else {
			UNSUITABLE_PRIORITY
		}
	}

	fn identify(&self, config: &TestConfig) -> Result<ManifestDescriptor> {
		let Some(properties) = &self.properties else {
			return Err(ManifestError::UnsuitablePlugin(self.name()));
		};

		let mut manifest_file = properties.android_merged_manifest.as_ref().map(|p| FsFile::Path(PathBuf::from(p)));
		let mut resources_root = location(properties.android_merged_resources.as_ref())?;
		let mut assets_root = location(properties.android_merged_assets.as_ref())?;
		let mut package_name = properties.android_custom_package.clone();

		match &config.manifest {
			ManifestSetting::Default => {}
			ManifestSetting::None => info!("manifest = none specified while using the build-system properties, ignoring"),
			ManifestSetting::Path(name) => manifest_file = Some(self.resolve_file(name)?),
		}
		if let Some(dir) = &config.resource_dir {
			resources_root = Some(self.resolve_file(dir)?);
		}
		if let Some(dir) = &config.asset_dir {
			assets_root = Some(self.resolve_file(dir)?);
		}
		if let Some(name) = &config.package_name {
			package_name = Some(name.clone());
		}
		if !config.libraries.is_empty() {
			info!("libraries specified while using the build-system properties, ignoring");
		}

		Ok(ManifestDescriptor {
			manifest_file,
			resources_root,
			assets_root,
			package_name,
			library_dirs: Vec::new(),
		})
	}
}
