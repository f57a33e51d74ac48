//! Conventional project layout resolver.
//!
//! Everything is looked up relative to one base directory: the manifest as
//! `AndroidManifest.xml`, resources under `res/`, assets under `assets/`.
//! It always applies, so it runs last.

use std::path::PathBuf;

use tracing::warn;

use crate::config::{ManifestSetting, TestConfig};
use crate::descriptor::{FsFile, ManifestDescriptor};
use crate::error::Result;
use crate::factory::{MAVEN_PRIORITY, ManifestFactory};

pub const DEFAULT_MANIFEST_NAME: &str = "AndroidManifest.xml";
pub const DEFAULT_RES_FOLDER: &str = "res";
pub const DEFAULT_ASSET_FOLDER: &str = "assets";

pub struct DirectoryManifestFactory {
	base: PathBuf,
}

impl DirectoryManifestFactory {
	pub fn new(base: impl Into<PathBuf>) -> Self {
		Self { base: base.into() }
	}
}

impl ManifestFactory for DirectoryManifestFactory {
	fn name(&self) -> &'static str {
		"directory"
	}

	fn priority(&self) -> i32 {
		MAVEN_PRIORITY
	}

	fn identify(&self, config: &TestConfig) -> Result<ManifestDescriptor> {
		let manifest_file = match &config.manifest {
			ManifestSetting::None => None,
			ManifestSetting::Default => Some(self.base.join(DEFAULT_MANIFEST_NAME)),
			ManifestSetting::Path(name) => Some(self.base.join(name)),
		};
		if let Some(path) = &manifest_file
			&& !path.exists()
		{
			warn!("no manifest file found at {}", path.display());
		}

		let dir = |value: &Option<String>, default: &str| FsFile::Path(self.base.join(value.as_deref().unwrap_or(default)));
		Ok(ManifestDescriptor {
			manifest_file: manifest_file.map(FsFile::Path),
			resources_root: Some(dir(&config.resource_dir, DEFAULT_RES_FOLDER)),
			assets_root: Some(dir(&config.asset_dir, DEFAULT_ASSET_FOLDER)),
			package_name: config.package_name.clone(),
			library_dirs: config.libraries.iter().map(|lib| FsFile::Path(self.base.join(lib))).collect(),
		})
	}
}
