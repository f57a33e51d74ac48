//! The resolved manifest bundle handed to the engine.

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{ManifestError, Result};

/// Location of a bundle part: a plain path or a URL into an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsFile {
	Path(PathBuf),
	Url(Url),
}

impl FsFile {
	/// Parses a build-system location; values starting with `jar` are URLs.
	pub fn parse(value: &str) -> Result<Self> {
		if value.starts_with("jar") {
			Url::parse(value).map(Self::Url).map_err(|error| ManifestError::InvalidUrl {
				value: value.to_string(),
				error,
			})
		} else {
			Ok(Self::Path(PathBuf::from(value)))
		}
	}

	pub fn as_path(&self) -> Option<&Path> {
		match self {
			Self::Path(path) => Some(path),
			Self::Url(_) => None,
		}
	}
}

impl fmt::Display for FsFile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Path(path) => write!(f, "{}", path.display()),
			Self::Url(url) => write!(f, "{url}"),
		}
	}
}

impl From<PathBuf> for FsFile {
	fn from(path: PathBuf) -> Self {
		Self::Path(path)
	}
}

/// The app, service or library under test: manifest, resources, assets,
/// optional package override and dependency libraries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDescriptor {
	pub manifest_file: Option<FsFile>,
	pub resources_root: Option<FsFile>,
	pub assets_root: Option<FsFile>,
	pub package_name: Option<String>,
	pub library_dirs: Vec<FsFile>,
}

impl ManifestDescriptor {
	/// A descriptor for tests that run without any manifest.
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn has_manifest(&self) -> bool {
		self.manifest_file.is_some()
	}
}
