//! Host-filtered table of emulated SDK versions.
//!
//! The table is declared once as [`BUILTIN_SDKS`] and filtered at construction
//! against the host toolchain: an entry whose minimum toolchain is newer than
//! the host's is dropped, and a diagnostic naming the level is emitted and kept
//! in [`SdkVersionMatrix::excluded`]. The filtered matrix never changes after
//! construction.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

use crate::error::{Result, SdkError};
use crate::{ApiLevel, ToolchainVersion};

/// Level used when a test does not pick one.
pub const FALLBACK_SDK_VERSION: ApiLevel = ApiLevel::JELLY_BEAN;

/// Highest level supported by the [global](SdkVersionMatrix::global) matrix,
/// `None` when the host filtered every level out.
pub static MAX_SDK_VERSION: LazyLock<Option<ApiLevel>> = LazyLock::new(|| SdkVersionMatrix::global().max_supported());

/// Static declaration of one table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SdkDef {
	pub api_level: ApiLevel,
	pub platform_version: &'static str,
	pub framework_build_revision: &'static str,
	pub min_toolchain: ToolchainVersion,
	pub code_name: &'static str,
}

impl SdkDef {
	pub const fn new(
		api_level: ApiLevel,
		platform_version: &'static str,
		framework_build_revision: &'static str,
		min_toolchain: ToolchainVersion,
		code_name: &'static str,
	) -> Self {
		Self {
			api_level,
			platform_version,
			framework_build_revision,
			min_toolchain,
			code_name,
		}
	}
}

const TC_1_6: ToolchainVersion = ToolchainVersion::new(1, 6);
const TC_1_7: ToolchainVersion = ToolchainVersion::new(1, 7);
const TC_1_8: ToolchainVersion = ToolchainVersion::new(1, 8);

/// Every level the engine knows how to emulate.
pub const BUILTIN_SDKS: &[SdkDef] = &[
	SdkDef::new(ApiLevel::JELLY_BEAN, "4.1.2_r1", "0", TC_1_6, "REL"),
	SdkDef::new(ApiLevel::JELLY_BEAN_MR1, "4.2.2_r1.2", "0", TC_1_6, "REL"),
	SdkDef::new(ApiLevel::JELLY_BEAN_MR2, "4.3_r2", "0", TC_1_6, "REL"),
	SdkDef::new(ApiLevel::KITKAT, "4.4_r1", "1", TC_1_7, "REL"),
	SdkDef::new(ApiLevel::LOLLIPOP, "5.0.0_r2", "1", TC_1_7, "REL"),
	SdkDef::new(ApiLevel::LOLLIPOP_MR1, "5.1.1_r9", "1", TC_1_7, "REL"),
	SdkDef::new(ApiLevel::M, "6.0.1_r3", "0", TC_1_7, "REL"),
	SdkDef::new(ApiLevel::N, "7.0.0_r1", "0", TC_1_8, "REL"),
	SdkDef::new(ApiLevel::N_MR1, "7.1.0_r7", "0", TC_1_8, "REL"),
	SdkDef::new(ApiLevel::O, "o-preview-4", "0", TC_1_8, "O"),
];

/// Platform metadata for one supported API level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SdkVersion {
	pub api_level: ApiLevel,
	pub platform_version: &'static str,
	pub framework_build_revision: &'static str,
	pub code_name: &'static str,
}

impl SdkVersion {
	/// Coordinates of the platform jar built for this level.
	pub fn artifact(&self) -> PlatformArtifact {
		PlatformArtifact {
			group_id: PlatformArtifact::GROUP_ID,
			artifact_id: PlatformArtifact::ARTIFACT_ID,
			version: format!("{}-robolectric-{}", self.platform_version, self.framework_build_revision),
			classifier: None,
		}
	}
}

impl PartialOrd for SdkVersion {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for SdkVersion {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self.api_level.cmp(&other.api_level)
	}
}

impl fmt::Display for SdkVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.api_level.fmt(f)
	}
}

/// Dependency coordinates of a platform jar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformArtifact {
	pub group_id: &'static str,
	pub artifact_id: &'static str,
	pub version: String,
	pub classifier: Option<String>,
}

impl PlatformArtifact {
	pub const GROUP_ID: &'static str = "org.robolectric";
	pub const ARTIFACT_ID: &'static str = "android-all";
}

impl fmt::Display for PlatformArtifact {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)?;
		if let Some(classifier) = &self.classifier {
			write!(f, ":{classifier}")?;
		}
		Ok(())
	}
}

/// A declared level dropped because the host toolchain is too old.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcludedSdk {
	pub api_level: ApiLevel,
	pub required: ToolchainVersion,
	pub host: ToolchainVersion,
}

impl fmt::Display for ExcludedSdk {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} not supported on toolchain {} (it requires {})", self.api_level, self.host, self.required)
	}
}

/// Immutable API level -> [`SdkVersion`] table for one host toolchain.
#[derive(Debug, Clone)]
pub struct SdkVersionMatrix {
	host: ToolchainVersion,
	entries: BTreeMap<ApiLevel, SdkVersion>,
	excluded: Vec<ExcludedSdk>,
}

static GLOBAL: LazyLock<SdkVersionMatrix> = LazyLock::new(|| SdkVersionMatrix::for_host(ToolchainVersion::detect()));

impl SdkVersionMatrix {
	/// Process-wide matrix for the detected host toolchain.
	pub fn global() -> &'static SdkVersionMatrix {
		&GLOBAL
	}

	/// Builds the [`BUILTIN_SDKS`] matrix for an explicit host toolchain.
	pub fn for_host(host: ToolchainVersion) -> Self {
		Self::from_defs(BUILTIN_SDKS, host)
	}

	/// Builds a matrix from arbitrary declarations.
	///
	/// A level declared twice keeps its first declaration.
	pub fn from_defs(defs: &[SdkDef], host: ToolchainVersion) -> Self {
		let mut entries = BTreeMap::new();
		let mut excluded = Vec::new();

		for def in defs {
			if host < def.min_toolchain {
				let skipped = ExcludedSdk {
					api_level: def.api_level,
					required: def.min_toolchain,
					host,
				};
				tracing::info!("{}", skipped);
				excluded.push(skipped);
				continue;
			}
			if entries.contains_key(&def.api_level) {
				tracing::warn!("duplicate SDK declaration for {}, keeping the first", def.api_level);
				continue;
			}
			entries.insert(
				def.api_level,
				SdkVersion {
					api_level: def.api_level,
					platform_version: def.platform_version,
					framework_build_revision: def.framework_build_revision,
					code_name: def.code_name,
				},
			);
		}

		Self { host, entries, excluded }
	}

	pub fn host(&self) -> ToolchainVersion {
		self.host
	}

	pub fn supported_api_levels(&self) -> BTreeSet<ApiLevel> {
		self.entries.keys().copied().collect()
	}

	pub fn is_supported(&self, level: ApiLevel) -> bool {
		self.entries.contains_key(&level)
	}

	/// Looks up the metadata for `level`.
	pub fn resolve(&self, level: ApiLevel) -> Result<&SdkVersion> {
		self.entries.get(&level).ok_or(SdkError::UnsupportedApiLevel(level))
	}

	/// Highest supported level, if any survived filtering.
	pub fn max_supported(&self) -> Option<ApiLevel> {
		self.entries.keys().next_back().copied()
	}

	/// Metadata for [`FALLBACK_SDK_VERSION`].
	pub fn fallback(&self) -> Result<&SdkVersion> {
		self.resolve(FALLBACK_SDK_VERSION)
	}

	/// Levels dropped at construction, in declaration order.
	pub fn excluded(&self) -> &[ExcludedSdk] {
		&self.excluded
	}

	pub fn iter(&self) -> impl Iterator<Item = &SdkVersion> {
		self.entries.values()
	}
}
