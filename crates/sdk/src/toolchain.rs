use std::fmt;
use std::str::FromStr;

use crate::error::SdkError;

/// Environment variable overriding the detected host toolchain version.
pub const HOST_TOOLCHAIN_ENV: &str = "UMBRA_HOST_TOOLCHAIN";

/// `major.minor` version of the host toolchain that runs platform artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToolchainVersion {
	pub major: u16,
	pub minor: u16,
}

impl ToolchainVersion {
	/// Assumed host version when nothing is configured.
	pub const DEFAULT: Self = Self::new(1, 8);

	pub const fn new(major: u16, minor: u16) -> Self {
		Self { major, minor }
	}

	/// Reads [`HOST_TOOLCHAIN_ENV`], falling back to [`Self::DEFAULT`].
	///
	/// An unparsable value is reported and ignored.
	pub fn detect() -> Self {
		match std::env::var(HOST_TOOLCHAIN_ENV) {
			Ok(raw) => raw.parse().unwrap_or_else(|err| {
				tracing::warn!("ignoring {}={:?}: {}", HOST_TOOLCHAIN_ENV, raw, err);
				Self::DEFAULT
			}),
			Err(_) => Self::DEFAULT,
		}
	}
}

impl FromStr for ToolchainVersion {
	type Err = SdkError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = || SdkError::InvalidToolchainVersion(s.to_string());
		let trimmed = s.trim();
		let mut parts = trimmed.splitn(3, '.');
		let major = parts.next().unwrap_or_default().parse().map_err(|_| invalid())?;
		let minor = parts.next().map_or(Ok(0), |minor| minor.parse::<u16>()).map_err(|_| invalid())?;
		// A patch component is accepted and dropped.
		if let Some(patch) = parts.next() {
			patch.parse::<u16>().map_err(|_| invalid())?;
		}
		Ok(Self { major, minor })
	}
}

impl fmt::Display for ToolchainVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.major, self.minor)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_major_minor() {
		assert_eq!("1.7".parse::<ToolchainVersion>().unwrap(), ToolchainVersion::new(1, 7));
		assert_eq!(" 11 ".parse::<ToolchainVersion>().unwrap(), ToolchainVersion::new(11, 0));
	}

	#[test]
	fn patch_component_is_ignored() {
		assert_eq!("1.8.0".parse::<ToolchainVersion>().unwrap(), ToolchainVersion::new(1, 8));
		assert_eq!("11.0.2".parse::<ToolchainVersion>().unwrap(), ToolchainVersion::new(11, 0));
	}

	#[test]
	fn rejects_garbage() {
		assert!(matches!("one.eight".parse::<ToolchainVersion>(), Err(SdkError::InvalidToolchainVersion(_))));
		assert!(matches!("1.8.x".parse::<ToolchainVersion>(), Err(SdkError::InvalidToolchainVersion(_))));
	}

	#[test]
	fn orders_numerically() {
		assert!(ToolchainVersion::new(1, 10) > ToolchainVersion::new(1, 8));
		assert!(ToolchainVersion::new(11, 0) > ToolchainVersion::new(1, 8));
	}
}
