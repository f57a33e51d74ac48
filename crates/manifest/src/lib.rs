//! Per-test configuration and manifest bundle resolution.
//!
//! The engine never parses manifests or resources itself. It takes a
//! [`TestConfig`], asks a [`ManifestResolver`] which of its registered
//! [`ManifestFactory`] plugins applies, and hands the resulting
//! [`ManifestDescriptor`] to the test.

pub mod build_system;
pub mod config;
mod descriptor;
pub mod directory;
mod error;
pub mod factory;
pub mod resolver;

pub use build_system::{BuildSystemManifestFactory, BuildSystemProperties};
pub use config::{ManifestSetting, TestConfig};
pub use descriptor::{FsFile, ManifestDescriptor};
pub use directory::DirectoryManifestFactory;
pub use error::{ConfigError, ManifestError, Result};
pub use factory::ManifestFactory;
pub use resolver::ManifestResolver;
