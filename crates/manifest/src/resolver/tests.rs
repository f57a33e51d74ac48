use pretty_assertions::assert_eq;

use super::*;
use crate::build_system::BuildSystemManifestFactory;
use crate::descriptor::FsFile;
use crate::directory::DirectoryManifestFactory;
use crate::factory::{DEFAULT_PRIORITY, MAVEN_PRIORITY};

struct Fixed {
	name: &'static str,
	priority: i32,
	package: Option<&'static str>,
}

impl ManifestFactory for Fixed {
	fn name(&self) -> &'static str {
		self.name
	}

	fn priority(&self) -> i32 {
		self.priority
	}

	fn identify(&self, _config: &TestConfig) -> Result<ManifestDescriptor> {
		match self.package {
			Some(package) => Ok(ManifestDescriptor {
				package_name: Some(package.to_string()),
				..ManifestDescriptor::empty()
			}),
			None => Err(ManifestError::UnsuitablePlugin(self.name)),
		}
	}
}

fn fixed(name: &'static str, priority: i32, package: Option<&'static str>) -> Fixed {
	Fixed { name, priority, package }
}

#[test]
fn highest_priority_suitable_factory_wins() {
	let resolver = ManifestResolver::new()
		.with(fixed("maven", MAVEN_PRIORITY, Some("from.maven")))
		.with(fixed("gradle", DEFAULT_PRIORITY, Some("from.gradle")));
	assert_eq!(resolver.order(), vec!["gradle", "maven"]);

	let descriptor = resolver.resolve(&TestConfig::default()).unwrap();
	assert_eq!(descriptor.package_name.as_deref(), Some("from.gradle"));
}

#[test]
fn unsuitable_factories_are_skipped() {
	let resolver = ManifestResolver::new()
		.with(fixed("buck", DEFAULT_PRIORITY, None))
		.with(fixed("maven", MAVEN_PRIORITY, Some("from.maven")));
	let descriptor = resolver.resolve(&TestConfig::default()).unwrap();
	assert_eq!(descriptor.package_name.as_deref(), Some("from.maven"));
}

#[test]
fn ties_keep_registration_order() {
	let resolver = ManifestResolver::new()
		.with(fixed("first", DEFAULT_PRIORITY, Some("first")))
		.with(fixed("second", DEFAULT_PRIORITY, Some("second")));
	assert_eq!(resolver.order(), vec!["first", "second"]);
	assert_eq!(
		resolver.resolve(&TestConfig::default()).unwrap().package_name.as_deref(),
		Some("first")
	);
}

#[test]
fn all_unsuitable_is_fatal() {
	let resolver = ManifestResolver::new()
		.with(BuildSystemManifestFactory::new(None, Vec::new()))
		.with(fixed("buck", DEFAULT_PRIORITY, None));
	let err = resolver.resolve(&TestConfig::default()).unwrap_err();
	assert_eq!(err.to_string(), "no suitable manifest resolver (tried: buck, build-system)");
}

#[test]
fn hard_errors_stop_resolution() {
	let root = tempfile::tempdir().unwrap();
	let resolver = ManifestResolver::new()
		.with(BuildSystemManifestFactory::new(
			Some(Default::default()),
			vec![root.path().to_path_buf()],
		))
		.with(DirectoryManifestFactory::new(root.path()));
	let config = TestConfig {
		resource_dir: Some("missing-res".into()),
		..TestConfig::default()
	};
	assert!(matches!(resolver.resolve(&config), Err(ManifestError::ResourceNotFound(name)) if name == "missing-res"));
}

#[test]
fn directory_factory_is_the_fallback() {
	let root = tempfile::tempdir().unwrap();
	let resolver = ManifestResolver::new()
		.with(DirectoryManifestFactory::new(root.path()))
		.with(BuildSystemManifestFactory::new(None, Vec::new()));
	let config = TestConfig {
		libraries: vec!["lib/a".into()],
		..TestConfig::default()
	};

	let descriptor = resolver.resolve(&config).unwrap();
	assert_eq!(
		descriptor.manifest_file,
		Some(FsFile::Path(root.path().join("AndroidManifest.xml")))
	);
	assert_eq!(descriptor.resources_root, Some(FsFile::Path(root.path().join("res"))));
	assert_eq!(descriptor.library_dirs, vec![FsFile::Path(root.path().join("lib/a"))]);
}
