use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

#[test]
fn empty_document_is_all_defaults() {
	assert_eq!(TestConfig::from_toml("").unwrap(), TestConfig::default());
}

#[test]
fn parses_every_field() {
	const CONFIG: &str = r#"
sdk = 19
manifest = "TestManifest.xml"
resource_dir = "res-alt"
asset_dir = "assets-alt"
package_name = "com.example.test"
libraries = ["lib/a", "lib/b"]
"#;
	let config = TestConfig::from_toml(CONFIG).unwrap();
	assert_eq!(config.api_level(), Some(ApiLevel::KITKAT));
	assert_eq!(config.manifest, ManifestSetting::Path("TestManifest.xml".into()));
	assert_eq!(config.resource_dir.as_deref(), Some("res-alt"));
	assert_eq!(config.asset_dir.as_deref(), Some("assets-alt"));
	assert_eq!(config.package_name.as_deref(), Some("com.example.test"));
	assert_eq!(config.libraries, vec!["lib/a", "lib/b"]);
}

#[rstest]
#[case("default", ManifestSetting::Default)]
#[case("none", ManifestSetting::None)]
#[case("app/AndroidManifest.xml", ManifestSetting::Path("app/AndroidManifest.xml".into()))]
fn manifest_sentinels(#[case] raw: &str, #[case] expected: ManifestSetting) {
	let config = TestConfig::from_toml(&format!("manifest = {raw:?}")).unwrap();
	assert_eq!(config.manifest, expected);
}

#[test]
fn unknown_keys_are_rejected() {
	assert!(matches!(TestConfig::from_toml("sdkk = 19"), Err(ConfigError::Toml(_))));
}

#[test]
fn load_reports_the_missing_path() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("missing.toml");
	match TestConfig::load(&path) {
		Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
		other => panic!("expected I/O error, got {other:?}"),
	}
}

#[test]
fn load_reads_a_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("umbra.toml");
	std::fs::write(&path, "sdk = 26\nmanifest = \"none\"\n").unwrap();
	let config = TestConfig::load(&path).unwrap();
	assert_eq!(config.api_level(), Some(ApiLevel::O));
	assert_eq!(config.manifest, ManifestSetting::None);
}

#[test]
fn overlay_prefers_explicit_values() {
	let base = TestConfig {
		sdk: Some(19),
		manifest: ManifestSetting::None,
		package_name: Some("com.base".into()),
		libraries: vec!["lib/base".into()],
		..TestConfig::default()
	};
	let top = TestConfig {
		resource_dir: Some("res-top".into()),
		package_name: Some("com.top".into()),
		..TestConfig::default()
	}
	.with_sdk(ApiLevel::O);

	let merged = base.overlay(&top);
	assert_eq!(merged.api_level(), Some(ApiLevel::O));
	assert_eq!(merged.manifest, ManifestSetting::None);
	assert_eq!(merged.resource_dir.as_deref(), Some("res-top"));
	assert_eq!(merged.package_name.as_deref(), Some("com.top"));
	assert_eq!(merged.libraries, vec!["lib/base"]);
}
