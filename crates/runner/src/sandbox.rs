//! One test execution, start to finish.
//!
//! A run merges the sandbox defaults with the test's own config, resolves
//! the emulated SDK and the manifest bundle, builds a fresh
//! [`ShadowEnvironment`], enters it as the active [`Scope`] and runs the
//! test body. Leaving the scope resets every singleton and all static shadow
//! state, so the next run starts clean even if the body panicked.

use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use parking_lot::ReentrantMutex;
use tracing::{debug, info};
use umbra_dispatch::{ApiLevel, Scope, ShadowEnvironment, ShadowRegistry};
use umbra_manifest::{BuildSystemManifestFactory, DirectoryManifestFactory, ManifestDescriptor, ManifestResolver, TestConfig};
use umbra_sdk::{FALLBACK_SDK_VERSION, SdkVersion, SdkVersionMatrix};

use crate::error::Result;

/// Serializes runs across every sandbox in the process.
///
/// Reentrant so a run started from inside a test body reaches
/// [`Scope::enter`] and fails there instead of blocking on itself.
static RUN_LOCK: LazyLock<ReentrantMutex<()>> = LazyLock::new(|| ReentrantMutex::new(()));

/// What a test body gets to see.
pub struct TestContext<'a> {
	env: &'a Arc<ShadowEnvironment>,
	config: &'a TestConfig,
	manifest: &'a ManifestDescriptor,
}

impl<'a> TestContext<'a> {
	pub fn env(&self) -> &'a Arc<ShadowEnvironment> {
		self.env
	}

	pub fn sdk(&self) -> &'a SdkVersion {
		self.env.sdk()
	}

	pub fn api_level(&self) -> ApiLevel {
		self.env.api_level()
	}

	/// The merged configuration this run used.
	pub fn config(&self) -> &'a TestConfig {
		self.config
	}

	pub fn manifest(&self) -> &'a ManifestDescriptor {
		self.manifest
	}
}

pub struct Sandbox {
	matrix: SdkVersionMatrix,
	registry: Arc<ShadowRegistry>,
	resolver: ManifestResolver,
	defaults: TestConfig,
}

impl Sandbox {
	pub fn new(matrix: SdkVersionMatrix, registry: Arc<ShadowRegistry>, resolver: ManifestResolver) -> Self {
		Self {
			matrix,
			registry,
			resolver,
			defaults: TestConfig::default(),
		}
	}

	/// Sandbox for a project directory: the host's matrix, every linked shadow
	/// package, the build-system resolver and the conventional-layout fallback.
	pub fn discover(project_dir: impl Into<PathBuf>) -> Result<Self> {
		let project_dir = project_dir.into();
		let registry = ShadowRegistry::from_packages()?;
		let resolver = ManifestResolver::new()
			.with(BuildSystemManifestFactory::discover(vec![project_dir.clone()])?)
			.with(DirectoryManifestFactory::new(project_dir));
		Ok(Self::new(SdkVersionMatrix::global().clone(), Arc::new(registry), resolver))
	}

	/// Config every run starts from; a test's own values win.
	pub fn with_defaults(mut self, defaults: TestConfig) -> Self {
		self.defaults = defaults;
		self
	}

	pub fn matrix(&self) -> &SdkVersionMatrix {
		&self.matrix
	}

	pub fn registry(&self) -> &Arc<ShadowRegistry> {
		&self.registry
	}

	/// Runs `test` once under `config`.
	pub fn run<T>(&self, config: &TestConfig, test: impl FnOnce(&TestContext<'_>) -> T) -> Result<T> {
		let config = self.defaults.overlay(config);
		let level = config.api_level().unwrap_or(FALLBACK_SDK_VERSION);
		self.run_at(level, &config, test)
	}

	/// Runs `test` once per level in `levels`, in order, each in a fresh environment.
	pub fn run_on<T>(&self, levels: &[ApiLevel], config: &TestConfig, test: impl Fn(&TestContext<'_>) -> T) -> Result<Vec<T>> {
		let config = self.defaults.overlay(config);
		levels.iter().map(|&level| self.run_at(level, &config, &test)).collect()
	}

	/// Runs `test` on every level the matrix supports.
	pub fn run_on_all<T>(&self, config: &TestConfig, test: impl Fn(&TestContext<'_>) -> T) -> Result<Vec<T>> {
		let levels: Vec<ApiLevel> = self.matrix.supported_api_levels().into_iter().collect();
		self.run_on(&levels, config, test)
	}

	fn run_at<T>(&self, level: ApiLevel, config: &TestConfig, test: impl FnOnce(&TestContext<'_>) -> T) -> Result<T> {
		let _run = RUN_LOCK.lock();

		let sdk = *self.matrix.resolve(level)?;
		let manifest = self.resolver.resolve(config)?;
		debug!("resolved manifest bundle: {:?}", manifest);

		let env = Arc::new(ShadowEnvironment::new(sdk, self.registry.clone()));
		let scope = Scope::enter(env.clone())?;
		info!(%sdk, "entering shadow scope");

		let outcome = test(&TestContext {
			env: &env,
			config,
			manifest: &manifest,
		});
		scope.exit();
		Ok(outcome)
	}
}
