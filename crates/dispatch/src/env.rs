//! Per-test shadow environment and the ambient scope that exposes it.
//!
//! A [`ShadowEnvironment`] bundles everything one test execution sees: the
//! emulated SDK, the shared registry and the binder holding singleton and
//! static shadow state. Intercepted calls find it through [`Scope::current`].
//! [`Scope::enter`] and the drop of its [`ScopeGuard`] are the only points
//! where the ambient pointer changes, and leaving a scope always resets the
//! environment.

use std::any::Any;
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use umbra_sdk::{ApiLevel, SdkVersion};

use crate::binder::{InstanceBinder, Shadow};
use crate::error::{BindError, ScopeError};
use crate::reflector::{Reflect, Reflector};
use crate::registry::ShadowRegistry;

#[derive(Debug)]
pub struct ShadowEnvironment {
	sdk: SdkVersion,
	registry: Arc<ShadowRegistry>,
	binder: InstanceBinder,
}

impl ShadowEnvironment {
	pub fn new(sdk: SdkVersion, registry: Arc<ShadowRegistry>) -> Self {
		Self {
			sdk,
			registry,
			binder: InstanceBinder::new(),
		}
	}

	pub fn sdk(&self) -> &SdkVersion {
		&self.sdk
	}

	pub fn api_level(&self) -> ApiLevel {
		self.sdk.api_level
	}

	pub fn registry(&self) -> &ShadowRegistry {
		&self.registry
	}

	pub fn binder(&self) -> &InstanceBinder {
		&self.binder
	}

	/// Shadow of type `S` paired with `real`.
	pub fn shadow_of<S: Shadow>(&self, real: &S::Real) -> Result<Arc<S>, BindError> {
		self.binder.bind::<S>(&self.registry, real)
	}

	pub fn reflector<'a, R: Reflect>(&'a self, real: &'a R) -> Reflector<'a, R> {
		Reflector::new(self, real)
	}

	pub fn singleton<T, F>(&self, create: F) -> Arc<T>
	where
		T: Any + Send + Sync,
		F: FnOnce() -> Arc<T>,
	{
		self.binder.get_or_create_singleton(create)
	}

	pub fn static_state<T: Any + Default + Send + Sync>(&self) -> Arc<T> {
		self.binder.static_state()
	}

	pub fn reset_all(&self) {
		self.binder.reset_all();
	}
}

static CURRENT: ArcSwapOption<ShadowEnvironment> = ArcSwapOption::const_empty();
static TRANSITION: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Ambient access to the active [`ShadowEnvironment`].
pub struct Scope;

impl Scope {
	/// Makes `env` the active environment until the guard drops.
	pub fn enter(env: Arc<ShadowEnvironment>) -> Result<ScopeGuard, ScopeError> {
		let _transition = TRANSITION.lock();
		if let Some(active) = CURRENT.load_full() {
			return Err(ScopeError::AlreadyActive(active.api_level()));
		}
		tracing::debug!("entering shadow scope on {}", env.api_level());
		CURRENT.store(Some(env.clone()));
		Ok(ScopeGuard { env })
	}

	pub fn current() -> Option<Arc<ShadowEnvironment>> {
		CURRENT.load_full()
	}

	pub fn is_active() -> bool {
		CURRENT.load().is_some()
	}
}

/// Keeps a [`Scope`] entered; dropping it resets the environment and clears the scope.
#[must_use = "dropping the guard immediately exits the scope"]
pub struct ScopeGuard {
	env: Arc<ShadowEnvironment>,
}

impl ScopeGuard {
	pub fn env(&self) -> &Arc<ShadowEnvironment> {
		&self.env
	}

	/// Explicit form of dropping the guard.
	pub fn exit(self) {}
}

impl Drop for ScopeGuard {
	fn drop(&mut self) {
		let _transition = TRANSITION.lock();
		self.env.reset_all();
		CURRENT.store(None);
		tracing::debug!("left shadow scope on {}", self.env.api_level());
	}
}

impl std::fmt::Debug for ScopeGuard {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ScopeGuard").field("api_level", &self.env.api_level()).finish()
	}
}
