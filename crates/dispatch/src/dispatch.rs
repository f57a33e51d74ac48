//! Call-time selection between shadow and original bodies.

use std::sync::Arc;

use umbra_sdk::ApiLevel;

use crate::binder::Shadow;
use crate::class::{Method, RealObject};
use crate::env::{Scope, ShadowEnvironment};
use crate::error::{BindError, DispatchError, Result};
use crate::reflector::{Reflect, Reflector};

/// Substitute body of a method of `R`.
pub type ShadowFn<R, A, O> = for<'a, 'b> fn(&'a Call<'b, R>, A) -> Result<O>;

/// Context handed to a shadow body: the real object and its environment.
pub struct Call<'a, R> {
	env: &'a ShadowEnvironment,
	real: &'a R,
}

impl<'a, R: RealObject> Call<'a, R> {
	pub fn real(&self) -> &'a R {
		self.real
	}

	pub fn env(&self) -> &'a ShadowEnvironment {
		self.env
	}

	pub fn api_level(&self) -> ApiLevel {
		self.env.api_level()
	}

	/// Shadow paired with the intercepted object.
	pub fn shadow<S: Shadow<Real = R>>(&self) -> std::result::Result<Arc<S>, BindError> {
		self.env.shadow_of::<S>(self.real)
	}
}

impl<'a, R: Reflect> Call<'a, R> {
	/// Raw access to the intercepted object's members.
	pub fn reflector(&self) -> Reflector<'a, R> {
		Reflector::new(self.env, self.real)
	}
}

/// Dispatches `method` on `real` through the active scope.
///
/// Outside any scope the original body runs unconditionally.
pub fn invoke<R: RealObject, A: 'static, O: 'static>(real: &R, method: &Method<R, A, O>, args: A) -> Result<O> {
	match Scope::current() {
		Some(env) => invoke_in(&env, real, method, args),
		None => Ok((method.original())(real, args)),
	}
}

/// Dispatches `method` on `real` within `env`.
///
/// A shadow mapping covering the emulated level wins; otherwise the original
/// body runs if the platform declares the method on that level.
pub fn invoke_in<R: RealObject, A: 'static, O: 'static>(env: &ShadowEnvironment, real: &R, method: &Method<R, A, O>, args: A) -> Result<O> {
	let level = env.api_level();
	if let Some(mapping) = env.registry().resolve(R::CLASS, method.signature(), level)
		&& let Some(handler) = mapping.shadow_fn::<R, A, O>()
	{
		return handler(&Call { env, real }, args);
	}

	if !method.availability().contains(level) {
		return Err(DispatchError::MethodUnavailable {
			class: R::CLASS,
			method: method.signature(),
			api_level: level,
		});
	}
	Ok((method.original())(real, args))
}
