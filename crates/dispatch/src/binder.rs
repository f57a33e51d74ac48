//! Real object <-> shadow pairing and process-wide shadow state.
//!
//! Ordinary shadows live in the [`ShadowSlot`](crate::ShadowSlot) of their
//! real object and die with it. Singletons and static shadow state live in the
//! [`InstanceBinder`] and survive until [`InstanceBinder::reset_all`].

use std::any::{Any, TypeId, type_name};
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap as HashMap;

use crate::class::RealObject;
use crate::error::BindError;
use crate::registry::ShadowRegistry;

/// Auxiliary state paired 1:1 with a real object.
pub trait Shadow: Any + Send + Sync + Sized {
	type Real: RealObject;

	/// Builds the shadow on first interception of `real`.
	fn create(real: &Self::Real) -> Self;
}

/// Lifecycle of one singleton slot within the current reset generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingletonState {
	Uncreated,
	Created,
}

#[derive(Default)]
struct SingletonSlot {
	instance: Mutex<Option<Arc<dyn Any + Send + Sync>>>,
}

/// Owner of singleton real objects and static shadow state.
#[derive(Default)]
pub struct InstanceBinder {
	singletons: RwLock<HashMap<TypeId, Arc<SingletonSlot>>>,
	statics: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
	generation: AtomicU64,
}

impl InstanceBinder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the shadow attached to `real`, creating it on first access.
	pub fn bind<S: Shadow>(&self, registry: &ShadowRegistry, real: &S::Real) -> Result<Arc<S>, BindError> {
		let class = <S::Real as RealObject>::CLASS;
		let def = registry.shadow_class(class).ok_or(BindError::NotShadowed(class))?;
		let mismatch = || BindError::ShadowTypeMismatch {
			class,
			registered: def.shadow_name,
			requested: type_name::<S>(),
		};
		if def.shadow_type != TypeId::of::<S>() {
			return Err(mismatch());
		}

		let slot = real.shadow_slot();
		let attached = match slot.get() {
			Some(shadow) => shadow.clone(),
			None => {
				let fresh = def.instantiate(real).ok_or_else(|| mismatch())?;
				slot.attach(fresh).clone()
			}
		};
		attached.downcast::<S>().map_err(|_| mismatch())
	}

	/// Returns the singleton of type `T`, creating it under the slot lock.
	///
	/// Concurrent first callers block until the single creator finishes and
	/// then observe the same instance.
	pub fn get_or_create_singleton<T, F>(&self, create: F) -> Arc<T>
	where
		T: Any + Send + Sync,
		F: FnOnce() -> Arc<T>,
	{
		match self.get_or_try_create_singleton::<T, Infallible, _>(|| Ok(create())) {
			Ok(instance) => instance,
			Err(never) => match never {},
		}
	}

	/// Fallible form of [`Self::get_or_create_singleton`]; a failed creation leaves the slot empty.
	pub fn get_or_try_create_singleton<T, E, F>(&self, create: F) -> Result<Arc<T>, E>
	where
		T: Any + Send + Sync,
		F: FnOnce() -> Result<Arc<T>, E>,
	{
		let slot = self.singleton_slot(TypeId::of::<T>());
		let mut instance = slot.instance.lock();

		if let Some(existing) = &*instance
			&& let Ok(existing) = existing.clone().downcast::<T>()
		{
			return Ok(existing);
		}

		let created = create()?;
		tracing::debug!("created singleton {}", type_name::<T>());
		let erased: Arc<dyn Any + Send + Sync> = created.clone();
		*instance = Some(erased);
		Ok(created)
	}

	fn singleton_slot(&self, key: TypeId) -> Arc<SingletonSlot> {
		if let Some(slot) = self.singletons.read().get(&key) {
			return slot.clone();
		}
		self.singletons.write().entry(key).or_default().clone()
	}

	pub fn singleton_state<T: Any>(&self) -> SingletonState {
		// Release the map before waiting on the slot: a creator may need the map's write lock.
		let slot = self.singletons.read().get(&TypeId::of::<T>()).cloned();
		let created = slot.is_some_and(|slot| slot.instance.lock().is_some());
		if created { SingletonState::Created } else { SingletonState::Uncreated }
	}

	/// Static shadow state of type `T`, defaulted on first access after a reset.
	pub fn static_state<T: Any + Default + Send + Sync>(&self) -> Arc<T> {
		let key = TypeId::of::<T>();
		if let Some(state) = self.statics.read().get(&key).cloned()
			&& let Ok(state) = state.downcast::<T>()
		{
			return state;
		}

		let mut statics = self.statics.write();
		let entry = statics.entry(key).or_insert_with(|| Arc::new(T::default()) as Arc<dyn Any + Send + Sync>);
		match entry.clone().downcast::<T>() {
			Ok(state) => state,
			Err(_) => {
				let state = Arc::new(T::default());
				*entry = state.clone();
				state
			}
		}
	}

	/// Drops every singleton and all static shadow state.
	///
	/// Must run between independent test executions.
	pub fn reset_all(&self) {
		let singletons = std::mem::take(&mut *self.singletons.write());
		let statics = std::mem::take(&mut *self.statics.write());
		let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
		tracing::debug!(
			"reset generation {}: dropped {} singleton slots, {} static states",
			generation,
			singletons.len(),
			statics.len()
		);
	}

	/// Number of completed resets.
	pub fn generation(&self) -> u64 {
		self.generation.load(Ordering::Acquire)
	}
}

impl std::fmt::Debug for InstanceBinder {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("InstanceBinder")
			.field("singletons", &self.singletons.read().len())
			.field("statics", &self.statics.read().len())
			.field("generation", &self.generation())
			.finish()
	}
}

#[cfg(test)]
mod tests;
