//! Shadow dispatch engine.
//!
//! Platform classes implement [`RealObject`] and route their methods through
//! [`invoke`]. At call time the active [`ShadowEnvironment`] decides, from its
//! [`ShadowRegistry`] and emulated API level, whether a shadow body, the
//! original body, or neither applies.
//!
//! # Modules
//!
//! - [`registry`] - version-gated method tables with overlap rejection
//! - [`binder`] - shadow pairing, singletons and static shadow state
//! - [`env`] - the per-test environment and the ambient [`Scope`]
//! - [`reflector`] - named access to hidden fields and original bodies
//! - [`listeners`] - listener bookkeeping with inline or queued delivery

pub mod binder;
mod class;
pub mod dispatch;
pub mod env;
mod error;
pub mod listeners;
mod range;
pub mod reflector;
pub mod registry;

pub use binder::{InstanceBinder, Shadow, SingletonState};
pub use class::{ClassId, Method, MethodSignature, OriginalFn, RealObject, ShadowSlot};
pub use dispatch::{Call, ShadowFn, invoke, invoke_in};
pub use env::{Scope, ScopeGuard, ShadowEnvironment};
pub use error::{AccessError, BindError, DispatchError, RegistryError, Result, ScopeError};
pub use listeners::{DeliveryContext, DeliveryQueue, ListenerRegistry};
pub use range::SdkRange;
pub use reflector::{FieldDef, FieldValue, Reflect, Reflector};
pub use registry::{MappingKind, ShadowClassDef, ShadowMapping, ShadowPackage, ShadowRegistry, ShadowRegistryBuilder};
pub use umbra_sdk::ApiLevel;

#[cfg(test)]
mod test_fixtures;
