//! Version-gated method tables.
//!
//! # Role
//!
//! Every interceptable method of a real class owns a list of mappings, each
//! tagged with an inclusive SDK range and a [`MappingKind`]. Registration goes
//! through [`ShadowRegistryBuilder`], which rejects any pair of same-kind
//! mappings whose ranges share a level. The built [`ShadowRegistry`] is
//! immutable, so resolution never needs a tie-break and can be shared without
//! locking.
//!
//! # Resolution
//!
//! [`ShadowRegistry::resolve`] only ever returns [`MappingKind::Shadow`]
//! entries. [`MappingKind::Direct`] entries hold original bodies and are
//! reached exclusively through [`ShadowRegistry::direct`] (the reflector's
//! bypass path).

use std::any::{Any, TypeId, type_name};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;
use umbra_sdk::ApiLevel;

use crate::binder::Shadow;
use crate::class::{ClassId, Method, MethodSignature, OriginalFn, RealObject};
use crate::dispatch::ShadowFn;
use crate::error::RegistryError;
use crate::range::SdkRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingKind {
	/// Substitute body selected by normal dispatch.
	Shadow,
	/// Original body, only reachable through the bypass path.
	Direct,
}

impl fmt::Display for MappingKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Shadow => write!(f, "shadow"),
			Self::Direct => write!(f, "direct"),
		}
	}
}

/// One registered implementation of a method over an SDK range.
#[derive(Clone)]
pub struct ShadowMapping {
	class: ClassId,
	signature: MethodSignature,
	range: SdkRange,
	kind: MappingKind,
	call_type: TypeId,
	call_type_name: &'static str,
	handler: Arc<dyn Any + Send + Sync>,
}

impl ShadowMapping {
	/// Builds a mapping whose handler substitutes the original body.
	pub fn shadow<R: RealObject, A: 'static, O: 'static>(method: &Method<R, A, O>, range: SdkRange, handler: ShadowFn<R, A, O>) -> Self {
		Self::erased::<R, A, O>(method.signature(), range, MappingKind::Shadow, Arc::new(handler))
	}

	/// Builds a mapping exposing the original body over the method's availability.
	pub fn direct<R: RealObject, A: 'static, O: 'static>(method: &Method<R, A, O>) -> Self {
		let original: OriginalFn<R, A, O> = method.original();
		Self::erased::<R, A, O>(method.signature(), method.availability(), MappingKind::Direct, Arc::new(original))
	}

	fn erased<R: RealObject, A: 'static, O: 'static>(
		signature: MethodSignature,
		range: SdkRange,
		kind: MappingKind,
		handler: Arc<dyn Any + Send + Sync>,
	) -> Self {
		Self {
			class: R::CLASS,
			signature,
			range,
			kind,
			call_type: TypeId::of::<OriginalFn<R, A, O>>(),
			call_type_name: type_name::<OriginalFn<R, A, O>>(),
			handler,
		}
	}

	pub fn class(&self) -> ClassId {
		self.class
	}

	pub fn signature(&self) -> MethodSignature {
		self.signature
	}

	pub fn range(&self) -> SdkRange {
		self.range
	}

	pub fn kind(&self) -> MappingKind {
		self.kind
	}

	/// Typed shadow handler, if this is a shadow mapping of that shape.
	pub(crate) fn shadow_fn<R: RealObject, A: 'static, O: 'static>(&self) -> Option<ShadowFn<R, A, O>> {
		self.handler.downcast_ref::<ShadowFn<R, A, O>>().copied()
	}

	/// Typed original body, if this is a direct mapping of that shape.
	pub(crate) fn original_fn<R: RealObject, A: 'static, O: 'static>(&self) -> Option<OriginalFn<R, A, O>> {
		self.handler.downcast_ref::<OriginalFn<R, A, O>>().copied()
	}
}

impl fmt::Debug for ShadowMapping {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ShadowMapping")
			.field("class", &self.class)
			.field("signature", &self.signature)
			.field("range", &self.range)
			.field("kind", &self.kind)
			.finish_non_exhaustive()
	}
}

/// Declares which shadow type pairs with a real class.
#[derive(Clone, Copy)]
pub struct ShadowClassDef {
	pub class: ClassId,
	pub shadow_type: TypeId,
	pub shadow_name: &'static str,
	create: fn(&dyn Any) -> Option<Arc<dyn Any + Send + Sync>>,
}

impl ShadowClassDef {
	pub fn of<S: Shadow>() -> Self {
		Self {
			class: <S::Real as RealObject>::CLASS,
			shadow_type: TypeId::of::<S>(),
			shadow_name: type_name::<S>(),
			create: create_shadow::<S>,
		}
	}

	/// Constructs a fresh shadow for `real`; `None` if `real` is not this class.
	pub(crate) fn instantiate(&self, real: &dyn Any) -> Option<Arc<dyn Any + Send + Sync>> {
		(self.create)(real)
	}
}

impl fmt::Debug for ShadowClassDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ShadowClassDef")
			.field("class", &self.class)
			.field("shadow", &self.shadow_name)
			.finish()
	}
}

fn create_shadow<S: Shadow>(real: &dyn Any) -> Option<Arc<dyn Any + Send + Sync>> {
	let real = real.downcast_ref::<S::Real>()?;
	let shadow: Arc<dyn Any + Send + Sync> = Arc::new(S::create(real));
	Some(shadow)
}

/// A named batch of registrations contributed by a shadow crate.
pub struct ShadowPackage {
	pub name: &'static str,
	pub register: fn(&mut ShadowRegistryBuilder) -> Result<(), RegistryError>,
}

inventory::collect!(ShadowPackage);

impl ShadowPackage {
	pub const fn new(name: &'static str, register: fn(&mut ShadowRegistryBuilder) -> Result<(), RegistryError>) -> Self {
		Self { name, register }
	}
}

#[derive(Debug, Clone)]
struct MethodTable {
	call_type: TypeId,
	call_type_name: &'static str,
	mappings: Vec<ShadowMapping>,
}

#[derive(Debug, Clone, Default)]
struct ClassTable {
	shadow: Option<ShadowClassDef>,
	methods: BTreeMap<MethodSignature, MethodTable>,
}

/// Collects registrations and validates them one at a time.
#[derive(Debug, Default)]
pub struct ShadowRegistryBuilder {
	classes: HashMap<ClassId, ClassTable>,
	packages: Vec<&'static str>,
}

impl ShadowRegistryBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds one mapping, rejecting overlap with an existing mapping of the same kind.
	pub fn register(&mut self, mapping: ShadowMapping) -> Result<(), RegistryError> {
		if !mapping.range.is_valid() {
			return Err(RegistryError::InvalidRange {
				class: mapping.class,
				method: mapping.signature,
				range: mapping.range,
			});
		}

		let table = self
			.classes
			.entry(mapping.class)
			.or_default()
			.methods
			.entry(mapping.signature)
			.or_insert_with(|| MethodTable {
				call_type: mapping.call_type,
				call_type_name: mapping.call_type_name,
				mappings: Vec::new(),
			});

		if table.call_type != mapping.call_type {
			return Err(RegistryError::SignatureMismatch {
				class: mapping.class,
				method: mapping.signature,
				existing: table.call_type_name,
				incoming: mapping.call_type_name,
			});
		}

		if let Some(existing) = table
			.mappings
			.iter()
			.find(|m| m.kind == mapping.kind && m.range.overlaps(mapping.range))
		{
			return Err(RegistryError::ConflictingMapping {
				class: mapping.class,
				method: mapping.signature,
				kind: mapping.kind,
				existing: existing.range,
				incoming: mapping.range,
			});
		}

		tracing::debug!(
			"registered {} {}.{} on {}",
			mapping.kind,
			mapping.class,
			mapping.signature,
			mapping.range
		);
		let at = table.mappings.partition_point(|m| m.range.min <= mapping.range.min);
		table.mappings.insert(at, mapping);
		Ok(())
	}

	/// Registers a shadow body for `method` on `range`.
	pub fn shadow<R: RealObject, A: 'static, O: 'static>(
		&mut self,
		method: &Method<R, A, O>,
		range: SdkRange,
		handler: ShadowFn<R, A, O>,
	) -> Result<(), RegistryError> {
		self.register(ShadowMapping::shadow(method, range, handler))
	}

	/// Exposes the original body of `method` to the bypass path.
	pub fn direct<R: RealObject, A: 'static, O: 'static>(&mut self, method: &Method<R, A, O>) -> Result<(), RegistryError> {
		self.register(ShadowMapping::direct(method))
	}

	/// Declares `S` as the shadow paired with instances of `S::Real`.
	pub fn shadow_class<S: Shadow>(&mut self) -> Result<(), RegistryError> {
		let def = ShadowClassDef::of::<S>();
		let table = self.classes.entry(def.class).or_default();
		match &table.shadow {
			Some(existing) if existing.shadow_type == def.shadow_type => Ok(()),
			Some(existing) => Err(RegistryError::ConflictingShadowClass {
				class: def.class,
				existing: existing.shadow_name,
				incoming: def.shadow_name,
			}),
			None => {
				table.shadow = Some(def);
				Ok(())
			}
		}
	}

	/// Runs one package's registrations, tagging failures with its name.
	pub fn package(&mut self, package: &ShadowPackage) -> Result<(), RegistryError> {
		(package.register)(self).map_err(|source| RegistryError::Package {
			package: package.name,
			source: Box::new(source),
		})?;
		self.packages.push(package.name);
		Ok(())
	}

	pub fn build(self) -> ShadowRegistry {
		ShadowRegistry {
			classes: self.classes,
			packages: self.packages,
		}
	}
}

/// Immutable, validated dispatch table.
#[derive(Debug, Default)]
pub struct ShadowRegistry {
	classes: HashMap<ClassId, ClassTable>,
	packages: Vec<&'static str>,
}

impl ShadowRegistry {
	pub fn builder() -> ShadowRegistryBuilder {
		ShadowRegistryBuilder::new()
	}

	/// Registry with no mappings; every call falls through to the original.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Builds a registry from every linked [`ShadowPackage`], in name order.
	pub fn from_packages() -> Result<Self, RegistryError> {
		let mut packages: Vec<&ShadowPackage> = inventory::iter::<ShadowPackage>.into_iter().collect();
		packages.sort_by_key(|p| p.name);

		let mut builder = ShadowRegistryBuilder::new();
		for package in packages {
			builder.package(package)?;
		}
		let registry = builder.build();
		tracing::info!(
			"shadow registry ready: {} classes from packages {:?}",
			registry.classes.len(),
			registry.packages
		);
		Ok(registry)
	}

	/// Selects the shadow mapping serving `method` on `level`, if any.
	pub fn resolve(&self, class: ClassId, method: MethodSignature, level: ApiLevel) -> Option<&ShadowMapping> {
		self.find(class, method, level, MappingKind::Shadow)
	}

	/// Looks up the original body of `method` on `level`.
	pub fn direct(&self, class: ClassId, method: MethodSignature, level: ApiLevel) -> Option<&ShadowMapping> {
		self.find(class, method, level, MappingKind::Direct)
	}

	/// Original bodies declared on `level` under the bare method `name`, one per overload.
	pub fn direct_overloads<'a>(&'a self, class: ClassId, name: &'a str, level: ApiLevel) -> impl Iterator<Item = &'a ShadowMapping> {
		self.classes
			.get(&class)
			.into_iter()
			.flat_map(|t| t.methods.values())
			.flat_map(|t| &t.mappings)
			.filter(move |m| m.kind == MappingKind::Direct && m.signature.name == name && m.range.contains(level))
	}

	fn find(&self, class: ClassId, method: MethodSignature, level: ApiLevel, kind: MappingKind) -> Option<&ShadowMapping> {
		self.classes
			.get(&class)?
			.methods
			.get(&method)?
			.mappings
			.iter()
			.find(|m| m.kind == kind && m.range.contains(level))
	}

	pub fn shadow_class(&self, class: ClassId) -> Option<&ShadowClassDef> {
		self.classes.get(&class)?.shadow.as_ref()
	}

	/// All mappings registered for `class`.
	pub fn mappings(&self, class: ClassId) -> impl Iterator<Item = &ShadowMapping> {
		self.classes
			.get(&class)
			.into_iter()
			.flat_map(|t| t.methods.values())
			.flat_map(|t| t.mappings.iter())
	}

	pub fn packages(&self) -> &[&'static str] {
		&self.packages
	}

	pub fn is_empty(&self) -> bool {
		self.classes.is_empty()
	}
}
