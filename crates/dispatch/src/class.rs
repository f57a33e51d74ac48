//! Identity of intercepted platform classes and their methods.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::range::SdkRange;

/// Fully qualified name of a platform class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(&'static str);

impl ClassId {
	pub const fn new(name: &'static str) -> Self {
		Self(name)
	}

	pub const fn name(self) -> &'static str {
		self.0
	}
}

impl fmt::Display for ClassId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.0)
	}
}

/// Method name plus parameter type names, enough to tell overloads apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodSignature {
	pub name: &'static str,
	pub params: &'static [&'static str],
}

impl MethodSignature {
	pub const fn new(name: &'static str, params: &'static [&'static str]) -> Self {
		Self { name, params }
	}
}

impl fmt::Display for MethodSignature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}({})", self.name, self.params.join(", "))
	}
}

/// Original (unshadowed) body of a platform method.
pub type OriginalFn<R, A, O> = fn(&R, A) -> O;

/// Typed descriptor of one interceptable method of `R`.
///
/// Carries the original body and the API levels on which the platform
/// actually declares the method.
pub struct Method<R, A, O> {
	signature: MethodSignature,
	available: SdkRange,
	original: OriginalFn<R, A, O>,
}

impl<R, A, O> Method<R, A, O> {
	/// Declares a method present on every API level.
	pub const fn new(name: &'static str, params: &'static [&'static str], original: OriginalFn<R, A, O>) -> Self {
		Self {
			signature: MethodSignature::new(name, params),
			available: SdkRange::ALL,
			original,
		}
	}

	/// Restricts the levels on which the platform declares this method.
	pub const fn available(mut self, range: SdkRange) -> Self {
		self.available = range;
		self
	}

	pub const fn signature(&self) -> MethodSignature {
		self.signature
	}

	pub const fn availability(&self) -> SdkRange {
		self.available
	}

	pub fn original(&self) -> OriginalFn<R, A, O> {
		self.original
	}
}

impl<R, A, O> fmt::Debug for Method<R, A, O> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Method")
			.field("signature", &self.signature)
			.field("available", &self.available)
			.finish_non_exhaustive()
	}
}

/// A platform class whose instances can be paired with a shadow.
pub trait RealObject: Any + Send + Sync {
	/// Class this type stands for in the shadow registry.
	const CLASS: ClassId;

	/// Storage for the attached shadow; lives and dies with the object.
	fn shadow_slot(&self) -> &ShadowSlot;
}

/// Per-instance cell holding the shadow bound to a real object.
#[derive(Default)]
pub struct ShadowSlot {
	cell: OnceLock<Arc<dyn Any + Send + Sync>>,
}

impl ShadowSlot {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_bound(&self) -> bool {
		self.cell.get().is_some()
	}

	pub(crate) fn get(&self) -> Option<&Arc<dyn Any + Send + Sync>> {
		self.cell.get()
	}

	/// Attaches `shadow` unless another thread won; returns whichever is attached.
	pub(crate) fn attach(&self, shadow: Arc<dyn Any + Send + Sync>) -> &Arc<dyn Any + Send + Sync> {
		self.cell.get_or_init(|| shadow)
	}
}

impl fmt::Debug for ShadowSlot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ShadowSlot").field("bound", &self.is_bound()).finish()
	}
}
