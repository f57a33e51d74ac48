//! Raw access to non-public members of real objects.
//!
//! A real class lists its hidden fields once through [`Reflect::fields`];
//! fields may exist only on some API levels, and each may be readable,
//! writable or both. Shadows wrap a [`Reflector`] in a hand-written
//! capability trait so the name-based lookup stays in one place.

use std::any::{Any, type_name};

use umbra_sdk::ApiLevel;

use crate::class::{Method, OriginalFn, RealObject};
use crate::env::ShadowEnvironment;
use crate::error::AccessError;
use crate::range::SdkRange;

/// Type-erased field value.
pub type FieldValue = Box<dyn Any + Send>;

/// Declaration of one hidden field of `R`.
pub struct FieldDef<R> {
	pub name: &'static str,
	pub available: SdkRange,
	read: Option<fn(&R) -> FieldValue>,
	write: Option<fn(&R, FieldValue) -> Result<(), FieldValue>>,
}

impl<R> FieldDef<R> {
	/// A field with no access paths; add them with [`Self::reader`] and [`Self::writer`].
	pub const fn new(name: &'static str, available: SdkRange) -> Self {
		Self {
			name,
			available,
			read: None,
			write: None,
		}
	}

	pub const fn reader(self, read: fn(&R) -> FieldValue) -> Self {
		Self { read: Some(read), ..self }
	}

	/// The writer hands the value back when it has the wrong type.
	pub const fn writer(self, write: fn(&R, FieldValue) -> Result<(), FieldValue>) -> Self {
		Self { write: Some(write), ..self }
	}
}

/// Real classes with reflectively reachable members.
pub trait Reflect: RealObject + Sized {
	fn fields() -> &'static [FieldDef<Self>];
}

/// Live view over one real object's hidden members.
pub struct Reflector<'a, R> {
	env: &'a ShadowEnvironment,
	real: &'a R,
}

impl<'a, R: Reflect> Reflector<'a, R> {
	pub(crate) fn new(env: &'a ShadowEnvironment, real: &'a R) -> Self {
		Self { env, real }
	}

	pub fn real(&self) -> &'a R {
		self.real
	}

	/// Level whose member layout this view sees.
	pub fn api_level(&self) -> ApiLevel {
		self.env.api_level()
	}

	fn not_found(&self, member: impl ToString) -> AccessError {
		AccessError::MemberNotFound {
			class: R::CLASS,
			member: member.to_string(),
			api_level: self.env.api_level(),
		}
	}

	fn field(&self, name: &str) -> Result<&'static FieldDef<R>, AccessError> {
		let level = self.env.api_level();
		R::fields()
			.iter()
			.find(|f| f.name == name && f.available.contains(level))
			.ok_or_else(|| self.not_found(name))
	}

	/// Reads field `name` as a `T`.
	pub fn get<T: Any>(&self, name: &str) -> Result<T, AccessError> {
		let field = self.field(name)?;
		let read = field.read.ok_or(AccessError::AccessDenied {
			class: R::CLASS,
			member: name.to_string(),
			reason: "field is write-only",
		})?;
		read(self.real).downcast::<T>().map(|v| *v).map_err(|_| AccessError::TypeMismatch {
			class: R::CLASS,
			member: name.to_string(),
			expected: type_name::<T>(),
		})
	}

	/// Writes `value` into field `name`.
	pub fn set<T: Any + Send>(&self, name: &str, value: T) -> Result<(), AccessError> {
		let field = self.field(name)?;
		let write = field.write.ok_or(AccessError::AccessDenied {
			class: R::CLASS,
			member: name.to_string(),
			reason: "field is read-only",
		})?;
		write(self.real, Box::new(value)).map_err(|_| AccessError::TypeMismatch {
			class: R::CLASS,
			member: name.to_string(),
			expected: type_name::<T>(),
		})
	}

	/// Runs the original body of `method`, never the shadow.
	pub fn call_direct<A: 'static, O: 'static>(&self, method: &Method<R, A, O>, args: A) -> Result<O, AccessError> {
		let signature = method.signature();
		let mapping = self
			.env
			.registry()
			.direct(R::CLASS, signature, self.env.api_level())
			.ok_or_else(|| self.not_found(signature))?;
		let original = mapping.original_fn::<R, A, O>().ok_or_else(|| AccessError::TypeMismatch {
			class: R::CLASS,
			member: signature.to_string(),
			expected: type_name::<OriginalFn<R, A, O>>(),
		})?;
		Ok(original(self.real, args))
	}

	/// Runs a hidden method by name with `args`.
	///
	/// Among overloads of `name`, the one taking `A` and returning `O` runs.
	pub fn call<A: 'static, O: 'static>(&self, name: &str, args: A) -> Result<O, AccessError> {
		let mut overloads = self
			.env
			.registry()
			.direct_overloads(R::CLASS, name, self.env.api_level())
			.peekable();
		if overloads.peek().is_none() {
			return Err(self.not_found(name));
		}
		let original = overloads
			.find_map(|mapping| mapping.original_fn::<R, A, O>())
			.ok_or_else(|| AccessError::TypeMismatch {
				class: R::CLASS,
				member: name.to_string(),
				expected: type_name::<OriginalFn<R, A, O>>(),
			})?;
		Ok(original(self.real, args))
	}
}
