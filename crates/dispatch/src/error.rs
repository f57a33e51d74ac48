use umbra_sdk::ApiLevel;

use crate::class::{ClassId, MethodSignature};
use crate::range::SdkRange;
use crate::registry::MappingKind;

/// Fatal registration errors, raised before any dispatch happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	/// Two mappings of one kind would both apply on some level.
	#[error("conflicting {kind} mapping for {class}.{method}: {incoming} overlaps {existing}")]
	ConflictingMapping {
		class: ClassId,
		method: MethodSignature,
		kind: MappingKind,
		existing: SdkRange,
		incoming: SdkRange,
	},

	#[error("invalid SDK range {range} for {class}.{method}")]
	InvalidRange {
		class: ClassId,
		method: MethodSignature,
		range: SdkRange,
	},

	/// The same signature was registered with different argument or return types.
	#[error("{class}.{method} registered as `{incoming}` but already known as `{existing}`")]
	SignatureMismatch {
		class: ClassId,
		method: MethodSignature,
		existing: &'static str,
		incoming: &'static str,
	},

	#[error("{class} is already shadowed by {existing}; refusing {incoming}")]
	ConflictingShadowClass {
		class: ClassId,
		existing: &'static str,
		incoming: &'static str,
	},

	#[error("shadow package {package}: {source}")]
	Package {
		package: &'static str,
		#[source]
		source: Box<RegistryError>,
	},
}

/// Failures of raw member access through a reflector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
	#[error("{class} has no member `{member}` on {api_level}")]
	MemberNotFound {
		class: ClassId,
		member: String,
		api_level: ApiLevel,
	},

	#[error("access to {class}.{member} denied: {reason}")]
	AccessDenied {
		class: ClassId,
		member: String,
		reason: &'static str,
	},

	#[error("{class}.{member} is not a `{expected}`")]
	TypeMismatch {
		class: ClassId,
		member: String,
		expected: &'static str,
	},
}

/// Failures pairing a real object with its shadow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
	#[error("{0} has no registered shadow")]
	NotShadowed(ClassId),

	#[error("{class} is shadowed by {registered}, not {requested}")]
	ShadowTypeMismatch {
		class: ClassId,
		registered: &'static str,
		requested: &'static str,
	},
}

/// Errors surfaced by an intercepted call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
	/// The platform does not declare the method on the emulated level.
	#[error("{class}.{method} does not exist on {api_level}")]
	MethodUnavailable {
		class: ClassId,
		method: MethodSignature,
		api_level: ApiLevel,
	},

	#[error(transparent)]
	Bind(#[from] BindError),

	#[error(transparent)]
	Access(#[from] AccessError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
	/// A scope is already entered; the previous test never exited.
	#[error("a shadow scope is already active ({0})")]
	AlreadyActive(ApiLevel),
}

/// Result type for intercepted calls.
pub type Result<T> = std::result::Result<T, DispatchError>;
