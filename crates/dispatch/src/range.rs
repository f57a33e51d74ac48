use std::fmt;

use umbra_sdk::ApiLevel;

/// Inclusive `[min, max]` span of API levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SdkRange {
	pub min: ApiLevel,
	pub max: ApiLevel,
}

impl SdkRange {
	/// Every representable level.
	pub const ALL: Self = Self::new(ApiLevel::MIN, ApiLevel::MAX);

	pub const fn new(min: ApiLevel, max: ApiLevel) -> Self {
		Self { min, max }
	}

	/// `[min, ∞)`.
	pub const fn from(min: ApiLevel) -> Self {
		Self::new(min, ApiLevel::MAX)
	}

	/// `[0, max]`.
	pub const fn up_to(max: ApiLevel) -> Self {
		Self::new(ApiLevel::MIN, max)
	}

	pub const fn is_valid(self) -> bool {
		self.min.get() <= self.max.get()
	}

	pub fn contains(self, level: ApiLevel) -> bool {
		self.min <= level && level <= self.max
	}

	/// True when some level lies in both ranges.
	pub fn overlaps(self, other: Self) -> bool {
		self.min <= other.max && other.min <= self.max
	}
}

impl fmt::Display for SdkRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}, {}]", self.min.get(), self.max.get())
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	fn range(min: u16, max: u16) -> SdkRange {
		SdkRange::new(ApiLevel::new(min), ApiLevel::new(max))
	}

	#[test]
	fn adjacent_ranges_do_not_overlap() {
		assert!(!range(1, 5).overlaps(range(6, 10)));
		assert!(range(1, 5).overlaps(range(4, 8)));
		assert!(range(1, 5).overlaps(range(5, 5)));
	}

	#[test]
	fn open_ranges() {
		assert!(SdkRange::from(ApiLevel::O).contains(ApiLevel::new(40)));
		assert!(!SdkRange::from(ApiLevel::O).contains(ApiLevel::N_MR1));
		assert!(SdkRange::up_to(ApiLevel::N).contains(ApiLevel::MIN));
		assert!(!range(6, 5).is_valid());
	}

	proptest! {
		#[test]
		fn overlap_means_a_shared_level(a in 0u16..40, b in 0u16..40, c in 0u16..40, d in 0u16..40) {
			let (x, y) = (range(a.min(b), a.max(b)), range(c.min(d), c.max(d)));
			let shared = (0u16..40).any(|l| x.contains(ApiLevel::new(l)) && y.contains(ApiLevel::new(l)));
			prop_assert_eq!(x.overlaps(y), shared);
			prop_assert_eq!(x.overlaps(y), y.overlaps(x));
		}
	}
}
