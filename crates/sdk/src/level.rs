use std::fmt;

/// Integer identifier of one emulated platform version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiLevel(u16);

impl ApiLevel {
	pub const JELLY_BEAN: Self = Self(16);
	pub const JELLY_BEAN_MR1: Self = Self(17);
	pub const JELLY_BEAN_MR2: Self = Self(18);
	pub const KITKAT: Self = Self(19);
	pub const LOLLIPOP: Self = Self(21);
	pub const LOLLIPOP_MR1: Self = Self(22);
	pub const M: Self = Self(23);
	pub const N: Self = Self(24);
	pub const N_MR1: Self = Self(25);
	pub const O: Self = Self(26);
	pub const O_MR1: Self = Self(27);

	/// Lowest representable level.
	pub const MIN: Self = Self(0);
	/// Highest representable level.
	pub const MAX: Self = Self(u16::MAX);

	pub const fn new(level: u16) -> Self {
		Self(level)
	}

	pub const fn get(self) -> u16 {
		self.0
	}
}

impl From<u16> for ApiLevel {
	fn from(level: u16) -> Self {
		Self(level)
	}
}

impl fmt::Display for ApiLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "API Level {}", self.0)
	}
}
