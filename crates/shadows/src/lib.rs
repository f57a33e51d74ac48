//! Shadows for emulated platform classes.
//!
//! Each shadow module submits a [`ShadowPackage`](umbra_dispatch::ShadowPackage),
//! so linking this crate is enough for
//! [`ShadowRegistry::from_packages`](umbra_dispatch::ShadowRegistry::from_packages)
//! to pick its registrations up.

pub mod accessibility;
pub mod platform;

pub use accessibility::{AccessibilityManagerReflector, AccessibilityShadow, ShadowAccessibilityManager, shadow_of};
