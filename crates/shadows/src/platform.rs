//! Host-side models of the platform classes the shadows in this crate target.

pub mod accessibility;
pub mod os;

pub use accessibility::{
	AccessibilityEvent, AccessibilityManager, AccessibilityServiceInfo, AccessibilityStateChangeListener, ServiceInfo, ServiceProxy,
	StateListener, TouchExplorationStateChangeListener, TouchListener, TouchListenerMap,
};
pub use os::{Context, Handler, Looper, Message};
