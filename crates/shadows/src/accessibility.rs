//! Shadow of the platform accessibility manager.
//!
//! Tests drive accessibility state through [`AccessibilityShadow`]: flipping
//! "enabled" notifies every registered state listener, touch exploration
//! changes reach the listeners the real manager keeps in its own hidden
//! field, and every sent event is recorded before the original send runs.
//! The manager itself is a per-test singleton obtained through
//! [`ShadowAccessibilityManager::get_instance`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::warn;
use umbra_dispatch::{
	AccessError, ApiLevel, BindError, Call, DeliveryContext, ListenerRegistry, Reflector, RegistryError, Result, Scope, SdkRange, Shadow,
	ShadowEnvironment, ShadowPackage, ShadowRegistryBuilder,
};

use crate::platform::accessibility::{
	ADD_STATE_LISTENER, ADD_STATE_LISTENER_WITH_HANDLER, GET_ENABLED_SERVICE_LIST, GET_INSTALLED_SERVICE_LIST, GET_SERVICE_LIST,
	IS_ACCESSIBILITY_BUTTON_SUPPORTED, IS_ENABLED, IS_TOUCH_EXPLORATION_ENABLED, PERFORM_ACCESSIBILITY_SHORTCUT,
	REMOVE_STATE_LISTENER, SEND_ACCESSIBILITY_EVENT, SET_STATE,
};
use crate::platform::{
	AccessibilityEvent, AccessibilityManager, AccessibilityServiceInfo, AccessibilityStateChangeListener, Context, Handler, Looper,
	ServiceInfo, ServiceProxy, StateListener, TouchListener, TouchListenerMap,
};

/// Message the manager's handler turns into a hidden `setState` call.
pub const DO_SET_STATE: i32 = 10;

const TOUCH_LISTENERS_FIELD: &str = "mTouchExplorationStateChangeListeners";

#[derive(Default)]
pub struct ShadowAccessibilityManager {
	sent_events: Mutex<Vec<AccessibilityEvent>>,
	enabled: AtomicBool,
	touch_exploration_enabled: AtomicBool,
	service_list: Mutex<Option<Vec<ServiceInfo>>>,
	enabled_service_list: Mutex<Option<Vec<AccessibilityServiceInfo>>>,
	installed_service_list: Mutex<Option<Vec<AccessibilityServiceInfo>>>,
	state_listeners: ListenerRegistry<dyn AccessibilityStateChangeListener>,
}

impl Shadow for ShadowAccessibilityManager {
	type Real = AccessibilityManager;

	fn create(_real: &AccessibilityManager) -> Self {
		Self::default()
	}
}

/// Class-wide shadow state.
struct ButtonSupport(AtomicBool);

impl Default for ButtonSupport {
	fn default() -> Self {
		Self(AtomicBool::new(true))
	}
}

impl ShadowAccessibilityManager {
	/// The process-wide manager, created on first use in each test.
	///
	/// From KITKAT the service proxy goes through the constructor; earlier
	/// levels have it written into `mService` afterwards. Either way the
	/// manager's `mHandler` runs on the context's main loop.
	pub fn get_instance(env: &ShadowEnvironment, context: &Context) -> std::result::Result<Arc<AccessibilityManager>, AccessError> {
		env.binder().get_or_try_create_singleton(|| {
			let manager = if env.api_level() >= ApiLevel::KITKAT {
				Arc::new(AccessibilityManager::with_service(ServiceProxy, 0))
			} else {
				let manager = Arc::new(AccessibilityManager::new());
				env.reflector(&*manager).set_service(ServiceProxy)?;
				manager
			};
			let handler = state_handler(context.main_looper().clone(), Arc::downgrade(&manager));
			env.reflector(&*manager).set_handler(handler)?;
			Ok(manager)
		})
	}

	/// Controls `isAccessibilityButtonSupported()`; `true` until set, and after every reset.
	pub fn set_accessibility_button_supported(env: &ShadowEnvironment, supported: bool) {
		env.static_state::<ButtonSupport>().0.store(supported, Ordering::SeqCst);
	}

	fn accessibility_button_supported(env: &ShadowEnvironment) -> bool {
		env.static_state::<ButtonSupport>().0.load(Ordering::SeqCst)
	}
}

fn state_handler(looper: Looper, manager: Weak<AccessibilityManager>) -> Handler {
	Handler::with_callback(looper, move |message| {
		let Some(manager) = manager.upgrade() else {
			return;
		};
		if message.what != DO_SET_STATE {
			warn!("AccessibilityManager: unknown message type {}", message.what);
			return;
		}
		let Some(env) = Scope::current() else {
			warn!("AccessibilityManager: state change delivered outside a shadow scope");
			return;
		};
		if let Err(err) = env.reflector(&*manager).set_state(message.arg1) {
			warn!("AccessibilityManager: {err}");
		}
	})
}

/// Raw access to the accessibility manager's hidden members.
pub trait AccessibilityManagerReflector {
	/// The original `sendAccessibilityEvent`, bypassing the shadow.
	fn send_accessibility_event(&self, event: AccessibilityEvent) -> std::result::Result<(), AccessError>;

	fn set_is_enabled(&self, enabled: bool) -> std::result::Result<(), AccessError>;

	fn set_handler(&self, handler: Handler) -> std::result::Result<(), AccessError>;

	fn set_service(&self, service: ServiceProxy) -> std::result::Result<(), AccessError>;

	/// Hidden `setState(int)`.
	fn set_state(&self, state: i32) -> std::result::Result<(), AccessError>;

	/// `mTouchExplorationStateChangeListeners`, whatever its shape on this level.
	fn touch_exploration_state_change_listeners(&self) -> std::result::Result<Vec<TouchListener>, AccessError>;
}

impl AccessibilityManagerReflector for Reflector<'_, AccessibilityManager> {
	fn send_accessibility_event(&self, event: AccessibilityEvent) -> std::result::Result<(), AccessError> {
		self.call_direct(&SEND_ACCESSIBILITY_EVENT, event)
	}

	fn set_is_enabled(&self, enabled: bool) -> std::result::Result<(), AccessError> {
		self.set("mIsEnabled", enabled)
	}

	fn set_handler(&self, handler: Handler) -> std::result::Result<(), AccessError> {
		self.set("mHandler", handler)
	}

	fn set_service(&self, service: ServiceProxy) -> std::result::Result<(), AccessError> {
		self.set("mService", service)
	}

	fn set_state(&self, state: i32) -> std::result::Result<(), AccessError> {
		self.call("setState", state)
	}

	fn touch_exploration_state_change_listeners(&self) -> std::result::Result<Vec<TouchListener>, AccessError> {
		if self.api_level() >= ApiLevel::O {
			let map: TouchListenerMap = self.get(TOUCH_LISTENERS_FIELD)?;
			Ok(map.into_iter().map(|(listener, _)| listener).collect())
		} else {
			self.get(TOUCH_LISTENERS_FIELD)
		}
	}
}

/// Test-facing view of one manager and its shadow.
pub struct AccessibilityShadow<'a> {
	env: &'a ShadowEnvironment,
	real: &'a AccessibilityManager,
	shadow: Arc<ShadowAccessibilityManager>,
}

/// Shadow view of `real` within `env`.
pub fn shadow_of<'a>(env: &'a ShadowEnvironment, real: &'a AccessibilityManager) -> std::result::Result<AccessibilityShadow<'a>, BindError> {
	Ok(AccessibilityShadow {
		env,
		real,
		shadow: env.shadow_of(real)?,
	})
}

impl<'a> AccessibilityShadow<'a> {
	fn from_call(call: &Call<'a, AccessibilityManager>) -> Result<Self> {
		Ok(Self {
			env: call.env(),
			real: call.real(),
			shadow: call.shadow()?,
		})
	}

	fn reflector(&self) -> Reflector<'a, AccessibilityManager> {
		self.env.reflector(self.real)
	}

	/// Events sent through `sendAccessibilityEvent`, oldest first.
	pub fn sent_accessibility_events(&self) -> Vec<AccessibilityEvent> {
		self.shadow.sent_events.lock().clone()
	}

	/// Sets the enabled state, mirrors it into `mIsEnabled` and notifies state listeners.
	pub fn set_enabled(&self, enabled: bool) -> std::result::Result<(), AccessError> {
		self.shadow.enabled.store(enabled, Ordering::SeqCst);
		self.reflector().set_is_enabled(enabled)?;
		self.shadow
			.state_listeners
			.notify_all(move |listener| listener.on_accessibility_state_changed(enabled));
		Ok(())
	}

	/// Sets touch exploration and tells the listeners the real manager holds.
	///
	/// Before KITKAT the platform has no such listeners.
	pub fn set_touch_exploration_enabled(&self, enabled: bool) -> std::result::Result<(), AccessError> {
		self.shadow.touch_exploration_enabled.store(enabled, Ordering::SeqCst);
		if self.env.api_level() < ApiLevel::KITKAT {
			return Ok(());
		}
		for listener in self.reflector().touch_exploration_state_change_listeners()? {
			listener.on_touch_exploration_state_changed(enabled);
		}
		Ok(())
	}

	pub fn set_accessibility_service_list(&self, list: Option<Vec<ServiceInfo>>) {
		*self.shadow.service_list.lock() = list;
	}

	pub fn set_enabled_accessibility_service_list(&self, list: Option<Vec<AccessibilityServiceInfo>>) {
		*self.shadow.enabled_service_list.lock() = list;
	}

	pub fn set_installed_accessibility_service_list(&self, list: Option<Vec<AccessibilityServiceInfo>>) {
		*self.shadow.installed_service_list.lock() = list;
	}

	pub fn state_listener_count(&self) -> usize {
		self.shadow.state_listeners.len()
	}
}

type Am = AccessibilityManager;

fn add_state_listener(call: &Call<'_, Am>, listener: StateListener) -> Result<bool> {
	let view = AccessibilityShadow::from_call(call)?;
	view.shadow.state_listeners.add(listener, DeliveryContext::Inline);
	Ok(true)
}

fn add_state_listener_with_handler(call: &Call<'_, Am>, (listener, handler): (StateListener, Handler)) -> Result<()> {
	let view = AccessibilityShadow::from_call(call)?;
	view.shadow.state_listeners.add(listener, handler.delivery_context());
	Ok(())
}

fn remove_state_listener(call: &Call<'_, Am>, listener: StateListener) -> Result<bool> {
	let view = AccessibilityShadow::from_call(call)?;
	Ok(view.shadow.state_listeners.remove(&listener))
}

fn get_service_list(call: &Call<'_, Am>, _: ()) -> Result<Option<Vec<ServiceInfo>>> {
	Ok(AccessibilityShadow::from_call(call)?.shadow.service_list.lock().clone())
}

fn get_enabled_service_list(call: &Call<'_, Am>, _feedback_type_flags: i32) -> Result<Option<Vec<AccessibilityServiceInfo>>> {
	Ok(AccessibilityShadow::from_call(call)?.shadow.enabled_service_list.lock().clone())
}

fn get_installed_service_list(call: &Call<'_, Am>, _: ()) -> Result<Option<Vec<AccessibilityServiceInfo>>> {
	Ok(AccessibilityShadow::from_call(call)?.shadow.installed_service_list.lock().clone())
}

fn send_accessibility_event(call: &Call<'_, Am>, event: AccessibilityEvent) -> Result<()> {
	let view = AccessibilityShadow::from_call(call)?;
	view.shadow.sent_events.lock().push(event.clone());
	view.reflector().send_accessibility_event(event)?;
	Ok(())
}

fn is_enabled(call: &Call<'_, Am>, _: ()) -> Result<bool> {
	Ok(AccessibilityShadow::from_call(call)?.shadow.enabled.load(Ordering::SeqCst))
}

fn is_touch_exploration_enabled(call: &Call<'_, Am>, _: ()) -> Result<bool> {
	Ok(AccessibilityShadow::from_call(call)?
		.shadow
		.touch_exploration_enabled
		.load(Ordering::SeqCst))
}

fn is_accessibility_button_supported(call: &Call<'_, Am>, _: ()) -> Result<bool> {
	Ok(ShadowAccessibilityManager::accessibility_button_supported(call.env()))
}

fn perform_accessibility_shortcut(call: &Call<'_, Am>, _: ()) -> Result<()> {
	let view = AccessibilityShadow::from_call(call)?;
	view.set_enabled(true)?;
	view.set_touch_exploration_enabled(true)?;
	Ok(())
}

/// Registers the accessibility manager's shadow and original bodies.
pub fn register(builder: &mut ShadowRegistryBuilder) -> std::result::Result<(), RegistryError> {
	builder.shadow_class::<ShadowAccessibilityManager>()?;

	builder.direct(&SEND_ACCESSIBILITY_EVENT)?;
	builder.direct(&SET_STATE)?;

	builder.shadow(&ADD_STATE_LISTENER, SdkRange::ALL, add_state_listener)?;
	builder.shadow(
		&ADD_STATE_LISTENER_WITH_HANDLER,
		SdkRange::from(ApiLevel::O),
		add_state_listener_with_handler,
	)?;
	builder.shadow(&REMOVE_STATE_LISTENER, SdkRange::ALL, remove_state_listener)?;
	builder.shadow(&GET_SERVICE_LIST, SdkRange::ALL, get_service_list)?;
	builder.shadow(&GET_ENABLED_SERVICE_LIST, SdkRange::ALL, get_enabled_service_list)?;
	builder.shadow(&GET_INSTALLED_SERVICE_LIST, SdkRange::ALL, get_installed_service_list)?;
	builder.shadow(&SEND_ACCESSIBILITY_EVENT, SdkRange::ALL, send_accessibility_event)?;
	builder.shadow(&IS_ENABLED, SdkRange::ALL, is_enabled)?;
	builder.shadow(&IS_TOUCH_EXPLORATION_ENABLED, SdkRange::ALL, is_touch_exploration_enabled)?;
	builder.shadow(
		&IS_ACCESSIBILITY_BUTTON_SUPPORTED,
		SdkRange::from(ApiLevel::O_MR1),
		is_accessibility_button_supported,
	)?;
	builder.shadow(
		&PERFORM_ACCESSIBILITY_SHORTCUT,
		SdkRange::from(ApiLevel::O),
		perform_accessibility_shortcut,
	)?;
	Ok(())
}

inventory::submit! {
	ShadowPackage::new("accessibility", register)
}

#[cfg(test)]
mod tests;
