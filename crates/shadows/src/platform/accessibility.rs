//! `android.view.accessibility.AccessibilityManager` as the host sees it.
//!
//! The original bodies only touch in-process state: there is no system
//! service behind [`ServiceProxy`], so lookups come back empty and sent
//! events land in a local log.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use umbra_dispatch::{ApiLevel, ClassId, FieldDef, Method, RealObject, Reflect, Result, SdkRange, ShadowSlot, invoke};

use super::os::Handler;

pub const STATE_FLAG_ACCESSIBILITY_ENABLED: i32 = 0x0000_0001;
pub const STATE_FLAG_TOUCH_EXPLORATION_ENABLED: i32 = 0x0000_0002;

pub trait AccessibilityStateChangeListener: Send + Sync {
	fn on_accessibility_state_changed(&self, enabled: bool);
}

pub trait TouchExplorationStateChangeListener: Send + Sync {
	fn on_touch_exploration_state_changed(&self, enabled: bool);
}

pub type StateListener = Arc<dyn AccessibilityStateChangeListener>;
pub type TouchListener = Arc<dyn TouchExplorationStateChangeListener>;
/// Shape of `mTouchExplorationStateChangeListeners` from O on.
pub type TouchListenerMap = Vec<(TouchListener, Option<Handler>)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessibilityEvent {
	pub event_type: i32,
	pub text: String,
}

impl AccessibilityEvent {
	pub fn new(event_type: i32, text: impl Into<String>) -> Self {
		Self {
			event_type,
			text: text.into(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
	pub package_name: String,
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessibilityServiceInfo {
	pub id: String,
	pub feedback_type: i32,
}

/// Inert binder proxy for the accessibility system service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceProxy;

pub struct AccessibilityManager {
	slot: ShadowSlot,
	is_enabled: AtomicBool,
	touch_exploration_enabled: AtomicBool,
	user_id: i32,
	handler: Mutex<Option<Handler>>,
	service: Mutex<Option<ServiceProxy>>,
	state_listeners: Mutex<Vec<(StateListener, Option<Handler>)>>,
	touch_listeners: Mutex<Vec<(TouchListener, Option<Handler>)>>,
	dispatched: Mutex<Vec<AccessibilityEvent>>,
}

impl RealObject for AccessibilityManager {
	const CLASS: ClassId = ClassId::new("android.view.accessibility.AccessibilityManager");

	fn shadow_slot(&self) -> &ShadowSlot {
		&self.slot
	}
}

fn upsert<L: ?Sized>(list: &mut Vec<(Arc<L>, Option<Handler>)>, listener: Arc<L>, handler: Option<Handler>) {
	match list.iter_mut().find(|(existing, _)| Arc::ptr_eq(existing, &listener)) {
		Some(entry) => entry.1 = handler,
		None => list.push((listener, handler)),
	}
}

fn remove<L: ?Sized>(list: &mut Vec<(Arc<L>, Option<Handler>)>, listener: &Arc<L>) -> bool {
	let before = list.len();
	list.retain(|(existing, _)| !Arc::ptr_eq(existing, listener));
	list.len() != before
}

impl AccessibilityManager {
	/// Constructor shape before KITKAT: the service and handler are wired afterwards.
	pub fn new() -> Self {
		Self::build(None, 0)
	}

	/// Constructor shape from KITKAT on.
	pub fn with_service(service: ServiceProxy, user_id: i32) -> Self {
		Self::build(Some(service), user_id)
	}

	fn build(service: Option<ServiceProxy>, user_id: i32) -> Self {
		Self {
			slot: ShadowSlot::new(),
			is_enabled: AtomicBool::new(false),
			touch_exploration_enabled: AtomicBool::new(false),
			user_id,
			handler: Mutex::new(None),
			service: Mutex::new(service),
			state_listeners: Mutex::new(Vec::new()),
			touch_listeners: Mutex::new(Vec::new()),
			dispatched: Mutex::new(Vec::new()),
		}
	}

	pub fn user_id(&self) -> i32 {
		self.user_id
	}

	/// Events that reached the (absent) system service.
	pub fn dispatched_events(&self) -> Vec<AccessibilityEvent> {
		self.dispatched.lock().clone()
	}

	pub fn add_accessibility_state_change_listener(&self, listener: StateListener) -> Result<bool> {
		invoke(self, &ADD_STATE_LISTENER, listener)
	}

	pub fn add_accessibility_state_change_listener_with_handler(&self, listener: StateListener, handler: Handler) -> Result<()> {
		invoke(self, &ADD_STATE_LISTENER_WITH_HANDLER, (listener, handler))
	}

	pub fn remove_accessibility_state_change_listener(&self, listener: StateListener) -> Result<bool> {
		invoke(self, &REMOVE_STATE_LISTENER, listener)
	}

	pub fn add_touch_exploration_state_change_listener(&self, listener: TouchListener) -> Result<bool> {
		invoke(self, &ADD_TOUCH_LISTENER, listener)
	}

	pub fn remove_touch_exploration_state_change_listener(&self, listener: TouchListener) -> Result<bool> {
		invoke(self, &REMOVE_TOUCH_LISTENER, listener)
	}

	pub fn get_accessibility_service_list(&self) -> Result<Option<Vec<ServiceInfo>>> {
		invoke(self, &GET_SERVICE_LIST, ())
	}

	pub fn get_enabled_accessibility_service_list(&self, feedback_type_flags: i32) -> Result<Option<Vec<AccessibilityServiceInfo>>> {
		invoke(self, &GET_ENABLED_SERVICE_LIST, feedback_type_flags)
	}

	pub fn get_installed_accessibility_service_list(&self) -> Result<Option<Vec<AccessibilityServiceInfo>>> {
		invoke(self, &GET_INSTALLED_SERVICE_LIST, ())
	}

	pub fn send_accessibility_event(&self, event: AccessibilityEvent) -> Result<()> {
		invoke(self, &SEND_ACCESSIBILITY_EVENT, event)
	}

	pub fn is_enabled(&self) -> Result<bool> {
		invoke(self, &IS_ENABLED, ())
	}

	pub fn is_touch_exploration_enabled(&self) -> Result<bool> {
		invoke(self, &IS_TOUCH_EXPLORATION_ENABLED, ())
	}

	pub fn is_accessibility_button_supported(&self) -> Result<bool> {
		invoke(self, &IS_ACCESSIBILITY_BUTTON_SUPPORTED, ())
	}

	pub fn perform_accessibility_shortcut(&self) -> Result<()> {
		invoke(self, &PERFORM_ACCESSIBILITY_SHORTCUT, ())
	}

	fn add_state_listener_original(&self, listener: StateListener) -> bool {
		upsert(&mut self.state_listeners.lock(), listener, None);
		true
	}

	fn add_state_listener_with_handler_original(&self, (listener, handler): (StateListener, Handler)) {
		upsert(&mut self.state_listeners.lock(), listener, Some(handler));
	}

	fn remove_state_listener_original(&self, listener: StateListener) -> bool {
		remove(&mut self.state_listeners.lock(), &listener)
	}

	fn add_touch_listener_original(&self, listener: TouchListener) -> bool {
		upsert(&mut self.touch_listeners.lock(), listener, None);
		true
	}

	fn remove_touch_listener_original(&self, listener: TouchListener) -> bool {
		remove(&mut self.touch_listeners.lock(), &listener)
	}

	fn get_service_list_original(&self, _: ()) -> Option<Vec<ServiceInfo>> {
		self.service.lock().map(|_| Vec::new())
	}

	fn get_enabled_service_list_original(&self, _feedback_type_flags: i32) -> Option<Vec<AccessibilityServiceInfo>> {
		self.service.lock().map(|_| Vec::new())
	}

	fn get_installed_service_list_original(&self, _: ()) -> Option<Vec<AccessibilityServiceInfo>> {
		self.service.lock().map(|_| Vec::new())
	}

	fn send_accessibility_event_original(&self, event: AccessibilityEvent) {
		if !self.is_enabled.load(Ordering::SeqCst) {
			tracing::debug!("accessibility off, dropping event {}", event.event_type);
			return;
		}
		self.dispatched.lock().push(event);
	}

	fn is_enabled_original(&self, _: ()) -> bool {
		self.is_enabled.load(Ordering::SeqCst)
	}

	fn is_touch_exploration_enabled_original(&self, _: ()) -> bool {
		self.touch_exploration_enabled.load(Ordering::SeqCst)
	}

	fn is_accessibility_button_supported_original(&self, _: ()) -> bool {
		false
	}

	fn perform_accessibility_shortcut_original(&self, _: ()) {}

	fn set_state_original(&self, state: i32) {
		self.is_enabled
			.store(state & STATE_FLAG_ACCESSIBILITY_ENABLED != 0, Ordering::SeqCst);
		self.touch_exploration_enabled
			.store(state & STATE_FLAG_TOUCH_EXPLORATION_ENABLED != 0, Ordering::SeqCst);
	}
}

impl Default for AccessibilityManager {
	fn default() -> Self {
		Self::new()
	}
}

type Am = AccessibilityManager;

pub const ADD_STATE_LISTENER: Method<Am, StateListener, bool> = Method::new(
	"addAccessibilityStateChangeListener",
	&["AccessibilityStateChangeListener"],
	Am::add_state_listener_original,
);
pub const ADD_STATE_LISTENER_WITH_HANDLER: Method<Am, (StateListener, Handler), ()> = Method::new(
	"addAccessibilityStateChangeListener",
	&["AccessibilityStateChangeListener", "Handler"],
	Am::add_state_listener_with_handler_original,
)
.available(SdkRange::from(ApiLevel::O));
pub const REMOVE_STATE_LISTENER: Method<Am, StateListener, bool> = Method::new(
	"removeAccessibilityStateChangeListener",
	&["AccessibilityStateChangeListener"],
	Am::remove_state_listener_original,
);
pub const ADD_TOUCH_LISTENER: Method<Am, TouchListener, bool> = Method::new(
	"addTouchExplorationStateChangeListener",
	&["TouchExplorationStateChangeListener"],
	Am::add_touch_listener_original,
)
.available(SdkRange::from(ApiLevel::KITKAT));
pub const REMOVE_TOUCH_LISTENER: Method<Am, TouchListener, bool> = Method::new(
	"removeTouchExplorationStateChangeListener",
	&["TouchExplorationStateChangeListener"],
	Am::remove_touch_listener_original,
)
.available(SdkRange::from(ApiLevel::KITKAT));
pub const GET_SERVICE_LIST: Method<Am, (), Option<Vec<ServiceInfo>>> =
	Method::new("getAccessibilityServiceList", &[], Am::get_service_list_original);
pub const GET_ENABLED_SERVICE_LIST: Method<Am, i32, Option<Vec<AccessibilityServiceInfo>>> =
	Method::new("getEnabledAccessibilityServiceList", &["int"], Am::get_enabled_service_list_original);
pub const GET_INSTALLED_SERVICE_LIST: Method<Am, (), Option<Vec<AccessibilityServiceInfo>>> =
	Method::new("getInstalledAccessibilityServiceList", &[], Am::get_installed_service_list_original);
pub const SEND_ACCESSIBILITY_EVENT: Method<Am, AccessibilityEvent, ()> = Method::new(
	"sendAccessibilityEvent",
	&["AccessibilityEvent"],
	Am::send_accessibility_event_original,
);
pub const IS_ENABLED: Method<Am, (), bool> = Method::new("isEnabled", &[], Am::is_enabled_original);
pub const IS_TOUCH_EXPLORATION_ENABLED: Method<Am, (), bool> =
	Method::new("isTouchExplorationEnabled", &[], Am::is_touch_exploration_enabled_original);
pub const IS_ACCESSIBILITY_BUTTON_SUPPORTED: Method<Am, (), bool> = Method::new(
	"isAccessibilityButtonSupported",
	&[],
	Am::is_accessibility_button_supported_original,
)
.available(SdkRange::from(ApiLevel::O_MR1));
/// Hidden.
pub const PERFORM_ACCESSIBILITY_SHORTCUT: Method<Am, (), ()> =
	Method::new("performAccessibilityShortcut", &[], Am::perform_accessibility_shortcut_original)
		.available(SdkRange::from(ApiLevel::O));
/// Hidden; driven by the manager's handler.
pub const SET_STATE: Method<Am, i32, ()> = Method::new("setState", &["int"], Am::set_state_original);

fn touch_listener_map(am: &Am) -> TouchListenerMap {
	am.touch_listeners.lock().clone()
}

fn touch_listener_list(am: &Am) -> Vec<TouchListener> {
	am.touch_listeners.lock().iter().map(|(l, _)| l.clone()).collect()
}

const FIELDS: &[FieldDef<Am>] = &[
	FieldDef::<Am>::new("mIsEnabled", SdkRange::ALL)
		.reader(|am| Box::new(am.is_enabled.load(Ordering::SeqCst)))
		.writer(|am, value| {
			am.is_enabled.store(*value.downcast::<bool>()?, Ordering::SeqCst);
			Ok(())
		}),
	FieldDef::<Am>::new("mIsTouchExplorationEnabled", SdkRange::ALL)
		.reader(|am| Box::new(am.touch_exploration_enabled.load(Ordering::SeqCst)))
		.writer(|am, value| {
			am.touch_exploration_enabled.store(*value.downcast::<bool>()?, Ordering::SeqCst);
			Ok(())
		}),
	FieldDef::<Am>::new("mHandler", SdkRange::ALL)
		.reader(|am| Box::new(am.handler.lock().clone()))
		.writer(|am, value| {
			*am.handler.lock() = Some(*value.downcast::<Handler>()?);
			Ok(())
		}),
	FieldDef::<Am>::new("mService", SdkRange::ALL)
		.reader(|am| Box::new(*am.service.lock()))
		.writer(|am, value| {
			*am.service.lock() = Some(*value.downcast::<ServiceProxy>()?);
			Ok(())
		}),
	FieldDef::<Am>::new(
		"mTouchExplorationStateChangeListeners",
		SdkRange::new(ApiLevel::KITKAT, ApiLevel::N_MR1),
	)
	.reader(|am| Box::new(touch_listener_list(am))),
	FieldDef::<Am>::new("mTouchExplorationStateChangeListeners", SdkRange::from(ApiLevel::O))
		.reader(|am| Box::new(touch_listener_map(am))),
];

impl Reflect for AccessibilityManager {
	fn fields() -> &'static [FieldDef<Self>] {
		FIELDS
	}
}
