use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;
use serial_test::serial;
use umbra_dispatch::{DispatchError, RealObject, ShadowRegistry, SingletonState};
use umbra_sdk::SdkVersion;

use super::*;
use crate::platform::accessibility::STATE_FLAG_ACCESSIBILITY_ENABLED;
use crate::platform::{Message, TouchExplorationStateChangeListener};

fn env_at(level: ApiLevel) -> ShadowEnvironment {
	let mut builder = ShadowRegistry::builder();
	register(&mut builder).unwrap();
	let sdk = SdkVersion {
		api_level: level,
		platform_version: "test",
		framework_build_revision: "0",
		code_name: "REL",
	};
	ShadowEnvironment::new(sdk, Arc::new(builder.build()))
}

#[derive(Default)]
struct TouchRecorder(parking_lot::Mutex<Vec<bool>>);

impl TouchExplorationStateChangeListener for TouchRecorder {
	fn on_touch_exploration_state_changed(&self, enabled: bool) {
		self.0.lock().push(enabled);
	}
}

#[test]
fn registration_is_conflict_free() {
	let mut builder = ShadowRegistry::builder();
	register(&mut builder).unwrap();
	let registry = builder.build();
	assert!(registry.shadow_class(AccessibilityManager::CLASS).is_some());
	assert_eq!(
		registry
			.direct_overloads(AccessibilityManager::CLASS, "setState", ApiLevel::KITKAT)
			.count(),
		1
	);
}

#[test]
fn singleton_survives_until_reset() {
	let env = env_at(ApiLevel::KITKAT);
	let context = Context::new();
	let first = ShadowAccessibilityManager::get_instance(&env, &context).unwrap();
	let again = ShadowAccessibilityManager::get_instance(&env, &context).unwrap();
	assert!(Arc::ptr_eq(&first, &again));
	assert_eq!(first.user_id(), 0);

	env.reset_all();
	assert_eq!(
		env.binder().singleton_state::<AccessibilityManager>(),
		SingletonState::Uncreated
	);
	let fresh = ShadowAccessibilityManager::get_instance(&env, &context).unwrap();
	assert!(!Arc::ptr_eq(&first, &fresh));
}

#[rstest]
#[case(ApiLevel::JELLY_BEAN_MR2)]
#[case(ApiLevel::KITKAT)]
fn instance_gets_a_service_and_handler(#[case] level: ApiLevel) {
	let env = env_at(level);
	let manager = ShadowAccessibilityManager::get_instance(&env, &Context::new()).unwrap();
	let reflector = env.reflector(&*manager);
	assert_eq!(reflector.get::<Option<ServiceProxy>>("mService").unwrap(), Some(ServiceProxy));
	assert!(reflector.get::<Option<Handler>>("mHandler").unwrap().is_some());
}

#[test]
#[serial]
fn handler_applies_state_through_the_hidden_setter() {
	let env = Arc::new(env_at(ApiLevel::KITKAT));
	let _scope = Scope::enter(env.clone()).unwrap();
	let context = Context::new();
	let manager = ShadowAccessibilityManager::get_instance(&env, &context).unwrap();
	let handler = env.reflector(&*manager).get::<Option<Handler>>("mHandler").unwrap().unwrap();

	handler.send_message(Message {
		what: DO_SET_STATE,
		arg1: STATE_FLAG_ACCESSIBILITY_ENABLED,
	});
	assert!(!env.reflector(&*manager).get::<bool>("mIsEnabled").unwrap());
	assert_eq!(context.main_looper().idle(), 1);
	assert!(env.reflector(&*manager).get::<bool>("mIsEnabled").unwrap());
}

#[rstest]
#[case(ApiLevel::KITKAT)]
#[case(ApiLevel::N_MR1)]
#[case(ApiLevel::O)]
fn touch_listener_field_shape_follows_the_level(#[case] level: ApiLevel) {
	let env = env_at(level);
	let manager = AccessibilityManager::with_service(ServiceProxy, 0);
	let listener = Arc::new(TouchRecorder::default());
	invoke_add_touch(&env, &manager, listener.clone());

	let listeners = env
		.reflector(&manager)
		.touch_exploration_state_change_listeners()
		.unwrap();
	assert_eq!(listeners.len(), 1);

	shadow_of(&env, &manager).unwrap().set_touch_exploration_enabled(true).unwrap();
	assert_eq!(*listener.0.lock(), vec![true]);
}

fn invoke_add_touch(env: &ShadowEnvironment, manager: &AccessibilityManager, listener: Arc<TouchRecorder>) {
	let listener: TouchListener = listener;
	let added = umbra_dispatch::invoke_in(env, manager, &crate::platform::accessibility::ADD_TOUCH_LISTENER, listener).unwrap();
	assert!(added);
}

#[test]
fn touch_listeners_do_not_exist_before_kitkat() {
	let env = env_at(ApiLevel::JELLY_BEAN_MR2);
	let manager = AccessibilityManager::new();
	assert!(matches!(
		env.reflector(&manager).touch_exploration_state_change_listeners(),
		Err(AccessError::MemberNotFound { .. })
	));
	shadow_of(&env, &manager).unwrap().set_touch_exploration_enabled(true).unwrap();
}

#[test]
fn button_support_query_needs_o_mr1() {
	let env = env_at(ApiLevel::O);
	let err = umbra_dispatch::invoke_in(&env, &AccessibilityManager::new(), &IS_ACCESSIBILITY_BUTTON_SUPPORTED, ()).unwrap_err();
	assert!(matches!(err, DispatchError::MethodUnavailable { .. }));
}

#[test]
fn button_support_is_static_and_resets() {
	let env = env_at(ApiLevel::O_MR1);
	let manager = AccessibilityManager::new();
	let call = |m: &AccessibilityManager| {
		umbra_dispatch::invoke_in(&env, m, &IS_ACCESSIBILITY_BUTTON_SUPPORTED, ()).unwrap()
	};
	assert!(call(&manager));

	ShadowAccessibilityManager::set_accessibility_button_supported(&env, false);
	assert!(!call(&manager));
	assert!(!call(&AccessibilityManager::new()));

	env.reset_all();
	assert!(call(&manager));
}

#[test]
fn service_lists_come_from_the_shadow() {
	let env = env_at(ApiLevel::KITKAT);
	let manager = AccessibilityManager::with_service(ServiceProxy, 0);
	let view = shadow_of(&env, &manager).unwrap();
	let installed = vec![AccessibilityServiceInfo {
		id: "com.example/.Reader".into(),
		feedback_type: 1,
	}];
	view.set_installed_accessibility_service_list(Some(installed.clone()));

	let got = umbra_dispatch::invoke_in(&env, &manager, &GET_INSTALLED_SERVICE_LIST, ()).unwrap();
	assert_eq!(got, Some(installed));
	assert_eq!(umbra_dispatch::invoke_in(&env, &manager, &GET_SERVICE_LIST, ()).unwrap(), None);
}
