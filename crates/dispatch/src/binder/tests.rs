use std::sync::atomic::{AtomicBool, AtomicUsize};
use std::sync::{Arc, Barrier, mpsc};
use std::thread;
use std::time::Duration;

use super::*;
use crate::test_fixtures::{ShadowWidget, Widget, widget_registry};

#[test]
fn binding_twice_returns_the_same_shadow() {
	let registry = widget_registry().build();
	let binder = InstanceBinder::new();
	let widget = Widget::new("a");

	let first = binder.bind::<ShadowWidget>(&registry, &widget).unwrap();
	let second = binder.bind::<ShadowWidget>(&registry, &widget).unwrap();
	assert!(Arc::ptr_eq(&first, &second));
	assert!(widget.shadow_slot().is_bound());
}

#[test]
fn each_real_object_gets_its_own_shadow() {
	let registry = widget_registry().build();
	let binder = InstanceBinder::new();
	let (a, b) = (Widget::new("a"), Widget::new("b"));

	let sa = binder.bind::<ShadowWidget>(&registry, &a).unwrap();
	let sb = binder.bind::<ShadowWidget>(&registry, &b).unwrap();
	assert!(!Arc::ptr_eq(&sa, &sb));
}

#[test]
fn unshadowed_class_fails_to_bind() {
	let registry = ShadowRegistry::empty();
	let err = InstanceBinder::new().bind::<ShadowWidget>(&registry, &Widget::new("a")).unwrap_err();
	assert_eq!(err, BindError::NotShadowed(Widget::CLASS));
}

struct Service {
	serial: usize,
}

#[test]
fn concurrent_first_touch_creates_one_singleton() {
	const THREADS: usize = 8;
	let binder = Arc::new(InstanceBinder::new());
	let constructions = Arc::new(AtomicUsize::new(0));
	let barrier = Arc::new(Barrier::new(THREADS));

	let handles: Vec<_> = (0..THREADS)
		.map(|_| {
			let binder = binder.clone();
			let constructions = constructions.clone();
			let barrier = barrier.clone();
			thread::spawn(move || {
				barrier.wait();
				binder.get_or_create_singleton(|| {
					let serial = constructions.fetch_add(1, Ordering::SeqCst);
					thread::sleep(Duration::from_millis(5));
					Arc::new(Service { serial })
				})
			})
		})
		.collect();

	let instances: Vec<Arc<Service>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
	assert_eq!(constructions.load(Ordering::SeqCst), 1);
	assert!(instances.iter().all(|i| Arc::ptr_eq(i, &instances[0])));
	assert_eq!(instances[0].serial, 0);
}

struct Outer(Arc<Service>);

#[test]
fn observing_a_singleton_while_its_constructor_creates_another() {
	let binder = Arc::new(InstanceBinder::new());
	let barrier = Arc::new(Barrier::new(2));
	let (done, finished) = mpsc::channel();

	let creator = {
		let binder = binder.clone();
		let barrier = barrier.clone();
		let done = done.clone();
		thread::spawn(move || {
			let outer = binder.get_or_create_singleton(|| {
				barrier.wait();
				thread::sleep(Duration::from_millis(50));
				Arc::new(Outer(binder.get_or_create_singleton(|| Arc::new(Service { serial: 9 }))))
			});
			done.send("creator").unwrap();
			outer
		})
	};
	let observer = {
		let binder = binder.clone();
		thread::spawn(move || {
			barrier.wait();
			let state = binder.singleton_state::<Outer>();
			done.send("observer").unwrap();
			state
		})
	};

	for _ in 0..2 {
		finished.recv_timeout(Duration::from_secs(5)).expect("binder deadlocked");
	}
	assert_eq!(creator.join().unwrap().0.serial, 9);
	assert_eq!(observer.join().unwrap(), SingletonState::Created);
	assert_eq!(binder.singleton_state::<Service>(), SingletonState::Created);
}

#[test]
fn reset_forces_a_fresh_singleton() {
	let binder = InstanceBinder::new();
	assert_eq!(binder.singleton_state::<Service>(), SingletonState::Uncreated);

	let before = binder.get_or_create_singleton(|| Arc::new(Service { serial: 1 }));
	assert_eq!(binder.singleton_state::<Service>(), SingletonState::Created);

	binder.reset_all();
	assert_eq!(binder.singleton_state::<Service>(), SingletonState::Uncreated);
	assert_eq!(binder.generation(), 1);

	let after = binder.get_or_create_singleton(|| Arc::new(Service { serial: 2 }));
	assert!(!Arc::ptr_eq(&before, &after));
	assert_eq!(after.serial, 2);
}

#[test]
fn failed_creation_leaves_slot_empty() {
	let binder = InstanceBinder::new();
	let failed: Result<Arc<Service>, &str> = binder.get_or_try_create_singleton(|| Err("boom"));
	assert_eq!(failed.err(), Some("boom"));
	assert_eq!(binder.singleton_state::<Service>(), SingletonState::Uncreated);

	let created: Result<Arc<Service>, &str> = binder.get_or_try_create_singleton(|| Ok(Arc::new(Service { serial: 3 })));
	assert_eq!(created.unwrap().serial, 3);
}

struct ButtonSupport(AtomicBool);

impl Default for ButtonSupport {
	fn default() -> Self {
		Self(AtomicBool::new(true))
	}
}

#[test]
fn static_state_defaults_after_reset() {
	let binder = InstanceBinder::new();
	binder.static_state::<ButtonSupport>().0.store(false, Ordering::SeqCst);
	assert!(!binder.static_state::<ButtonSupport>().0.load(Ordering::SeqCst));

	binder.reset_all();
	assert!(binder.static_state::<ButtonSupport>().0.load(Ordering::SeqCst));
}
