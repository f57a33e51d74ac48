//! A small fake platform class with a shadow, shared by the unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;
use umbra_sdk::{ApiLevel, SdkVersion};

use crate::{
	Call, ClassId, FieldDef, Method, RealObject, Reflect, Result, SdkRange, Shadow, ShadowEnvironment, ShadowRegistry,
	ShadowRegistryBuilder, ShadowSlot, invoke,
};

pub(crate) struct Widget {
	slot: ShadowSlot,
	pub clicks: AtomicU32,
	pub label: Mutex<String>,
	pub serial: u32,
}

impl RealObject for Widget {
	const CLASS: ClassId = ClassId::new("android.widget.Widget");

	fn shadow_slot(&self) -> &ShadowSlot {
		&self.slot
	}
}

impl Widget {
	pub fn new(label: &str) -> Self {
		Self {
			slot: ShadowSlot::new(),
			clicks: AtomicU32::new(0),
			label: Mutex::new(label.to_string()),
			serial: 7,
		}
	}

	pub fn click(&self) -> Result<u32> {
		invoke(self, &CLICK, ())
	}

	pub fn label(&self) -> Result<String> {
		invoke(self, &LABEL, ())
	}

	fn click_original(&self, _: ()) -> u32 {
		self.clicks.fetch_add(1, Ordering::SeqCst) + 1
	}

	fn label_original(&self, _: ()) -> String {
		self.label.lock().clone()
	}

	fn resize_original(&self, width: u32) -> u32 {
		width * 2
	}

	fn grow_original(&self, by: u32) -> u32 {
		self.serial + by
	}

	fn grow_both_original(&self, (width, height): (u32, u32)) -> u32 {
		self.serial + width * height
	}

	fn reset_clicks_original(&self, _: ()) {
		self.clicks.store(0, Ordering::SeqCst);
	}
}

pub(crate) const CLICK: Method<Widget, (), u32> = Method::new("click", &[], Widget::click_original);
pub(crate) const LABEL: Method<Widget, (), String> = Method::new("getLabel", &[], Widget::label_original);
pub(crate) const RESIZE: Method<Widget, u32, u32> =
	Method::new("resize", &["int"], Widget::resize_original).available(SdkRange::from(ApiLevel::LOLLIPOP));
pub(crate) const GROW: Method<Widget, u32, u32> = Method::new("grow", &["int"], Widget::grow_original);
pub(crate) const GROW_BOTH: Method<Widget, (u32, u32), u32> =
	Method::new("grow", &["int", "int"], Widget::grow_both_original);
pub(crate) const RESET_CLICKS: Method<Widget, (), ()> = Method::new("resetClicks", &[], Widget::reset_clicks_original);

const WIDGET_FIELDS: &[FieldDef<Widget>] = &[
	FieldDef::<Widget>::new("mLabel", SdkRange::ALL)
		.reader(|w| Box::new(w.label.lock().clone()))
		.writer(|w, value| {
			*w.label.lock() = *value.downcast::<String>()?;
			Ok(())
		}),
	FieldDef::<Widget>::new("mSerial", SdkRange::ALL).reader(|w| Box::new(w.serial)),
	FieldDef::<Widget>::new("mClicks", SdkRange::ALL).writer(|w, value| {
		w.clicks.store(*value.downcast::<u32>()?, Ordering::SeqCst);
		Ok(())
	}),
	FieldDef::<Widget>::new("mLegacyFlag", SdkRange::up_to(ApiLevel::JELLY_BEAN_MR2)).reader(|_| Box::new(true)),
];

impl Reflect for Widget {
	fn fields() -> &'static [FieldDef<Self>] {
		WIDGET_FIELDS
	}
}

#[derive(Debug, Default)]
pub(crate) struct ShadowWidget {
	pub intercepted: AtomicU32,
}

impl Shadow for ShadowWidget {
	type Real = Widget;

	fn create(_real: &Widget) -> Self {
		Self::default()
	}
}

/// Counts the interception, then runs the real click exactly once.
pub(crate) fn shadow_click(call: &Call<'_, Widget>, _: ()) -> Result<u32> {
	let shadow = call.shadow::<ShadowWidget>()?;
	shadow.intercepted.fetch_add(1, Ordering::SeqCst);
	Ok(call.reflector().call_direct(&CLICK, ())?)
}

pub(crate) fn shadow_label(_call: &Call<'_, Widget>, _: ()) -> Result<String> {
	Ok("shadowed".to_string())
}

pub(crate) fn widget_registry() -> ShadowRegistryBuilder {
	let mut builder = ShadowRegistry::builder();
	builder.shadow_class::<ShadowWidget>().unwrap();
	builder.direct(&CLICK).unwrap();
	builder.direct(&LABEL).unwrap();
	builder.direct(&RESIZE).unwrap();
	builder.direct(&RESET_CLICKS).unwrap();
	builder.direct(&GROW).unwrap();
	builder.direct(&GROW_BOTH).unwrap();
	builder.shadow(&CLICK, SdkRange::ALL, shadow_click).unwrap();
	builder.shadow(&LABEL, SdkRange::from(ApiLevel::M), shadow_label).unwrap();
	builder
}

pub(crate) fn sdk(level: ApiLevel) -> SdkVersion {
	SdkVersion {
		api_level: level,
		platform_version: "test",
		framework_build_revision: "0",
		code_name: "REL",
	}
}

pub(crate) fn env_at(level: ApiLevel, registry: ShadowRegistry) -> ShadowEnvironment {
	ShadowEnvironment::new(sdk(level), Arc::new(registry))
}
