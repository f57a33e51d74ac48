//! Host stand-ins for the platform's message loop primitives.

use std::fmt;
use std::sync::Arc;

use umbra_dispatch::{DeliveryContext, DeliveryQueue};

/// A message loop. Nothing runs until the test idles it.
#[derive(Debug, Clone, Default)]
pub struct Looper {
	queue: DeliveryQueue,
}

impl Looper {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn queue(&self) -> &DeliveryQueue {
		&self.queue
	}

	/// Runs everything posted so far; returns how many tasks ran.
	pub fn idle(&self) -> usize {
		self.queue.run_pending()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
	pub what: i32,
	pub arg1: i32,
}

type MessageCallback = Arc<dyn Fn(Message) + Send + Sync>;

/// Posts work and messages to a [`Looper`].
#[derive(Clone)]
pub struct Handler {
	looper: Looper,
	callback: Option<MessageCallback>,
}

impl Handler {
	pub fn new(looper: Looper) -> Self {
		Self { looper, callback: None }
	}

	pub fn with_callback(looper: Looper, callback: impl Fn(Message) + Send + Sync + 'static) -> Self {
		Self {
			looper,
			callback: Some(Arc::new(callback)),
		}
	}

	pub fn looper(&self) -> &Looper {
		&self.looper
	}

	pub fn post(&self, task: impl FnOnce() + Send + 'static) {
		self.looper.queue().post(task);
	}

	/// Queues `message` for this handler's callback; dropped if there is none.
	pub fn send_message(&self, message: Message) {
		if let Some(callback) = self.callback.clone() {
			self.post(move || callback(message));
		}
	}

	/// Listener delivery through this handler's loop.
	pub fn delivery_context(&self) -> DeliveryContext {
		DeliveryContext::Queued(self.looper.queue().clone())
	}
}

impl fmt::Debug for Handler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Handler")
			.field("looper", &self.looper)
			.field("has_callback", &self.callback.is_some())
			.finish()
	}
}

/// Application context; only the main loop is modelled.
#[derive(Debug, Clone, Default)]
pub struct Context {
	main_looper: Looper,
}

impl Context {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn main_looper(&self) -> &Looper {
		&self.main_looper
	}
}
