//! Listener bookkeeping for shadow state-change notifications.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap as HashMap;

type Task = Box<dyn FnOnce() + Send>;

/// FIFO of deferred deliveries, drained by the host's idle step.
#[derive(Clone, Default)]
pub struct DeliveryQueue {
	tasks: Arc<Mutex<VecDeque<Task>>>,
}

impl DeliveryQueue {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn post(&self, task: impl FnOnce() + Send + 'static) {
		self.tasks.lock().push_back(Box::new(task));
	}

	/// Runs queued tasks, including ones posted while draining; returns how many ran.
	pub fn run_pending(&self) -> usize {
		let mut ran = 0;
		loop {
			let Some(task) = self.tasks.lock().pop_front() else {
				return ran;
			};
			task();
			ran += 1;
		}
	}

	pub fn len(&self) -> usize {
		self.tasks.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.tasks.lock().is_empty()
	}

	/// True when both handles feed the same queue.
	pub fn same_queue(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.tasks, &other.tasks)
	}
}

impl fmt::Debug for DeliveryQueue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DeliveryQueue").field("pending", &self.len()).finish()
	}
}

/// How a listener receives notifications.
#[derive(Debug, Clone, Default)]
pub enum DeliveryContext {
	/// Called synchronously on the notifying thread.
	#[default]
	Inline,
	/// Posted to a queue and run when it drains.
	Queued(DeliveryQueue),
}

impl PartialEq for DeliveryContext {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Inline, Self::Inline) => true,
			(Self::Queued(a), Self::Queued(b)) => a.same_queue(b),
			_ => false,
		}
	}
}

struct ListenerEntry<L: ?Sized> {
	listener: Arc<L>,
	context: DeliveryContext,
}

impl<L: ?Sized> Clone for ListenerEntry<L> {
	fn clone(&self) -> Self {
		Self {
			listener: self.listener.clone(),
			context: self.context.clone(),
		}
	}
}

/// Listeners keyed by identity, each with its delivery context.
pub struct ListenerRegistry<L: ?Sized> {
	entries: Mutex<HashMap<usize, ListenerEntry<L>>>,
}

impl<L: ?Sized> Default for ListenerRegistry<L> {
	fn default() -> Self {
		Self {
			entries: Mutex::new(HashMap::default()),
		}
	}
}

fn identity<L: ?Sized>(listener: &Arc<L>) -> usize {
	Arc::as_ptr(listener).cast::<()>() as usize
}

impl<L: ?Sized + Send + Sync + 'static> ListenerRegistry<L> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `listener`, replacing the context of an existing registration.
	pub fn add(&self, listener: Arc<L>, context: DeliveryContext) {
		self.entries.lock().insert(identity(&listener), ListenerEntry { listener, context });
	}

	/// Unregisters `listener`; true iff it was registered.
	pub fn remove(&self, listener: &Arc<L>) -> bool {
		self.entries.lock().remove(&identity(listener)).is_some()
	}

	pub fn contains(&self, listener: &Arc<L>) -> bool {
		self.entries.lock().contains_key(&identity(listener))
	}

	pub fn context_of(&self, listener: &Arc<L>) -> Option<DeliveryContext> {
		self.entries.lock().get(&identity(listener)).map(|e| e.context.clone())
	}

	/// Delivers to every listener registered when the call starts.
	///
	/// Inline listeners run before this returns; queued ones run when their
	/// queue drains. Returns the number of listeners reached.
	pub fn notify_all<F>(&self, deliver: F) -> usize
	where
		F: Fn(&L) + Clone + Send + 'static,
	{
		let snapshot: Vec<ListenerEntry<L>> = self.entries.lock().values().cloned().collect();
		for entry in &snapshot {
			match &entry.context {
				DeliveryContext::Inline => deliver(&*entry.listener),
				DeliveryContext::Queued(queue) => {
					let deliver = deliver.clone();
					let listener = entry.listener.clone();
					queue.post(move || deliver(&*listener));
				}
			}
		}
		snapshot.len()
	}

	pub fn listeners(&self) -> Vec<Arc<L>> {
		self.entries.lock().values().map(|e| e.listener.clone()).collect()
	}

	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	pub fn clear(&self) {
		self.entries.lock().clear();
	}
}

impl<L: ?Sized> fmt::Debug for ListenerRegistry<L> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ListenerRegistry").field("len", &self.entries.lock().len()).finish()
	}
}
