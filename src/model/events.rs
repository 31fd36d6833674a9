//! Change notification for the graph model.
//!
//! Listeners are registered with [`Listeners::subscribe`] and stay registered
//! for exactly as long as the returned [`Subscription`] is alive.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use super::types::{EdgeId, NodeId};

#[derive(Clone, Debug, PartialEq)]
pub enum ChangeEvent {
	NodeAdded(NodeId),
	NodeRemoved(NodeId),
	EdgeAdded(EdgeId),
	EdgeRemoved(EdgeId),
	Moved(Vec<NodeId>),
	AttributeChanged { id: String, key: String },
	/// The whole element set was replaced (document load, undo, redo).
	Reset,
}

impl ChangeEvent {
	/// Whether the event changes which elements exist.
	pub fn is_structural(&self) -> bool {
		matches!(
			self,
			Self::NodeAdded(_)
				| Self::NodeRemoved(_)
				| Self::EdgeAdded(_)
				| Self::EdgeRemoved(_)
				| Self::Reset
		)
	}
}

type Callback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;
type Registry = Mutex<Vec<(u64, Callback)>>;

#[derive(Default)]
pub struct Listeners {
	registry: Arc<Registry>,
	next_id: AtomicU64,
}

impl Listeners {
	pub fn subscribe(&self, callback: impl Fn(&ChangeEvent) + Send + Sync + 'static) -> Subscription {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		if let Ok(mut registry) = self.registry.lock() {
			registry.push((id, Arc::new(callback)));
		}
		Subscription {
			registry: Arc::downgrade(&self.registry),
			id,
		}
	}

	pub fn len(&self) -> usize {
		self.registry.lock().map(|r| r.len()).unwrap_or(0)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub(crate) fn emit(&self, event: ChangeEvent) {
		// Callbacks run outside the lock so they may subscribe or drop handles.
		let callbacks: Vec<Callback> = match self.registry.lock() {
			Ok(registry) => registry.iter().map(|(_, cb)| cb.clone()).collect(),
			Err(_) => return,
		};
		for cb in callbacks {
			cb(&event);
		}
	}
}

impl std::fmt::Debug for Listeners {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Listeners").field("len", &self.len()).finish()
	}
}

/// Releases its listener when dropped.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
	registry: Weak<Registry>,
	id: u64,
}

impl Subscription {
	pub fn dispose(self) {}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(registry) = self.registry.upgrade() {
			if let Ok(mut registry) = registry.lock() {
				registry.retain(|(id, _)| *id != self.id);
			}
		}
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription").field("id", &self.id).finish()
	}
}
