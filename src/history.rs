//! Undo/redo over whole-map snapshots.
//!
//! A snapshot is only recorded when its content fingerprint differs from the
//! last one, so repeated captures of an unchanged map are free.

use sha2::{Digest, Sha256};

use crate::storage::Document;

pub type Fingerprint = [u8; 32];

/// SHA-256 over the canonical JSON encoding of a snapshot.
pub fn fingerprint(doc: &Document) -> Fingerprint {
	let bytes = serde_json::to_vec(doc).unwrap_or_default();
	Sha256::digest(&bytes).into()
}

#[derive(Debug, Clone)]
pub struct History {
	undo: Vec<Document>,
	redo: Vec<Document>,
	last: Option<Fingerprint>,
	limit: usize,
}

impl Default for History {
	fn default() -> Self {
		Self::new(100)
	}
}

impl History {
	pub fn new(limit: usize) -> Self {
		Self {
			undo: Vec::new(),
			redo: Vec::new(),
			last: None,
			limit: limit.max(1),
		}
	}

	/// Record `snapshot` if it differs from the last recorded state.
	pub fn capture(&mut self, snapshot: Document) -> bool {
		let hash = fingerprint(&snapshot);
		if self.last == Some(hash) {
			return false;
		}
		self.last = Some(hash);
		self.undo.push(snapshot);
		self.redo.clear();
		self.enforce_limit();
		true
	}

	fn enforce_limit(&mut self) {
		if self.undo.len() > self.limit {
			let excess = self.undo.len() - self.limit;
			self.undo.drain(..excess);
		}
	}

	pub fn can_undo(&self) -> bool {
		self.undo.len() > 1
	}

	pub fn can_redo(&self) -> bool {
		!self.redo.is_empty()
	}

	/// The snapshot [`History::undo`] would return, without moving.
	pub fn peek_undo(&self) -> Option<&Document> {
		if !self.can_undo() {
			return None;
		}
		self.undo.get(self.undo.len() - 2)
	}

	/// The snapshot [`History::redo`] would return, without moving.
	pub fn peek_redo(&self) -> Option<&Document> {
		self.redo.last()
	}

	/// The snapshot to restore when stepping back from `current`.
	pub fn undo(&mut self, current: Document) -> Option<Document> {
		if !self.can_undo() {
			return None;
		}
		self.undo.pop();
		self.redo.push(current);
		let prev = self.undo.last().cloned()?;
		self.last = Some(fingerprint(&prev));
		Some(prev)
	}

	/// The snapshot to restore when stepping forward again.
	pub fn redo(&mut self, current: Document) -> Option<Document> {
		let next = self.redo.pop()?;
		if self.last != Some(fingerprint(&current)) {
			self.undo.push(current);
		}
		self.undo.push(next.clone());
		self.enforce_limit();
		self.last = Some(fingerprint(&next));
		Some(next)
	}

	pub fn undo_len(&self) -> usize {
		self.undo.len()
	}

	pub fn redo_len(&self) -> usize {
		self.redo.len()
	}

	pub fn clear(&mut self) {
		self.undo.clear();
		self.redo.clear();
		self.last = None;
	}
}
