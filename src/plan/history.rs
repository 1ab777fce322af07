//! Snapshot based undo/redo.
//!
//! Both stacks hold full [`Document`] clones and are bounded; pushing past the
//! bound drops the oldest entry.

use std::collections::VecDeque;

use super::types::Document;

/// Default number of snapshots kept on each stack.
pub const DEFAULT_LIMIT: usize = 100;

/// Past and future document snapshots, each bounded by `limit`.
#[derive(Clone, Debug)]
pub struct History {
	past: VecDeque<Document>,
	future: VecDeque<Document>,
	limit: usize,
}

impl Default for History {
	fn default() -> Self {
		Self::new(DEFAULT_LIMIT)
	}
}

impl History {
	/// Creates empty stacks holding at most `limit` entries each.
	pub fn new(limit: usize) -> Self {
		Self {
			past: VecDeque::new(),
			future: VecDeque::new(),
			limit: limit.max(1),
		}
	}

	/// Maximum entries per stack.
	pub fn limit(&self) -> usize {
		self.limit
	}

	/// True when there is a snapshot to go back to.
	pub fn can_undo(&self) -> bool {
		!self.past.is_empty()
	}

	/// True after an undo that no edit has overwritten.
	pub fn can_redo(&self) -> bool {
		!self.future.is_empty()
	}

	/// Snapshots on the undo stack.
	pub fn undo_len(&self) -> usize {
		self.past.len()
	}

	/// Snapshots on the redo stack.
	pub fn redo_len(&self) -> usize {
		self.future.len()
	}

	/// Records the state before an edit. Clears the redo stack.
	pub fn record(&mut self, snapshot: Document) {
		push_bounded(&mut self.past, snapshot, self.limit);
		self.future.clear();
	}

	/// Steps back. `current` moves onto the redo stack and the previous
	/// snapshot is returned, or `None` when there is nothing to undo.
	pub fn undo(&mut self, current: Document) -> Option<Document> {
		let previous = self.past.pop_back()?;
		push_bounded(&mut self.future, current, self.limit);
		Some(previous)
	}

	/// Steps forward, mirroring [`History::undo`].
	pub fn redo(&mut self, current: Document) -> Option<Document> {
		let next = self.future.pop_back()?;
		push_bounded(&mut self.past, current, self.limit);
		Some(next)
	}

	/// Forgets both stacks.
	pub fn clear(&mut self) {
		self.past.clear();
		self.future.clear();
	}

	/// Oldest snapshot still on the undo stack.
	pub fn oldest(&self) -> Option<&Document> {
		self.past.front()
	}
}

fn push_bounded(stack: &mut VecDeque<Document>, doc: Document, limit: usize) {
	stack.push_back(doc);
	while stack.len() > limit {
		stack.pop_front();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::plan::types::{Node, NodeKind, Position};

	fn doc_with(n: usize) -> Document {
		Document {
			nodes: (0..n)
				.map(|i| Node::new(i.to_string(), NodeKind::Phase, Position::default()))
				.collect(),
			edges: Vec::new(),
		}
	}

	#[test]
	fn undo_then_redo_round_trips() {
		let mut history = History::new(10);
		history.record(doc_with(0));
		let current = doc_with(1);

		let restored = history.undo(current.clone()).unwrap();
		assert_eq!(restored, doc_with(0));
		assert!(history.can_redo());

		let again = history.redo(restored).unwrap();
		assert_eq!(again, current);
		assert!(!history.can_redo());
		assert!(history.can_undo());
	}

	#[test]
	fn record_clears_future() {
		let mut history = History::new(10);
		history.record(doc_with(0));
		history.undo(doc_with(1));
		assert_eq!(history.redo_len(), 1);
		history.record(doc_with(2));
		assert_eq!(history.redo_len(), 0);
	}

	#[test]
	fn evicts_oldest_first() {
		let mut history = History::new(3);
		for i in 0..5 {
			history.record(doc_with(i));
		}
		assert_eq!(history.undo_len(), 3);
		assert_eq!(history.oldest(), Some(&doc_with(2)));
	}

	#[test]
	fn empty_stacks_return_none() {
		let mut history = History::default();
		assert!(history.undo(doc_with(0)).is_none());
		assert!(history.redo(doc_with(0)).is_none());
		assert_eq!(history.limit(), DEFAULT_LIMIT);
	}
}
