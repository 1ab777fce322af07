//! Copy/paste of node selections.
//!
//! A [`Fragment`] is a detached piece of a document: some nodes and the edges
//! running between them. Pasting mints new IDs for everything and rewrites
//! edges onto them, so the same fragment can be pasted any number of times.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::exercises;
use super::ids;
use super::order;
use super::types::{Document, Edge, Node, NodeId, Position};

/// Nodes and the edges between them, detached from any document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
	/// Copied nodes, in document order.
	pub nodes: Vec<Node>,
	/// Edges whose ends are both in `nodes`.
	pub edges: Vec<Edge>,
}

impl Fragment {
	/// Deep copy of the selected nodes and the edges between them.
	pub fn from_selection(doc: &Document) -> Self {
		let nodes: Vec<Node> = doc.nodes.iter().filter(|n| n.selected).cloned().collect();
		let edges = doc
			.edges
			.iter()
			.filter(|e| {
				nodes.iter().any(|n| n.id == e.source) && nodes.iter().any(|n| n.id == e.target)
			})
			.cloned()
			.collect();
		Self { nodes, edges }
	}

	/// True when no node was captured.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Inserts a remapped copy into `doc` and selects it.
	///
	/// Returns the new node IDs in fragment order.
	pub fn paste_into(&self, doc: &mut Document, offset: Position) -> Vec<NodeId> {
		let mut taken = ids::taken(doc);
		let remap: HashMap<&str, NodeId> = self
			.nodes
			.iter()
			.map(|n| {
				let kind = n.kind;
				(n.id.as_str(), ids::fresh(&mut taken, || ids::node_id(kind)))
			})
			.collect();

		doc.clear_selection();

		let mut pasted = Vec::with_capacity(self.nodes.len());
		for node in &self.nodes {
			let mut copy = node.clone();
			copy.id = remap[node.id.as_str()].clone();
			copy.position = node.position.offset(offset.x, offset.y);
			copy.data.exercises = exercises::remangle(&node.data.exercises);
			copy.data.order = None;
			copy.selected = true;
			pasted.push(copy.id.clone());
			doc.nodes.push(copy);
		}

		for edge in &self.edges {
			let (Some(source), Some(target)) = (
				remap.get(edge.source.as_str()),
				remap.get(edge.target.as_str()),
			) else {
				continue;
			};
			let mut copy = edge.clone();
			copy.id = ids::fresh(&mut taken, ids::edge_id);
			copy.source = source.clone();
			copy.target = target.clone();
			copy.selected = false;
			doc.edges.push(copy);
		}

		for edge in &self.edges {
			if let Some(source) = remap.get(edge.source.as_str()) {
				order::resequence(doc, source);
			}
		}
		pasted
	}
}

/// A fragment saved under a name for reuse across plans.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Template {
	/// Name shown in the toolbar; unique among saved templates.
	pub name: String,
	/// Inserted content.
	pub fragment: Fragment,
}

/// Holds the last copied fragment.
#[derive(Clone, Debug, Default)]
pub struct Clipboard {
	content: Option<Fragment>,
	pastes: u32,
}

impl Clipboard {
	/// Creates an empty clipboard.
	pub fn new() -> Self {
		Self::default()
	}

	/// Copies the selection of `doc`. Returns false if nothing is selected.
	pub fn copy(&mut self, doc: &Document) -> bool {
		let fragment = Fragment::from_selection(doc);
		if fragment.is_empty() {
			return false;
		}
		self.content = Some(fragment);
		self.pastes = 0;
		true
	}

	/// Last copied fragment.
	pub fn content(&self) -> Option<&Fragment> {
		self.content.as_ref()
	}

	/// True before the first copy.
	pub fn is_empty(&self) -> bool {
		self.content.is_none()
	}

	/// Pastes the clipboard, shifting each successive paste by `step` more.
	pub fn paste(&mut self, doc: &mut Document, step: Position) -> Option<Vec<NodeId>> {
		let fragment = self.content.as_ref()?;
		self.pastes += 1;
		let n = f64::from(self.pastes);
		Some(fragment.paste_into(doc, Position::new(step.x * n, step.y * n)))
	}
}
