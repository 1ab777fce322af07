//! The editable plan: document, history and clipboard behind one API.
//!
//! Every mutating call validates first, then snapshots the current document
//! into history, then edits. A rejected edit leaves both untouched.

use std::collections::{BTreeSet, HashSet};

use log::{debug, info, warn};

use super::clipboard::{Clipboard, Fragment, Template};
use super::error::{EditError, Result};
use super::hierarchy;
use super::history::History;
use super::ids;
use super::layout;
use super::order;
use super::types::{Document, Edge, EdgeId, Node, NodeData, NodeId, NodeKind, Position};
use crate::config::EditorConfig;

/// Vertical gap between a parent and a child created with [`PlanStore::add_child`].
const CHILD_GAP: f64 = 120.0;

fn first_repeated<'a>(ids: impl IntoIterator<Item = &'a str>) -> Option<String> {
	let mut seen = HashSet::new();
	ids.into_iter().find(|id| !seen.insert(*id)).map(str::to_string)
}

/// Owns the document and everything needed to edit it.
pub struct PlanStore {
	doc: Document,
	history: History,
	clipboard: Clipboard,
	config: EditorConfig,
}

impl Default for PlanStore {
	fn default() -> Self {
		Self::new(EditorConfig::default())
	}
}

impl PlanStore {
	/// Creates a store around an empty document.
	pub fn new(config: EditorConfig) -> Self {
		Self::with_document(Document::new(), config)
	}

	/// Opens an existing document. History starts empty.
	///
	/// Stored documents are not trusted: repeated node IDs keep their first
	/// occurrence and edges the hierarchy rejects are dropped.
	pub fn with_document(mut doc: Document, config: EditorConfig) -> Self {
		let mut seen = HashSet::new();
		let nodes_before = doc.nodes.len();
		doc.nodes.retain(|n| seen.insert(n.id.clone()));
		if doc.nodes.len() != nodes_before {
			warn!("Dropped {} nodes with repeated IDs", nodes_before - doc.nodes.len());
		}
		let dropped = hierarchy::prune(&mut doc);
		if dropped > 0 {
			warn!("Dropped {} invalid edges from loaded plan", dropped);
		}
		order::resequence_all(&mut doc);
		Self {
			doc,
			history: History::new(config.history_limit),
			clipboard: Clipboard::new(),
			config,
		}
	}

	/// Current document.
	pub fn document(&self) -> &Document {
		&self.doc
	}

	/// Settings the store was opened with.
	pub fn config(&self) -> &EditorConfig {
		&self.config
	}

	/// Undo and redo stacks.
	pub fn history(&self) -> &History {
		&self.history
	}

	/// Last copied fragment.
	pub fn clipboard(&self) -> &Clipboard {
		&self.clipboard
	}

	fn checkpoint(&mut self) {
		self.history.record(self.doc.clone());
	}

	fn require_node(&self, id: &str) -> Result<&Node> {
		self.doc
			.node(id)
			.ok_or_else(|| EditError::UnknownNode(id.to_string()))
	}

	// Whole-array replacement

	/// Replaces all nodes. Edges the new nodes no longer support are dropped:
	/// edges touching removed nodes, and edges whose kinds changed to a pair the
	/// hierarchy rejects. Returns the number of edges dropped.
	pub fn replace_nodes(&mut self, nodes: Vec<Node>) -> Result<usize> {
		if let Some(dup) = first_repeated(nodes.iter().map(|n| n.id.as_str())) {
			return Err(EditError::DuplicateId(dup));
		}
		let mut candidate = Document {
			nodes,
			edges: self.doc.edges.clone(),
		};
		let dropped = hierarchy::prune(&mut candidate);
		order::resequence_all(&mut candidate);
		self.checkpoint();
		self.doc = candidate;
		debug!("Replaced nodes, dropped {} edges", dropped);
		Ok(dropped)
	}

	/// Replaces all edges. Each edge must pass the hierarchy rules against the
	/// edges before it.
	pub fn replace_edges(&mut self, edges: Vec<Edge>) -> Result<()> {
		let mut candidate = Document {
			nodes: self.doc.nodes.clone(),
			edges: Vec::with_capacity(edges.len()),
		};
		for edge in edges {
			if candidate.contains_edge(&edge.id) {
				return Err(EditError::DuplicateId(edge.id));
			}
			hierarchy::validate_connection(&candidate, &edge.source, &edge.target, None)?;
			candidate.edges.push(edge);
		}
		order::resequence_all(&mut candidate);
		self.checkpoint();
		self.doc = candidate;
		Ok(())
	}

	// Nodes

	/// Adds an unconnected node and returns its ID.
	pub fn add_node(&mut self, kind: NodeKind, position: Position) -> NodeId {
		self.checkpoint();
		let id = self.insert_node(kind, position);
		debug!("Added {} node {}", kind, id);
		id
	}

	fn insert_node(&mut self, kind: NodeKind, position: Position) -> NodeId {
		let mut taken = ids::taken(&self.doc);
		let id = ids::fresh(&mut taken, || ids::node_id(kind));
		self.doc.nodes.push(Node::new(id.clone(), kind, position));
		id
	}

	/// Creates the next kind down below `parent` and connects it as the last
	/// sibling.
	pub fn add_child(&mut self, parent: &str) -> Result<NodeId> {
		let parent_node = self.require_node(parent)?;
		let kind =
			hierarchy::child_kind(parent_node.kind).ok_or(EditError::NoChildKind(parent_node.kind))?;
		let siblings = self.doc.children_of(parent).len();
		let position = parent_node
			.position
			.offset(siblings as f64 * self.config.layout.sibling_spacing, CHILD_GAP);

		self.checkpoint();
		let id = self.insert_node(kind, position);
		self.push_edge(parent.to_string(), id.clone());
		order::resequence(&mut self.doc, parent);
		debug!("Added {} {} under {}", kind, id, parent);
		Ok(id)
	}

	/// Edits a node's data in place.
	pub fn update_data(&mut self, id: &str, f: impl FnOnce(&mut NodeData)) -> Result<()> {
		self.require_node(id)?;
		self.checkpoint();
		if let Some(node) = self.doc.node_mut(id) {
			let order = node.data.order;
			f(&mut node.data);
			// Order is derived from the graph, never edited directly.
			node.data.order = order;
		}
		Ok(())
	}

	/// Applies the same edit to several nodes as a single undo step.
	pub fn bulk_update(&mut self, ids: &[NodeId], f: impl Fn(&mut NodeData)) -> Result<usize> {
		if ids.is_empty() {
			return Err(EditError::EmptySelection);
		}
		for id in ids {
			self.require_node(id)?;
		}
		self.checkpoint();
		let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
		let mut touched = 0;
		for node in self.doc.nodes.iter_mut().filter(|n| wanted.contains(n.id.as_str())) {
			let order = node.data.order;
			f(&mut node.data);
			node.data.order = order;
			touched += 1;
		}
		info!("Bulk edited {} nodes", touched);
		Ok(touched)
	}

	/// Sets a node position, usually at the end of a drag.
	pub fn move_node(&mut self, id: &str, position: Position) -> Result<()> {
		if self.require_node(id)?.position == position {
			return Ok(());
		}
		self.checkpoint();
		if let Some(node) = self.doc.node_mut(id) {
			node.position = position;
		}
		Ok(())
	}

	/// Moves a node up (`delta < 0`) or down among its siblings.
	pub fn move_sibling(&mut self, id: &str, delta: isize) -> Result<bool> {
		self.require_node(id)?;
		let mut candidate = self.doc.clone();
		if !order::move_within_siblings(&mut candidate, id, delta) {
			return Ok(false);
		}
		self.checkpoint();
		self.doc = candidate;
		Ok(true)
	}

	/// Removes nodes and every edge touching them.
	pub fn delete_nodes(&mut self, ids: &[NodeId]) -> Result<usize> {
		if ids.is_empty() {
			return Err(EditError::EmptySelection);
		}
		self.checkpoint();
		let removed = self.remove(ids, &[]);
		Ok(removed)
	}

	/// Removes selected nodes and selected edges.
	pub fn delete_selection(&mut self) -> Result<usize> {
		let nodes = self.doc.selected_node_ids();
		let edges = self.doc.selected_edge_ids();
		if nodes.is_empty() && edges.is_empty() {
			return Err(EditError::EmptySelection);
		}
		self.checkpoint();
		Ok(self.remove(&nodes, &edges))
	}

	fn remove(&mut self, nodes: &[NodeId], edges: &[EdgeId]) -> usize {
		let nodes: HashSet<&str> = nodes.iter().map(String::as_str).collect();
		let edges: HashSet<&str> = edges.iter().map(String::as_str).collect();
		let doomed = |e: &Edge| {
			edges.contains(e.id.as_str())
				|| nodes.contains(e.source.as_str())
				|| nodes.contains(e.target.as_str())
		};

		let mut parents = BTreeSet::new();
		let mut orphans = BTreeSet::new();
		for edge in self.doc.edges.iter().filter(|&e| doomed(e)) {
			parents.insert(edge.source.clone());
			orphans.insert(edge.target.clone());
		}

		let (before, edges_before) = (self.doc.nodes.len(), self.doc.edges.len());
		self.doc.edges.retain(|e| !doomed(e));
		self.doc.nodes.retain(|n| !nodes.contains(n.id.as_str()));

		for parent in &parents {
			if self.doc.contains_node(parent) {
				order::resequence(&mut self.doc, parent);
			}
		}
		for orphan in &orphans {
			order::detach(&mut self.doc, orphan);
		}
		let removed = before - self.doc.nodes.len();
		debug!(
			"Removed {} nodes and {} edges",
			removed,
			edges_before - self.doc.edges.len()
		);
		removed
	}

	// Edges

	fn push_edge(&mut self, source: NodeId, target: NodeId) -> EdgeId {
		let mut taken = ids::taken(&self.doc);
		let id = ids::fresh(&mut taken, ids::edge_id);
		self.doc.edges.push(Edge::new(id.clone(), source, target));
		id
	}

	/// Adds a parent-child edge after checking the hierarchy rules.
	pub fn connect(&mut self, source: &str, target: &str) -> Result<EdgeId> {
		hierarchy::validate_connection(&self.doc, source, target, None)?;
		self.checkpoint();
		let id = self.push_edge(source.to_string(), target.to_string());
		order::resequence(&mut self.doc, source);
		debug!("Connected {} -> {}", source, target);
		Ok(id)
	}

	/// Connects the two selected nodes, whichever way the hierarchy allows.
	pub fn connect_selection(&mut self) -> Result<EdgeId> {
		let selected = self.doc.selected_node_ids();
		let [a, b] = selected.as_slice() else {
			return Err(EditError::EmptySelection);
		};
		let (a_kind, b_kind) = (self.require_node(a)?.kind, self.require_node(b)?.kind);
		match hierarchy::orient(a_kind, b_kind) {
			Some(true) => self.connect(a, b),
			Some(false) => self.connect(b, a),
			None => Err(EditError::InvalidHierarchy {
				source_kind: a_kind,
				target_kind: b_kind,
			}),
		}
	}

	/// Removes an edge. The former child becomes a root.
	pub fn disconnect(&mut self, edge_id: &str) -> Result<()> {
		let edge = self
			.doc
			.edge(edge_id)
			.cloned()
			.ok_or_else(|| EditError::UnknownEdge(edge_id.to_string()))?;
		self.checkpoint();
		self.doc.edges.retain(|e| e.id != edge_id);
		order::resequence(&mut self.doc, &edge.source);
		order::detach(&mut self.doc, &edge.target);
		Ok(())
	}

	/// Moves an edge onto a new source and target, keeping its ID.
	pub fn reconnect(&mut self, edge_id: &str, source: &str, target: &str) -> Result<()> {
		let old = self
			.doc
			.edge(edge_id)
			.cloned()
			.ok_or_else(|| EditError::UnknownEdge(edge_id.to_string()))?;
		hierarchy::validate_connection(&self.doc, source, target, Some(edge_id))?;
		self.checkpoint();

		if let Some(edge) = self.doc.edges.iter_mut().find(|e| e.id == edge_id) {
			edge.source = source.to_string();
			edge.target = target.to_string();
		}
		order::resequence(&mut self.doc, &old.source);
		order::resequence(&mut self.doc, source);
		order::detach(&mut self.doc, &old.target);
		debug!(
			"Reconnected {}: {} -> {} is now {} -> {}",
			edge_id, old.source, old.target, source, target
		);
		Ok(())
	}

	// Selection is view state and is not recorded in history.

	/// Selects one node, clearing every other selection.
	pub fn select_only(&mut self, id: &str) {
		self.doc.clear_selection();
		if let Some(node) = self.doc.node_mut(id) {
			node.selected = true;
		}
	}

	/// Adds or removes a node from the selection.
	pub fn toggle_selected(&mut self, id: &str) {
		if let Some(node) = self.doc.node_mut(id) {
			node.selected = !node.selected;
		}
	}

	/// Selects one edge, clearing every other selection.
	pub fn select_edge(&mut self, id: &str) {
		self.doc.clear_selection();
		if let Some(edge) = self.doc.edges.iter_mut().find(|e| e.id == id) {
			edge.selected = true;
		}
	}

	/// Deselects every node and edge.
	pub fn clear_selection(&mut self) {
		self.doc.clear_selection();
	}

	/// Selects exactly the listed nodes. Unknown IDs are skipped.
	pub fn select_nodes(&mut self, ids: &[NodeId]) {
		self.doc.clear_selection();
		for node in self.doc.nodes.iter_mut() {
			if ids.contains(&node.id) {
				node.selected = true;
			}
		}
	}

	// Clipboard

	/// Copies the selection. Returns the number of nodes copied.
	pub fn copy(&mut self) -> Result<usize> {
		if !self.clipboard.copy(&self.doc) {
			return Err(EditError::EmptySelection);
		}
		Ok(self.clipboard.content().map_or(0, |f| f.nodes.len()))
	}

	/// Copies then deletes the selection, as one undo step.
	pub fn cut(&mut self) -> Result<usize> {
		let copied = self.copy()?;
		let nodes = self.doc.selected_node_ids();
		self.checkpoint();
		self.remove(&nodes, &[]);
		Ok(copied)
	}

	/// Pastes the clipboard with fresh IDs. Returns the new node IDs.
	pub fn paste(&mut self) -> Result<Vec<NodeId>> {
		if self.clipboard.is_empty() {
			return Err(EditError::EmptyClipboard);
		}
		self.checkpoint();
		let pasted = self
			.clipboard
			.paste(&mut self.doc, self.config.paste_offset)
			.unwrap_or_default();
		debug!("Pasted {} nodes", pasted.len());
		Ok(pasted)
	}

	// Templates

	/// Captures the selection as a named template.
	pub fn selection_as_template(&self, name: &str) -> Result<Template> {
		let fragment = Fragment::from_selection(&self.doc);
		if fragment.is_empty() {
			return Err(EditError::EmptySelection);
		}
		Ok(Template {
			name: name.to_string(),
			fragment,
		})
	}

	/// Inserts a copy of a template with fresh IDs and selects it.
	pub fn insert_template(&mut self, template: &Template) -> Result<Vec<NodeId>> {
		if template.fragment.is_empty() {
			return Err(EditError::EmptySelection);
		}
		self.checkpoint();
		Ok(template
			.fragment
			.paste_into(&mut self.doc, self.config.paste_offset))
	}

	// History

	/// True when `undo` would succeed.
	pub fn can_undo(&self) -> bool {
		self.history.can_undo()
	}

	/// True when `redo` would succeed.
	pub fn can_redo(&self) -> bool {
		self.history.can_redo()
	}

	/// Restores the previous snapshot.
	pub fn undo(&mut self) -> Result<()> {
		let previous = self
			.history
			.undo(self.doc.clone())
			.ok_or(EditError::NothingToUndo)?;
		self.doc = previous;
		Ok(())
	}

	/// Reapplies the last undone edit.
	pub fn redo(&mut self) -> Result<()> {
		let next = self
			.history
			.redo(self.doc.clone())
			.ok_or(EditError::NothingToRedo)?;
		self.doc = next;
		Ok(())
	}

	// Layout

	/// Runs the layout delegate and applies its positions as one undo step.
	pub fn auto_layout(&mut self) -> usize {
		let positions = layout::compute(&self.doc, &self.config.layout);
		let mut candidate = self.doc.clone();
		let moved = layout::apply(&mut candidate, &positions);
		if moved > 0 {
			self.checkpoint();
			self.doc = candidate;
		}
		info!("Layout moved {} nodes", moved);
		moved
	}
}
