//! Sibling `order` bookkeeping.

use std::collections::BTreeSet;

use super::types::Document;

/// Renumbers the children of `parent` as `1..N` in node array order.
pub fn resequence(doc: &mut Document, parent: &str) {
	let children: BTreeSet<String> = doc
		.edges
		.iter()
		.filter(|e| e.source == parent)
		.map(|e| e.target.clone())
		.collect();

	let mut next = 1;
	for node in doc.nodes.iter_mut() {
		if children.contains(&node.id) {
			node.data.order = Some(next);
			next += 1;
		}
	}
}

/// Clears `order` on `node` if nothing points at it anymore.
pub fn detach(doc: &mut Document, node: &str) {
	if doc.parent_of(node).is_some() {
		return;
	}
	if let Some(n) = doc.node_mut(node) {
		n.data.order = None;
	}
}

/// Resequences every parent and clears orders on roots.
pub fn resequence_all(doc: &mut Document) {
	let parents: BTreeSet<String> = doc.edges.iter().map(|e| e.source.clone()).collect();
	let roots: Vec<String> = doc
		.nodes
		.iter()
		.filter(|n| doc.parent_of(&n.id).is_none())
		.map(|n| n.id.clone())
		.collect();
	for parent in &parents {
		resequence(doc, parent);
	}
	for root in &roots {
		detach(doc, root);
	}
}

/// Moves `node` `delta` places among its siblings by shifting it in the node
/// array, then renumbers. Returns false when the node has no parent or is
/// already at the edge.
pub fn move_within_siblings(doc: &mut Document, node: &str, delta: isize) -> bool {
	let Some(parent) = doc.parent_of(node).map(str::to_string) else {
		return false;
	};
	let siblings: Vec<usize> = doc
		.nodes
		.iter()
		.enumerate()
		.filter(|(_, n)| doc.edges.iter().any(|e| e.source == parent && e.target == n.id))
		.map(|(i, _)| i)
		.collect();
	let Some(rank) = siblings.iter().position(|&i| doc.nodes[i].id == node) else {
		return false;
	};
	if delta == 0 {
		return false;
	}
	let Some(wanted) = rank.checked_add_signed(delta).filter(|&w| w < siblings.len()) else {
		return false;
	};

	let (from, to) = (siblings[rank], siblings[wanted]);
	let moved = doc.nodes.remove(from);
	doc.nodes.insert(to, moved);
	resequence(doc, &parent);
	true
}

/// True when every parent's children are numbered exactly `1..N` in node
/// array order.
pub fn is_sequenced(doc: &Document) -> bool {
	let parents: BTreeSet<&str> = doc.edges.iter().map(|e| e.source.as_str()).collect();
	parents.iter().all(|parent| {
		doc.children_of(parent)
			.iter()
			.enumerate()
			.all(|(i, n)| n.data.order == Some(i as u32 + 1))
	})
}
