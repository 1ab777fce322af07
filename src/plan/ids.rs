//! Unique IDs for nodes, edges and exercise keys.

use std::collections::HashSet;

use uuid::Uuid;

use super::types::{Document, NodeKind};

/// Short random suffix, eight hex digits.
pub fn short_id() -> String {
	let mut simple = Uuid::new_v4().simple().to_string();
	simple.truncate(8);
	simple
}

/// A node ID such as `session-6f1c...`.
pub fn node_id(kind: NodeKind) -> String {
	format!("{}-{}", kind.as_str(), Uuid::new_v4().simple())
}

/// New random edge ID.
pub fn edge_id() -> String {
	format!("edge-{}", Uuid::new_v4().simple())
}

/// Every node and edge ID currently in `doc`.
pub fn taken(doc: &Document) -> HashSet<String> {
	doc.nodes
		.iter()
		.map(|n| n.id.clone())
		.chain(doc.edges.iter().map(|e| e.id.clone()))
		.collect()
}

/// Draws from `mint` until the result is not in `taken`, then reserves it.
pub fn fresh(taken: &mut HashSet<String>, mut mint: impl FnMut() -> String) -> String {
	loop {
		let id = mint();
		if taken.insert(id.clone()) {
			return id;
		}
	}
}
