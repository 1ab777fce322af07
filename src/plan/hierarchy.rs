//! Which node kinds may be connected, and in which direction.

use super::error::{EditError, Result};
use super::types::{Document, NodeKind};

/// Allowed (parent, child) kind pairs.
pub const ALLOWED: &[(NodeKind, NodeKind)] = &[
	(NodeKind::Intervention, NodeKind::Phase),
	(NodeKind::Phase, NodeKind::Micro),
	(NodeKind::Micro, NodeKind::Session),
];

/// True when a `source` node may be the parent of a `target` node.
pub fn can_parent(source: NodeKind, target: NodeKind) -> bool {
	ALLOWED.contains(&(source, target))
}

/// The kind created below `kind`, if any.
pub fn child_kind(kind: NodeKind) -> Option<NodeKind> {
	ALLOWED
		.iter()
		.find(|(parent, _)| *parent == kind)
		.map(|&(_, child)| child)
}

/// Depth of `kind` in the hierarchy, `None` for free-standing kinds.
pub fn depth(kind: NodeKind) -> Option<usize> {
	match kind {
		NodeKind::Intervention => Some(0),
		NodeKind::Phase => Some(1),
		NodeKind::Micro => Some(2),
		NodeKind::Session => Some(3),
		NodeKind::Profile => None,
	}
}

/// Given two kinds, tells which is the parent. Returns `Some(true)` when `a`
/// parents `b`, `Some(false)` when `b` parents `a`.
pub fn orient(a: NodeKind, b: NodeKind) -> Option<bool> {
	if can_parent(a, b) {
		Some(true)
	} else if can_parent(b, a) {
		Some(false)
	} else {
		None
	}
}

/// Checks that `source -> target` may be added to `doc`.
///
/// `ignore_edge` is the edge being reconnected, which must not count as an
/// existing parent or duplicate.
pub fn validate_connection(
	doc: &Document,
	source: &str,
	target: &str,
	ignore_edge: Option<&str>,
) -> Result<()> {
	let source_node = doc
		.node(source)
		.ok_or_else(|| EditError::UnknownNode(source.to_string()))?;
	let target_node = doc
		.node(target)
		.ok_or_else(|| EditError::UnknownNode(target.to_string()))?;

	if source == target {
		return Err(EditError::SelfConnection);
	}
	if !can_parent(source_node.kind, target_node.kind) {
		return Err(EditError::InvalidHierarchy {
			source_kind: source_node.kind,
			target_kind: target_node.kind,
		});
	}

	let mut others = doc
		.edges
		.iter()
		.filter(|e| Some(e.id.as_str()) != ignore_edge);
	if let Some(existing) = others.find(|e| e.target == target) {
		return Err(if existing.source == source {
			EditError::DuplicateEdge
		} else {
			EditError::AlreadyParented(target.to_string())
		});
	}
	Ok(())
}

/// Drops every edge that would be rejected by [`validate_connection`] when
/// added in array order, and edges reusing an earlier edge's ID. Returns the
/// number dropped.
pub fn prune(doc: &mut Document) -> usize {
	let edges = std::mem::take(&mut doc.edges);
	let before = edges.len();
	for edge in edges {
		if doc.contains_edge(&edge.id) {
			continue;
		}
		if validate_connection(doc, &edge.source, &edge.target, None).is_ok() {
			doc.edges.push(edge);
		}
	}
	before - doc.edges.len()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::plan::types::{Edge, Node, Position};

	fn doc() -> Document {
		let kinds = [
			("i", NodeKind::Intervention),
			("p", NodeKind::Phase),
			("q", NodeKind::Phase),
			("m", NodeKind::Micro),
			("s", NodeKind::Session),
			("x", NodeKind::Profile),
		];
		Document {
			nodes: kinds
				.iter()
				.map(|&(id, kind)| Node::new(id, kind, Position::default()))
				.collect(),
			edges: vec![Edge::new("e", "i", "p")],
		}
	}

	#[test]
	fn allow_list_is_the_only_way_down() {
		for a in NodeKind::ALL {
			for b in NodeKind::ALL {
				let expected = matches!(
					(a, b),
					(NodeKind::Intervention, NodeKind::Phase)
						| (NodeKind::Phase, NodeKind::Micro)
						| (NodeKind::Micro, NodeKind::Session)
				);
				assert_eq!(can_parent(a, b), expected, "{a} -> {b}");
			}
		}
	}

	#[test]
	fn orient_picks_parent() {
		assert_eq!(orient(NodeKind::Session, NodeKind::Micro), Some(false));
		assert_eq!(orient(NodeKind::Phase, NodeKind::Micro), Some(true));
		assert_eq!(orient(NodeKind::Phase, NodeKind::Session), None);
		assert_eq!(child_kind(NodeKind::Micro), Some(NodeKind::Session));
		assert_eq!(child_kind(NodeKind::Session), None);
	}

	#[test]
	fn rejects_bad_connections() {
		let doc = doc();
		assert!(matches!(
			validate_connection(&doc, "p", "p", None),
			Err(EditError::SelfConnection)
		));
		assert!(matches!(
			validate_connection(&doc, "i", "m", None),
			Err(EditError::InvalidHierarchy { .. })
		));
		assert!(matches!(
			validate_connection(&doc, "x", "p", None),
			Err(EditError::InvalidHierarchy { .. })
		));
		assert!(matches!(
			validate_connection(&doc, "i", "p", None),
			Err(EditError::DuplicateEdge)
		));
		assert!(matches!(
			validate_connection(&doc, "nope", "p", None),
			Err(EditError::UnknownNode(_))
		));
		assert!(validate_connection(&doc, "i", "q", None).is_ok());
		assert!(validate_connection(&doc, "p", "m", None).is_ok());
	}

	#[test]
	fn target_keeps_a_single_parent() {
		let mut doc = doc();
		doc.nodes
			.push(Node::new("j", NodeKind::Intervention, Position::default()));
		assert!(matches!(
			validate_connection(&doc, "j", "p", None),
			Err(EditError::AlreadyParented(_))
		));
		assert!(validate_connection(&doc, "j", "p", Some("e")).is_ok());
	}

	#[test]
	fn prune_keeps_only_valid_edges() {
		let mut doc = doc();
		doc.nodes[1].kind = NodeKind::Session;
		doc.edges.extend([
			Edge::new("f", "q", "m"),
			Edge::new("f", "m", "s"),
			Edge::new("g", "m", "ghost"),
			Edge::new("h", "q", "m"),
		]);
		assert_eq!(prune(&mut doc), 4);
		let ids: Vec<&str> = doc.edges.iter().map(|e| e.id.as_str()).collect();
		assert_eq!(ids, ["f"]);
	}
}
