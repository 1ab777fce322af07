//! The plan document: nodes, edges and their payloads.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a node in a plan document.
pub type NodeId = String;
/// Identifier of an edge in a plan document.
pub type EdgeId = String;

/// Kind of a plan node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	/// Root of a plan.
	Intervention,
	/// A block of micro-cycles.
	Phase,
	/// A micro-cycle, usually one week of sessions.
	Micro,
	/// A single training session.
	Session,
	/// Free-standing athlete profile.
	Profile,
}

impl NodeKind {
	/// Every kind, in hierarchy order.
	pub const ALL: [NodeKind; 5] = [
		NodeKind::Intervention,
		NodeKind::Phase,
		NodeKind::Micro,
		NodeKind::Session,
		NodeKind::Profile,
	];

	/// Lowercase name used in IDs and serialized documents.
	pub fn as_str(self) -> &'static str {
		match self {
			NodeKind::Intervention => "intervention",
			NodeKind::Phase => "phase",
			NodeKind::Micro => "micro",
			NodeKind::Session => "session",
			NodeKind::Profile => "profile",
		}
	}

	/// Human readable name for labels.
	pub fn title(self) -> &'static str {
		match self {
			NodeKind::Intervention => "Intervention",
			NodeKind::Phase => "Phase",
			NodeKind::Micro => "Micro-cycle",
			NodeKind::Session => "Session",
			NodeKind::Profile => "Profile",
		}
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Canvas position of a node, in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Position {
	/// Creates a position.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Returns this position shifted by `(dx, dy)`.
	pub fn offset(self, dx: f64, dy: f64) -> Self {
		Self::new(self.x + dx, self.y + dy)
	}
}

/// A named group of exercises inside a session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseContainer {
	/// Display name, without the mangling suffix.
	pub name: String,
	/// Freeform exercise entries.
	#[serde(default)]
	pub exercises: Vec<serde_json::Value>,
}

/// Per-node payload. Known fields are typed; everything else is kept as-is.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
	/// Rank among siblings sharing the same parent, `None` for roots.
	#[serde(default)]
	pub order: Option<u32>,
	/// User-facing name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	/// Scheduled date, as entered.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub date: Option<String>,
	/// Free-form tags.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tags: Option<String>,
	/// Exercise containers keyed by mangled key.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub exercises: BTreeMap<String, ExerciseContainer>,
	/// Fields this editor does not interpret.
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A unit in the plan hierarchy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	/// Unique node ID.
	pub id: NodeId,
	/// Place in the hierarchy.
	#[serde(rename = "type")]
	pub kind: NodeKind,
	/// Canvas position.
	pub position: Position,
	/// Payload edited in the inspector.
	#[serde(default)]
	pub data: NodeData,
	/// Part of the current selection.
	#[serde(default)]
	pub selected: bool,
}

impl Node {
	/// Creates an unselected node with empty data.
	pub fn new(id: impl Into<NodeId>, kind: NodeKind, position: Position) -> Self {
		Self {
			id: id.into(),
			kind,
			position,
			data: NodeData::default(),
			selected: false,
		}
	}

	/// Text drawn next to the node on the canvas.
	pub fn caption(&self) -> String {
		let name = self
			.data
			.label
			.clone()
			.unwrap_or_else(|| self.kind.title().to_string());
		match self.data.order {
			Some(order) => format!("{} {}", name, order),
			None => name,
		}
	}
}

/// A directed parent to child relation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
	/// Unique edge ID.
	pub id: EdgeId,
	/// Parent node.
	pub source: NodeId,
	/// Child node.
	pub target: NodeId,
	/// Part of the current selection.
	#[serde(default)]
	pub selected: bool,
}

impl Edge {
	/// Creates an unselected edge.
	pub fn new(id: impl Into<EdgeId>, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
		Self {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			selected: false,
		}
	}
}

/// The whole plan graph. Node array order defines sibling order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
	/// Nodes; array order is sibling order.
	#[serde(default)]
	pub nodes: Vec<Node>,
	/// Parent to child edges.
	#[serde(default)]
	pub edges: Vec<Edge>,
}

impl Document {
	/// Creates an empty document.
	pub fn new() -> Self {
		Self::default()
	}

	/// Looks up a node by ID.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Looks up a node by ID, mutably.
	pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
		self.nodes.iter_mut().find(|n| n.id == id)
	}

	/// Looks up an edge by ID.
	pub fn edge(&self, id: &str) -> Option<&Edge> {
		self.edges.iter().find(|e| e.id == id)
	}

	/// True when a node has this ID.
	pub fn contains_node(&self, id: &str) -> bool {
		self.node(id).is_some()
	}

	/// True when an edge has this ID.
	pub fn contains_edge(&self, id: &str) -> bool {
		self.edge(id).is_some()
	}

	/// Source of the first edge pointing at `id`.
	pub fn parent_of(&self, id: &str) -> Option<&str> {
		self.edges
			.iter()
			.find(|e| e.target == id)
			.map(|e| e.source.as_str())
	}

	/// Children of `id`, in node array order.
	pub fn children_of(&self, id: &str) -> Vec<&Node> {
		self.nodes
			.iter()
			.filter(|n| self.edges.iter().any(|e| e.source == id && e.target == n.id))
			.collect()
	}

	/// IDs of selected nodes, in array order.
	pub fn selected_node_ids(&self) -> Vec<NodeId> {
		self.nodes
			.iter()
			.filter(|n| n.selected)
			.map(|n| n.id.clone())
			.collect()
	}

	/// IDs of selected edges.
	pub fn selected_edge_ids(&self) -> Vec<EdgeId> {
		self.edges
			.iter()
			.filter(|e| e.selected)
			.map(|e| e.id.clone())
			.collect()
	}

	/// Deselects every node and edge.
	pub fn clear_selection(&mut self) {
		self.nodes.iter_mut().for_each(|n| n.selected = false);
		self.edges.iter_mut().for_each(|e| e.selected = false);
	}
}
