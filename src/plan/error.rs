//! Errors returned by plan edits.

use super::types::NodeKind;

/// Result alias for plan edits.
pub type Result<T> = std::result::Result<T, EditError>;

/// Reasons a plan edit is rejected.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
	/// No node with this ID.
	#[error("unknown node: {0}")]
	UnknownNode(String),

	/// No edge with this ID.
	#[error("unknown edge: {0}")]
	UnknownEdge(String),

	/// Source and target are the same node.
	#[error("a node cannot connect to itself")]
	SelfConnection,

	/// The kind pair is not part of the hierarchy.
	#[error("{source_kind} cannot be the parent of {target_kind}")]
	InvalidHierarchy {
		/// Kind of the would-be parent.
		source_kind: NodeKind,
		/// Kind of the would-be child.
		target_kind: NodeKind,
	},

	/// An edge between the same two nodes already exists.
	#[error("these nodes are already connected")]
	DuplicateEdge,

	/// Two nodes or two edges share an ID.
	#[error("duplicate id: {0}")]
	DuplicateId(String),

	/// The target already has a parent.
	#[error("node {0} already has a parent")]
	AlreadyParented(String),

	/// Operation needs a selection.
	#[error("nothing is selected")]
	EmptySelection,

	/// Paste with nothing copied.
	#[error("clipboard is empty")]
	EmptyClipboard,

	/// Undo with an empty past.
	#[error("nothing to undo")]
	NothingToUndo,

	/// Redo with an empty future.
	#[error("nothing to redo")]
	NothingToRedo,

	/// The node kind has no child kind in the hierarchy.
	#[error("{0} nodes cannot have children")]
	NoChildKind(NodeKind),

	/// Key-value backend failure.
	#[error("storage error: {0}")]
	Storage(String),

	/// JSON encoding or decoding failed.
	#[error("serialization error: {0}")]
	Serde(#[from] serde_json::Error),
}

impl EditError {
	/// True for errors caused by user input rather than the environment.
	pub fn is_validation(&self) -> bool {
		!matches!(self, EditError::Storage(_) | EditError::Serde(_))
	}
}
