//! In-memory plan document and the rules for editing it.

pub mod clipboard;
pub mod error;
pub mod exercises;
pub mod hierarchy;
pub mod history;
pub mod ids;
pub mod layout;
pub mod order;
pub mod store;
pub mod types;

pub use clipboard::{Clipboard, Fragment, Template};
pub use error::{EditError, Result};
pub use history::History;
pub use store::PlanStore;
pub use types::{Document, Edge, EdgeId, Node, NodeData, NodeId, NodeKind, Position};
