//! Editor commands shared by the toolbar and keyboard shortcuts.

use leptos::prelude::*;
use log::{error, warn};
use web_sys::KeyboardEvent;

use super::toast::Toasts;
use crate::plan::{EditError, NodeKind, PlanStore, Position};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
	AddNode(NodeKind),
	AddChild,
	Connect,
	Delete,
	MoveUp,
	MoveDown,
	Copy,
	Cut,
	Paste,
	Undo,
	Redo,
	AutoLayout,
}

impl Action {
	/// Maps a key press to an action, following the usual editor shortcuts.
	pub fn from_key(ev: &KeyboardEvent) -> Option<Self> {
		let ctrl = ev.ctrl_key() || ev.meta_key();
		let key = ev.key().to_lowercase();
		match (ctrl, ev.shift_key(), key.as_str()) {
			(true, false, "z") => Some(Action::Undo),
			(true, true, "z") | (true, _, "y") => Some(Action::Redo),
			(true, _, "c") => Some(Action::Copy),
			(true, _, "x") => Some(Action::Cut),
			(true, _, "v") => Some(Action::Paste),
			(true, _, "l") => Some(Action::AutoLayout),
			(false, _, "delete") | (false, _, "backspace") => Some(Action::Delete),
			_ => None,
		}
	}
}

fn only_selected(store: &PlanStore) -> Result<String, EditError> {
	match store.document().selected_node_ids().as_slice() {
		[one] => Ok(one.clone()),
		_ => Err(EditError::EmptySelection),
	}
}

fn apply(store: &mut PlanStore, action: Action) -> Result<Option<String>, EditError> {
	match action {
		Action::AddNode(kind) => {
			let count = store.document().nodes.len() as f64;
			let id = store.add_node(kind, Position::new(40.0 * count, 0.0));
			store.select_only(&id);
			Ok(None)
		}
		Action::AddChild => {
			let parent = only_selected(store)?;
			let id = store.add_child(&parent)?;
			store.select_only(&id);
			Ok(None)
		}
		Action::Connect => store.connect_selection().map(|_| None),
		Action::Delete => store
			.delete_selection()
			.map(|n| Some(format!("Deleted {} nodes", n))),
		Action::MoveUp | Action::MoveDown => {
			let id = only_selected(store)?;
			let delta = if action == Action::MoveUp { -1 } else { 1 };
			store.move_sibling(&id, delta).map(|_| None)
		}
		Action::Copy => store.copy().map(|n| Some(format!("Copied {} nodes", n))),
		Action::Cut => store.cut().map(|n| Some(format!("Cut {} nodes", n))),
		Action::Paste => store.paste().map(|_| None),
		Action::Undo => store.undo().map(|_| None),
		Action::Redo => store.redo().map(|_| None),
		Action::AutoLayout => Ok(Some(format!("Layout moved {} nodes", store.auto_layout()))),
	}
}

/// Runs `action` against the store and reports the outcome.
pub fn dispatch(store: RwSignal<PlanStore>, toasts: Toasts, action: Action) {
	let Some(outcome) = store.try_update(|s| apply(s, action)) else {
		error!("Plan store dropped before {:?}", action);
		return;
	};
	match outcome {
		Ok(Some(message)) => toasts.info(message),
		Ok(None) => {}
		Err(e) if e.is_validation() => {
			warn!("{:?} rejected: {}", action, e);
			toasts.error(e.to_string());
		}
		Err(e) => {
			error!("{:?} failed: {}", action, e);
			toasts.error(e.to_string());
		}
	}
}
