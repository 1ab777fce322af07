use std::collections::HashSet;

use plan_editor::config::EditorConfig;
use plan_editor::plan::hierarchy;
use plan_editor::plan::order;
use plan_editor::plan::{Edge, EditError, NodeKind, PlanStore, Position};
use proptest::prelude::*;

const LIMIT: usize = 6;

#[derive(Clone, Debug)]
enum Op {
	Add(usize),
	AddChild(usize),
	Connect(usize, usize),
	Disconnect(usize),
	Reconnect(usize, usize, usize),
	Delete(usize),
	Move(usize, bool),
	CopyPaste(Vec<usize>),
	Cut(Vec<usize>),
	BulkUpdate(Vec<usize>),
	/// Changes one node's kind and, when set, appends a copy of it.
	ReplaceNodes(usize, usize, bool),
	/// Rewires every edge; when set, the last edge reuses the first ID.
	ReplaceEdges(Vec<(usize, usize)>, bool),
	Undo,
	Redo,
}

fn kind() -> impl Strategy<Value = NodeKind> {
	prop::sample::select(NodeKind::ALL.to_vec())
}

fn op() -> impl Strategy<Value = Op> {
	prop_oneof![
		(0..NodeKind::ALL.len()).prop_map(Op::Add),
		any::<usize>().prop_map(Op::AddChild),
		(any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Connect(a, b)),
		any::<usize>().prop_map(Op::Disconnect),
		(any::<usize>(), any::<usize>(), any::<usize>()).prop_map(|(e, a, b)| Op::Reconnect(e, a, b)),
		any::<usize>().prop_map(Op::Delete),
		(any::<usize>(), any::<bool>()).prop_map(|(i, up)| Op::Move(i, up)),
		prop::collection::vec(any::<usize>(), 1..4).prop_map(Op::CopyPaste),
		prop::collection::vec(any::<usize>(), 1..4).prop_map(Op::Cut),
		prop::collection::vec(any::<usize>(), 1..4).prop_map(Op::BulkUpdate),
		(any::<usize>(), 0..NodeKind::ALL.len(), prop::bool::weighted(0.2))
			.prop_map(|(i, k, dup)| Op::ReplaceNodes(i, k, dup)),
		(
			prop::collection::vec((any::<usize>(), any::<usize>()), 0..6),
			prop::bool::weighted(0.2)
		)
			.prop_map(|(pairs, dup)| Op::ReplaceEdges(pairs, dup)),
		Just(Op::Undo),
		Just(Op::Redo),
	]
}

fn node_at(store: &PlanStore, i: usize) -> Option<String> {
	let nodes = &store.document().nodes;
	(!nodes.is_empty()).then(|| nodes[i % nodes.len()].id.clone())
}

fn edge_at(store: &PlanStore, i: usize) -> Option<String> {
	let edges = &store.document().edges;
	(!edges.is_empty()).then(|| edges[i % edges.len()].id.clone())
}

fn select(store: &mut PlanStore, picks: &[usize]) {
	store.clear_selection();
	for pick in picks {
		if let Some(id) = node_at(store, *pick) {
			store.toggle_selected(&id);
		}
	}
}

fn run(store: &mut PlanStore, op: &Op) {
	// Rejections are expected; only the invariants matter here.
	let _ = match op {
		Op::Add(k) => {
			store.add_node(NodeKind::ALL[*k], Position::default());
			Ok(())
		}
		Op::AddChild(i) => match node_at(store, *i) {
			Some(id) => store.add_child(&id).map(|_| ()),
			None => Ok(()),
		},
		Op::Connect(a, b) => match (node_at(store, *a), node_at(store, *b)) {
			(Some(a), Some(b)) => store.connect(&a, &b).map(|_| ()),
			_ => Ok(()),
		},
		Op::Disconnect(e) => match edge_at(store, *e) {
			Some(e) => store.disconnect(&e),
			None => Ok(()),
		},
		Op::Reconnect(e, a, b) => match (edge_at(store, *e), node_at(store, *a), node_at(store, *b)) {
			(Some(e), Some(a), Some(b)) => store.reconnect(&e, &a, &b),
			_ => Ok(()),
		},
		Op::Delete(i) => match node_at(store, *i) {
			Some(id) => store.delete_nodes(&[id]).map(|_| ()),
			None => Ok(()),
		},
		Op::Move(i, up) => match node_at(store, *i) {
			Some(id) => store.move_sibling(&id, if *up { -1 } else { 1 }).map(|_| ()),
			None => Ok(()),
		},
		Op::CopyPaste(picks) => {
			select(store, picks);
			store.copy().and_then(|_| store.paste()).map(|_| ())
		}
		Op::Cut(picks) => {
			select(store, picks);
			store.cut().map(|_| ())
		}
		Op::BulkUpdate(picks) => {
			let ids: Vec<String> = picks.iter().filter_map(|p| node_at(store, *p)).collect();
			store
				.bulk_update(&ids, |d| {
					d.tags = Some("deload".into());
					d.order = Some(99);
				})
				.map(|_| ())
		}
		Op::ReplaceNodes(i, k, dup) => {
			let mut nodes = store.document().nodes.clone();
			if !nodes.is_empty() {
				let at = i % nodes.len();
				nodes[at].kind = NodeKind::ALL[*k];
				if *dup {
					nodes.push(nodes[at].clone());
				}
			}
			store.replace_nodes(nodes).map(|_| ())
		}
		Op::ReplaceEdges(pairs, dup) => {
			let mut edges: Vec<Edge> = pairs
				.iter()
				.enumerate()
				.filter_map(|(j, (a, b))| {
					Some(Edge::new(format!("r{}", j), node_at(store, *a)?, node_at(store, *b)?))
				})
				.collect();
			if *dup && edges.len() > 1 {
				let first = edges[0].id.clone();
				if let Some(last) = edges.last_mut() {
					last.id = first;
				}
			}
			store.replace_edges(edges)
		}
		Op::Undo => store.undo(),
		Op::Redo => store.redo(),
	};
}

fn store() -> PlanStore {
	PlanStore::new(EditorConfig {
		history_limit: LIMIT,
		..EditorConfig::default()
	})
}

proptest! {
	#[test]
	fn connections_outside_the_allow_list_are_rejected(a in kind(), b in kind()) {
		let mut store = store();
		let source = store.add_node(a, Position::default());
		let target = store.add_node(b, Position::default());
		let result = store.connect(&source, &target);
		if hierarchy::can_parent(a, b) {
			prop_assert!(result.is_ok());
		} else {
			let is_hierarchy_error = matches!(result, Err(EditError::InvalidHierarchy { .. }));
			prop_assert!(is_hierarchy_error);
			prop_assert!(store.document().edges.is_empty());
		}
	}

	#[test]
	fn invariants_hold_after_any_edit(ops in prop::collection::vec(op(), 1..40)) {
		let mut store = store();
		for op in &ops {
			run(&mut store, op);
			let doc = store.document();

			prop_assert!(order::is_sequenced(doc), "after {:?}", op);
			for edge in &doc.edges {
				let source = doc.node(&edge.source).map(|n| n.kind);
				let target = doc.node(&edge.target).map(|n| n.kind);
				prop_assert!(matches!((source, target), (Some(s), Some(t)) if hierarchy::can_parent(s, t)));
			}
			let targets: HashSet<_> = doc.edges.iter().map(|e| &e.target).collect();
			prop_assert_eq!(targets.len(), doc.edges.len());
			let edge_ids: HashSet<_> = doc.edges.iter().map(|e| &e.id).collect();
			prop_assert_eq!(edge_ids.len(), doc.edges.len());
			let node_ids: HashSet<_> = doc.nodes.iter().map(|n| &n.id).collect();
			prop_assert_eq!(node_ids.len(), doc.nodes.len());
			for node in doc.nodes.iter().filter(|n| doc.parent_of(&n.id).is_none()) {
				prop_assert_eq!(node.data.order, None);
			}

			prop_assert!(store.history().undo_len() <= LIMIT);
			prop_assert!(store.history().redo_len() <= LIMIT);
		}
	}

	#[test]
	fn undoing_then_redoing_k_steps_restores_each_snapshot(
		ops in prop::collection::vec(op(), 1..25),
		k in 1usize..=LIMIT,
	) {
		let mut store = store();
		for op in &ops {
			run(&mut store, op);
		}
		let k = k.min(store.history().undo_len());
		let mut seen = vec![store.document().clone()];
		for _ in 0..k {
			store.undo().unwrap();
			seen.push(store.document().clone());
		}
		for expected in seen.iter().rev().skip(1) {
			store.redo().unwrap();
			prop_assert_eq!(store.document(), expected);
		}
	}

	#[test]
	fn paste_mints_fresh_ids(ops in prop::collection::vec(op(), 1..25), picks in prop::collection::vec(any::<usize>(), 1..5)) {
		let mut store = store();
		for op in &ops {
			run(&mut store, op);
		}
		select(&mut store, &picks);
		if store.copy().is_err() {
			return Ok(());
		}

		let before = store.document().clone();
		let old_ids: HashSet<String> = before
			.nodes
			.iter()
			.map(|n| n.id.clone())
			.chain(before.edges.iter().map(|e| e.id.clone()))
			.collect();

		let pasted = store.paste().unwrap();
		let pasted_set: HashSet<&String> = pasted.iter().collect();
		let doc = store.document();

		for id in &pasted {
			prop_assert!(!old_ids.contains(id));
		}
		for edge in doc.edges.iter().filter(|e| !old_ids.contains(&e.id)) {
			prop_assert!(pasted_set.contains(&edge.source));
			prop_assert!(pasted_set.contains(&edge.target));
		}
		let all: HashSet<&String> = doc.nodes.iter().map(|n| &n.id).collect();
		prop_assert_eq!(all.len(), doc.nodes.len());
	}

	#[test]
	fn history_evicts_oldest_first(extra in 1usize..20) {
		let mut store = store();
		let mut snapshots = Vec::new();
		for _ in 0..LIMIT + extra {
			snapshots.push(store.document().clone());
			store.add_node(NodeKind::Profile, Position::default());
		}
		prop_assert_eq!(store.history().undo_len(), LIMIT);
		prop_assert_eq!(store.history().oldest(), Some(&snapshots[extra]));
	}
}
