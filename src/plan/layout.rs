//! Automatic placement of plan nodes.
//!
//! Intervention, phase and micro nodes are handed to `force_graph`, seeded in
//! layers so the simulation starts from a readable tree. Sessions are not
//! simulated: they are stacked under their micro-cycle afterwards. Profiles and
//! unparented sessions keep their position.

use std::collections::HashMap;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::hierarchy;
use super::types::{Document, NodeId, NodeKind, Position};
use crate::config::LayoutConfig;

fn simulated(kind: NodeKind) -> bool {
	matches!(
		kind,
		NodeKind::Intervention | NodeKind::Phase | NodeKind::Micro
	)
}

/// Computes new positions for `doc`. Nodes absent from the result keep theirs.
pub fn compute(doc: &Document, config: &LayoutConfig) -> HashMap<NodeId, Position> {
	let seeds = seed(doc, config);
	let mut positions = simulate(doc, &seeds, config);
	stack_sessions(doc, &mut positions, config);
	positions
}

/// Layered starting positions: depth down, rank across.
fn seed(doc: &Document, config: &LayoutConfig) -> HashMap<NodeId, (Position, bool)> {
	let mut seeds = HashMap::new();
	let mut next_slot: HashMap<usize, usize> = HashMap::new();

	// Walk roots first, then children in sibling order, so ranks follow order.
	let mut queue: Vec<&str> = doc
		.nodes
		.iter()
		.filter(|n| simulated(n.kind) && doc.parent_of(&n.id).is_none())
		.map(|n| n.id.as_str())
		.collect();
	let mut cursor = 0;
	while cursor < queue.len() {
		let id = queue[cursor];
		cursor += 1;
		let Some(node) = doc.node(id) else { continue };
		if seeds.contains_key(id) {
			continue;
		}
		let depth = hierarchy::depth(node.kind).unwrap_or(0);
		let slot = next_slot.entry(depth).or_insert(0);
		let position = Position::new(
			*slot as f64 * config.sibling_spacing,
			depth as f64 * config.layer_spacing,
		);
		*slot += 1;
		let is_root = doc.parent_of(id).is_none();
		seeds.insert(id.to_string(), (position, is_root));

		queue.extend(
			doc.children_of(id)
				.into_iter()
				.filter(|c| simulated(c.kind))
				.map(|c| c.id.as_str()),
		);
	}
	seeds
}

fn simulate(
	doc: &Document,
	seeds: &HashMap<NodeId, (Position, bool)>,
	config: &LayoutConfig,
) -> HashMap<NodeId, Position> {
	let mut graph: ForceGraph<NodeId, ()> = ForceGraph::new(SimulationParameters {
		force_charge: config.force_charge,
		force_spring: config.force_spring,
		force_max: config.force_max,
		node_speed: config.node_speed,
		damping_factor: config.damping_factor,
	});

	let mut id_to_idx = HashMap::new();
	for node in doc.nodes.iter().filter(|n| seeds.contains_key(&n.id)) {
		let (position, is_anchor) = seeds[&node.id];
		let idx = graph.add_node(NodeData {
			x: position.x as f32,
			y: position.y as f32,
			mass: 10.0,
			is_anchor,
			user_data: node.id.clone(),
		});
		id_to_idx.insert(node.id.as_str(), idx);
	}
	for edge in &doc.edges {
		if let (Some(&src), Some(&tgt)) = (
			id_to_idx.get(edge.source.as_str()),
			id_to_idx.get(edge.target.as_str()),
		) {
			graph.add_edge(src, tgt, EdgeData::default());
		}
	}

	for _ in 0..config.iterations {
		graph.update(config.dt);
	}

	let mut positions = HashMap::new();
	graph.visit_nodes(|node| {
		let (x, y) = (node.x() as f64, node.y() as f64);
		// Coincident nodes can blow up the simulation.
		if x.is_finite() && y.is_finite() {
			positions.insert(node.data.user_data.clone(), Position::new(x, y));
		}
	});
	positions
}

/// Places each micro-cycle's sessions in a column below it, in order.
fn stack_sessions(doc: &Document, positions: &mut HashMap<NodeId, Position>, config: &LayoutConfig) {
	for micro in doc.nodes.iter().filter(|n| n.kind == NodeKind::Micro) {
		let anchor = positions.get(&micro.id).copied().unwrap_or(micro.position);
		let mut sessions: Vec<_> = doc
			.children_of(&micro.id)
			.into_iter()
			.filter(|c| c.kind == NodeKind::Session)
			.collect();
		sessions.sort_by_key(|s| s.data.order.unwrap_or(u32::MAX));
		for (i, session) in sessions.into_iter().enumerate() {
			positions.insert(
				session.id.clone(),
				anchor.offset(0.0, (i + 1) as f64 * config.stack_spacing),
			);
		}
	}
}

/// Writes `positions` into `doc`. Returns how many nodes moved.
pub fn apply(doc: &mut Document, positions: &HashMap<NodeId, Position>) -> usize {
	let mut moved = 0;
	for node in doc.nodes.iter_mut() {
		if let Some(&position) = positions.get(&node.id) {
			if node.position != position {
				node.position = position;
				moved += 1;
			}
		}
	}
	moved
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::plan::order;
	use crate::plan::types::{Edge, Node};

	fn plan() -> Document {
		let mut doc = Document {
			nodes: vec![
				Node::new("i", NodeKind::Intervention, Position::new(400.0, 400.0)),
				Node::new("p", NodeKind::Phase, Position::new(0.0, 0.0)),
				Node::new("m", NodeKind::Micro, Position::new(0.0, 0.0)),
				Node::new("s2", NodeKind::Session, Position::new(0.0, 0.0)),
				Node::new("s1", NodeKind::Session, Position::new(0.0, 0.0)),
				Node::new("lone", NodeKind::Session, Position::new(7.0, 7.0)),
				Node::new("who", NodeKind::Profile, Position::new(-5.0, 3.0)),
			],
			edges: vec![
				Edge::new("a", "i", "p"),
				Edge::new("b", "p", "m"),
				Edge::new("c", "m", "s1"),
				Edge::new("d", "m", "s2"),
			],
		};
		order::resequence_all(&mut doc);
		doc
	}

	fn config() -> LayoutConfig {
		LayoutConfig {
			iterations: 20,
			..LayoutConfig::default()
		}
	}

	#[test]
	fn profiles_and_orphan_sessions_are_left_alone() {
		let positions = compute(&plan(), &config());
		assert!(!positions.contains_key("who"));
		assert!(!positions.contains_key("lone"));
		for id in ["i", "p", "m", "s1", "s2"] {
			let p = positions[id];
			assert!(p.x.is_finite() && p.y.is_finite(), "{id}");
		}
	}

	#[test]
	fn sessions_stack_under_micro_in_order() {
		let config = config();
		let positions = compute(&plan(), &config);
		let micro = positions["m"];
		// s2 comes first in the node array, so it has order 1.
		assert_eq!(positions["s2"], micro.offset(0.0, config.stack_spacing));
		assert_eq!(positions["s1"], micro.offset(0.0, 2.0 * config.stack_spacing));
	}

	#[test]
	fn root_stays_anchored_at_its_seed() {
		let positions = compute(&plan(), &config());
		assert_eq!(positions["i"], Position::new(0.0, 0.0));
	}

	#[test]
	fn apply_counts_moves() {
		let mut doc = plan();
		let mut positions = HashMap::new();
		positions.insert("who".to_string(), Position::new(-5.0, 3.0));
		positions.insert("lone".to_string(), Position::new(1.0, 1.0));
		assert_eq!(apply(&mut doc, &positions), 1);
		assert_eq!(doc.node("lone").unwrap().position, Position::new(1.0, 1.0));
	}
}
