use crate::persistence::EditorState;
use crate::plan::{Document, EdgeId, NodeId, Position};

pub const NODE_RADIUS: f64 = 14.0;
pub const HIT_RADIUS: f64 = 18.0;
pub const EDGE_HIT: f64 = 6.0;

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<NodeId>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Position,
	pub current: Position,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// View state of the canvas. The plan itself lives in the store.
pub struct CanvasState {
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: Option<NodeId>,
	pub width: f64,
	pub height: f64,
}

impl CanvasState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			transform: ViewTransform {
				x: width / 4.0,
				y: height / 6.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: None,
			width,
			height,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Where `id` is drawn: the drag position while it is being dragged.
	pub fn position_of(&self, id: &str, stored: Position) -> Position {
		match &self.drag.node {
			Some(dragged) if dragged == id => self.drag.current,
			_ => stored,
		}
	}

	/// Topmost node under the cursor.
	pub fn node_at_position(&self, doc: &Document, sx: f64, sy: f64) -> Option<NodeId> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		doc.nodes
			.iter()
			.rev()
			.find(|node| {
				let p = self.position_of(&node.id, node.position);
				let (dx, dy) = (p.x - gx, p.y - gy);
				(dx * dx + dy * dy).sqrt() < HIT_RADIUS
			})
			.map(|node| node.id.clone())
	}

	/// Edge passing within [`EDGE_HIT`] screen pixels of the cursor.
	pub fn edge_at_position(&self, doc: &Document, sx: f64, sy: f64) -> Option<EdgeId> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let tolerance = EDGE_HIT / self.transform.k;
		doc.edges
			.iter()
			.find(|edge| {
				let (Some(a), Some(b)) = (doc.node(&edge.source), doc.node(&edge.target)) else {
					return false;
				};
				let a = self.position_of(&a.id, a.position);
				let b = self.position_of(&b.id, b.position);
				distance_to_segment((gx, gy), (a.x, a.y), (b.x, b.y)) < tolerance
			})
			.map(|edge| edge.id.clone())
	}

	pub fn begin_drag(&mut self, id: NodeId, sx: f64, sy: f64, at: Position) {
		self.drag = DragState {
			node: Some(id),
			start_x: sx,
			start_y: sy,
			node_start: at,
			current: at,
			moved: false,
		};
	}

	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		if self.drag.node.is_none() {
			return;
		}
		let (dx, dy) = (
			(sx - self.drag.start_x) / self.transform.k,
			(sy - self.drag.start_y) / self.transform.k,
		);
		self.drag.current = self.drag.node_start.offset(dx, dy);
		self.drag.moved = true;
	}

	/// Ends the drag and returns the node and its final position if it moved.
	pub fn end_drag(&mut self) -> Option<(NodeId, Position)> {
		let drag = std::mem::take(&mut self.drag);
		self.pan.active = false;
		match drag.node {
			Some(id) if drag.moved => Some((id, drag.current)),
			_ => None,
		}
	}

	pub fn zoom_at(&mut self, x: f64, y: f64, zoom_in: bool) {
		let factor = if zoom_in { 1.1 } else { 0.9 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Viewport and `selected` nodes, ready to be stored.
	pub fn view_state(&self, selected: Vec<NodeId>) -> EditorState {
		EditorState {
			zoom: self.transform.k,
			pan_x: self.transform.x,
			pan_y: self.transform.y,
			selected,
		}
	}

	/// Restores a stored viewport. Unusable values keep the current one.
	pub fn restore_view(&mut self, saved: &EditorState) {
		let usable = saved.zoom.is_finite()
			&& saved.zoom > 0.0
			&& saved.pan_x.is_finite()
			&& saved.pan_y.is_finite();
		if !usable {
			return;
		}
		self.transform = ViewTransform {
			x: saved.pan_x,
			y: saved.pan_y,
			k: saved.zoom.clamp(0.1, 10.0),
		};
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (abx, aby) = (b.0 - a.0, b.1 - a.1);
	let len2 = abx * abx + aby * aby;
	let t = if len2 < f64::EPSILON {
		0.0
	} else {
		(((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len2).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.0 + t * abx, a.1 + t * aby);
	((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}
