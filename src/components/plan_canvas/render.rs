use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{CanvasState, NODE_RADIUS};
use crate::plan::{Document, NodeKind};

pub fn kind_color(kind: NodeKind) -> &'static str {
	match kind {
		NodeKind::Intervention => "#d62728",
		NodeKind::Phase => "#ff7f0e",
		NodeKind::Micro => "#2ca02c",
		NodeKind::Session => "#1f77b4",
		NodeKind::Profile => "#9467bd",
	}
}

pub fn render(state: &CanvasState, doc: &Document, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, doc, ctx);
	draw_nodes(state, doc, ctx);
	ctx.restore();
}

fn draw_edges(state: &CanvasState, doc: &Document, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let arrow_size = 8.0 / k;

	for edge in &doc.edges {
		let (Some(source), Some(target)) = (doc.node(&edge.source), doc.node(&edge.target)) else {
			continue;
		};
		let a = state.position_of(&source.id, source.position);
		let b = state.position_of(&target.id, target.position);
		let (dx, dy) = (b.x - a.x, b.y - a.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let (color, width) = if edge.selected {
			("rgba(255, 220, 120, 0.95)", 3.0 / k)
		} else {
			("rgba(100, 180, 255, 0.6)", 1.5 / k)
		};
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(width);

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(a.x + ux * NODE_RADIUS, a.y + uy * NODE_RADIUS);
		ctx.line_to(
			b.x - ux * (NODE_RADIUS + arrow_size),
			b.y - uy * (NODE_RADIUS + arrow_size),
		);
		ctx.stroke();

		ctx.set_fill_style_str(color);
		let (tip_x, tip_y) = (b.x - ux * NODE_RADIUS, b.y - uy * NODE_RADIUS);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_nodes(state: &CanvasState, doc: &Document, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	ctx.set_font(&format!("{}px sans-serif", 11.0 / k.max(0.5)));

	for node in &doc.nodes {
		let p = state.position_of(&node.id, node.position);
		let hovered = state.hover.as_deref() == Some(node.id.as_str());

		if node.selected || hovered {
			ctx.begin_path();
			let _ = ctx.arc(p.x, p.y, NODE_RADIUS + 4.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(if node.selected {
				"rgba(255, 220, 120, 0.95)"
			} else {
				"rgba(255, 255, 255, 0.5)"
			});
			ctx.set_line_width(2.0 / k);
			ctx.stroke();
		}

		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, NODE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(kind_color(node.kind));
		ctx.fill();

		ctx.set_fill_style_str("rgba(255, 255, 255, 0.9)");
		let _ = ctx.fill_text(&node.caption(), p.x + NODE_RADIUS + 4.0, p.y + 4.0);
		if let Some(date) = &node.data.date {
			ctx.set_fill_style_str("rgba(255, 255, 255, 0.5)");
			let _ = ctx.fill_text(date, p.x + NODE_RADIUS + 4.0, p.y + 4.0 + 13.0 / k.max(0.5));
		}
	}
}
