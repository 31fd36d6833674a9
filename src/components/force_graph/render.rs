use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scale::{font_px, wrap_label};
use super::state::{ForceGraphState, NODE_RADIUS, loop_circle, normal};
use super::types::{EdgeInfo, NodeInfo, NodeShape};
use crate::layout::Routing;

const BACKGROUND: &str = "#1a1a2e";
const EDGE_COLOR: &str = "rgb(100, 180, 255)";
const SELECTED_COLOR: &str = "#ffd166";
const CONNECT_COLOR: &str = "#06d6a0";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	let positions = state.positions();
	draw_edges(state, &positions, ctx);
	draw_nodes(state, ctx);
	draw_edge_labels(state, &positions, ctx);
	ctx.restore();
}

fn set_dash(ctx: &CanvasRenderingContext2d, pattern: &[f64], k: f64) {
	let dash = js_sys::Array::new();
	for len in pattern {
		dash.push(&JsValue::from_f64(len / k));
	}
	let _ = ctx.set_line_dash(&dash);
}

fn unit(from: (f64, f64), to: (f64, f64)) -> (f64, f64) {
	let (dx, dy) = (to.0 - from.0, to.1 - from.1);
	let len = (dx * dx + dy * dy).sqrt();
	if len < 0.001 {
		return (0.0, 0.0);
	}
	(dx / len, dy / len)
}

/// Filled arrowhead with its tip at `tip`, pointing along `dir`.
fn draw_arrow(ctx: &CanvasRenderingContext2d, tip: (f64, f64), dir: (f64, f64), size: f64) {
	let (ux, uy) = dir;
	let (back_x, back_y) = (tip.0 - ux * size, tip.1 - uy * size);
	let (px, py) = (-uy * size * 0.5, ux * size * 0.5);
	ctx.begin_path();
	ctx.move_to(tip.0, tip.1);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

/// Strokes one edge along the current routing and returns where and in which
/// direction its arrowhead goes.
fn trace_edge(
	routing: Routing,
	edge: &EdgeInfo,
	p1: (f64, f64),
	p2: (f64, f64),
	arrow_size: f64,
	ctx: &CanvasRenderingContext2d,
) -> ((f64, f64), (f64, f64)) {
	match routing {
		Routing::Straight => {
			let u = unit(p1, p2);
			let tip = (p2.0 - u.0 * NODE_RADIUS, p2.1 - u.1 * NODE_RADIUS);
			ctx.begin_path();
			ctx.move_to(p1.0 + u.0 * NODE_RADIUS, p1.1 + u.1 * NODE_RADIUS);
			ctx.line_to(tip.0 - u.0 * arrow_size, tip.1 - u.1 * arrow_size);
			ctx.stroke();
			(tip, u)
		}
		Routing::Curved => {
			let (nx, ny) = normal(p1.0, p1.1, p2.0, p2.1);
			// the curve passes through midpoint + normal * offset
			let c = (
				(p1.0 + p2.0) / 2.0 + nx * 2.0 * edge.offset,
				(p1.1 + p2.1) / 2.0 + ny * 2.0 * edge.offset,
			);
			let (us, ue) = (unit(p1, c), unit(c, p2));
			let tip = (p2.0 - ue.0 * NODE_RADIUS, p2.1 - ue.1 * NODE_RADIUS);
			ctx.begin_path();
			ctx.move_to(p1.0 + us.0 * NODE_RADIUS, p1.1 + us.1 * NODE_RADIUS);
			ctx.quadratic_curve_to(c.0, c.1, tip.0 - ue.0 * arrow_size, tip.1 - ue.1 * arrow_size);
			ctx.stroke();
			(tip, ue)
		}
		Routing::Orth => {
			let elbow_x = (p1.0 + p2.0) / 2.0 + edge.offset;
			let (a, b) = ((elbow_x, p1.1), (elbow_x, p2.1));
			let first = if (a.0 - p1.0).abs() < 0.001 { b } else { a };
			let last = if (p2.0 - b.0).abs() < 0.001 { a } else { b };
			let (us, ue) = (unit(p1, first), unit(last, p2));
			let tip = (p2.0 - ue.0 * NODE_RADIUS, p2.1 - ue.1 * NODE_RADIUS);
			ctx.begin_path();
			ctx.move_to(p1.0 + us.0 * NODE_RADIUS, p1.1 + us.1 * NODE_RADIUS);
			ctx.line_to(a.0, a.1);
			ctx.line_to(b.0, b.1);
			ctx.line_to(tip.0 - ue.0 * arrow_size, tip.1 - ue.1 * arrow_size);
			ctx.stroke();
			(tip, ue)
		}
	}
}

fn trace_loop(
	edge: &EdgeInfo,
	p: (f64, f64),
	ctx: &CanvasRenderingContext2d,
) -> ((f64, f64), (f64, f64)) {
	let (cx, cy, r) = loop_circle(p.0, p.1, edge);
	// leave a gap where the loop dips into the node
	let (start, end) = (PI / 2.0 + 0.9, PI / 2.0 - 0.9 + 2.0 * PI);
	ctx.begin_path();
	let _ = ctx.arc(cx, cy, r, start, end);
	ctx.stroke();
	let tip = (cx + r * end.cos(), cy + r * end.sin());
	(tip, (-end.sin(), end.cos()))
}

fn draw_edges(
	state: &ForceGraphState,
	positions: &HashMap<DefaultNodeIdx, (f64, f64)>,
	ctx: &CanvasRenderingContext2d,
) {
	let k = state.transform.k;
	let (line_width, arrow_size) = (1.5 / k, 8.0 / k);
	let t = ease_out_cubic(state.hover.highlight_t);
	let selected = state.selected.as_deref();

	for edge in &state.edges {
		let (Some(&p1), Some(&p2)) = (positions.get(&edge.source), positions.get(&edge.target))
		else {
			continue;
		};
		let is_highlighted = state.is_highlighted(edge.source) && state.is_highlighted(edge.target);
		let is_selected = selected == Some(edge.id.as_str());

		// t=0: all edges at base (0.6), t=1: highlighted at 0.9, others at 0.15
		let (alpha, width) = if is_selected {
			(1.0, line_width * 2.0)
		} else if is_highlighted {
			(0.6 + 0.3 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};

		let color = if is_selected {
			SELECTED_COLOR
		} else {
			edge.color.as_deref().unwrap_or(EDGE_COLOR)
		};
		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(color);
		ctx.set_fill_style_str(color);
		ctx.set_line_width(width);

		let pattern = edge.style.pattern();
		set_dash(ctx, pattern, k);
		if !pattern.is_empty() {
			let period: f64 = pattern.iter().sum::<f64>() / k;
			ctx.set_line_dash_offset(-(state.flow_time * 30.0) % period);
		}

		let (tip, dir) = if edge.is_self_loop() {
			trace_loop(edge, p1, ctx)
		} else {
			trace_edge(state.routing, edge, p1, p2, arrow_size, ctx)
		};
		set_dash(ctx, &[], k);
		if dir != (0.0, 0.0) {
			draw_arrow(ctx, tip, dir, arrow_size);
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_edge_labels(
	state: &ForceGraphState,
	positions: &HashMap<DefaultNodeIdx, (f64, f64)>,
	ctx: &CanvasRenderingContext2d,
) {
	let k = state.transform.k;
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	for edge in state.edges.iter().filter(|e| !e.label.is_empty()) {
		let Some((x, y)) = state.label_anchor(edge, positions) else {
			continue;
		};
		let px = font_px(edge.font_size, k);
		let lines = wrap_label(&edge.label, edge.max_width, px);
		let top = y - px * (lines.len() as f64 - 1.0) / 2.0;
		ctx.set_font(&format!("{}px sans-serif", px));
		for (i, line) in lines.iter().enumerate() {
			let ly = top + px * i as f64;
			if let Ok(metrics) = ctx.measure_text(line) {
				let w = metrics.width();
				ctx.set_fill_style_str("rgba(26, 26, 46, 0.8)");
				ctx.fill_rect(x - w / 2.0 - 2.0 / k, ly - px / 2.0, w + 4.0 / k, px);
			}
			ctx.set_fill_style_str("rgba(220, 230, 255, 0.9)");
			let _ = ctx.fill_text(line, x, ly);
		}
	}
	ctx.set_text_align("start");
	ctx.set_text_baseline("alphabetic");
}

/// Outline of a node shape scaled to `r`.
fn shape_path(ctx: &CanvasRenderingContext2d, shape: NodeShape, x: f64, y: f64, r: f64) {
	ctx.begin_path();
	match shape {
		NodeShape::Ellipse => {
			let _ = ctx.ellipse(x, y, r * 1.25, r, 0.0, 0.0, 2.0 * PI);
		}
		NodeShape::Rectangle => ctx.rect(x - r * 1.25, y - r, r * 2.5, r * 2.0),
		NodeShape::RoundRectangle => {
			let (w, h, c) = (r * 1.25, r, r * 0.4);
			ctx.move_to(x - w + c, y - h);
			let _ = ctx.arc_to(x + w, y - h, x + w, y + h, c);
			let _ = ctx.arc_to(x + w, y + h, x - w, y + h, c);
			let _ = ctx.arc_to(x - w, y + h, x - w, y - h, c);
			let _ = ctx.arc_to(x - w, y - h, x + w, y - h, c);
			ctx.close_path();
		}
		NodeShape::Diamond => {
			ctx.move_to(x, y - r * 1.2);
			ctx.line_to(x + r * 1.4, y);
			ctx.line_to(x, y + r * 1.2);
			ctx.line_to(x - r * 1.4, y);
			ctx.close_path();
		}
	}
}

fn draw_label(ctx: &CanvasRenderingContext2d, info: &NodeInfo, x: f64, y: f64, r: f64, k: f64) {
	let px = font_px(info.font_size, k);
	ctx.set_font(&format!("{}px sans-serif", px));
	ctx.set_text_align("center");
	for (i, line) in wrap_label(&info.label, info.max_width, px).iter().enumerate() {
		let _ = ctx.fill_text(line, x, y + r + px * (i as f64 + 1.0));
	}
	ctx.set_text_align("start");
}

fn draw_rings(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	info: &NodeInfo,
	x: f64,
	y: f64,
	r: f64,
) {
	let k = state.transform.k;
	ctx.set_line_width(2.0 / k);
	if state.selected.as_deref() == Some(info.id.as_str()) {
		shape_path(ctx, info.shape, x, y, r + 4.0 / k);
		ctx.set_stroke_style_str(SELECTED_COLOR);
		ctx.stroke();
	}
	if state.connect_source.as_deref() == Some(info.id.as_str()) {
		set_dash(ctx, &[4.0, 3.0], k);
		shape_path(ctx, info.shape, x, y, r + 8.0 / k);
		ctx.set_stroke_style_str(CONNECT_COLOR);
		ctx.stroke();
		set_dash(ctx, &[], k);
	}
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if has_highlight && state.is_highlighted(idx) {
			return;
		}
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let (alpha, radius) = (1.0 - 0.7 * t, NODE_RADIUS * (1.0 - 0.15 * t));

		ctx.set_global_alpha(alpha);
		shape_path(ctx, info.shape, x, y, radius);
		ctx.set_fill_style_str(&info.color);
		ctx.fill();
		ctx.set_global_alpha(1.0);
		draw_rings(state, ctx, info, x, y, radius);

		ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha * 0.8));
		draw_label(ctx, info, x, y, radius, k);
	});

	if !has_highlight {
		return;
	}

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if !state.is_highlighted(idx) {
			return;
		}
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let is_hovered = state.is_hovered(idx);
		let is_neighbor =
			state.hover.neighbors.contains(&idx) || state.hover.prev_neighbors.contains(&idx);

		let (radius, glow_radius) = if is_hovered {
			(
				NODE_RADIUS * (1.0 + 0.35 * t),
				NODE_RADIUS * (1.8 + 1.2 * t),
			)
		} else if is_neighbor {
			(NODE_RADIUS * (1.0 + 0.2 * t), NODE_RADIUS * (1.4 + 0.6 * t))
		} else {
			(NODE_RADIUS, 0.0)
		};

		if glow_radius > 0.0 && t > 0.01 {
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius) {
				let alpha = if is_hovered { 0.35 * t } else { 0.2 * t };
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {})", alpha));
				let _ = gradient.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		shape_path(ctx, info.shape, x, y, radius);
		ctx.set_fill_style_str(&info.color);
		ctx.fill();

		if is_hovered && t > 0.01 {
			shape_path(ctx, info.shape, x, y, radius + 2.0 / k);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}
		draw_rings(state, ctx, info, x, y, radius);

		ctx.set_fill_style_str("white");
		draw_label(ctx, info, x, y, radius, k);
	});
}
