use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::types::{EdgeInfo, NodeInfo};
use crate::config::SimulationConfig;
use crate::layout::Routing;
use crate::model::{ConceptGraph, NodeId, Position};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

pub const NODE_RADIUS: f64 = 14.0;
pub const HIT_RADIUS: f64 = 18.0;
/// Pointer travel, in pixels, before a press turns into a drag.
pub const DRAG_THRESHOLD: f64 = 3.0;

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub moved: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub edges: Vec<EdgeInfo>,
	index: HashMap<NodeId, DefaultNodeIdx>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	/// Edge whose label is under the pointer, when no node is.
	pub hovered_edge: Option<String>,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	pub routing: Routing,
	pub selected: Option<String>,
	pub connect_source: Option<String>,
}

fn parameters(sim: &SimulationConfig) -> SimulationParameters {
	SimulationParameters {
		force_charge: sim.force_charge,
		force_spring: sim.force_spring,
		force_max: sim.force_max,
		node_speed: sim.node_speed,
		damping_factor: sim.damping_factor,
	}
}

impl ForceGraphState {
	pub fn new(model: &ConceptGraph, sim: &SimulationConfig, width: f64, height: f64) -> Self {
		let mut state = Self {
			graph: ForceGraph::new(parameters(sim)),
			edges: Vec::new(),
			index: HashMap::new(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			hovered_edge: None,
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
			routing: Routing::default(),
			selected: None,
			connect_source: None,
		};
		state.sync(model, sim, false);
		state
	}

	/// Rebuild the simulation from the model.
	///
	/// With `keep_simulated` the nodes that already exist keep their simulated
	/// positions; otherwise every node starts from its model position.
	pub fn sync(&mut self, model: &ConceptGraph, sim: &SimulationConfig, keep_simulated: bool) {
		let previous: HashMap<NodeId, (f32, f32, bool)> = if keep_simulated {
			let mut prev = HashMap::new();
			self.graph.visit_nodes(|node| {
				prev.insert(
					node.data.user_data.id.clone(),
					(node.x(), node.y(), node.data.is_anchor),
				);
			});
			prev
		} else {
			HashMap::new()
		};

		let hovered = self.hovered_id();
		let mut graph = ForceGraph::new(parameters(sim));
		let mut index = HashMap::new();
		let count = model.node_count().max(1);

		for (i, node) in model.nodes().enumerate() {
			let (x, y, is_anchor) = match previous.get(&node.id) {
				Some(&p) => p,
				None if node.position != Position::default() || count == 1 => {
					(node.position.x as f32, node.position.y as f32, false)
				}
				None => {
					// unplaced nodes start on a circle so the springs can untangle them
					let angle = (i as f64) * 2.0 * PI / count as f64;
					((100.0 * angle.cos()) as f32, (100.0 * angle.sin()) as f32, false)
				}
			};
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor,
				user_data: NodeInfo::from_model(node, COLORS[i % COLORS.len()]),
			});
			index.insert(node.id.clone(), idx);
		}

		let mut springs = HashSet::new();
		let mut edges = Vec::with_capacity(model.edge_count());
		for edge in model.edges() {
			if let (Some(&src), Some(&tgt)) = (index.get(&edge.source), index.get(&edge.target)) {
				// one spring per unordered pair; loops pull on nothing
				let pair = if src < tgt { (src, tgt) } else { (tgt, src) };
				if src != tgt && springs.insert(pair) {
					graph.add_edge(src, tgt, EdgeData::default());
				}
				edges.push(EdgeInfo::from_model(edge, src, tgt));
			}
		}

		self.graph = graph;
		self.edges = edges;
		self.index = index;
		self.drag = DragState::default();
		self.hover = HoverState::default();
		if let Some(id) = hovered {
			self.set_hover(self.node_index(&id));
		}
		let edges = &self.edges;
		self.hovered_edge = self
			.hovered_edge
			.take()
			.filter(|id| edges.iter().any(|e| &e.id == id));
	}

	/// Id of the hovered node, or failing that the hovered edge label.
	pub fn hover_target(&self) -> Option<String> {
		self.hovered_id().or_else(|| self.hovered_edge.clone())
	}

	/// Screen position of a node centre or an edge label, under the current view.
	pub fn screen_anchor(&self, id: &str) -> Option<(f64, f64)> {
		let positions = self.positions();
		let (gx, gy) = match self.node_index(id) {
			Some(idx) => *positions.get(&idx)?,
			None => {
				let edge = self.edges.iter().find(|e| e.id == id)?;
				self.label_anchor(edge, &positions)?
			}
		};
		Some(self.graph_to_screen(gx, gy))
	}

	fn hovered_id(&self) -> Option<NodeId> {
		let idx = self.hover.node?;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(node.data.user_data.id.clone());
			}
		});
		found
	}

	pub fn node_index(&self, id: &str) -> Option<DefaultNodeIdx> {
		self.index.get(id).copied()
	}

	/// Current simulated positions keyed by node index.
	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut out = HashMap::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			out.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		out
	}

	/// Current simulated positions in model terms, for writing back.
	pub fn model_positions(&self) -> Vec<(NodeId, Position)> {
		let mut out = Vec::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			out.push((
				node.data.user_data.id.clone(),
				Position::new(node.x() as f64, node.y() as f64),
			));
		});
		out
	}

	pub fn node_id(&self, idx: DefaultNodeIdx) -> Option<NodeId> {
		self.index
			.iter()
			.find(|(_, i)| **i == idx)
			.map(|(id, _)| id.clone())
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(
			gx * self.transform.k + self.transform.x,
			gy * self.transform.k + self.transform.y,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	/// The edge whose label anchor is under the pointer.
	pub fn edge_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let positions = self.positions();
		self.edges
			.iter()
			.filter_map(|edge| {
				let (lx, ly) = self.label_anchor(edge, &positions)?;
				let d = ((lx - gx).powi(2) + (ly - gy).powi(2)).sqrt();
				(d < HIT_RADIUS).then_some((d, edge))
			})
			.min_by(|a, b| a.0.total_cmp(&b.0))
			.map(|(_, edge)| edge.id.clone())
	}

	/// World position of an edge's label for the current routing.
	pub fn label_anchor(
		&self,
		edge: &EdgeInfo,
		positions: &HashMap<DefaultNodeIdx, (f64, f64)>,
	) -> Option<(f64, f64)> {
		let &(x1, y1) = positions.get(&edge.source)?;
		let &(x2, y2) = positions.get(&edge.target)?;
		if edge.is_self_loop() {
			let (cx, cy, r) = loop_circle(x1, y1, edge);
			return Some((cx, cy - r));
		}
		let (mx, my) = ((x1 + x2) / 2.0, (y1 + y2) / 2.0);
		Some(match self.routing {
			Routing::Straight => (mx, my),
			Routing::Curved => {
				let (nx, ny) = normal(x1, y1, x2, y2);
				(mx + nx * edge.offset, my + ny * edge.offset)
			}
			Routing::Orth => (mx + edge.offset, my),
		})
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for edge in &self.edges {
				if edge.source == idx {
					self.hover.neighbors.insert(edge.target);
				} else if edge.target == idx {
					self.hover.neighbors.insert(edge.source);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		if self.animation_running {
			self.graph.update(dt);
		}
		self.flow_time += dt as f64;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

/// Unit normal to the segment, pointing left of the direction of travel.
pub fn normal(x1: f64, y1: f64, x2: f64, y2: f64) -> (f64, f64) {
	let (dx, dy) = (x2 - x1, y2 - y1);
	let len = (dx * dx + dy * dy).sqrt();
	if len < 0.001 {
		return (0.0, -1.0);
	}
	(-dy / len, dx / len)
}

/// Circle a self-loop is drawn on, sitting on top of its node.
///
/// Loops in the same bucket nest by growing with their offset.
pub fn loop_circle(x: f64, y: f64, edge: &EdgeInfo) -> (f64, f64, f64) {
	let r = NODE_RADIUS * 0.8 + edge.offset.abs() * 0.5;
	(x, y - NODE_RADIUS - r * 0.6, r)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{Edge, Node};

	fn model() -> ConceptGraph {
		let mut g = ConceptGraph::new();
		g.add_node(Node::new("A", "a").at(-50.0, 0.0)).unwrap();
		g.add_node(Node::new("B", "b").at(50.0, 0.0)).unwrap();
		g.insert_edge(Edge::new("ab1", "A", "B", "")).unwrap();
		g.insert_edge(Edge::new("ab2", "A", "B", "")).unwrap();
		g.insert_edge(Edge::new("aa", "A", "A", "")).unwrap();
		g
	}

	#[test]
	fn screen_anchor_follows_pan_and_zoom() {
		let mut state = ForceGraphState::new(&model(), &SimulationConfig::default(), 800.0, 600.0);
		assert_eq!(state.screen_anchor("A"), Some((350.0, 300.0)));
		assert_eq!(state.screen_anchor("ab2"), Some((400.0, 300.0)));

		state.transform.x += 30.0;
		state.transform.k = 2.0;
		assert_eq!(state.screen_anchor("A"), Some((330.0, 300.0)));
		assert_eq!(state.screen_anchor("B"), Some((530.0, 300.0)));
		assert_eq!(state.screen_anchor("missing"), None);
	}

	#[test]
	fn hovered_edge_is_dropped_when_it_leaves_the_model() {
		let mut g = model();
		let sim = SimulationConfig::default();
		let mut state = ForceGraphState::new(&g, &sim, 800.0, 600.0);
		state.hovered_edge = Some("ab1".into());
		assert_eq!(state.hover_target().as_deref(), Some("ab1"));

		state.sync(&g, &sim, true);
		assert_eq!(state.hovered_edge.as_deref(), Some("ab1"));
		g.remove_edge("ab1").unwrap();
		state.sync(&g, &sim, true);
		assert_eq!(state.hover_target(), None);

		state.set_hover(state.node_index("B"));
		assert_eq!(state.hover_target().as_deref(), Some("B"));
	}

	#[test]
	fn sync_mirrors_model_elements() {
		let state = ForceGraphState::new(&model(), &SimulationConfig::default(), 800.0, 600.0);
		assert_eq!(state.edges.len(), 3);
		assert!(state.edges[2].is_self_loop());
		let a = state.node_index("A").unwrap();
		assert_eq!(state.positions()[&a], (-50.0, 0.0));
		assert_eq!(state.node_id(a).as_deref(), Some("A"));
	}

	#[test]
	fn screen_and_graph_coordinates_invert() {
		let mut state = ForceGraphState::new(&model(), &SimulationConfig::default(), 800.0, 600.0);
		state.transform.k = 2.0;
		let (sx, sy) = state.graph_to_screen(-50.0, 0.0);
		assert_eq!(state.screen_to_graph(sx, sy), (-50.0, 0.0));
		assert_eq!(state.node_at_position(sx, sy), state.node_index("A"));
	}

	#[test]
	fn curved_label_anchor_follows_offset() {
		let mut g = model();
		g.set_attr("ab1", "curve-offset", serde_json::json!(-10.0)).unwrap();
		let state = ForceGraphState::new(&g, &SimulationConfig::default(), 800.0, 600.0);
		let positions = state.positions();
		// A -> B runs along +x, so the left normal is +y
		assert_eq!(state.label_anchor(&state.edges[0], &positions), Some((0.0, -10.0)));
		assert_eq!(state.label_anchor(&state.edges[1], &positions), Some((0.0, 0.0)));
		let (sx, sy) = state.graph_to_screen(0.0, -10.0);
		assert_eq!(state.edge_at_position(sx, sy).as_deref(), Some("ab1"));
	}
}
