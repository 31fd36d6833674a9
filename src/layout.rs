//! Layout and edge routing choices.
//!
//! The force layout is driven continuously by the canvas simulation; the other
//! layouts are one-shot placements written back into the model.

use std::f64::consts::PI;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ConceptGraph, NodeId, Position};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
	#[default]
	Force,
	Grid,
	Concentric,
	Preset,
}

impl LayoutKind {
	pub const ALL: [LayoutKind; 4] = [Self::Force, Self::Grid, Self::Concentric, Self::Preset];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Force => "force",
			Self::Grid => "grid",
			Self::Concentric => "concentric",
			Self::Preset => "preset",
		}
	}

	/// Whether the simulation keeps moving nodes under this layout.
	pub fn is_animated(self) -> bool {
		self == Self::Force
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Routing {
	Straight,
	#[default]
	Curved,
	Orth,
}

impl Routing {
	pub const ALL: [Routing; 3] = [Self::Straight, Self::Curved, Self::Orth];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Straight => "straight",
			Self::Curved => "curved",
			Self::Orth => "orth",
		}
	}
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown choice `{0}`")]
pub struct UnknownChoice(pub String);

impl FromStr for LayoutKind {
	type Err = UnknownChoice;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|k| k.as_str() == s)
			.ok_or_else(|| UnknownChoice(s.to_string()))
	}
}

impl FromStr for Routing {
	type Err = UnknownChoice;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|r| r.as_str() == s)
			.ok_or_else(|| UnknownChoice(s.to_string()))
	}
}

/// Positions for a one-shot layout centered on `center`, or `None` for layouts
/// that keep the current positions.
pub fn arrange(
	graph: &ConceptGraph,
	kind: LayoutKind,
	center: Position,
	spacing: f64,
) -> Option<Vec<(NodeId, Position)>> {
	match kind {
		LayoutKind::Grid => Some(grid(graph, center, spacing)),
		LayoutKind::Concentric => Some(concentric(graph, center, spacing)),
		LayoutKind::Force | LayoutKind::Preset => None,
	}
}

fn grid(graph: &ConceptGraph, center: Position, spacing: f64) -> Vec<(NodeId, Position)> {
	let n = graph.node_count();
	let cols = (n as f64).sqrt().ceil().max(1.0) as usize;
	let rows = n.div_ceil(cols);
	let (x0, y0) = (
		center.x - (cols as f64 - 1.0) * spacing / 2.0,
		center.y - (rows as f64 - 1.0) * spacing / 2.0,
	);
	graph
		.nodes()
		.enumerate()
		.map(|(i, node)| {
			let (row, col) = (i / cols, i % cols);
			let pos = Position::new(x0 + col as f64 * spacing, y0 + row as f64 * spacing);
			(node.id.clone(), pos)
		})
		.collect()
}

fn concentric(graph: &ConceptGraph, center: Position, spacing: f64) -> Vec<(NodeId, Position)> {
	let mut order: Vec<(usize, &NodeId)> = graph
		.nodes()
		.map(|n| (graph.degree(&n.id), &n.id))
		.collect();
	// stable: equal degrees keep node order
	order.sort_by(|a, b| b.0.cmp(&a.0));

	let mut placed = Vec::with_capacity(order.len());
	let mut ring = 0usize;
	let mut idx = 0usize;
	while idx < order.len() {
		// ring r holds 1 node at the center, then 6r nodes
		let capacity = if ring == 0 { 1 } else { 6 * ring };
		let members = &order[idx..(idx + capacity).min(order.len())];
		let radius = ring as f64 * spacing;
		for (k, (_, id)) in members.iter().enumerate() {
			let angle = 2.0 * PI * k as f64 / members.len() as f64;
			let pos = Position::new(center.x + radius * angle.cos(), center.y + radius * angle.sin());
			placed.push(((*id).clone(), pos));
		}
		idx += members.len();
		ring += 1;
	}
	placed
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{Edge, Node};

	fn nodes(n: usize) -> ConceptGraph {
		let mut g = ConceptGraph::new();
		for i in 0..n {
			g.add_node(Node::new(format!("n{i}"), "")).unwrap();
		}
		g
	}

	#[test]
	fn choices_parse_from_their_names() {
		for kind in LayoutKind::ALL {
			assert_eq!(kind.as_str().parse::<LayoutKind>(), Ok(kind));
		}
		for routing in Routing::ALL {
			assert_eq!(routing.as_str().parse::<Routing>(), Ok(routing));
		}
		assert!("hierarchy".parse::<LayoutKind>().is_err());
	}

	#[test]
	fn grid_is_centered_row_major() {
		let g = nodes(4);
		let placed = arrange(&g, LayoutKind::Grid, Position::new(0.0, 0.0), 100.0).unwrap();
		let coords: Vec<_> = placed.iter().map(|(_, p)| (p.x, p.y)).collect();
		assert_eq!(
			coords,
			[(-50.0, -50.0), (50.0, -50.0), (-50.0, 50.0), (50.0, 50.0)]
		);
	}

	#[test]
	fn concentric_puts_highest_degree_in_the_middle() {
		let mut g = nodes(4);
		for (i, t) in ["n0", "n1", "n2"].iter().enumerate() {
			g.insert_edge(Edge::new(format!("e{i}"), "n3", *t, "")).unwrap();
		}
		let center = Position::new(10.0, 20.0);
		let placed = arrange(&g, LayoutKind::Concentric, center, 50.0).unwrap();
		assert_eq!(placed[0], ("n3".to_string(), center));
		let ring: Vec<_> = placed[1..].iter().map(|(id, _)| id.as_str()).collect();
		assert_eq!(ring, ["n0", "n1", "n2"]);
		for (_, p) in &placed[1..] {
			let r = ((p.x - center.x).powi(2) + (p.y - center.y).powi(2)).sqrt();
			assert!((r - 50.0).abs() < 1e-9);
		}
	}

	#[test]
	fn force_and_preset_keep_positions() {
		let g = nodes(3);
		assert!(arrange(&g, LayoutKind::Force, Position::default(), 10.0).is_none());
		assert!(arrange(&g, LayoutKind::Preset, Position::default(), 10.0).is_none());
		assert_eq!(arrange(&nodes(0), LayoutKind::Grid, Position::default(), 10.0), Some(vec![]));
	}
}
