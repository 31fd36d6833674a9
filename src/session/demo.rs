use crate::model::{ConceptGraph, Edge, GraphResult, Node, attr};

/// Starter map shown in a fresh editor. It deliberately contains one parallel
/// pair and one detached node so the problems panel has something to show.
pub fn seed() -> GraphResult<ConceptGraph> {
	let mut g = ConceptGraph::new();
	let nodes = [
		("map", "Concept map", "#1f77b4", -160.0, 0.0),
		("node", "Node", "#ff7f0e", 0.0, -90.0),
		("edge", "Edge", "#2ca02c", 0.0, 90.0),
		("label", "Label", "#9467bd", 160.0, 0.0),
		("note", "Loose idea", "#7f7f7f", 160.0, 160.0),
	];
	for (id, label, fill, x, y) in nodes {
		g.add_node(Node::new(id, label).at(x, y).with_attr(attr::FILL, fill))?;
	}
	let edges = [
		("d1", "map", "node", "contains"),
		("d2", "map", "edge", "contains"),
		("d3", "node", "label", "has"),
		("d4", "edge", "label", "has"),
		("d5", "edge", "node", "connects"),
		("d6", "edge", "node", "points to"),
	];
	for (id, source, target, label) in edges {
		g.insert_edge(Edge::new(id, source, target, label))?;
	}
	Ok(g)
}
