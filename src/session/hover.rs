use crate::model::{ConceptGraph, ElementKind};

/// Content of the info bubble shown next to the hovered element.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverInfo {
	pub id: String,
	pub kind: ElementKind,
	pub headline: String,
	pub detail: Option<String>,
	/// Anchor in canvas pixels.
	pub x: f64,
	pub y: f64,
}

impl HoverInfo {
	/// Describe a node by its label and connection count, an edge by its
	/// label and endpoints. `None` for an unknown id.
	pub fn describe(graph: &ConceptGraph, id: &str, x: f64, y: f64) -> Option<Self> {
		let name = |node: &str| display_name(graph, node);
		let (kind, headline, detail) = match graph.kind_of(id)? {
			ElementKind::Node => {
				let detail = match graph.degree(id) {
					0 => "Not connected".to_string(),
					1 => "1 connection".to_string(),
					n => format!("{n} connections"),
				};
				(ElementKind::Node, name(id), Some(detail))
			}
			ElementKind::Edge => {
				let edge = graph.edge(id)?;
				let route = format!("{} → {}", name(&edge.source), name(&edge.target));
				match edge.label.trim() {
					"" => (ElementKind::Edge, route, None),
					label => (ElementKind::Edge, label.to_string(), Some(route)),
				}
			}
		};

		Some(Self {
			id: id.to_string(),
			kind,
			headline,
			detail,
			x,
			y,
		})
	}
}

fn display_name(graph: &ConceptGraph, id: &str) -> String {
	match graph.node(id).map(|n| n.label.trim()) {
		Some(label) if !label.is_empty() => label.to_string(),
		_ => id.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{Edge, Node};

	fn graph() -> ConceptGraph {
		let mut g = ConceptGraph::new();
		g.add_node(Node::new("A", "Water")).unwrap();
		g.add_node(Node::new("B", "")).unwrap();
		g.add_node(Node::new("C", "Ice")).unwrap();
		g.insert_edge(Edge::new("e1", "A", "B", "becomes")).unwrap();
		g.insert_edge(Edge::new("e2", "A", "A", "")).unwrap();
		g
	}

	#[test]
	fn nodes_show_label_and_connections() {
		let g = graph();
		let a = HoverInfo::describe(&g, "A", 10.0, 20.0).unwrap();
		assert_eq!(a.kind, ElementKind::Node);
		assert_eq!(a.headline, "Water");
		assert_eq!(a.detail.as_deref(), Some("3 connections"));
		assert_eq!((a.x, a.y), (10.0, 20.0));

		let b = HoverInfo::describe(&g, "B", 0.0, 0.0).unwrap();
		assert_eq!(b.headline, "B");
		assert_eq!(b.detail.as_deref(), Some("1 connection"));
		assert_eq!(
			HoverInfo::describe(&g, "C", 0.0, 0.0).unwrap().detail.as_deref(),
			Some("Not connected")
		);
	}

	#[test]
	fn edges_show_label_then_route() {
		let g = graph();
		let e1 = HoverInfo::describe(&g, "e1", 0.0, 0.0).unwrap();
		assert_eq!(e1.headline, "becomes");
		assert_eq!(e1.detail.as_deref(), Some("Water → B"));

		let e2 = HoverInfo::describe(&g, "e2", 0.0, 0.0).unwrap();
		assert_eq!(e2.headline, "Water → Water");
		assert_eq!(e2.detail, None);
		assert!(HoverInfo::describe(&g, "nope", 0.0, 0.0).is_none());
	}
}
