//! Curvature offsets that fan out edges sharing the same ordered endpoints.

use indexmap::IndexMap;
use serde_json::Value;

use crate::model::{ConceptGraph, EdgeId, attr};

use super::problems::parallel_buckets;

/// Symmetric offsets centered at zero: `n = 3` gives `[-step, 0, step]`.
pub fn symmetric_offsets(n: usize, step: f64) -> Vec<f64> {
	let center = (n as f64 - 1.0) / 2.0;
	(0..n).map(|i| (i as f64 - center) * step).collect()
}

/// Offset for every edge, in edge order within each bucket.
pub fn edge_offsets(graph: &ConceptGraph, step: f64) -> IndexMap<EdgeId, f64> {
	let mut offsets = IndexMap::with_capacity(graph.edge_count());
	for ids in parallel_buckets(graph).into_values() {
		let spread = symmetric_offsets(ids.len(), step);
		for (id, offset) in ids.into_iter().zip(spread) {
			offsets.insert(id.clone(), offset);
		}
	}
	offsets
}

/// Write the offsets into each edge's `curve-offset` attribute; returns how many changed.
///
/// A zero offset is stored as an absent attribute, so edges outside a parallel
/// bucket keep exactly the attributes they were given.
pub fn apply_offsets(graph: &mut ConceptGraph, step: f64) -> usize {
	let mut changed = 0;
	for (id, offset) in edge_offsets(graph, step) {
		let value = if offset == 0.0 {
			Value::Null
		} else {
			Value::from(offset)
		};
		if matches!(graph.set_attr(&id, attr::CURVE_OFFSET, value), Ok(true)) {
			changed += 1;
		}
	}
	changed
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{Edge, Node};

	#[test]
	fn offsets_are_symmetric_around_zero() {
		let s = 10.0;
		assert_eq!(symmetric_offsets(0, s), Vec::<f64>::new());
		assert_eq!(symmetric_offsets(1, s), [0.0]);
		assert_eq!(symmetric_offsets(2, s), [-5.0, 5.0]);
		assert_eq!(symmetric_offsets(3, s), [-10.0, 0.0, 10.0]);
		assert_eq!(symmetric_offsets(4, s), [-15.0, -5.0, 5.0, 15.0]);
	}

	#[test]
	fn buckets_are_direction_sensitive() {
		let mut g = ConceptGraph::new();
		g.add_node(Node::new("A", "")).unwrap();
		g.add_node(Node::new("B", "")).unwrap();
		g.insert_edge(Edge::new("ab1", "A", "B", "")).unwrap();
		g.insert_edge(Edge::new("ba", "B", "A", "")).unwrap();
		g.insert_edge(Edge::new("ab2", "A", "B", "")).unwrap();

		let offsets = edge_offsets(&g, 20.0);
		assert_eq!(offsets["ab1"], -10.0);
		assert_eq!(offsets["ab2"], 10.0);
		assert_eq!(offsets["ba"], 0.0);
	}

	#[test]
	fn apply_only_touches_changed_edges() {
		let mut g = ConceptGraph::new();
		g.add_node(Node::new("A", "")).unwrap();
		g.add_node(Node::new("B", "")).unwrap();
		g.insert_edge(Edge::new("e1", "A", "B", "")).unwrap();
		assert_eq!(apply_offsets(&mut g, 20.0), 0);
		assert!(g.edge("e1").unwrap().attrs.is_empty());

		g.insert_edge(Edge::new("e2", "A", "B", "")).unwrap();
		assert_eq!(apply_offsets(&mut g, 20.0), 2);
		assert_eq!(g.edge("e1").unwrap().attr_f64(attr::CURVE_OFFSET), Some(-10.0));

		assert_eq!(apply_offsets(&mut g, 20.0), 0);

		g.remove_edge("e2").unwrap();
		assert_eq!(apply_offsets(&mut g, 20.0), 1);
		assert_eq!(g.edge("e1").unwrap().attr_f64(attr::CURVE_OFFSET), None);
	}

	#[test]
	fn single_edges_keep_their_document_attributes() {
		let text = r##"{"elements":[
			{"group":"nodes","data":{"id":"A","label":"a"},"position":{"x":0,"y":0}},
			{"group":"nodes","data":{"id":"B","label":"b"},"position":{"x":1,"y":0}},
			{"group":"edges","data":{"id":"e","source":"A","target":"B","label":"r","line-color":"#333"}}
		]}"##;
		let mut g = crate::storage::import(text).unwrap();
		let before = crate::storage::export(&g).unwrap();
		assert_eq!(apply_offsets(&mut g, 20.0), 0);
		assert_eq!(crate::storage::export(&g).unwrap(), before);
	}
}
