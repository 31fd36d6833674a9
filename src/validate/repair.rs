//! One-click repairs for the problems reported by [`detect`](super::detect).
//!
//! Each repair is idempotent: a second call right after the first changes nothing.

use log::debug;

use crate::model::{Attributes, ConceptGraph, EdgeId, GraphResult};

use super::problems::parallel_buckets;

/// Separator placed between labels folded into a surviving edge.
pub const LABEL_SEPARATOR: &str = " | ";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
	pub groups: usize,
	pub removed: usize,
}

/// Collapse every group of parallel edges into its first edge.
///
/// The survivor keeps its own attributes; its label becomes the de-duplicated,
/// first-seen union of the group's non-empty labels.
pub fn merge_parallel(graph: &mut ConceptGraph) -> GraphResult<MergeReport> {
	let groups: Vec<Vec<EdgeId>> = parallel_buckets(graph)
		.into_values()
		.filter(|ids| ids.len() > 1)
		.map(|ids| ids.into_iter().cloned().collect())
		.collect();

	let mut report = MergeReport::default();
	for ids in groups {
		let mut labels: Vec<String> = Vec::new();
		for id in &ids {
			if let Some(edge) = graph.edge(id) {
				let label = &edge.label;
				if !label.trim().is_empty() && !labels.contains(label) {
					labels.push(label.clone());
				}
			}
		}
		let Some((survivor, rest)) = ids.split_first() else {
			continue;
		};
		graph.set_label(survivor, labels.join(LABEL_SEPARATOR))?;
		report.removed += graph.remove_edges(rest);
		report.groups += 1;
	}

	debug!(
		"merged {} parallel groups, removed {} edges",
		report.groups, report.removed
	);
	Ok(report)
}

/// Connect every component to the first one with a single unlabeled edge.
///
/// The new edges carry no meaning beyond making the map connected. Returns the
/// ids of the added edges, one per component after the first.
pub fn bridge_components(graph: &mut ConceptGraph) -> GraphResult<Vec<EdgeId>> {
	let components = graph.components();
	let Some((anchor, others)) = components.split_first() else {
		return Ok(Vec::new());
	};
	let Some(anchor_node) = anchor.first() else {
		return Ok(Vec::new());
	};

	let mut added = Vec::with_capacity(others.len());
	for component in others {
		if let Some(first) = component.first() {
			added.push(graph.add_edge(anchor_node, first, "", Attributes::new())?);
		}
	}

	debug!("bridged {} components from {anchor_node}", added.len());
	Ok(added)
}

/// Remove every edge whose source equals its target. Returns how many were removed.
pub fn drop_self_loops(graph: &mut ConceptGraph) -> usize {
	let loops: Vec<EdgeId> = graph
		.edges()
		.filter(|e| e.is_self_loop())
		.map(|e| e.id.clone())
		.collect();
	let removed = graph.remove_edges(&loops);
	debug!("dropped {removed} self-loops");
	removed
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::model::{Edge, Node};
	use crate::validate::{ProblemKind, detect};

	fn graph(nodes: &[&str], edges: &[(&str, &str, &str)]) -> ConceptGraph {
		let mut g = ConceptGraph::new();
		for id in nodes {
			g.add_node(Node::new(*id, *id)).unwrap();
		}
		for (i, (s, t, label)) in edges.iter().enumerate() {
			g.insert_edge(Edge::new(format!("e{i}"), *s, *t, *label))
				.unwrap();
		}
		g
	}

	fn count(g: &ConceptGraph, kind: ProblemKind) -> usize {
		detect(g).iter().filter(|p| p.kind == kind).count()
	}

	#[test]
	fn merge_folds_labels_into_first_edge() {
		let mut g = graph(
			&["A", "B", "C"],
			&[
				("A", "B", "leads to"),
				("A", "B", "also relates to"),
				("B", "C", "causes"),
			],
		);
		let report = merge_parallel(&mut g).unwrap();
		assert_eq!(report, MergeReport { groups: 1, removed: 1 });

		let ab: Vec<_> = g
			.edges()
			.filter(|e| e.source == "A" && e.target == "B")
			.collect();
		assert_eq!(ab.len(), 1);
		assert_eq!(ab[0].id, "e0");
		assert_eq!(ab[0].label, "leads to | also relates to");
		assert_eq!(count(&g, ProblemKind::Parallel), 0);
	}

	#[test]
	fn merge_dedupes_skips_empty_and_keeps_survivor_style() {
		let mut g = graph(
			&["A", "B"],
			&[("A", "B", ""), ("A", "B", "x"), ("A", "B", "x"), ("A", "B", "y")],
		);
		g.set_attr("e0", "line-color", json!("#123456")).unwrap();
		g.set_attr("e1", "line-color", json!("#ffffff")).unwrap();
		merge_parallel(&mut g).unwrap();

		assert_eq!(g.edge_count(), 1);
		let survivor = g.edge("e0").unwrap();
		assert_eq!(survivor.label, "x | y");
		assert_eq!(survivor.attr_str("line-color"), Some("#123456"));
	}

	#[test]
	fn merge_keeps_label_text_verbatim() {
		let mut g = graph(&["A", "B"], &[("A", "B", "x "), ("A", "B", "x"), ("A", "B", "  ")]);
		merge_parallel(&mut g).unwrap();
		assert_eq!(g.edge_count(), 1);
		assert_eq!(g.edge("e0").unwrap().label, "x  | x");
	}

	#[test]
	fn merge_is_idempotent() {
		let mut g = graph(&["A", "B"], &[("A", "B", "a"), ("A", "B", "b"), ("B", "A", "c")]);
		merge_parallel(&mut g).unwrap();
		let edges: Vec<_> = g.edges().cloned().collect();
		assert_eq!(merge_parallel(&mut g).unwrap(), MergeReport::default());
		assert_eq!(g.edges().cloned().collect::<Vec<_>>(), edges);
	}

	#[test]
	fn bridge_adds_one_edge_per_extra_component() {
		let mut g = graph(&["A", "B", "C", "D", "E"], &[("A", "B", ""), ("C", "D", "")]);
		let added = bridge_components(&mut g).unwrap();
		assert_eq!(added.len(), 2);
		for id in &added {
			let edge = g.edge(id).unwrap();
			assert_eq!(edge.source, "A");
			assert!(edge.label.is_empty());
			assert!(edge.attrs.is_empty());
		}
		let targets: Vec<_> = added.iter().map(|id| g.edge(id).unwrap().target.as_str()).collect();
		assert_eq!(targets, ["C", "E"]);
		assert_eq!(count(&g, ProblemKind::Components), 0);
		assert!(bridge_components(&mut g).unwrap().is_empty());
	}

	#[test]
	fn bridge_is_noop_on_connected_or_empty_graph() {
		let mut g = graph(&["A", "B"], &[("A", "B", "")]);
		assert!(bridge_components(&mut g).unwrap().is_empty());
		assert_eq!(g.edge_count(), 1);
		assert!(bridge_components(&mut ConceptGraph::new()).unwrap().is_empty());
	}

	#[test]
	fn drop_self_loops_removes_only_loops() {
		let mut g = graph(&["A", "B"], &[("A", "A", ""), ("A", "B", ""), ("B", "B", "")]);
		assert_eq!(drop_self_loops(&mut g), 2);
		assert_eq!(g.edges().map(|e| e.id.as_str()).collect::<Vec<_>>(), ["e1"]);
		assert_eq!(drop_self_loops(&mut g), 0);
		assert_eq!(count(&g, ProblemKind::SelfLoop), 0);
	}
}
