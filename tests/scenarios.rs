//! End-to-end behaviour of the validation core through the public API:
//! detection, the three repairs, the editor's refresh cycle and persistence.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use concept_map::config::EditorConfig;
use concept_map::layout::LayoutKind;
use concept_map::model::{ConceptGraph, Edge, Node, Position};
use concept_map::session::Editor;
use concept_map::storage::{Library, MemoryStore, export, import};
use concept_map::validate::{
	ProblemKind, Severity, bridge_components, detect, drop_self_loops, merge_parallel,
};

fn graph(nodes: &[&str], edges: &[(&str, &str, &str, &str)]) -> ConceptGraph {
	let mut g = ConceptGraph::new();
	for id in nodes {
		g.add_node(Node::new(*id, *id)).unwrap();
	}
	for (id, source, target, label) in edges {
		g.insert_edge(Edge::new(*id, *source, *target, *label)).unwrap();
	}
	g
}

fn kinds(g: &ConceptGraph) -> Vec<ProblemKind> {
	detect(g).into_iter().map(|p| p.kind).collect()
}

#[test]
fn parallel_edges_merge_into_one_labeled_edge() {
	let mut g = graph(
		&["A", "B"],
		&[("e1", "A", "B", "leads to"), ("e2", "A", "B", "also relates to")],
	);
	let problems = detect(&g);
	assert_eq!(problems.len(), 1);
	assert_eq!(problems[0].id, "parallel:A->B");
	assert_eq!(problems[0].info, "Parallel edges A->B (2)");
	assert_eq!(problems[0].severity, Severity::Error);

	let report = merge_parallel(&mut g).unwrap();
	assert_eq!((report.groups, report.removed), (1, 1));
	assert_eq!(g.edge_count(), 1);
	assert_eq!(g.edge("e1").unwrap().label, "leads to | also relates to");
	assert!(detect(&g).is_empty());
}

#[test]
fn opposite_directions_are_not_parallel() {
	let g = graph(&["A", "B"], &[("e1", "A", "B", ""), ("e2", "B", "A", "")]);
	assert!(detect(&g).is_empty());
}

#[test]
fn two_islands_get_one_bridge() {
	let mut g = graph(
		&["A", "B", "C", "D"],
		&[("e1", "A", "B", ""), ("e2", "C", "D", "")],
	);
	let problems = detect(&g);
	assert_eq!(problems.len(), 1);
	assert_eq!(problems[0].id, "components:2");
	assert_eq!(problems[0].info, "Graph split into 2 components");

	let added = bridge_components(&mut g).unwrap();
	assert_eq!(added.len(), 1);
	let bridge = g.edge(&added[0]).unwrap();
	assert_eq!((bridge.source.as_str(), bridge.target.as_str()), ("A", "C"));
	assert!(bridge.label.is_empty());
	assert!(detect(&g).is_empty());
}

#[test]
fn bridge_adds_count_minus_one_edges() {
	let mut g = graph(&["A", "B", "C", "D", "E"], &[("e1", "A", "B", "")]);
	let before = g.components().len();
	assert_eq!(before, 4);
	assert_eq!(bridge_components(&mut g).unwrap().len(), before - 1);
	assert_eq!(g.components().len(), 1);
	assert!(bridge_components(&mut g).unwrap().is_empty());
}

#[test]
fn self_loop_is_reported_and_dropped() {
	let mut g = graph(&["A"], &[("loop", "A", "A", "refers to")]);
	let problems = detect(&g);
	assert_eq!(problems.len(), 1);
	assert_eq!(problems[0].id, "loop");
	assert_eq!(problems[0].kind, ProblemKind::SelfLoop);
	assert_eq!(problems[0].info, "Self-loop on A");

	assert_eq!(drop_self_loops(&mut g), 1);
	assert_eq!(drop_self_loops(&mut g), 0);
	assert!(detect(&g).is_empty());
	assert_eq!(g.node_count(), 1);
}

#[test]
fn detection_is_deterministic_and_ordered() {
	let g = graph(
		&["A", "B", "C"],
		&[
			("p1", "A", "B", ""),
			("p2", "A", "B", ""),
			("l", "B", "B", ""),
		],
	);
	assert_eq!(detect(&g), detect(&g));
	assert_eq!(
		kinds(&g),
		[ProblemKind::SelfLoop, ProblemKind::Parallel, ProblemKind::Components]
	);
}

#[test]
fn merge_is_idempotent_on_a_busy_graph() {
	let mut g = graph(
		&["A", "B", "C"],
		&[
			("e1", "A", "B", "x"),
			("e2", "B", "C", "y"),
			("e3", "A", "B", "x"),
			("e4", "B", "C", ""),
			("e5", "A", "B", "z"),
		],
	);
	merge_parallel(&mut g).unwrap();
	let after_first = export(&g).unwrap();
	assert_eq!(g.edge("e1").unwrap().label, "x | z");
	assert_eq!(g.edge("e2").unwrap().label, "y");

	let report = merge_parallel(&mut g).unwrap();
	assert_eq!(report.removed, 0);
	assert_eq!(export(&g).unwrap(), after_first);
	assert!(!kinds(&g).contains(&ProblemKind::Parallel));
}

#[test]
fn editor_refreshes_problems_and_offsets_after_each_change() {
	let mut editor = Editor::with_graph(graph(&["A", "B"], &[]), EditorConfig::default());
	assert!(editor.problems().iter().any(|p| p.kind == ProblemKind::Components));

	editor.mutate(|g| {
		g.insert_edge(Edge::new("e1", "A", "B", "one")).unwrap();
		g.insert_edge(Edge::new("e2", "A", "B", "two")).unwrap();
	});
	assert_eq!(
		editor.problems().iter().map(|p| p.kind).collect::<Vec<_>>(),
		[ProblemKind::Parallel]
	);
	let step = EditorConfig::default().bundle_step;
	assert_eq!(editor.graph().edge("e1").unwrap().attr_f64("curve-offset"), Some(-step / 2.0));
	assert_eq!(editor.graph().edge("e2").unwrap().attr_f64("curve-offset"), Some(step / 2.0));

	editor.merge_parallel().unwrap();
	assert!(editor.problems().is_empty());
	assert_eq!(editor.graph().edge("e1").unwrap().attr_f64("curve-offset"), None);
}

#[test]
fn repairs_are_undoable() {
	let mut editor = Editor::with_graph(
		graph(&["A", "B"], &[("e1", "A", "B", "a"), ("e2", "A", "B", "b")]),
		EditorConfig::default(),
	);
	assert!(!editor.can_undo());

	editor.merge_parallel().unwrap();
	assert_eq!(editor.graph().edge_count(), 1);
	assert!(editor.can_undo());

	assert!(editor.undo().unwrap());
	assert_eq!(editor.graph().edge_count(), 2);
	assert_eq!(editor.problems()[0].kind, ProblemKind::Parallel);

	assert!(editor.redo().unwrap());
	assert_eq!(editor.graph().edge_count(), 1);
	assert!(editor.problems().is_empty());
}

#[test]
fn grid_layout_places_every_node() {
	let mut editor = Editor::with_graph(graph(&["A", "B", "C", "D"], &[]), EditorConfig::default());
	let moved = editor.apply_layout(LayoutKind::Grid, Position::default());
	assert_eq!(moved, 4);
	let mut seen: Vec<(i64, i64)> = editor
		.graph()
		.nodes()
		.map(|n| (n.position.x.round() as i64, n.position.y.round() as i64))
		.collect();
	seen.sort();
	seen.dedup();
	assert_eq!(seen.len(), 4);
	assert_eq!(editor.apply_layout(LayoutKind::Force, Position::default()), 0);
}

#[test]
fn documents_survive_export_and_import() {
	let mut g = graph(&["A", "B"], &[("e1", "A", "B", "leads to")]);
	g.set_position("A", Position::new(10.0, -20.0)).unwrap();
	g.set_attr("A", "fill", serde_json::json!("#ff0000")).unwrap();

	let json = export(&g).unwrap();
	let back = import(&json).unwrap();
	assert_eq!(back.node("A"), g.node("A"));
	assert_eq!(back.edge("e1"), g.edge("e1"));
	assert_eq!(export(&back).unwrap(), json);
}

#[test]
fn malformed_documents_are_rejected_whole() {
	let mut editor = Editor::with_graph(graph(&["A"], &[]), EditorConfig::default());
	let dangling = r#"{ "elements": [
		{ "data": { "id": "B" } },
		{ "data": { "id": "e", "source": "B", "target": "Z" } }
	] }"#;
	assert!(editor.load_document(dangling).is_err());
	assert!(editor.load_document("not json").is_err());
	assert!(editor.load_document(r#"{ "nodes": [] }"#).is_err());
	assert!(editor.graph().contains("A"));
	assert_eq!(editor.graph().node_count(), 1);
}

#[test]
fn library_keeps_named_maps() {
	let mut library = Library::new(MemoryStore::new(), "conceptmap:map:");
	let g = graph(&["A", "B"], &[("e1", "A", "B", "")]);
	library.save("second", &g).unwrap();
	library.save("first", &ConceptGraph::new()).unwrap();
	assert_eq!(library.list().unwrap(), ["first", "second"]);

	let loaded = library.load("second").unwrap();
	assert_eq!(loaded.edge_count(), 1);
	library.delete("second").unwrap();
	assert_eq!(library.list().unwrap(), ["first"]);
	assert!(library.load("second").is_err());
}

#[test]
fn subscriptions_release_on_drop() {
	let mut g = ConceptGraph::new();
	let calls = Arc::new(AtomicUsize::new(0));
	let counter = calls.clone();
	let sub = g.subscribe(move |_| {
		counter.fetch_add(1, Ordering::Relaxed);
	});
	g.add_node(Node::new("A", "A")).unwrap();
	assert_eq!(calls.load(Ordering::Relaxed), 1);

	drop(sub);
	assert_eq!(g.listener_count(), 0);
	g.add_node(Node::new("B", "B")).unwrap();
	assert_eq!(calls.load(Ordering::Relaxed), 1);
}
