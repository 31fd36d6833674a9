use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use crate::config::EditorConfig;
use crate::history::History;
use crate::layout::{self, LayoutKind};
use crate::model::{ConceptGraph, GraphResult, NodeId, Position, Subscription};
use crate::storage::{Document, DocumentError};
use crate::validate::{self, MergeReport, Problem, bundling};

/// Owns one concept map together with everything derived from it.
///
/// Every change goes through [`Editor::mutate`], which re-applies edge
/// bundling, re-runs detection and records an undo step before returning.
pub struct Editor {
	graph: ConceptGraph,
	history: History,
	problems: Vec<Problem>,
	config: EditorConfig,
	dirty: Arc<AtomicBool>,
	_watch: Subscription,
}

impl Editor {
	pub fn new(config: EditorConfig) -> Self {
		Self::with_graph(ConceptGraph::new(), config)
	}

	pub fn with_graph(graph: ConceptGraph, config: EditorConfig) -> Self {
		let dirty = Arc::new(AtomicBool::new(true));
		let flag = dirty.clone();
		let watch = graph.subscribe(move |_| flag.store(true, Ordering::Relaxed));
		let mut editor = Self {
			graph,
			history: History::new(config.history_limit),
			problems: Vec::new(),
			config,
			dirty,
			_watch: watch,
		};
		editor.refresh();
		editor
	}

	pub fn graph(&self) -> &ConceptGraph {
		&self.graph
	}

	pub fn problems(&self) -> &[Problem] {
		&self.problems
	}

	pub fn config(&self) -> &EditorConfig {
		&self.config
	}

	pub fn can_undo(&self) -> bool {
		self.history.can_undo()
	}

	pub fn can_redo(&self) -> bool {
		self.history.can_redo()
	}

	/// Apply `f` to the graph, then bring bundling, problems and history up to date.
	pub fn mutate<R>(&mut self, f: impl FnOnce(&mut ConceptGraph) -> R) -> R {
		let out = f(&mut self.graph);
		self.refresh();
		out
	}

	fn refresh(&mut self) {
		bundling::apply_offsets(&mut self.graph, self.config.bundle_step);
		self.problems = validate::detect(&self.graph);
		if self.dirty.swap(false, Ordering::Relaxed) {
			self.history.capture(Document::from_graph(&self.graph));
		}
		debug!(
			"refresh: {} nodes, {} edges, {} problems",
			self.graph.node_count(),
			self.graph.edge_count(),
			self.problems.len()
		);
	}

	pub fn merge_parallel(&mut self) -> GraphResult<MergeReport> {
		self.mutate(validate::merge_parallel)
	}

	pub fn bridge_components(&mut self) -> GraphResult<Vec<String>> {
		self.mutate(validate::bridge_components)
	}

	pub fn drop_self_loops(&mut self) -> usize {
		self.mutate(validate::drop_self_loops)
	}

	/// Place nodes for a one-shot layout; returns how many nodes moved.
	pub fn apply_layout(&mut self, kind: LayoutKind, center: Position) -> usize {
		let spacing = self.config.layout_spacing;
		match layout::arrange(&self.graph, kind, center, spacing) {
			Some(positions) => self.mutate(|g| g.set_positions(positions)),
			None => 0,
		}
	}

	pub fn move_nodes(&mut self, positions: Vec<(NodeId, Position)>) -> usize {
		self.mutate(|g| g.set_positions(positions))
	}

	/// Replace the map with the contents of a document. Undoable.
	pub fn load_document(&mut self, text: &str) -> Result<(), DocumentError> {
		let graph = crate::storage::import(text)?;
		self.load_graph(graph);
		Ok(())
	}

	pub fn load_graph(&mut self, graph: ConceptGraph) {
		self.mutate(|g| g.replace_with(graph));
	}

	pub fn export(&self) -> Result<String, DocumentError> {
		crate::storage::export(&self.graph)
	}

	/// Step back one snapshot. A snapshot that no longer decodes is reported
	/// and leaves both the map and the history where they were.
	pub fn undo(&mut self) -> Result<bool, DocumentError> {
		let Some(prev) = self.history.peek_undo() else {
			return Ok(false);
		};
		let graph = prev.to_graph()?;
		self.history.undo(Document::from_graph(&self.graph));
		self.restore(graph);
		Ok(true)
	}

	pub fn redo(&mut self) -> Result<bool, DocumentError> {
		let Some(next) = self.history.peek_redo() else {
			return Ok(false);
		};
		let graph = next.to_graph()?;
		self.history.redo(Document::from_graph(&self.graph));
		self.restore(graph);
		Ok(true)
	}

	fn restore(&mut self, graph: ConceptGraph) {
		self.graph.replace_with(graph);
		bundling::apply_offsets(&mut self.graph, self.config.bundle_step);
		// the snapshot is already in the history
		self.dirty.store(false, Ordering::Relaxed);
		self.problems = validate::detect(&self.graph);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{Attributes, Edge, Node};
	use crate::validate::ProblemKind;

	fn editor() -> Editor {
		let mut g = ConceptGraph::new();
		for id in ["A", "B", "C"] {
			g.add_node(Node::new(id, id)).unwrap();
		}
		g.insert_edge(Edge::new("e1", "A", "B", "leads to")).unwrap();
		g.insert_edge(Edge::new("e2", "A", "B", "also relates to")).unwrap();
		Editor::with_graph(g, EditorConfig::default())
	}

	fn kinds(e: &Editor) -> Vec<ProblemKind> {
		e.problems().iter().map(|p| p.kind).collect()
	}

	#[test]
	fn problems_and_offsets_follow_every_mutation() {
		let mut e = editor();
		assert_eq!(kinds(&e), [ProblemKind::Parallel, ProblemKind::Components]);
		assert_eq!(
			e.graph().edge("e2").unwrap().attr_f64("curve-offset"),
			Some(e.config().bundle_step / 2.0)
		);

		e.mutate(|g| g.add_edge("B", "C", "causes", Attributes::new()))
			.unwrap();
		assert_eq!(kinds(&e), [ProblemKind::Parallel]);

		e.merge_parallel().unwrap();
		assert!(e.problems().is_empty());
		assert_eq!(e.graph().edge("e1").unwrap().attr_f64("curve-offset"), None);
	}

	#[test]
	fn repairs_are_undoable() {
		let mut e = editor();
		assert!(!e.can_undo());
		e.merge_parallel().unwrap();
		assert!(e.can_undo());
		assert_eq!(e.graph().edge_count(), 1);

		assert!(e.undo().unwrap());
		assert_eq!(e.graph().edge_count(), 2);
		assert_eq!(kinds(&e), [ProblemKind::Parallel, ProblemKind::Components]);
		assert!(!e.can_undo());
		assert!(e.can_redo());

		assert!(e.redo().unwrap());
		assert_eq!(e.graph().edge_count(), 1);
		assert!(!e.redo().unwrap());
	}

	#[test]
	fn undecodable_snapshot_leaves_history_in_step() {
		let mut e = editor();
		let mut broken = Document::from_graph(e.graph());
		broken.elements.retain(|el| el.data.contains_key("source"));
		e.history.capture(broken);
		e.merge_parallel().unwrap();

		let (undo_len, redo_len) = (e.history.undo_len(), e.history.redo_len());
		assert!(e.undo().is_err());
		assert_eq!((e.history.undo_len(), e.history.redo_len()), (undo_len, redo_len));
		assert_eq!(e.graph().edge_count(), 1);
	}

	#[test]
	fn noop_repair_adds_no_history() {
		let mut e = editor();
		e.drop_self_loops();
		assert!(!e.can_undo());
	}

	#[test]
	fn invalid_document_leaves_map_untouched() {
		let mut e = editor();
		assert!(e.load_document(r#"{"elements":[{"data":{"id":"x","source":"q","target":"q"}}]}"#).is_err());
		assert_eq!(e.graph().edge_count(), 2);
		assert!(!e.can_undo());
	}

	#[test]
	fn export_then_load_round_trips() {
		let mut e = editor();
		let text = e.export().unwrap();
		e.mutate(|g| g.clear());
		assert!(e.graph().is_empty());
		e.load_document(&text).unwrap();
		assert_eq!(e.export().unwrap(), text);
	}

	#[test]
	fn grid_layout_moves_nodes_once() {
		let mut e = editor();
		assert_eq!(e.apply_layout(LayoutKind::Grid, Position::default()), 3);
		assert_eq!(e.apply_layout(LayoutKind::Grid, Position::default()), 0);
		assert_eq!(e.apply_layout(LayoutKind::Force, Position::default()), 0);
	}
}
