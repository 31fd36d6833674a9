//! Per-editor session state shared by the canvas and the side panels.
//!
//! A session is created by the editor page and handed to its children through
//! Leptos context, so two editors never share a graph.

pub mod demo;
mod editor;
mod hover;

use std::fmt::Display;
use std::sync::{Arc, Mutex};

use leptos::prelude::*;
use log::{info, warn};
use serde_json::Value;

pub use editor::Editor;
pub use hover::HoverInfo;

use crate::config::EditorConfig;
use crate::layout::{LayoutKind, Routing};
use crate::model::{
	Attributes, ChangeEvent, ConceptGraph, ElementKind, Node, NodeId, Position, Subscription, attr,
};
use crate::storage::{BrowserStore, Library, StorageResult};
use crate::validate::Problem;

/// Latest node positions published by the canvas while the simulation runs.
pub type LivePositions = Arc<Mutex<Vec<(NodeId, Position)>>>;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum ConnectState {
	#[default]
	Idle,
	PickSource,
	PickTarget(NodeId),
}

/// Inline label editing request, in canvas pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct EditTarget {
	pub id: String,
	pub kind: ElementKind,
	pub value: String,
	pub x: f64,
	pub y: f64,
}

#[derive(Clone, Copy)]
pub struct EditorSession {
	editor: StoredValue<Editor>,
	live: StoredValue<Option<LivePositions>>,
	pub problems: RwSignal<Vec<Problem>>,
	/// Bumped after every change so views can re-read the graph.
	pub revision: RwSignal<u64>,
	pub selection: RwSignal<Option<String>>,
	pub connect: RwSignal<ConnectState>,
	pub editing: RwSignal<Option<EditTarget>>,
	pub hover: RwSignal<Option<HoverInfo>>,
	pub layout: RwSignal<LayoutKind>,
	pub routing: RwSignal<Routing>,
	pub notice: RwSignal<Option<String>>,
}

impl EditorSession {
	pub fn new(config: EditorConfig) -> Self {
		let graph = if config.demo {
			demo::seed().unwrap_or_else(|err| {
				warn!("demo map rejected: {err}");
				ConceptGraph::new()
			})
		} else {
			ConceptGraph::new()
		};
		let editor = Editor::with_graph(graph, config);
		let problems = editor.problems().to_vec();
		Self {
			editor: StoredValue::new(editor),
			live: StoredValue::new(None),
			problems: RwSignal::new(problems),
			revision: RwSignal::new(0),
			selection: RwSignal::new(None),
			connect: RwSignal::new(ConnectState::Idle),
			editing: RwSignal::new(None),
			hover: RwSignal::new(None),
			layout: RwSignal::new(LayoutKind::default()),
			routing: RwSignal::new(Routing::default()),
			notice: RwSignal::new(None),
		}
	}

	/// Create a session and make it available to descendant components.
	pub fn provide(config: EditorConfig) -> Self {
		let session = Self::new(config);
		provide_context(session);
		session
	}

	pub fn expect() -> Self {
		expect_context::<Self>()
	}

	pub fn with_graph<R>(&self, f: impl FnOnce(&ConceptGraph) -> R) -> Option<R> {
		self.editor.try_with_value(|e| f(e.graph()))
	}

	pub fn config(&self) -> EditorConfig {
		self.editor
			.try_with_value(|e| e.config().clone())
			.unwrap_or_default()
	}

	/// Listen for graph changes; the listener lives as long as the handle.
	pub fn subscribe(
		&self,
		callback: impl Fn(&ChangeEvent) + Send + Sync + 'static,
	) -> Option<Subscription> {
		self.editor.try_with_value(|e| e.graph().subscribe(callback))
	}

	pub fn attach_live_positions(&self, live: Option<LivePositions>) {
		self.live.set_value(live);
	}

	fn run<R>(&self, f: impl FnOnce(&mut Editor) -> R) -> Option<R> {
		let out = self.editor.try_update_value(f);
		self.sync();
		out
	}

	fn sync(&self) {
		if let Some(problems) = self.editor.try_with_value(|e| e.problems().to_vec()) {
			self.problems.set(problems);
		}
		if let Some(id) = self.selection.get_untracked() {
			if self.with_graph(|g| !g.contains(&id)).unwrap_or(true) {
				self.selection.set(None);
			}
		}
		self.revision.update(|r| *r += 1);
	}

	/// Mutate the graph and refresh everything derived from it.
	pub fn mutate<R>(&self, f: impl FnOnce(&mut ConceptGraph) -> R) -> Option<R> {
		self.run(|e| e.mutate(f))
	}

	/// Log and surface a failed action; pass through a successful one.
	pub fn report<T, E: Display>(&self, action: &str, result: Result<T, E>) -> Option<T> {
		match result {
			Ok(value) => {
				self.notice.set(None);
				Some(value)
			}
			Err(err) => {
				warn!("{action} failed: {err}");
				self.notice.set(Some(format!("{action} failed: {err}")));
				None
			}
		}
	}

	pub fn notify(&self, message: impl Into<String>) {
		let message = message.into();
		info!("{message}");
		self.notice.set(Some(message));
	}

	pub fn can_undo(&self) -> bool {
		self.revision.track();
		self.editor.try_with_value(Editor::can_undo).unwrap_or(false)
	}

	pub fn can_redo(&self) -> bool {
		self.revision.track();
		self.editor.try_with_value(Editor::can_redo).unwrap_or(false)
	}

	/// Copy the simulation's current positions into the model.
	pub fn flush_positions(&self) {
		let positions = self
			.live
			.try_with_value(|live| {
				live.as_ref()
					.and_then(|l| l.lock().ok().map(|p| p.to_vec()))
			})
			.flatten();
		if let Some(positions) = positions {
			self.run(|e| e.move_nodes(positions));
		}
	}

	pub fn add_node(&self, position: Position) -> Option<NodeId> {
		let id = self.mutate(|g| {
			let id = g.fresh_id("n");
			let label = format!("Concept {}", g.node_count() + 1);
			g.add_node(Node::new(id, label).at(position.x, position.y))
		})?;
		let id = self.report("Add node", id)?;
		self.selection.set(Some(id.clone()));
		Some(id)
	}

	pub fn add_edge(&self, source: &str, target: &str) -> Option<String> {
		let result = self.mutate(|g| g.add_edge(source, target, "", Attributes::new()))?;
		self.report("Connect", result)
	}

	pub fn toggle_connect(&self) {
		self.connect.update(|c| {
			*c = match c {
				ConnectState::Idle => ConnectState::PickSource,
				_ => ConnectState::Idle,
			}
		});
	}

	/// A node was clicked on the canvas: select it or continue a connection.
	pub fn node_clicked(&self, id: NodeId) {
		match self.connect.get_untracked() {
			ConnectState::Idle => self.selection.set(Some(id)),
			ConnectState::PickSource => self.connect.set(ConnectState::PickTarget(id)),
			ConnectState::PickTarget(source) => {
				self.connect.set(ConnectState::Idle);
				if let Some(edge) = self.add_edge(&source, &id) {
					self.selection.set(Some(edge));
				}
			}
		}
	}

	pub fn select(&self, id: Option<String>) {
		self.selection.set(id);
	}

	pub fn delete_selected(&self) {
		let Some(id) = self.selection.get_untracked() else {
			return;
		};
		if let Some(result) = self.mutate(|g| g.remove(&id)) {
			self.report("Delete", result);
		}
		self.selection.set(None);
	}

	pub fn set_label(&self, id: &str, label: &str) {
		if let Some(result) = self.mutate(|g| g.set_label(id, label)) {
			self.report("Rename", result);
		}
	}

	pub fn set_style(&self, id: &str, key: &str, value: Value) {
		if let Some(result) = self.mutate(|g| g.set_attr(id, key, value)) {
			self.report("Style", result);
		}
	}

	pub fn begin_edit(&self, id: &str, x: f64, y: f64) {
		let target = self.with_graph(|g| match g.kind_of(id)? {
			ElementKind::Node => g.node(id).map(|n| (ElementKind::Node, n.label.clone())),
			ElementKind::Edge => g.edge(id).map(|e| (ElementKind::Edge, e.label.clone())),
		});
		if let Some(Some((kind, value))) = target {
			self.editing.set(Some(EditTarget {
				id: id.to_string(),
				kind,
				value,
				x,
				y,
			}));
		}
	}

	/// Keep the open edit box over its element as the view pans and zooms.
	pub fn follow_edit(&self, x: f64, y: f64) {
		let moved = self.editing.with_untracked(|e| {
			e.as_ref()
				.is_some_and(|t| (t.x - x).abs() >= 0.5 || (t.y - y).abs() >= 0.5)
		});
		if moved {
			self.editing.update(|e| {
				if let Some(t) = e {
					t.x = x;
					t.y = y;
				}
			});
		}
	}

	/// Point the hover bubble at an element, or hide it.
	pub fn hover_at(&self, target: Option<(String, f64, f64)>) {
		let info = target.and_then(|(id, x, y)| {
			self.with_graph(|g| HoverInfo::describe(g, &id, x.round(), y.round()))
				.flatten()
		});
		if self.hover.with_untracked(|h| *h != info) {
			self.hover.set(info);
		}
	}

	pub fn commit_edit(&self, value: &str) {
		if let Some(target) = self.editing.get_untracked() {
			self.editing.set(None);
			self.set_label(&target.id, value.trim());
		}
	}

	pub fn cancel_edit(&self) {
		self.editing.set(None);
	}

	pub fn merge_parallel(&self) {
		let Some(result) = self.run(Editor::merge_parallel) else {
			return;
		};
		if let Some(report) = self.report("Merge parallel edges", result) {
			self.notify(format!(
				"Merged {} groups, removed {} edges",
				report.groups, report.removed
			));
		}
	}

	pub fn bridge_components(&self) {
		let Some(result) = self.run(Editor::bridge_components) else {
			return;
		};
		if let Some(added) = self.report("Bridge components", result) {
			self.notify(format!("Added {} bridging edges", added.len()));
		}
	}

	pub fn drop_self_loops(&self) {
		if let Some(removed) = self.run(Editor::drop_self_loops) {
			self.notify(format!("Removed {removed} self-loops"));
		}
	}

	pub fn undo(&self) {
		if let Some(result) = self.run(Editor::undo) {
			self.report("Undo", result);
		}
	}

	pub fn redo(&self) {
		if let Some(result) = self.run(Editor::redo) {
			self.report("Redo", result);
		}
	}

	pub fn set_layout(&self, kind: LayoutKind) {
		if kind == LayoutKind::Preset {
			self.flush_positions();
		}
		self.layout.set(kind);
		let moved = self
			.run(|e| e.apply_layout(kind, Position::default()))
			.unwrap_or(0);
		info!("layout {} moved {moved} nodes", kind.as_str());
	}

	pub fn set_routing(&self, routing: Routing) {
		self.routing.set(routing);
	}

	pub fn export_json(&self) -> Option<String> {
		self.flush_positions();
		let result = self.editor.try_with_value(Editor::export)?;
		self.report("Export", result)
	}

	pub fn import_json(&self, text: &str) {
		if let Some(result) = self.run(|e| e.load_document(text)) {
			if self.report("Import", result).is_some() {
				self.selection.set(None);
			}
		}
	}

	fn library(&self) -> StorageResult<Library<BrowserStore>> {
		Ok(Library::new(BrowserStore::open()?, self.config().storage_prefix))
	}

	pub fn saved_maps(&self) -> Vec<String> {
		self.report("List maps", self.library().and_then(|lib| lib.list()))
			.unwrap_or_default()
	}

	pub fn save_map(&self, name: &str) -> bool {
		self.flush_positions();
		let result = self.library().and_then(|mut lib| {
			self.editor
				.try_with_value(|e| lib.save(name, e.graph()))
				.unwrap_or(Ok(()))
		});
		let saved = self.report("Save", result).is_some();
		if saved {
			self.notify(format!("Saved `{}`", name.trim()));
		}
		saved
	}

	pub fn load_map(&self, name: &str) {
		let Some(graph) = self.report("Load", self.library().and_then(|lib| lib.load(name))) else {
			return;
		};
		self.run(|e| e.load_graph(graph));
		self.selection.set(None);
		self.notify(format!("Loaded `{}`", name.trim()));
	}

	pub fn delete_map(&self, name: &str) {
		if self
			.report("Delete map", self.library().and_then(|mut lib| lib.delete(name)))
			.is_some()
		{
			self.notify(format!("Deleted `{}`", name.trim()));
		}
	}

	/// Style attribute of the current selection, as a string for form inputs.
	pub fn selected_attr(&self, key: &str) -> Option<String> {
		self.revision.track();
		let id = self.selection.get()?;
		self.with_graph(|g| {
			let attrs = g
				.node(&id)
				.map(|n| &n.attrs)
				.or_else(|| g.edge(&id).map(|e| &e.attrs))?;
			attrs.get(key).map(|v| match v {
				Value::String(s) => s.clone(),
				other => other.to_string(),
			})
		})
		.flatten()
	}

	pub fn selected_kind(&self) -> Option<ElementKind> {
		self.revision.track();
		let id = self.selection.get()?;
		self.with_graph(|g| g.kind_of(&id)).flatten()
	}

	pub fn selected_label(&self) -> Option<String> {
		self.revision.track();
		let id = self.selection.get()?;
		self.with_graph(|g| {
			g.node(&id)
				.map(|n| n.label.clone())
				.or_else(|| g.edge(&id).map(|e| e.label.clone()))
		})
		.flatten()
	}
}

/// Keys the style panel offers per element kind.
pub fn style_keys(kind: ElementKind) -> &'static [&'static str] {
	match kind {
		ElementKind::Node => &[attr::FILL, attr::SHAPE, attr::FONT_SIZE, attr::TEXT_MAX_WIDTH],
		ElementKind::Edge => &[attr::LINE_COLOR, attr::LINE_STYLE, attr::FONT_SIZE, attr::TEXT_MAX_WIDTH],
	}
}
