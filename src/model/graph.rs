use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use super::events::{ChangeEvent, Listeners, Subscription};
use super::types::{Attributes, Edge, EdgeId, ElementKind, Node, NodeId, Position, RESERVED_KEYS};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
	#[error("Node {0} not found")]
	NodeNotFound(NodeId),

	#[error("Edge {0} not found")]
	EdgeNotFound(EdgeId),

	#[error("Element {0} not found")]
	ElementNotFound(String),

	#[error("Element {0} already exists")]
	DuplicateId(String),

	#[error("Invalid edge: source node {0} does not exist")]
	InvalidEdgeSource(NodeId),

	#[error("Invalid edge: target node {0} does not exist")]
	InvalidEdgeTarget(NodeId),

	#[error("`{0}` is not a style attribute")]
	ReservedKey(String),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Mutable directed multigraph backing one editor session.
///
/// Nodes and edges iterate in insertion order; every algorithm in the crate
/// relies on that order being stable. Removal preserves the relative order of
/// the remaining elements.
#[derive(Debug, Default)]
pub struct ConceptGraph {
	nodes: IndexMap<NodeId, Node>,
	edges: IndexMap<EdgeId, Edge>,
	next_id: u64,
	listeners: Listeners,
}

impl ConceptGraph {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}

	pub fn nodes(&self) -> impl Iterator<Item = &Node> {
		self.nodes.values()
	}

	pub fn edges(&self) -> impl Iterator<Item = &Edge> {
		self.edges.values()
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.get(id)
	}

	pub fn edge(&self, id: &str) -> Option<&Edge> {
		self.edges.get(id)
	}

	pub fn kind_of(&self, id: &str) -> Option<ElementKind> {
		if self.nodes.contains_key(id) {
			Some(ElementKind::Node)
		} else if self.edges.contains_key(id) {
			Some(ElementKind::Edge)
		} else {
			None
		}
	}

	pub fn contains(&self, id: &str) -> bool {
		self.kind_of(id).is_some()
	}

	/// Number of edges touching `id`, counting a self-loop twice.
	pub fn degree(&self, id: &str) -> usize {
		self.edges
			.values()
			.map(|e| usize::from(e.source == id) + usize::from(e.target == id))
			.sum()
	}

	/// Register a change listener. The listener is removed when the handle drops.
	pub fn subscribe(&self, callback: impl Fn(&ChangeEvent) + Send + Sync + 'static) -> Subscription {
		self.listeners.subscribe(callback)
	}

	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}

	/// An id with `prefix` that no element uses yet.
	pub fn fresh_id(&mut self, prefix: &str) -> String {
		loop {
			self.next_id += 1;
			let id = format!("{prefix}{}", self.next_id);
			if !self.contains(&id) {
				return id;
			}
		}
	}

	pub fn add_node(&mut self, node: Node) -> GraphResult<NodeId> {
		if self.contains(&node.id) {
			return Err(GraphError::DuplicateId(node.id));
		}
		let id = node.id.clone();
		self.nodes.insert(id.clone(), node);
		self.listeners.emit(ChangeEvent::NodeAdded(id.clone()));
		Ok(id)
	}

	/// Add an edge with a generated id and the given attributes.
	pub fn add_edge(
		&mut self,
		source: &str,
		target: &str,
		label: impl Into<String>,
		attrs: Attributes,
	) -> GraphResult<EdgeId> {
		self.check_endpoints(source, target)?;
		let id = self.fresh_id("e");
		let mut edge = Edge::new(id, source, target, label);
		edge.attrs = attrs;
		self.insert_edge(edge)
	}

	/// Add an edge that already carries its id.
	pub fn insert_edge(&mut self, edge: Edge) -> GraphResult<EdgeId> {
		if self.contains(&edge.id) {
			return Err(GraphError::DuplicateId(edge.id));
		}
		self.check_endpoints(&edge.source, &edge.target)?;
		let id = edge.id.clone();
		self.edges.insert(id.clone(), edge);
		self.listeners.emit(ChangeEvent::EdgeAdded(id.clone()));
		Ok(id)
	}

	fn check_endpoints(&self, source: &str, target: &str) -> GraphResult<()> {
		if !self.nodes.contains_key(source) {
			return Err(GraphError::InvalidEdgeSource(source.to_string()));
		}
		if !self.nodes.contains_key(target) {
			return Err(GraphError::InvalidEdgeTarget(target.to_string()));
		}
		Ok(())
	}

	pub fn remove_edge(&mut self, id: &str) -> GraphResult<Edge> {
		let edge = self
			.edges
			.shift_remove(id)
			.ok_or_else(|| GraphError::EdgeNotFound(id.to_string()))?;
		self.listeners.emit(ChangeEvent::EdgeRemoved(edge.id.clone()));
		Ok(edge)
	}

	/// Remove every listed edge that exists; returns how many were removed.
	pub fn remove_edges<I, S>(&mut self, ids: I) -> usize
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		ids.into_iter()
			.filter(|id| self.remove_edge(id.as_ref()).is_ok())
			.count()
	}

	/// Remove a node together with its incident edges.
	pub fn remove_node(&mut self, id: &str) -> GraphResult<Node> {
		if !self.nodes.contains_key(id) {
			return Err(GraphError::NodeNotFound(id.to_string()));
		}
		let incident: Vec<EdgeId> = self
			.edges
			.values()
			.filter(|e| e.source == id || e.target == id)
			.map(|e| e.id.clone())
			.collect();
		self.remove_edges(&incident);
		let node = self
			.nodes
			.shift_remove(id)
			.ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
		self.listeners.emit(ChangeEvent::NodeRemoved(node.id.clone()));
		Ok(node)
	}

	/// Remove a node or an edge by id.
	pub fn remove(&mut self, id: &str) -> GraphResult<ElementKind> {
		match self.kind_of(id) {
			Some(ElementKind::Node) => self.remove_node(id).map(|_| ElementKind::Node),
			Some(ElementKind::Edge) => self.remove_edge(id).map(|_| ElementKind::Edge),
			None => Err(GraphError::ElementNotFound(id.to_string())),
		}
	}

	pub fn set_label(&mut self, id: &str, label: impl Into<String>) -> GraphResult<()> {
		let label = label.into();
		let slot = if let Some(node) = self.nodes.get_mut(id) {
			&mut node.label
		} else if let Some(edge) = self.edges.get_mut(id) {
			&mut edge.label
		} else {
			return Err(GraphError::ElementNotFound(id.to_string()));
		};
		if *slot != label {
			*slot = label;
			self.listeners.emit(ChangeEvent::AttributeChanged {
				id: id.to_string(),
				key: "label".into(),
			});
		}
		Ok(())
	}

	/// Set a style attribute on a node or edge; `Value::Null` removes it.
	///
	/// Returns whether the stored value changed. Unchanged writes emit nothing.
	pub fn set_attr(&mut self, id: &str, key: &str, value: Value) -> GraphResult<bool> {
		if RESERVED_KEYS.contains(&key) {
			return Err(GraphError::ReservedKey(key.to_string()));
		}
		let attrs = if let Some(node) = self.nodes.get_mut(id) {
			&mut node.attrs
		} else if let Some(edge) = self.edges.get_mut(id) {
			&mut edge.attrs
		} else {
			return Err(GraphError::ElementNotFound(id.to_string()));
		};
		let changed = if value.is_null() {
			attrs.shift_remove(key).is_some()
		} else if attrs.get(key) == Some(&value) {
			false
		} else {
			attrs.insert(key.to_string(), value);
			true
		};
		if changed {
			self.listeners.emit(ChangeEvent::AttributeChanged {
				id: id.to_string(),
				key: key.to_string(),
			});
		}
		Ok(changed)
	}

	pub fn set_position(&mut self, id: &str, position: Position) -> GraphResult<()> {
		let node = self
			.nodes
			.get_mut(id)
			.ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
		if node.position != position {
			node.position = position;
			self.listeners.emit(ChangeEvent::Moved(vec![id.to_string()]));
		}
		Ok(())
	}

	/// Move many nodes at once, emitting a single event. Unknown ids are skipped.
	pub fn set_positions<I>(&mut self, positions: I) -> usize
	where
		I: IntoIterator<Item = (NodeId, Position)>,
	{
		let mut moved = Vec::new();
		for (id, position) in positions {
			if let Some(node) = self.nodes.get_mut(&id) {
				if node.position != position {
					node.position = position;
					moved.push(id);
				}
			}
		}
		let count = moved.len();
		if count > 0 {
			self.listeners.emit(ChangeEvent::Moved(moved));
		}
		count
	}

	/// Replace every element with those of `other`, keeping the listeners of `self`.
	pub fn replace_with(&mut self, other: ConceptGraph) {
		self.nodes = other.nodes;
		self.edges = other.edges;
		self.next_id = self.next_id.max(other.next_id);
		self.listeners.emit(ChangeEvent::Reset);
	}

	pub fn clear(&mut self) {
		self.replace_with(ConceptGraph::new());
	}

	/// Connected components, treating every edge as undirected.
	///
	/// Components are ordered by their first node in node order, and nodes within a
	/// component keep node order, so the result is stable for an unchanged graph.
	pub fn components(&self) -> Vec<Vec<NodeId>> {
		let mut sets = DisjointSets::new(self.nodes.len());
		for edge in self.edges.values() {
			if let (Some(s), Some(t)) = (
				self.nodes.get_index_of(&edge.source),
				self.nodes.get_index_of(&edge.target),
			) {
				sets.union(s, t);
			}
		}

		let mut by_root: IndexMap<usize, Vec<NodeId>> = IndexMap::new();
		for (idx, id) in self.nodes.keys().enumerate() {
			by_root.entry(sets.find(idx)).or_default().push(id.clone());
		}
		by_root.into_values().collect()
	}
}

/// Union-find over dense node indices.
struct DisjointSets {
	parent: Vec<usize>,
	rank: Vec<usize>,
}

impl DisjointSets {
	fn new(size: usize) -> Self {
		Self {
			parent: (0..size).collect(),
			rank: vec![0; size],
		}
	}

	fn find(&mut self, i: usize) -> usize {
		let mut root = i;
		while self.parent[root] != root {
			root = self.parent[root];
		}
		let mut cur = i;
		while self.parent[cur] != root {
			let next = self.parent[cur];
			self.parent[cur] = root;
			cur = next;
		}
		root
	}

	fn union(&mut self, a: usize, b: usize) {
		let (ra, rb) = (self.find(a), self.find(b));
		if ra == rb {
			return;
		}
		match self.rank[ra].cmp(&self.rank[rb]) {
			std::cmp::Ordering::Less => self.parent[ra] = rb,
			std::cmp::Ordering::Greater => self.parent[rb] = ra,
			std::cmp::Ordering::Equal => {
				self.parent[rb] = ra;
				self.rank[ra] += 1;
			}
		}
	}
}
