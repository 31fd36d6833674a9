use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type NodeId = String;
pub type EdgeId = String;

/// Free-form style attributes, kept in insertion order.
pub type Attributes = IndexMap<String, Value>;

/// Keys carried by an element's data bag that are not attributes.
pub const RESERVED_KEYS: &[&str] = &["id", "label", "source", "target"];

pub mod attr {
	//! Well-known attribute keys read by the canvas and the style panel.

	pub const FILL: &str = "fill";
	pub const SHAPE: &str = "shape";
	pub const FONT_SIZE: &str = "font-size";
	pub const TEXT_MAX_WIDTH: &str = "text-max-width";
	pub const LINE_COLOR: &str = "line-color";
	pub const LINE_STYLE: &str = "line-style";
	pub const CURVE_OFFSET: &str = "curve-offset";
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

impl Position {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: NodeId,
	pub label: String,
	pub attrs: Attributes,
	pub position: Position,
	/// Element-level fields from an imported document that the editor does not interpret.
	pub extra: Map<String, Value>,
}

impl Node {
	pub fn new(id: impl Into<NodeId>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			attrs: Attributes::new(),
			position: Position::default(),
			extra: Map::new(),
		}
	}

	pub fn at(mut self, x: f64, y: f64) -> Self {
		self.position = Position::new(x, y);
		self
	}

	pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attrs.insert(key.into(), value.into());
		self
	}

	pub fn attr_str(&self, key: &str) -> Option<&str> {
		self.attrs.get(key).and_then(Value::as_str)
	}

	pub fn attr_f64(&self, key: &str) -> Option<f64> {
		self.attrs.get(key).and_then(Value::as_f64)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	pub id: EdgeId,
	pub source: NodeId,
	pub target: NodeId,
	pub label: String,
	pub attrs: Attributes,
	pub extra: Map<String, Value>,
}

impl Edge {
	pub fn new(
		id: impl Into<EdgeId>,
		source: impl Into<NodeId>,
		target: impl Into<NodeId>,
		label: impl Into<String>,
	) -> Self {
		Self {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			label: label.into(),
			attrs: Attributes::new(),
			extra: Map::new(),
		}
	}

	pub fn is_self_loop(&self) -> bool {
		self.source == self.target
	}

	/// Direction-sensitive bucket key shared by the detector, the merge repair and bundling.
	pub fn pair_key(&self) -> (&str, &str) {
		(&self.source, &self.target)
	}

	pub fn attr_str(&self, key: &str) -> Option<&str> {
		self.attrs.get(key).and_then(Value::as_str)
	}

	pub fn attr_f64(&self, key: &str) -> Option<f64> {
		self.attrs.get(key).and_then(Value::as_f64)
	}
}

/// Either kind of element, as addressed by the attribute and label setters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
	Node,
	Edge,
}
