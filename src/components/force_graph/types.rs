use force_graph::DefaultNodeIdx;

use crate::model::{Edge, Node, attr};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeShape {
	#[default]
	Ellipse,
	Rectangle,
	RoundRectangle,
	Diamond,
}

impl NodeShape {
	pub const ALL: [NodeShape; 4] = [
		Self::Ellipse,
		Self::Rectangle,
		Self::RoundRectangle,
		Self::Diamond,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Ellipse => "ellipse",
			Self::Rectangle => "rectangle",
			Self::RoundRectangle => "round-rectangle",
			Self::Diamond => "diamond",
		}
	}

	pub fn parse(s: &str) -> Self {
		Self::ALL
			.into_iter()
			.find(|shape| shape.as_str() == s)
			.unwrap_or_default()
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineStyle {
	#[default]
	Solid,
	Dashed,
	Dotted,
}

impl LineStyle {
	pub const ALL: [LineStyle; 3] = [Self::Solid, Self::Dashed, Self::Dotted];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Solid => "solid",
			Self::Dashed => "dashed",
			Self::Dotted => "dotted",
		}
	}

	pub fn parse(s: &str) -> Self {
		Self::ALL
			.into_iter()
			.find(|style| style.as_str() == s)
			.unwrap_or_default()
	}

	/// Dash pattern in screen pixels, empty for solid lines.
	pub fn pattern(self) -> &'static [f64] {
		match self {
			Self::Solid => &[],
			Self::Dashed => &[8.0, 4.0],
			Self::Dotted => &[2.0, 3.0],
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	pub color: String,
	pub shape: NodeShape,
	pub font_size: Option<f64>,
	pub max_width: Option<f64>,
}

impl NodeInfo {
	pub fn from_model(node: &Node, fallback_color: &str) -> Self {
		Self {
			id: node.id.clone(),
			label: node.label.clone(),
			color: node
				.attr_str(attr::FILL)
				.unwrap_or(fallback_color)
				.to_string(),
			shape: node.attr_str(attr::SHAPE).map(NodeShape::parse).unwrap_or_default(),
			font_size: node.attr_f64(attr::FONT_SIZE),
			max_width: node.attr_f64(attr::TEXT_MAX_WIDTH),
		}
	}
}

#[derive(Clone, Debug)]
pub struct EdgeInfo {
	pub id: String,
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub label: String,
	pub color: Option<String>,
	pub style: LineStyle,
	pub font_size: Option<f64>,
	pub max_width: Option<f64>,
	pub offset: f64,
}

impl EdgeInfo {
	pub fn from_model(edge: &Edge, source: DefaultNodeIdx, target: DefaultNodeIdx) -> Self {
		Self {
			id: edge.id.clone(),
			source,
			target,
			label: edge.label.clone(),
			color: edge.attr_str(attr::LINE_COLOR).map(str::to_string),
			style: edge
				.attr_str(attr::LINE_STYLE)
				.map(LineStyle::parse)
				.unwrap_or_default(),
			font_size: edge.attr_f64(attr::FONT_SIZE),
			max_width: edge.attr_f64(attr::TEXT_MAX_WIDTH),
			offset: edge.attr_f64(attr::CURVE_OFFSET).unwrap_or(0.0),
		}
	}

	pub fn is_self_loop(&self) -> bool {
		self.source == self.target
	}
}
