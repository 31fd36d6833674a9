//! The `{ "elements": [...] }` import/export format.
//!
//! Each element carries a `data` bag (`id`, `label`, and for edges `source` and
//! `target`, plus any style attributes), an optional `position` for nodes and an
//! optional `group`. Fields the editor does not interpret are kept verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{Attributes, ConceptGraph, Edge, GraphError, Node, Position, RESERVED_KEYS};

#[derive(Error, Debug)]
pub enum DocumentError {
	#[error("invalid JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("document has no `elements` array")]
	MissingElements,

	#[error("element {index}: {reason}")]
	InvalidElement { index: usize, reason: String },

	#[error("element {index}: {source}")]
	Graph {
		index: usize,
		#[source]
		source: GraphError,
	},
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
	Nodes,
	Edges,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub group: Option<Group>,
	pub data: Map<String, Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub position: Option<Position>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl Element {
	fn group(&self) -> Group {
		self.group.unwrap_or_else(|| {
			if self.data.contains_key("source") || self.data.contains_key("target") {
				Group::Edges
			} else {
				Group::Nodes
			}
		})
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
	pub elements: Vec<Element>,
}

impl Document {
	/// Snapshot a graph: nodes first, then edges, each in graph order.
	pub fn from_graph(graph: &ConceptGraph) -> Self {
		let nodes = graph.nodes().map(|node| {
			let mut data = Map::new();
			data.insert("id".into(), node.id.clone().into());
			data.insert("label".into(), node.label.clone().into());
			extend_attrs(&mut data, &node.attrs);
			Element {
				group: Some(Group::Nodes),
				data,
				position: Some(node.position),
				extra: node.extra.clone(),
			}
		});
		let edges = graph.edges().map(|edge| {
			let mut data = Map::new();
			data.insert("id".into(), edge.id.clone().into());
			data.insert("source".into(), edge.source.clone().into());
			data.insert("target".into(), edge.target.clone().into());
			data.insert("label".into(), edge.label.clone().into());
			extend_attrs(&mut data, &edge.attrs);
			Element {
				group: Some(Group::Edges),
				data,
				position: None,
				extra: edge.extra.clone(),
			}
		});
		Self {
			elements: nodes.chain(edges).collect(),
		}
	}

	/// Build a fresh graph. Nothing is returned unless every element is valid.
	pub fn to_graph(&self) -> Result<ConceptGraph, DocumentError> {
		let mut graph = ConceptGraph::new();
		let indexed = || self.elements.iter().enumerate();

		for (index, el) in indexed().filter(|(_, el)| el.group() == Group::Nodes) {
			let mut node = Node::new(required_str(el, index, "id")?, optional_label(el, index)?);
			node.attrs = collect_attrs(&el.data);
			node.position = el.position.unwrap_or_default();
			node.extra = el.extra.clone();
			graph
				.add_node(node)
				.map_err(|source| DocumentError::Graph { index, source })?;
		}

		for (index, el) in indexed().filter(|(_, el)| el.group() == Group::Edges) {
			let mut edge = Edge::new(
				required_str(el, index, "id")?,
				required_str(el, index, "source")?,
				required_str(el, index, "target")?,
				optional_label(el, index)?,
			);
			edge.attrs = collect_attrs(&el.data);
			edge.extra = el.extra.clone();
			graph
				.insert_edge(edge)
				.map_err(|source| DocumentError::Graph { index, source })?;
		}

		Ok(graph)
	}

	pub fn parse(text: &str) -> Result<Self, DocumentError> {
		let value: Value = serde_json::from_str(text)?;
		match value.get("elements") {
			Some(Value::Array(_)) => Ok(serde_json::from_value(value)?),
			_ => Err(DocumentError::MissingElements),
		}
	}

	pub fn to_json(&self) -> Result<String, DocumentError> {
		Ok(serde_json::to_string(self)?)
	}

	pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
		Ok(serde_json::to_string_pretty(self)?)
	}
}

/// Parse a document and build its graph in one step.
pub fn import(text: &str) -> Result<ConceptGraph, DocumentError> {
	Document::parse(text)?.to_graph()
}

/// Serialize a graph as a pretty-printed document.
pub fn export(graph: &ConceptGraph) -> Result<String, DocumentError> {
	Document::from_graph(graph).to_json_pretty()
}

fn extend_attrs(data: &mut Map<String, Value>, attrs: &Attributes) {
	for (key, value) in attrs {
		data.insert(key.clone(), value.clone());
	}
}

fn collect_attrs(data: &Map<String, Value>) -> Attributes {
	data.iter()
		.filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
		.map(|(key, value)| (key.clone(), value.clone()))
		.collect()
}

fn required_str(el: &Element, index: usize, key: &str) -> Result<String, DocumentError> {
	match el.data.get(key) {
		Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
		Some(_) => Err(DocumentError::InvalidElement {
			index,
			reason: format!("`{key}` must be a non-empty string"),
		}),
		None => Err(DocumentError::InvalidElement {
			index,
			reason: format!("missing `{key}`"),
		}),
	}
}

fn optional_label(el: &Element, index: usize) -> Result<String, DocumentError> {
	match el.data.get("label") {
		None | Some(Value::Null) => Ok(String::new()),
		Some(Value::String(s)) => Ok(s.clone()),
		Some(Value::Number(n)) => Ok(n.to_string()),
		Some(_) => Err(DocumentError::InvalidElement {
			index,
			reason: "`label` must be a string".into(),
		}),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn sample() -> ConceptGraph {
		let mut g = ConceptGraph::new();
		g.add_node(Node::new("A", "Alpha").at(1.5, -2.0).with_attr("fill", "#ff0000"))
			.unwrap();
		g.add_node(Node::new("B", "Beta").at(10.0, 20.0)).unwrap();
		let mut e = Edge::new("e1", "A", "B", "leads to");
		e.attrs.insert("line-style".into(), json!("dashed"));
		g.insert_edge(e).unwrap();
		g.insert_edge(Edge::new("e2", "B", "B", "")).unwrap();
		g
	}

	#[test]
	fn export_shape_matches_the_file_format() {
		let value: Value = serde_json::from_str(&export(&sample()).unwrap()).unwrap();
		assert_eq!(
			value["elements"][0],
			json!({
				"group": "nodes",
				"data": { "id": "A", "label": "Alpha", "fill": "#ff0000" },
				"position": { "x": 1.5, "y": -2.0 }
			})
		);
		assert_eq!(
			value["elements"][2],
			json!({
				"group": "edges",
				"data": {
					"id": "e1", "source": "A", "target": "B",
					"label": "leads to", "line-style": "dashed"
				}
			})
		);
	}

	#[test]
	fn round_trip_is_lossless() {
		let text = r#"{"elements":[
			{"group":"nodes","data":{"id":"A","label":"a","shape":"round"},"position":{"x":1,"y":2},"classes":"hl","selected":false},
			{"group":"nodes","data":{"id":"B","label":"b"},"position":{"x":3,"y":4}},
			{"group":"edges","data":{"id":"x","source":"A","target":"B","label":"r","curve-offset":0.0},"classes":""}
		]}"#;
		let first = Document::from_graph(&import(text).unwrap());
		let second = Document::from_graph(&first.to_graph().unwrap());
		assert_eq!(first, second);
		assert_eq!(first.elements[0].extra["classes"], json!("hl"));
		assert_eq!(first.elements[0].data["shape"], json!("round"));
	}

	#[test]
	fn group_is_inferred_when_absent() {
		let g = import(
			r#"{"elements":[
				{"data":{"id":"e","source":"n","target":"n"}},
				{"data":{"id":"n"}}
			]}"#,
		)
		.unwrap();
		assert_eq!(g.node_count(), 1);
		assert!(g.edge("e").unwrap().is_self_loop());
		assert_eq!(g.node("n").unwrap().position, Position::default());
	}

	#[test]
	fn malformed_documents_are_rejected() {
		assert!(matches!(import("not json"), Err(DocumentError::Json(_))));
		assert!(matches!(import("{}"), Err(DocumentError::MissingElements)));
		assert!(matches!(
			import(r#"{"elements": {}}"#),
			Err(DocumentError::MissingElements)
		));
		assert!(matches!(
			import(r#"{"elements":[{"data":{"label":"no id"}}]}"#),
			Err(DocumentError::InvalidElement { index: 0, .. })
		));
		assert!(matches!(
			import(r#"{"elements":[{"data":{"id":"A"}},{"data":{"id":"e","source":"A","target":"Z"}}]}"#),
			Err(DocumentError::Graph {
				index: 1,
				source: GraphError::InvalidEdgeTarget(_)
			})
		));
		assert!(matches!(
			import(r#"{"elements":[{"data":{"id":"A"}},{"data":{"id":"A"}}]}"#),
			Err(DocumentError::Graph {
				source: GraphError::DuplicateId(_),
				..
			})
		));
	}
}
