//! In-memory concept map: nodes, labeled edges, positions and style attributes.

mod events;
mod graph;
mod types;

pub use events::{ChangeEvent, Listeners, Subscription};
pub use graph::{ConceptGraph, GraphError, GraphResult};
pub use types::{
	Attributes, Edge, EdgeId, ElementKind, Node, NodeId, Position, RESERVED_KEYS, attr,
};
