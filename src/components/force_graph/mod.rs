mod component;
mod render;
mod scale;
mod state;
mod types;

pub use component::ConceptCanvas;
pub use types::{LineStyle, NodeShape};
