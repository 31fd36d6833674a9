//! Panels around the canvas. Each one reads the session from context.

mod info_bubble;
mod label_editor;
mod problems_panel;
mod style_panel;
mod toolbar;

pub use info_bubble::InfoBubble;
pub use label_editor::LabelEditor;
pub use problems_panel::ProblemsPanel;
pub use style_panel::StylePanel;
pub use toolbar::Toolbar;
