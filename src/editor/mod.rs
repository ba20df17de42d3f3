//! The interactive editing core: gesture handling, structure edits,
//! undo history and SVG output.
//!
//! # Module Organization
//!
//! - `engine` - Hit-testing, direction choice, grafting, deletion and labelling
//! - `history` - Bounded snapshot cache backing undo and redo
//! - `host` - Named editor instances and their published content
//! - `render` - Turning a structure into editor and document SVG
//! - `session` - One open editor: tools, mouse gestures, commits

pub mod engine;
pub mod history;
pub mod host;
pub mod render;
pub mod session;

pub use engine::PlacementError;
pub use history::History;
pub use host::{Instance, InstanceHost};
pub use render::{draw, RenderedShape};
pub use session::{EditorSession, Tool};
