//! View documents: reading, discovery, and flattening.

pub mod flatten;
pub mod reader;

pub use flatten::{flatten, value_text, FlatMap};
pub use reader::{discover_views, read_document, read_flat, DEFAULT_VIEW_PATTERN};
