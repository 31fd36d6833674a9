//! Import/export document format and the library of named maps.

pub mod document;
mod library;

pub use document::{Document, DocumentError, Element, Group, export, import};
pub use library::{
	BrowserStore, DEFAULT_PREFIX, Library, MapStore, MemoryStore, StorageError, StorageResult,
};
