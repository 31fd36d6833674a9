use std::collections::BTreeMap;

use log::info;
use thiserror::Error;

use crate::model::ConceptGraph;

use super::document::{Document, DocumentError};

/// Key prefix for saved maps.
pub const DEFAULT_PREFIX: &str = "conceptmap:map:";

#[derive(Error, Debug)]
pub enum StorageError {
	#[error("storage is unavailable")]
	Unavailable,

	#[error("storage backend error: {0}")]
	Backend(String),

	#[error("map name must not be empty")]
	EmptyName,

	#[error("no saved map named `{0}`")]
	NotFound(String),

	#[error("saved map `{name}` is invalid: {source}")]
	Corrupt {
		name: String,
		#[source]
		source: DocumentError,
	},

	#[error(transparent)]
	Document(#[from] DocumentError),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// String key/value persistence, as offered by browser local storage.
pub trait MapStore {
	fn keys(&self) -> StorageResult<Vec<String>>;
	fn get(&self, key: &str) -> StorageResult<Option<String>>;
	fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
	fn remove(&mut self, key: &str) -> StorageResult<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
	entries: BTreeMap<String, String>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl MapStore for MemoryStore {
	fn keys(&self) -> StorageResult<Vec<String>> {
		Ok(self.entries.keys().cloned().collect())
	}

	fn get(&self, key: &str) -> StorageResult<Option<String>> {
		Ok(self.entries.get(key).cloned())
	}

	fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
		self.entries.insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn remove(&mut self, key: &str) -> StorageResult<()> {
		self.entries.remove(key);
		Ok(())
	}
}

/// `window.localStorage`.
pub struct BrowserStore {
	storage: web_sys::Storage,
}

impl BrowserStore {
	pub fn open() -> StorageResult<Self> {
		let storage = web_sys::window()
			.ok_or(StorageError::Unavailable)?
			.local_storage()
			.map_err(js_error)?
			.ok_or(StorageError::Unavailable)?;
		Ok(Self { storage })
	}
}

fn js_error(err: wasm_bindgen::JsValue) -> StorageError {
	StorageError::Backend(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

impl MapStore for BrowserStore {
	fn keys(&self) -> StorageResult<Vec<String>> {
		let len = self.storage.length().map_err(js_error)?;
		let mut keys = Vec::with_capacity(len as usize);
		for i in 0..len {
			if let Some(key) = self.storage.key(i).map_err(js_error)? {
				keys.push(key);
			}
		}
		Ok(keys)
	}

	fn get(&self, key: &str) -> StorageResult<Option<String>> {
		self.storage.get_item(key).map_err(js_error)
	}

	fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
		self.storage.set_item(key, value).map_err(js_error)
	}

	fn remove(&mut self, key: &str) -> StorageResult<()> {
		self.storage.remove_item(key).map_err(js_error)
	}
}

/// Named concept maps kept in a [`MapStore`] under a common key prefix.
pub struct Library<S> {
	store: S,
	prefix: String,
}

impl<S: MapStore> Library<S> {
	pub fn new(store: S, prefix: impl Into<String>) -> Self {
		Self {
			store,
			prefix: prefix.into(),
		}
	}

	fn key(&self, name: &str) -> StorageResult<String> {
		let name = name.trim();
		if name.is_empty() {
			return Err(StorageError::EmptyName);
		}
		Ok(format!("{}{name}", self.prefix))
	}

	/// Saved map names, sorted.
	pub fn list(&self) -> StorageResult<Vec<String>> {
		let mut names: Vec<String> = self
			.store
			.keys()?
			.into_iter()
			.filter_map(|k| k.strip_prefix(&self.prefix).map(str::to_string))
			.collect();
		names.sort();
		Ok(names)
	}

	pub fn save(&mut self, name: &str, graph: &ConceptGraph) -> StorageResult<()> {
		let key = self.key(name)?;
		let payload = Document::from_graph(graph).to_json()?;
		self.store.set(&key, &payload)?;
		info!("saved map `{}` ({} bytes)", name.trim(), payload.len());
		Ok(())
	}

	pub fn load(&self, name: &str) -> StorageResult<ConceptGraph> {
		let key = self.key(name)?;
		let payload = self
			.store
			.get(&key)?
			.ok_or_else(|| StorageError::NotFound(name.trim().to_string()))?;
		super::document::import(&payload).map_err(|source| StorageError::Corrupt {
			name: name.trim().to_string(),
			source,
		})
	}

	pub fn delete(&mut self, name: &str) -> StorageResult<()> {
		let key = self.key(name)?;
		self.store.remove(&key)
	}

	pub fn store(&self) -> &S {
		&self.store
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::{Edge, Node};

	fn library() -> Library<MemoryStore> {
		Library::new(MemoryStore::new(), DEFAULT_PREFIX)
	}

	fn graph() -> ConceptGraph {
		let mut g = ConceptGraph::new();
		g.add_node(Node::new("A", "a")).unwrap();
		g.add_node(Node::new("B", "b")).unwrap();
		g.insert_edge(Edge::new("e", "A", "B", "rel")).unwrap();
		g
	}

	#[test]
	fn save_list_load_delete() {
		let mut lib = library();
		lib.save("zeta", &graph()).unwrap();
		lib.save(" alpha ", &ConceptGraph::new()).unwrap();
		assert_eq!(lib.list().unwrap(), ["alpha", "zeta"]);

		let loaded = lib.load("zeta").unwrap();
		assert_eq!(
			Document::from_graph(&loaded),
			Document::from_graph(&graph())
		);

		lib.delete("zeta").unwrap();
		assert_eq!(lib.list().unwrap(), ["alpha"]);
		assert!(matches!(lib.load("zeta"), Err(StorageError::NotFound(n)) if n == "zeta"));
	}

	#[test]
	fn foreign_keys_are_ignored_and_names_validated() {
		let mut store = MemoryStore::new();
		store.set("other:thing", "{}").unwrap();
		let mut lib = Library::new(store, DEFAULT_PREFIX);
		assert!(lib.list().unwrap().is_empty());
		assert!(matches!(lib.save("  ", &graph()), Err(StorageError::EmptyName)));
	}

	#[test]
	fn corrupt_payload_is_reported() {
		let mut store = MemoryStore::new();
		store.set(&format!("{DEFAULT_PREFIX}bad"), "{\"nodes\":[]}").unwrap();
		let lib = Library::new(store, DEFAULT_PREFIX);
		assert!(matches!(
			lib.load("bad"),
			Err(StorageError::Corrupt {
				source: DocumentError::MissingElements,
				..
			})
		));
	}
}
