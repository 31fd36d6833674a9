//! Editor settings.
//!
//! Defaults live in code. A JSON object stored under [`CONFIG_KEY`] in local
//! storage overrides any subset of the fields.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::storage::{BrowserStore, DEFAULT_PREFIX, MapStore};

pub const CONFIG_KEY: &str = "conceptmap:config";

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	pub force_charge: f32,
	pub force_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			force_charge: 250.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
	/// Distance between neighbouring parallel edges.
	pub bundle_step: f64,
	/// Node spacing for the grid and concentric layouts.
	pub layout_spacing: f64,
	pub history_limit: usize,
	pub storage_prefix: String,
	/// Seed new sessions with the demo map.
	pub demo: bool,
	pub simulation: SimulationConfig,
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			bundle_step: 24.0,
			layout_spacing: 120.0,
			history_limit: 100,
			storage_prefix: DEFAULT_PREFIX.to_string(),
			demo: true,
			simulation: SimulationConfig::default(),
		}
	}
}

impl EditorConfig {
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}

	/// Read the override from `store`, falling back to defaults on any problem.
	pub fn load_from(store: &impl MapStore) -> Self {
		match store.get(CONFIG_KEY) {
			Ok(Some(text)) => match Self::from_json(&text) {
				Ok(config) => {
					info!("loaded editor config override");
					config
				}
				Err(err) => {
					warn!("ignoring invalid editor config: {err}");
					Self::default()
				}
			},
			Ok(None) => Self::default(),
			Err(err) => {
				warn!("could not read editor config: {err}");
				Self::default()
			}
		}
	}

	/// Browser entry point: local storage override or defaults.
	pub fn load() -> Self {
		match BrowserStore::open() {
			Ok(store) => Self::load_from(&store),
			Err(_) => Self::default(),
		}
	}
}
