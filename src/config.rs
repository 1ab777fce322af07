//! Editor settings, stored as JSON next to the plans.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;
use crate::plan::history::DEFAULT_LIMIT;
use crate::plan::types::Position;

/// Key the config is read from.
pub const CONFIG_KEY: &str = "plan-editor/config";

/// Settings for the layout delegate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Simulation steps per layout run.
	pub iterations: u32,
	/// Time step fed to the simulation.
	pub dt: f32,
	/// Vertical distance between hierarchy levels when seeding.
	pub layer_spacing: f64,
	/// Horizontal distance between siblings when seeding.
	pub sibling_spacing: f64,
	/// Vertical distance between stacked sessions.
	pub stack_spacing: f64,
	/// Repulsion between nodes.
	pub force_charge: f32,
	/// Pull along edges.
	pub force_spring: f32,
	/// Cap on any single force.
	pub force_max: f32,
	/// Cap on node velocity.
	pub node_speed: f32,
	/// Velocity kept per step.
	pub damping_factor: f32,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			iterations: 200,
			dt: 0.016,
			layer_spacing: 160.0,
			sibling_spacing: 140.0,
			stack_spacing: 48.0,
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		}
	}
}

/// Top-level editor settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
	/// Maximum entries on each of the undo and redo stacks.
	pub history_limit: usize,
	/// Shift applied to each successive paste.
	pub paste_offset: Position,
	/// How long a toast stays visible.
	pub toast_millis: u64,
	/// Layout delegate settings.
	pub layout: LayoutConfig,
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			history_limit: DEFAULT_LIMIT,
			paste_offset: Position::new(40.0, 40.0),
			toast_millis: 3000,
			layout: LayoutConfig::default(),
		}
	}
}

impl EditorConfig {
	/// Reads the config from `store`, falling back to defaults.
	pub fn load(store: &impl KeyValueStore) -> Self {
		let raw = match store.get(CONFIG_KEY) {
			Ok(Some(raw)) => raw,
			Ok(None) => return Self::default(),
			Err(e) => {
				warn!("Could not read editor config: {}", e);
				return Self::default();
			}
		};
		serde_json::from_str(&raw).unwrap_or_else(|e| {
			warn!("Ignoring malformed editor config: {}", e);
			Self::default()
		})
	}
}
