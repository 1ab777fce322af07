//! Browser local storage for plans and editor state.
//!
//! Everything is plain JSON under fixed keys. There is no schema version: a
//! value that fails to parse is reported and treated as absent by callers.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::plan::clipboard::Template;
use crate::plan::error::{EditError, Result};
use crate::plan::types::Document;

/// Patient list.
pub const PATIENTS_KEY: &str = "plan-editor/patients";
/// Plans by intervention ID.
pub const INTERVENTIONS_KEY: &str = "plan-editor/interventions";
/// Viewport and selection per plan.
pub const EDITOR_STATES_KEY: &str = "plan-editor/editor-states";
/// Profile documents per patient.
pub const PROFILE_STATES_KEY: &str = "plan-editor/profile-states";
/// Saved templates.
pub const TEMPLATES_KEY: &str = "plan-editor/templates";
/// Saved exercise definitions.
pub const EXERCISES_KEY: &str = "plan-editor/exercises";

/// Intervention ID of the plan open on the home page.
pub const CURRENT_PLAN: &str = "current";

/// String key-value backend.
pub trait KeyValueStore {
	/// Reads `key`, `Ok(None)` when absent.
	fn get(&self, key: &str) -> Result<Option<String>>;
	/// Writes `value` under `key`.
	fn set(&self, key: &str, value: &str) -> Result<()>;
	/// Deletes `key`. Deleting a missing key is not an error.
	fn remove(&self, key: &str) -> Result<()>;
}

/// `window.localStorage`.
pub struct LocalStorage {
	storage: web_sys::Storage,
}

impl LocalStorage {
	/// Opens the window's local storage, if the browser exposes one.
	pub fn open() -> Result<Self> {
		let window = web_sys::window().ok_or_else(|| EditError::Storage("no window".into()))?;
		let storage = window
			.local_storage()
			.map_err(js_error)?
			.ok_or_else(|| EditError::Storage("local storage unavailable".into()))?;
		Ok(Self { storage })
	}
}

/// Typed access backed by `window.localStorage`.
pub fn browser() -> Result<Persistence<LocalStorage>> {
	Ok(Persistence::new(LocalStorage::open()?))
}

fn js_error(value: wasm_bindgen::JsValue) -> EditError {
	EditError::Storage(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

impl KeyValueStore for LocalStorage {
	fn get(&self, key: &str) -> Result<Option<String>> {
		self.storage.get_item(key).map_err(js_error)
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		self.storage.set_item(key, value).map_err(js_error)
	}

	fn remove(&self, key: &str) -> Result<()> {
		self.storage.remove_item(key).map_err(js_error)
	}
}

/// In-memory backend for tests.
#[derive(Default)]
pub struct MemoryStore {
	entries: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>> {
		Ok(self.entries.borrow().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		self.entries
			.borrow_mut()
			.insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<()> {
		self.entries.borrow_mut().remove(key);
		Ok(())
	}
}

/// A patient the plans are written for.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Patient {
	/// Unique patient ID.
	pub id: String,
	/// Display name.
	pub name: String,
	/// IDs of interventions assigned to this patient.
	#[serde(default)]
	pub interventions: Vec<String>,
	/// Fields this editor does not interpret.
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Viewport and selection of an open editor, restored on reload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorState {
	/// Canvas scale factor.
	pub zoom: f64,
	/// Horizontal pan in screen pixels.
	pub pan_x: f64,
	/// Vertical pan in screen pixels.
	pub pan_y: f64,
	/// Selected node IDs.
	#[serde(default)]
	pub selected: Vec<String>,
}

/// A reusable exercise definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDefinition {
	/// Unique name.
	pub name: String,
	/// Everything else about the exercise, kept as-is.
	#[serde(flatten)]
	pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Typed access to the editor's keys.
pub struct Persistence<S> {
	store: S,
}

impl<S: KeyValueStore> Persistence<S> {
	/// Wraps a backend.
	pub fn new(store: S) -> Self {
		Self { store }
	}

	/// The underlying backend.
	pub fn store(&self) -> &S {
		&self.store
	}

	fn load<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
		match self.store.get(key)? {
			Some(raw) => Ok(serde_json::from_str(&raw)?),
			None => Ok(T::default()),
		}
	}

	fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
		let raw = serde_json::to_string(value)?;
		debug!("Saving {} ({} bytes)", key, raw.len());
		self.store.set(key, &raw)
	}

	/// All patients, empty when none are stored.
	pub fn load_patients(&self) -> Result<Vec<Patient>> {
		self.load(PATIENTS_KEY)
	}

	/// Overwrites the patient list.
	pub fn save_patients(&self, patients: &[Patient]) -> Result<()> {
		self.save(PATIENTS_KEY, &patients)
	}

	/// Inserts or replaces a patient by ID.
	pub fn upsert_patient(&self, patient: Patient) -> Result<()> {
		let mut patients = self.load_patients()?;
		match patients.iter_mut().find(|p| p.id == patient.id) {
			Some(existing) => *existing = patient,
			None => patients.push(patient),
		}
		self.save_patients(&patients)
	}

	/// Every stored plan by intervention ID.
	pub fn load_interventions(&self) -> Result<BTreeMap<String, Document>> {
		self.load(INTERVENTIONS_KEY)
	}

	/// One stored plan.
	pub fn load_intervention(&self, id: &str) -> Result<Option<Document>> {
		Ok(self.load_interventions()?.remove(id))
	}

	/// Stores `doc` under `id`, replacing any previous version.
	pub fn save_intervention(&self, id: &str, doc: &Document) -> Result<()> {
		let mut all = self.load_interventions()?;
		all.insert(id.to_string(), doc.clone());
		self.save(INTERVENTIONS_KEY, &all)
	}

	/// Removes an intervention. Returns whether it existed.
	pub fn delete_intervention(&self, id: &str) -> Result<bool> {
		let mut all = self.load_interventions()?;
		let existed = all.remove(id).is_some();
		if existed {
			self.save(INTERVENTIONS_KEY, &all)?;
		}
		Ok(existed)
	}

	/// Every stored editor state by intervention ID.
	pub fn load_editor_states(&self) -> Result<BTreeMap<String, EditorState>> {
		self.load(EDITOR_STATES_KEY)
	}

	/// Stores the editor state of intervention `id`.
	pub fn save_editor_state(&self, id: &str, state: &EditorState) -> Result<()> {
		let mut all = self.load_editor_states()?;
		all.insert(id.to_string(), state.clone());
		self.save(EDITOR_STATES_KEY, &all)
	}

	/// Profile editors keep a document of their own, keyed by patient.
	pub fn load_profile_states(&self) -> Result<BTreeMap<String, Document>> {
		self.load(PROFILE_STATES_KEY)
	}

	/// Stores the profile document of `patient`.
	pub fn save_profile_state(&self, patient: &str, doc: &Document) -> Result<()> {
		let mut all = self.load_profile_states()?;
		all.insert(patient.to_string(), doc.clone());
		self.save(PROFILE_STATES_KEY, &all)
	}

	/// Saved templates, in save order.
	pub fn load_templates(&self) -> Result<Vec<Template>> {
		self.load(TEMPLATES_KEY)
	}

	/// Saves a template, replacing any with the same name.
	pub fn save_template(&self, template: &Template) -> Result<()> {
		let mut all = self.load_templates()?;
		all.retain(|t| t.name != template.name);
		all.push(template.clone());
		self.save(TEMPLATES_KEY, &all)
	}

	/// Saved exercise definitions.
	pub fn load_exercises(&self) -> Result<Vec<ExerciseDefinition>> {
		self.load(EXERCISES_KEY)
	}

	/// Saves an exercise definition, replacing any with the same name.
	pub fn save_exercise(&self, exercise: &ExerciseDefinition) -> Result<()> {
		let mut all = self.load_exercises()?;
		all.retain(|e| e.name != exercise.name);
		all.push(exercise.clone());
		self.save(EXERCISES_KEY, &all)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::plan::clipboard::Fragment;
	use crate::plan::types::{Node, NodeKind, Position};

	fn persistence() -> Persistence<MemoryStore> {
		Persistence::new(MemoryStore::default())
	}

	#[test]
	fn missing_keys_load_empty() {
		let p = persistence();
		assert!(p.load_patients().unwrap().is_empty());
		assert!(p.load_interventions().unwrap().is_empty());
		assert!(p.load_intervention("x").unwrap().is_none());
		assert!(p.load_templates().unwrap().is_empty());
	}

	#[test]
	fn interventions_round_trip_by_id() {
		let p = persistence();
		let mut doc = Document::new();
		doc.nodes
			.push(Node::new("i", NodeKind::Intervention, Position::new(1.0, 2.0)));
		p.save_intervention("plan-a", &doc).unwrap();
		p.save_intervention("plan-b", &Document::new()).unwrap();

		assert_eq!(p.load_intervention("plan-a").unwrap(), Some(doc));
		assert!(p.delete_intervention("plan-b").unwrap());
		assert!(!p.delete_intervention("plan-b").unwrap());
		assert_eq!(p.load_interventions().unwrap().len(), 1);
	}

	#[test]
	fn templates_replace_by_name() {
		let p = persistence();
		let empty = Template {
			name: "Week".into(),
			fragment: Fragment::default(),
		};
		p.save_template(&empty).unwrap();
		let mut filled = empty.clone();
		filled
			.fragment
			.nodes
			.push(Node::new("m", NodeKind::Micro, Position::default()));
		p.save_template(&filled).unwrap();
		assert_eq!(p.load_templates().unwrap(), vec![filled]);
	}

	#[test]
	fn upsert_patient_replaces() {
		let p = persistence();
		let mut patient = Patient {
			id: "p1".into(),
			name: "A".into(),
			..Default::default()
		};
		p.upsert_patient(patient.clone()).unwrap();
		patient.name = "B".into();
		p.upsert_patient(patient).unwrap();
		let patients = p.load_patients().unwrap();
		assert_eq!(patients.len(), 1);
		assert_eq!(patients[0].name, "B");
	}

	#[test]
	fn editor_states_round_trip_by_id() {
		let p = persistence();
		let state = EditorState {
			zoom: 1.5,
			pan_x: -20.0,
			pan_y: 40.0,
			selected: vec!["phase-1".into()],
		};
		p.save_editor_state("plan-a", &state).unwrap();
		p.save_editor_state("plan-b", &EditorState::default()).unwrap();
		let states = p.load_editor_states().unwrap();
		assert_eq!(states.len(), 2);
		assert_eq!(states.get("plan-a"), Some(&state));
	}

	#[test]
	fn profile_states_round_trip_by_patient() {
		let p = persistence();
		let mut doc = Document::new();
		doc.nodes
			.push(Node::new("profile-1", NodeKind::Profile, Position::default()));
		p.save_profile_state("p1", &doc).unwrap();
		p.save_profile_state("p1", &doc).unwrap();
		let states = p.load_profile_states().unwrap();
		assert_eq!(states.len(), 1);
		assert_eq!(states.get("p1"), Some(&doc));
	}

	#[test]
	fn exercises_replace_by_name() {
		let p = persistence();
		assert!(p.load_exercises().unwrap().is_empty());
		let mut squat = ExerciseDefinition {
			name: "Squat".into(),
			fields: serde_json::Map::new(),
		};
		p.save_exercise(&squat).unwrap();
		squat.fields.insert("sets".into(), serde_json::json!(5));
		p.save_exercise(&squat).unwrap();
		p.save_exercise(&ExerciseDefinition {
			name: "Row".into(),
			fields: serde_json::Map::new(),
		})
		.unwrap();
		let all = p.load_exercises().unwrap();
		assert_eq!(all.len(), 2);
		assert_eq!(all.iter().find(|e| e.name == "Squat"), Some(&squat));
	}

	#[test]
	fn corrupt_value_is_an_error() {
		let p = persistence();
		p.store().set(PATIENTS_KEY, "[{").unwrap();
		assert!(matches!(p.load_patients(), Err(EditError::Serde(_))));
	}
}
