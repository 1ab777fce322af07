//! Exercise containers inside session data.
//!
//! Containers are keyed by a mangled key: the display name followed by
//! [`SEPARATOR`] and a generated suffix, so two containers may share a name.

use std::collections::BTreeMap;

use super::ids::short_id;
use super::types::{ExerciseContainer, NodeData};

/// Separates the display name from the unique suffix.
pub const SEPARATOR: char = '#';

/// Appends a fresh unique suffix to `name`.
pub fn mangle(name: &str) -> String {
	format!("{}{}{}", name, SEPARATOR, short_id())
}

/// The name part of a mangled key. Keys without a suffix are returned whole.
pub fn display_name(key: &str) -> &str {
	key.rsplit_once(SEPARATOR).map_or(key, |(name, _)| name)
}

/// Gives every container a fresh key while keeping names and contents.
pub fn remangle(
	containers: &BTreeMap<String, ExerciseContainer>,
) -> BTreeMap<String, ExerciseContainer> {
	let mut out = BTreeMap::new();
	for (key, container) in containers {
		let mut fresh = mangle(display_name(key));
		while out.contains_key(&fresh) {
			fresh = mangle(display_name(key));
		}
		out.insert(fresh, container.clone());
	}
	out
}

/// Adds an empty container named `name` and returns its key.
pub fn add_container(data: &mut NodeData, name: &str) -> String {
	let mut key = mangle(name);
	while data.exercises.contains_key(&key) {
		key = mangle(name);
	}
	data.exercises.insert(
		key.clone(),
		ExerciseContainer {
			name: name.to_string(),
			exercises: Vec::new(),
		},
	);
	key
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn same_name_twice_gets_two_keys() {
		let mut data = NodeData::default();
		let a = add_container(&mut data, "Warm-up");
		let b = add_container(&mut data, "Warm-up");
		assert_ne!(a, b);
		assert_eq!(display_name(&a), "Warm-up");
		assert_eq!(data.exercises.len(), 2);
	}

	#[test]
	fn display_name_splits_on_last_separator() {
		assert_eq!(display_name("Sets #2#abcd1234"), "Sets #2");
		assert_eq!(display_name("plain"), "plain");
	}

	#[test]
	fn remangle_keeps_names_and_contents() {
		let mut data = NodeData::default();
		let key = add_container(&mut data, "Main");
		data.exercises
			.get_mut(&key)
			.unwrap()
			.exercises
			.push(serde_json::json!({ "name": "Squat", "sets": 3 }));

		let fresh = remangle(&data.exercises);
		assert_eq!(fresh.len(), 1);
		let (new_key, container) = fresh.iter().next().unwrap();
		assert_ne!(new_key, &key);
		assert_eq!(display_name(new_key), "Main");
		assert_eq!(container, &data.exercises[&key]);
	}
}
