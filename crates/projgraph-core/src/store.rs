//! An in-memory named project snapshot store.

use crate::project::Project;
use std::collections::HashMap;

/// Saves, loads, lists, and deletes `Project` snapshots keyed by name.
///
/// `save` is last-writer-wins: a project stored under a key that already has
/// a snapshot simply overwrites it. Every returned project is an owned clone,
/// so mutating a caller's copy never affects the stored snapshot.
#[derive(Debug, Default)]
pub struct ProjectStore {
    snapshots: HashMap<String, Project>,
}

impl ProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self, key: impl Into<String>, project: &Project) {
        self.snapshots.insert(key.into(), project.clone());
    }

    pub fn load(&self, key: &str) -> Option<Project> {
        self.snapshots.get(key).cloned()
    }

    pub fn list(&self) -> Vec<String> {
        self.snapshots.keys().cloned().collect()
    }

    pub fn delete(&mut self, key: &str) -> bool {
        self.snapshots.remove(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_roundtrips() {
        let mut store = ProjectStore::new();
        let project = Project::new("demo");
        store.save("p1", &project);
        let loaded = store.load("p1").unwrap();
        assert_eq!(loaded.name, "demo");
    }

    #[test]
    fn load_missing_key_returns_none() {
        let store = ProjectStore::new();
        assert!(store.load("ghost").is_none());
    }

    #[test]
    fn save_is_last_writer_wins() {
        let mut store = ProjectStore::new();
        store.save("p1", &Project::new("first"));
        store.save("p1", &Project::new("second"));
        assert_eq!(store.load("p1").unwrap().name, "second");
    }

    #[test]
    fn list_returns_all_keys() {
        let mut store = ProjectStore::new();
        store.save("a", &Project::new("a"));
        store.save("b", &Project::new("b"));
        let mut keys = store.list();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn delete_reports_whether_a_snapshot_was_removed() {
        let mut store = ProjectStore::new();
        store.save("a", &Project::new("a"));
        assert!(store.delete("a"));
        assert!(!store.delete("a"));
    }

    #[test]
    fn mutating_caller_copy_does_not_affect_stored_snapshot() {
        let mut store = ProjectStore::new();
        let mut project = Project::new("demo");
        store.save("p1", &project);
        project.name = "mutated".to_string();
        assert_eq!(store.load("p1").unwrap().name, "demo");
    }
}
