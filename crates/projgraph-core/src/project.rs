//! The project entity graph and its CRUD operations.

use crate::attributes::{merge_attributes, Attributes};
use crate::error::ProjectError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Disambiguates which entity namespace an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Task,
    Milestone,
    Resource,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task => write!(f, "task"),
            Self::Milestone => write!(f, "milestone"),
            Self::Resource => write!(f, "resource"),
        }
    }
}

macro_rules! entity_kind_struct {
    ($name:ident) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            pub id: String,
            pub attributes: Attributes,
        }

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self { id: id.into(), attributes: Attributes::new() }
            }

            pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
                self.attributes.insert(key.into(), value.into());
                self
            }
        }
    };
}

entity_kind_struct!(Task);
entity_kind_struct!(Milestone);
entity_kind_struct!(Resource);

/// A named grouping of tasks and milestones, used only for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub attributes: Attributes,
    pub task_ids: HashSet<String>,
    pub milestone_ids: HashSet<String>,
}

/// A precedence edge: `src` must finish before `dest` may start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub src: String,
    #[serde(rename = "srcType")]
    pub src_type: EntityKind,
    pub dest: String,
    #[serde(rename = "destType")]
    pub dest_type: EntityKind,
}

impl Dependency {
    pub fn new(src: impl Into<String>, src_type: EntityKind, dest: impl Into<String>, dest_type: EntityKind) -> Self {
        Self { src: src.into(), src_type, dest: dest.into(), dest_type }
    }

    fn endpoint_matches(&self, id: &str, kind: EntityKind) -> bool {
        (self.src == id && self.src_type == kind) || (self.dest == id && self.dest_type == kind)
    }
}

/// A task-to-resource linkage. Scheduler-irrelevant; pruned on entity removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(rename = "taskId")]
    pub task_id: String,
    #[serde(rename = "resourceId")]
    pub resource_id: String,
}

impl Assignment {
    fn references(&self, id: &str, kind: EntityKind) -> bool {
        (self.task_id == id && kind == EntityKind::Task) || (self.resource_id == id && kind == EntityKind::Resource)
    }
}

/// The in-memory project entity graph: tasks, milestones, resources, clusters,
/// their dependencies, and resource assignments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub tasks: HashMap<String, Task>,
    pub milestones: HashMap<String, Milestone>,
    pub resources: HashMap<String, Resource>,
    pub clusters: HashMap<String, Cluster>,
    pub dependencies: Vec<Dependency>,
    pub assignments: Vec<Assignment>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    // ------------------------------------------------------------------
    // Entity upsert / merge
    // ------------------------------------------------------------------

    /// Create a new task, or merge `attributes` into an existing one with the
    /// same id (tombstone semantics per [`merge_attributes`]).
    pub fn task_upsert(&mut self, task: Task) {
        self.tasks
            .entry(task.id.clone())
            .and_modify(|existing| {
                existing.attributes = merge_attributes(std::mem::take(&mut existing.attributes), &task.attributes);
            })
            .or_insert(task);
    }

    pub fn milestone_upsert(&mut self, milestone: Milestone) {
        self.milestones
            .entry(milestone.id.clone())
            .and_modify(|existing| {
                existing.attributes =
                    merge_attributes(std::mem::take(&mut existing.attributes), &milestone.attributes);
            })
            .or_insert(milestone);
    }

    pub fn resource_upsert(&mut self, resource: Resource) {
        self.resources
            .entry(resource.id.clone())
            .and_modify(|existing| {
                existing.attributes =
                    merge_attributes(std::mem::take(&mut existing.attributes), &resource.attributes);
            })
            .or_insert(resource);
    }

    // ------------------------------------------------------------------
    // Entity removal, with reference pruning
    // ------------------------------------------------------------------

    /// Remove an entity of the given kind, pruning every dangling reference
    /// (dependencies, assignments, cluster membership). A no-op if absent.
    pub fn entity_remove(&mut self, id: &str, kind: EntityKind) {
        self.dependencies.retain(|d| !d.endpoint_matches(id, kind));
        match kind {
            EntityKind::Task => {
                self.tasks.remove(id);
                self.assignments.retain(|a| !a.references(id, kind));
                for cluster in self.clusters.values_mut() {
                    cluster.task_ids.remove(id);
                }
            }
            EntityKind::Milestone => {
                self.milestones.remove(id);
                for cluster in self.clusters.values_mut() {
                    cluster.milestone_ids.remove(id);
                }
            }
            EntityKind::Resource => {
                self.resources.remove(id);
                self.assignments.retain(|a| !a.references(id, kind));
            }
        }
    }

    // ------------------------------------------------------------------
    // Activity (task) CRUD
    // ------------------------------------------------------------------

    /// Insert a brand-new task. Fails if blank or already present.
    pub fn activity_add(&mut self, task: Task) -> Result<(), ProjectError> {
        if task.id.is_empty() {
            return Err(ProjectError::InvalidId);
        }
        if self.tasks.contains_key(&task.id) {
            return Err(ProjectError::IdExists(task.id));
        }
        self.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    /// Remove a task by id. A no-op if absent.
    pub fn activity_remove(&mut self, id: &str) {
        self.entity_remove(id, EntityKind::Task);
    }

    /// Upsert a task wholesale (not merged).
    pub fn activity_replace(&mut self, task: Task) -> Result<(), ProjectError> {
        if task.id.is_empty() {
            return Err(ProjectError::InvalidId);
        }
        self.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    /// Merge `attrs` into the named task's attribute bag. If `attrs` contains
    /// an `"id"` key with a non-blank value, the task (and every dependency
    /// referencing it) is renamed atomically before the remaining attributes
    /// are applied.
    pub fn activity_patch(&mut self, id: &str, mut attrs: Attributes) -> Result<(), ProjectError> {
        if !self.tasks.contains_key(id) {
            return Err(ProjectError::IdNotFound(id.to_string()));
        }
        let target_id = match attrs.remove("id").filter(|v| !v.is_empty()) {
            Some(new_id) => {
                self.rename_task(id, &new_id);
                new_id
            }
            None => id.to_string(),
        };
        if let Some(task) = self.tasks.get_mut(&target_id) {
            task.attributes = merge_attributes(std::mem::take(&mut task.attributes), &attrs);
        }
        Ok(())
    }

    fn rename_task(&mut self, old_id: &str, new_id: &str) {
        if old_id == new_id {
            return;
        }
        if let Some(mut task) = self.tasks.remove(old_id) {
            task.id = new_id.to_string();
            self.tasks.insert(new_id.to_string(), task);
        }
        for dep in &mut self.dependencies {
            if dep.src == old_id && dep.src_type == EntityKind::Task {
                dep.src = new_id.to_string();
            }
            if dep.dest == old_id && dep.dest_type == EntityKind::Task {
                dep.dest = new_id.to_string();
            }
        }
        for assignment in &mut self.assignments {
            if assignment.task_id == old_id {
                assignment.task_id = new_id.to_string();
            }
        }
    }

    /// Duplicate a task under a fresh id, along with its inbound and outbound
    /// dependencies. Returns the new id.
    pub fn activity_clone(&mut self, id: &str) -> Result<String, ProjectError> {
        let task = self.tasks.get(id).cloned().ok_or_else(|| ProjectError::IdNotFound(id.to_string()))?;
        let new_id = self.fresh_id(id);
        let mut cloned = task;
        cloned.id = new_id.clone();
        self.tasks.insert(new_id.clone(), cloned);

        let mut to_add = Vec::new();
        for dep in &self.dependencies {
            if dep.src == id && dep.src_type == EntityKind::Task {
                to_add.push(Dependency::new(new_id.clone(), EntityKind::Task, dep.dest.clone(), dep.dest_type));
            }
            if dep.dest == id && dep.dest_type == EntityKind::Task {
                to_add.push(Dependency::new(dep.src.clone(), dep.src_type, new_id.clone(), EntityKind::Task));
            }
        }
        self.dependencies.extend(to_add);
        Ok(new_id)
    }

    /// Insert a new empty task immediately after `id`: every `id -> X` arrow
    /// becomes `new -> X`, and `id -> new` is added.
    pub fn activity_insert_after(&mut self, id: &str) -> Result<String, ProjectError> {
        if !self.tasks.contains_key(id) {
            return Err(ProjectError::IdNotFound(id.to_string()));
        }
        let new_id = self.fresh_id(id);
        self.tasks.insert(new_id.clone(), Task::new(new_id.clone()));
        for dep in &mut self.dependencies {
            if dep.src == id && dep.src_type == EntityKind::Task {
                dep.src = new_id.clone();
            }
        }
        self.dependencies.push(Dependency::new(id, EntityKind::Task, new_id.clone(), EntityKind::Task));
        Ok(new_id)
    }

    /// Insert a new empty task immediately before `id`: every `X -> id` arrow
    /// becomes `X -> new`, and `new -> id` is added.
    pub fn activity_insert_before(&mut self, id: &str) -> Result<String, ProjectError> {
        if !self.tasks.contains_key(id) {
            return Err(ProjectError::IdNotFound(id.to_string()));
        }
        let new_id = self.fresh_id(id);
        self.tasks.insert(new_id.clone(), Task::new(new_id.clone()));
        for dep in &mut self.dependencies {
            if dep.dest == id && dep.dest_type == EntityKind::Task {
                dep.dest = new_id.clone();
            }
        }
        self.dependencies.push(Dependency::new(new_id.clone(), EntityKind::Task, id, EntityKind::Task));
        Ok(new_id)
    }

    // ------------------------------------------------------------------
    // Dependency CRUD
    // ------------------------------------------------------------------

    /// Idempotently add an edge between two entities of the given kinds.
    pub fn dependency_add(
        &mut self,
        src: impl Into<String>,
        src_type: EntityKind,
        dest: impl Into<String>,
        dest_type: EntityKind,
    ) -> Result<(), ProjectError> {
        let (src, dest) = (src.into(), dest.into());
        if src == dest && src_type == dest_type {
            return Err(ProjectError::SameId(src));
        }
        if !self.entity_exists(&src, src_type) {
            return Err(ProjectError::IdNotFound(src));
        }
        if !self.entity_exists(&dest, dest_type) {
            return Err(ProjectError::IdNotFound(dest));
        }
        let already_present = self.dependencies.iter().any(|d| {
            d.src == src && d.src_type == src_type && d.dest == dest && d.dest_type == dest_type
        });
        if !already_present {
            self.dependencies.push(Dependency::new(src, src_type, dest, dest_type));
        }
        Ok(())
    }

    /// Remove the edge between two entities, if present. A no-op otherwise.
    pub fn dependency_remove(&mut self, src: &str, src_type: EntityKind, dest: &str, dest_type: EntityKind) {
        self.dependencies
            .retain(|d| !(d.src == src && d.src_type == src_type && d.dest == dest && d.dest_type == dest_type));
    }

    /// Replace the edge `src -> dest` with `src -> new -> dest`, where `new`
    /// is a fresh task.
    pub fn dependency_split(&mut self, src: &str, dest: &str) -> Result<String, ProjectError> {
        if !self.tasks.contains_key(src) {
            return Err(ProjectError::IdNotFound(src.to_string()));
        }
        if !self.tasks.contains_key(dest) {
            return Err(ProjectError::IdNotFound(dest.to_string()));
        }
        let new_id = self.fresh_id(src);
        self.tasks.insert(new_id.clone(), Task::new(new_id.clone()));
        self.dependency_remove(src, EntityKind::Task, dest, EntityKind::Task);
        self.dependency_add(src, EntityKind::Task, new_id.clone(), EntityKind::Task)?;
        self.dependency_add(new_id.clone(), EntityKind::Task, dest, EntityKind::Task)?;
        Ok(new_id)
    }

    fn entity_exists(&self, id: &str, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Task => self.tasks.contains_key(id),
            EntityKind::Milestone => self.milestones.contains_key(id),
            EntityKind::Resource => self.resources.contains_key(id),
        }
    }

    // ------------------------------------------------------------------
    // Fresh id generation (spec 4.2.1): strip a trailing "+k" suffix from the
    // seed, then probe base+1, base+2, ... against the task namespace.
    // ------------------------------------------------------------------

    pub fn fresh_id(&self, seed: &str) -> String {
        fresh_id_against(seed, |candidate| self.tasks.contains_key(candidate))
    }
}

/// Strip a trailing `+<digits>` suffix from `seed`, then probe `base+1`,
/// `base+2`, ... against `exists`, returning the first id for which `exists`
/// is false.
pub fn fresh_id_against(seed: &str, exists: impl Fn(&str) -> bool) -> String {
    let base = match seed.rsplit_once('+') {
        Some((prefix, suffix)) if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) => prefix,
        _ => seed,
    };
    let mut k = 1u64;
    loop {
        let candidate = format!("{base}+{k}");
        if !exists(&candidate) {
            return candidate;
        }
        k += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_add_rejects_duplicate_id() {
        let mut project = Project::new("p");
        project.activity_add(Task::new("a")).unwrap();
        let err = project.activity_add(Task::new("a")).unwrap_err();
        assert_eq!(err, ProjectError::IdExists("a".into()));
    }

    #[test]
    fn activity_add_rejects_blank_id() {
        let mut project = Project::new("p");
        let err = project.activity_add(Task::new("")).unwrap_err();
        assert_eq!(err, ProjectError::InvalidId);
    }

    #[test]
    fn activity_remove_is_noop_if_absent() {
        let mut project = Project::new("p");
        project.activity_remove("ghost");
        assert!(project.tasks.is_empty());
    }

    #[test]
    fn activity_remove_prunes_dependencies_and_assignments() {
        let mut project = Project::new("p");
        project.activity_add(Task::new("a")).unwrap();
        project.activity_add(Task::new("b")).unwrap();
        project.dependency_add("a", EntityKind::Task, "b", EntityKind::Task).unwrap();
        project.assignments.push(Assignment { task_id: "a".into(), resource_id: "r".into() });

        project.activity_remove("a");

        assert!(project.dependencies.is_empty());
        assert!(project.assignments.is_empty());
        assert!(!project.tasks.contains_key("a"));
    }

    #[test]
    fn dependency_add_rejects_self_loop() {
        let mut project = Project::new("p");
        project.activity_add(Task::new("a")).unwrap();
        let err = project.dependency_add("a", EntityKind::Task, "a", EntityKind::Task).unwrap_err();
        assert_eq!(err, ProjectError::SameId("a".into()));
    }

    #[test]
    fn dependency_add_is_idempotent() {
        let mut project = Project::new("p");
        project.activity_add(Task::new("a")).unwrap();
        project.activity_add(Task::new("b")).unwrap();
        project.dependency_add("a", EntityKind::Task, "b", EntityKind::Task).unwrap();
        project.dependency_add("a", EntityKind::Task, "b", EntityKind::Task).unwrap();
        assert_eq!(project.dependencies.len(), 1);
    }

    #[test]
    fn fresh_id_probes_plus_suffix() {
        let mut project = Project::new("p");
        project.activity_add(Task::new("a")).unwrap();
        project.activity_add(Task::new("a+1")).unwrap();
        assert_eq!(project.fresh_id("a"), "a+2");
        assert_eq!(project.fresh_id("a+1"), "a+2");
    }

    #[test]
    fn activity_insert_after_rewires_outgoing_edges() {
        let mut project = Project::new("p");
        project.activity_add(Task::new("a")).unwrap();
        project.activity_add(Task::new("b")).unwrap();
        project.dependency_add("a", EntityKind::Task, "b", EntityKind::Task).unwrap();

        let new_id = project.activity_insert_after("a").unwrap();

        assert!(project
            .dependencies
            .iter()
            .any(|d| d.src == new_id && d.dest == "b"));
        assert!(project
            .dependencies
            .iter()
            .any(|d| d.src == "a" && d.dest == new_id));
        assert!(!project.dependencies.iter().any(|d| d.src == "a" && d.dest == "b"));
    }

    #[test]
    fn activity_insert_before_rewires_incoming_edges() {
        let mut project = Project::new("p");
        project.activity_add(Task::new("a")).unwrap();
        project.activity_add(Task::new("b")).unwrap();
        project.dependency_add("a", EntityKind::Task, "b", EntityKind::Task).unwrap();

        let new_id = project.activity_insert_before("b").unwrap();

        assert!(project
            .dependencies
            .iter()
            .any(|d| d.src == "a" && d.dest == new_id));
        assert!(project
            .dependencies
            .iter()
            .any(|d| d.src == new_id && d.dest == "b"));
    }

    #[test]
    fn dependency_split_inserts_intermediate_task() {
        let mut project = Project::new("p");
        project.activity_add(Task::new("a")).unwrap();
        project.activity_add(Task::new("b")).unwrap();
        project.dependency_add("a", EntityKind::Task, "b", EntityKind::Task).unwrap();

        let mid = project.dependency_split("a", "b").unwrap();

        assert!(!project.dependencies.iter().any(|d| d.src == "a" && d.dest == "b"));
        assert!(project.dependencies.iter().any(|d| d.src == "a" && d.dest == mid));
        assert!(project.dependencies.iter().any(|d| d.src == mid && d.dest == "b"));
    }

    #[test]
    fn task_upsert_merges_attributes_with_tombstone() {
        let mut project = Project::new("p");
        project.task_upsert(Task::new("t").with_attr("k", "v1").with_attr("j", "v2"));
        project.task_upsert(Task::new("t").with_attr("k", "~"));
        let t = &project.tasks["t"];
        assert_eq!(t.attributes.get("k"), None);
        assert_eq!(t.attributes.get("j"), Some(&"v2".to_string()));
    }

    #[test]
    fn activity_patch_renames_and_rewires_dependencies() {
        let mut project = Project::new("p");
        project.activity_add(Task::new("a")).unwrap();
        project.activity_add(Task::new("b")).unwrap();
        project.dependency_add("a", EntityKind::Task, "b", EntityKind::Task).unwrap();

        let mut attrs = Attributes::new();
        attrs.insert("id".to_string(), "a2".to_string());
        project.activity_patch("a", attrs).unwrap();

        assert!(!project.tasks.contains_key("a"));
        assert!(project.tasks.contains_key("a2"));
        assert!(project.dependencies.iter().any(|d| d.src == "a2" && d.dest == "b"));
    }
}
