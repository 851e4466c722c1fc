//! # projgraph-core
//!
//! Core domain model for the projgraph scheduling engine.
//!
//! This crate provides:
//! - Entity types: `Task`, `Milestone`, `Resource`, `Cluster`, `Dependency`, `Assignment`
//! - The `Project` container and its CRUD operations
//! - Attribute merge semantics with tombstone deletion
//! - An in-memory named project store
//!
//! ## Example
//!
//! ```rust
//! use projgraph_core::{Project, Task, EntityKind};
//!
//! let mut project = Project::new("demo");
//! project.activity_add(Task::new("design")).unwrap();
//! project.activity_add(Task::new("implement")).unwrap();
//! project.dependency_add("design", EntityKind::Task, "implement", EntityKind::Task).unwrap();
//! assert_eq!(project.dependencies.len(), 1);
//! ```

pub mod attributes;
pub mod error;
pub mod project;
pub mod store;

pub use attributes::{merge_attributes, Attributes};
pub use error::ProjectError;
pub use project::{
    Assignment, Cluster, Dependency, EntityKind, Milestone, Project, Resource, Task,
};
pub use store::ProjectStore;

/// Unique identifier for any entity (task, milestone, resource, or cluster).
pub type EntityId = String;
