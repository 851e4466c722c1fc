//! # projgraph-solver
//!
//! The CPM scheduler: turns a [`projgraph_core::Project`] into a
//! [`Chart`] of earliest/latest start and finish times, slack, and critical
//! path, by way of the three-point PERT estimate for activities that don't
//! carry an explicit duration.

mod activity_view;
mod cpm;
mod estimator;

pub use activity_view::{from_project, ActivityInput};
pub use cpm::{calculate, Arrow, Chart, CpmError, Node, NodePosition};
pub use estimator::{estimate_duration, round1};

use projgraph_core::Project;

/// Project a [`Project`] to its activity graph and run CPM over it in one
/// step, naming the resulting chart after the project itself.
pub fn schedule_project(project: &Project) -> Result<Chart, CpmError> {
    let activities = from_project(project);
    calculate(&activities, project.name.clone(), project.name.clone())
}
