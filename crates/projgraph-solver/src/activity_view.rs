//! The read-only activity-graph projection of a [`Project`].
//!
//! This module never mutates the project; it is the seam between the entity
//! graph maintained by the interpreter and the CPM scheduler, which only
//! understands plain activities with durations and predecessor lists.

use crate::estimator::estimate_duration;
use projgraph_core::{EntityKind, Project};
use std::collections::HashMap;

/// One activity as the scheduler sees it: a duration and a predecessor list,
/// stripped of everything entity-graph-specific.
#[derive(Debug, Clone)]
pub struct ActivityInput {
    pub id: String,
    pub title: String,
    pub description: String,
    pub meta: HashMap<String, String>,
    pub duration: f64,
    pub duration_low: f64,
    pub duration_likely: f64,
    pub duration_high: f64,
    pub predecessors: Vec<String>,
}

const KNOWN_KEYS: &[&str] =
    &["title", "name", "description", "duration", "durationLow", "durationLikely", "durationHigh"];

fn parse_f64(attrs: &HashMap<String, String>, key: &str) -> f64 {
    attrs.get(key).and_then(|v| v.parse::<f64>().ok()).unwrap_or(0.0)
}

fn meta_of(attrs: &HashMap<String, String>) -> HashMap<String, String> {
    attrs.iter().filter(|(k, _)| !KNOWN_KEYS.contains(&k.as_str())).map(|(k, v)| (k.clone(), v.clone())).collect()
}

fn title_of(id: &str, attrs: &HashMap<String, String>) -> String {
    attrs.get("title").or_else(|| attrs.get("name")).cloned().unwrap_or_else(|| id.to_string())
}

fn predecessors_of(project: &Project, id: &str, kind: EntityKind) -> Vec<String> {
    let mut preds: Vec<String> = project
        .dependencies
        .iter()
        .filter(|d| d.dest == id && d.dest_type == kind)
        .map(|d| d.src.clone())
        .collect();
    preds.sort();
    preds
}

/// Flatten a project's tasks and milestones into scheduler-ready activities,
/// sorted by id for deterministic output.
pub fn from_project(project: &Project) -> Vec<ActivityInput> {
    let mut out = Vec::with_capacity(project.tasks.len() + project.milestones.len());

    for task in project.tasks.values() {
        let low = parse_f64(&task.attributes, "durationLow");
        let likely = parse_f64(&task.attributes, "durationLikely");
        let high = parse_f64(&task.attributes, "durationHigh");
        let duration =
            task.attributes.get("duration").and_then(|v| v.parse::<f64>().ok()).unwrap_or_else(|| estimate_duration(low, likely, high));
        out.push(ActivityInput {
            id: task.id.clone(),
            title: title_of(&task.id, &task.attributes),
            description: task.attributes.get("description").cloned().unwrap_or_default(),
            meta: meta_of(&task.attributes),
            duration,
            duration_low: low,
            duration_likely: likely,
            duration_high: high,
            predecessors: predecessors_of(project, &task.id, EntityKind::Task),
        });
    }

    for milestone in project.milestones.values() {
        out.push(ActivityInput {
            id: milestone.id.clone(),
            title: title_of(&milestone.id, &milestone.attributes),
            description: milestone.attributes.get("description").cloned().unwrap_or_default(),
            meta: meta_of(&milestone.attributes),
            duration: 0.0,
            duration_low: 0.0,
            duration_likely: 0.0,
            duration_high: 0.0,
            predecessors: predecessors_of(project, &milestone.id, EntityKind::Milestone),
        });
    }

    out.sort_by(|a, b| a.id.cmp(&b.id));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use projgraph_core::{EntityKind as EK, Task};

    #[test]
    fn milestones_are_always_zero_duration() {
        let mut project = Project::new("p");
        project.milestone_upsert(projgraph_core::Milestone::new("M").with_attr("duration", "99"));
        let activities = from_project(&project);
        assert_eq!(activities[0].duration, 0.0);
    }

    #[test]
    fn explicit_duration_attribute_overrides_pert_estimate() {
        let mut project = Project::new("p");
        project.task_upsert(Task::new("T").with_attr("duration", "5").with_attr("durationLikely", "100"));
        let activities = from_project(&project);
        assert_eq!(activities[0].duration, 5.0);
    }

    #[test]
    fn duration_falls_back_to_pert_estimate() {
        let mut project = Project::new("p");
        project.task_upsert(
            Task::new("T").with_attr("durationLow", "10").with_attr("durationLikely", "20").with_attr("durationHigh", "30"),
        );
        let activities = from_project(&project);
        assert_eq!(activities[0].duration, 20.0);
    }

    #[test]
    fn predecessors_reflect_incoming_dependencies() {
        let mut project = Project::new("p");
        project.activity_add(Task::new("A")).unwrap();
        project.activity_add(Task::new("B")).unwrap();
        project.dependency_add("A", EK::Task, "B", EK::Task).unwrap();
        let activities = from_project(&project);
        let b = activities.iter().find(|a| a.id == "B").unwrap();
        assert_eq!(b.predecessors, vec!["A".to_string()]);
    }

    #[test]
    fn output_is_sorted_by_id() {
        let mut project = Project::new("p");
        project.activity_add(Task::new("Z")).unwrap();
        project.activity_add(Task::new("A")).unwrap();
        let activities = from_project(&project);
        assert_eq!(activities[0].id, "A");
        assert_eq!(activities[1].id, "Z");
    }
}
