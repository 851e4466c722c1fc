//! Critical Path Method implementation.
//!
//! Activity-on-node graph over a flat arena (`Vec<Node>`) addressed by
//! index, so shared predecessors/successors never need `Rc`/`RefCell`.
//!
//! # Algorithm
//!
//! 1. Graph construction: wire predecessor/successor adjacency and emit an
//!    arrow per discovered edge. A start is a node with no predecessors, an
//!    end is a node with no successors.
//! 2. Forward pass, driven from every start, recursing into successors:
//!    `earliestStart(n) = max(earliestFinish(p) for p in predecessors(n))`,
//!    `earliestFinish(n) = round1(earliestStart(n) + duration(n))`. Each
//!    node's own predecessors are computed first if not already done, so
//!    traversal order never matters.
//! 3. Backward pass, seeded at the end set: every end's `latestFinish`
//!    is leveled to the maximum `earliestFinish` across all ends (so a
//!    multi-ender graph still has one well-defined project finish), then
//!    `latestStart`/`slack` follow from that. Recursing into predecessors:
//!    `latestFinish(n) = min(latestStart(s) for s in successors(n))`,
//!    computing any not-yet-done successor first.
//! 4. Critical path: from the subset of the end set that actually reaches
//!    the project finish (largest `earliestFinish` among ends, ties
//!    included), walk upstream repeatedly selecting, among a node's
//!    predecessors, those with the largest `earliestFinish` (ties
//!    included); every such edge is marked critical. An early-finishing
//!    end with positive slack never seeds the walk, so it contributes no
//!    critical arrows.

use crate::activity_view::ActivityInput;
use crate::estimator::round1;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpmError {
    #[error("cycle detected in project `{project}`: {reason}")]
    CycleDetected { project: String, reason: &'static str },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
}

/// A scheduled activity: the original activity data plus every CPM-computed
/// field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub title: String,
    pub description: String,
    pub meta: HashMap<String, String>,
    pub position: NodePosition,

    pub duration: f64,
    #[serde(rename = "durationLow")]
    pub duration_low: f64,
    #[serde(rename = "durationLikely")]
    pub duration_likely: f64,
    #[serde(rename = "durationHigh")]
    pub duration_high: f64,
    pub label: String,

    #[serde(rename = "earliestStart")]
    pub earliest_start: f64,
    #[serde(rename = "earliestFinish")]
    pub earliest_finish: f64,
    #[serde(rename = "latestStart")]
    pub latest_start: f64,
    #[serde(rename = "latestFinish")]
    pub latest_finish: f64,
    pub slack: f64,

    #[serde(skip)]
    predecessors: Vec<usize>,
    #[serde(skip)]
    required_by: Vec<usize>,
    #[serde(skip)]
    fwd_done: bool,
    #[serde(skip)]
    bwd_done: bool,
}

impl Node {
    pub fn is_critical(&self) -> bool {
        self.slack == 0.0
    }
}

/// A precedence edge in the computed chart, flagged if it lies on a critical
/// path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "criticalPath")]
    pub critical_path: bool,
}

/// The full scheduling result for one run of [`calculate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chart {
    pub nodes: Vec<Node>,
    pub arrows: Vec<Arrow>,
    pub id: String,
    pub title: String,
}

impl Chart {
    pub fn project_finish(&self) -> f64 {
        self.nodes.iter().map(|n| n.earliest_finish).fold(0.0_f64, f64::max)
    }

    pub fn critical_path_node_ids(&self) -> Vec<&str> {
        self.nodes.iter().filter(|n| n.is_critical()).map(|n| n.id.as_str()).collect()
    }
}

fn node_from_activity(a: &ActivityInput) -> Node {
    Node {
        id: a.id.clone(),
        title: a.title.clone(),
        description: a.description.clone(),
        meta: a.meta.clone(),
        position: NodePosition::default(),
        duration: a.duration,
        duration_low: a.duration_low,
        duration_likely: a.duration_likely,
        duration_high: a.duration_high,
        label: a.title.clone(),
        earliest_start: 0.0,
        earliest_finish: a.duration,
        latest_start: 0.0,
        latest_finish: a.duration,
        slack: 0.0,
        predecessors: Vec::new(),
        required_by: Vec::new(),
        fwd_done: false,
        bwd_done: false,
    }
}

struct Build {
    nodes: Vec<Node>,
    arrows: Vec<Arrow>,
    starts: Vec<usize>,
    ends: Vec<usize>,
}

fn build_nodes_arrows(activities: &[ActivityInput]) -> Build {
    let mut nodes = Vec::with_capacity(activities.len());
    let mut index_of: HashMap<&str, usize> = HashMap::new();
    for a in activities {
        index_of.insert(a.id.as_str(), nodes.len());
        nodes.push(node_from_activity(a));
    }

    let mut arrows = Vec::new();
    for a in activities {
        let idx = index_of[a.id.as_str()];
        for pred in &a.predecessors {
            // An id with no matching activity is assumed validated upstream; skip it.
            let Some(&pidx) = index_of.get(pred.as_str()) else { continue };
            nodes[idx].predecessors.push(pidx);
            nodes[pidx].required_by.push(idx);
            arrows.push(Arrow {
                id: format!("{}->{}", nodes[pidx].id, nodes[idx].id),
                from: nodes[pidx].id.clone(),
                to: nodes[idx].id.clone(),
                critical_path: false,
            });
        }
    }

    let mut starts = Vec::new();
    let mut ends = Vec::new();
    for (i, n) in nodes.iter().enumerate() {
        if n.predecessors.is_empty() {
            starts.push(i);
        }
        if n.required_by.is_empty() {
            ends.push(i);
        }
    }

    Build { nodes, arrows, starts, ends }
}

fn set_earliest(nodes: &mut [Node], idx: usize) -> (f64, f64) {
    if nodes[idx].fwd_done {
        return (nodes[idx].earliest_start, nodes[idx].earliest_finish);
    }
    let preds = nodes[idx].predecessors.clone();
    let mut earliest_start = 0.0_f64;
    for p in preds {
        let (_, finish) = set_earliest(nodes, p);
        earliest_start = earliest_start.max(finish);
    }
    nodes[idx].earliest_start = earliest_start;
    nodes[idx].earliest_finish = round1(earliest_start + nodes[idx].duration);
    nodes[idx].fwd_done = true;
    (nodes[idx].earliest_start, nodes[idx].earliest_finish)
}

fn do_forward_pass(nodes: &mut [Node], idx: usize) {
    set_earliest(nodes, idx);
    for succ in nodes[idx].required_by.clone() {
        do_forward_pass(nodes, succ);
    }
}

/// Seeds every end node's latest times from its own earliest times, then
/// levels `latestFinish` to the maximum across the whole end set so a
/// multi-ender graph has one well-defined project finish.
fn level_ends(nodes: &mut [Node], ends: &[usize]) {
    let max_finish = ends.iter().map(|&e| nodes[e].earliest_finish).fold(0.0_f64, f64::max);
    for &e in ends {
        nodes[e].latest_finish = max_finish;
        nodes[e].latest_start = round1(max_finish - nodes[e].duration);
        nodes[e].slack = round1(max_finish - nodes[e].earliest_finish);
        nodes[e].bwd_done = true;
    }
}

fn set_latest(nodes: &mut [Node], idx: usize) -> (f64, f64) {
    if nodes[idx].bwd_done {
        return (nodes[idx].latest_start, nodes[idx].latest_finish);
    }
    let succs = nodes[idx].required_by.clone();
    let mut latest_finish = f64::INFINITY;
    for s in succs {
        let (start, _) = set_latest(nodes, s);
        latest_finish = latest_finish.min(start);
    }
    nodes[idx].latest_finish = latest_finish;
    nodes[idx].latest_start = round1(latest_finish - nodes[idx].duration);
    nodes[idx].slack = round1(latest_finish - nodes[idx].earliest_finish);
    nodes[idx].bwd_done = true;
    (nodes[idx].latest_start, nodes[idx].latest_finish)
}

fn do_backward_pass(nodes: &mut [Node], idx: usize) {
    set_latest(nodes, idx);
    for pred in nodes[idx].predecessors.clone() {
        do_backward_pass(nodes, pred);
    }
}

/// Among `candidates`, the subset with the largest `earliestFinish` (ties
/// included).
fn find_latest(nodes: &[Node], candidates: &[usize]) -> Vec<usize> {
    let max_finish = candidates.iter().map(|&i| nodes[i].earliest_finish).fold(f64::MIN, f64::max);
    candidates.iter().copied().filter(|&i| nodes[i].earliest_finish == max_finish).collect()
}

fn add_to_critical_path(nodes: &[Node], idx: usize, critical_arrows: &mut HashSet<String>) {
    if nodes[idx].predecessors.is_empty() {
        return;
    }
    for p in find_latest(nodes, &nodes[idx].predecessors) {
        critical_arrows.insert(format!("{}->{}", nodes[p].id, nodes[idx].id));
        add_to_critical_path(nodes, p, critical_arrows);
    }
}

fn find_critical_path(nodes: &[Node], ends: &[usize], arrows: &mut [Arrow]) {
    let mut critical_arrows = HashSet::new();
    for &e in &find_latest(nodes, ends) {
        add_to_critical_path(nodes, e, &mut critical_arrows);
    }
    for arrow in arrows.iter_mut() {
        if critical_arrows.contains(&arrow.id) {
            arrow.critical_path = true;
        }
    }
}

/// Build the activity-on-node graph for `activities`, run the forward and
/// backward passes, and mark every arrow lying on a critical path.
///
/// An empty `activities` slice yields an empty chart with no error. Missing
/// predecessor ids are silently ignored — referential integrity is assumed
/// to have been validated upstream.
pub fn calculate(
    activities: &[ActivityInput],
    id: impl Into<String>,
    title: impl Into<String>,
) -> Result<Chart, CpmError> {
    let id = id.into();
    let title = title.into();
    if activities.is_empty() {
        return Ok(Chart { nodes: Vec::new(), arrows: Vec::new(), id, title });
    }

    let Build { mut nodes, mut arrows, starts, ends } = build_nodes_arrows(activities);

    if starts.is_empty() {
        return Err(CpmError::CycleDetected { project: id, reason: "no starts found" });
    }
    if ends.is_empty() {
        return Err(CpmError::CycleDetected { project: id, reason: "no ends found" });
    }

    for &s in &starts {
        do_forward_pass(&mut nodes, s);
    }

    level_ends(&mut nodes, &ends);
    for &e in &ends {
        do_backward_pass(&mut nodes, e);
    }

    find_critical_path(&nodes, &ends, &mut arrows);

    Ok(Chart { nodes, arrows, id, title })
}
