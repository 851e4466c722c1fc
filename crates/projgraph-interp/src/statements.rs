//! Statement dispatch: one function per AST statement tag.

use crate::ast::AstNode;
use crate::error::InterpError;
use projgraph_core::{Attributes, EntityKind, Milestone, Project, Resource, Task};

pub fn dispatch(node: &AstNode, project: &mut Project) -> Result<(), InterpError> {
    match node.tag.as_str() {
        "dependency" => handle_dependency(node, project),
        "task_split_operation" => handle_task_split(node, project),
        "entity_create_or_update" => handle_entity_create_or_update(node, project),
        "entity_remove" => handle_entity_remove(node, project),
        "task_explode_implode" | "cluster_operation" | "resource_assignment" => {
            Err(InterpError::NotImplemented(node.tag.clone()))
        }
        // Structural nodes (newlines, comments) reach here too; they are no-ops.
        _ => Ok(()),
    }
}

fn extract_attrs(node: &AstNode) -> Attributes {
    let mut attrs = Attributes::new();
    let Some(bag) = node.children.iter().find(|c| c.tag == "attributes") else {
        return attrs;
    };
    for attr in &bag.children {
        if attr.tag != "attribute" || attr.children.len() < 2 {
            continue;
        }
        if let (Some(k), Some(v)) = (attr.children[0].value.as_deref(), attr.children[1].value.as_deref()) {
            attrs.insert(k.to_string(), v.to_string());
        }
    }
    attrs
}

fn extract_task(node: &AstNode) -> Option<Task> {
    let id = node.find_identifier()?;
    Some(Task { id: id.to_string(), attributes: extract_attrs(node) })
}

fn extract_milestone(node: &AstNode) -> Option<Milestone> {
    let id = node.find_identifier()?;
    Some(Milestone { id: id.to_string(), attributes: extract_attrs(node) })
}

fn extract_resource(node: &AstNode) -> Option<Resource> {
    let id = node.find_identifier()?;
    Some(Resource { id: id.to_string(), attributes: extract_attrs(node) })
}

fn handle_entity_create_or_update(node: &AstNode, project: &mut Project) -> Result<(), InterpError> {
    for child in &node.children {
        match child.tag.as_str() {
            "entity" => handle_entity_create_or_update(child, project)?,
            "task" => {
                let t = extract_task(child).ok_or_else(|| InterpError::MalformedInput("task missing id".into()))?;
                project.task_upsert(t);
            }
            "milestone" => {
                let m = extract_milestone(child)
                    .ok_or_else(|| InterpError::MalformedInput("milestone missing id".into()))?;
                project.milestone_upsert(m);
            }
            "resource" => {
                let r = extract_resource(child)
                    .ok_or_else(|| InterpError::MalformedInput("resource missing id".into()))?;
                project.resource_upsert(r);
            }
            _ => {}
        }
    }
    Ok(())
}

fn find_entity_kind_node(node: &AstNode) -> Option<&AstNode> {
    if matches!(node.tag.as_str(), "task" | "milestone" | "resource") {
        return Some(node);
    }
    node.children.iter().find_map(find_entity_kind_node)
}

fn handle_entity_remove(node: &AstNode, project: &mut Project) -> Result<(), InterpError> {
    let target = find_entity_kind_node(node)
        .ok_or_else(|| InterpError::MalformedInput("entity_remove has no target entity".into()))?;
    let kind = match target.tag.as_str() {
        "task" => EntityKind::Task,
        "milestone" => EntityKind::Milestone,
        "resource" => EntityKind::Resource,
        other => return Err(InterpError::BadEntityKind(other.to_string())),
    };
    let id = target
        .find_identifier()
        .ok_or_else(|| InterpError::MalformedInput("entity_remove target missing id".into()))?;
    project.entity_remove(id, kind);
    Ok(())
}

fn handle_task_split(node: &AstNode, project: &mut Project) -> Result<(), InterpError> {
    let mut new_idx = None;
    let mut target_node = None;
    for (i, child) in node.children.iter().enumerate() {
        match child.tag.as_str() {
            "new_task_sigil" => new_idx = Some(i),
            "task" => target_node = Some(child),
            _ => {}
        }
    }
    let target = target_node
        .and_then(AstNode::find_identifier)
        .ok_or_else(|| InterpError::MalformedInput("task_split_operation missing task".into()))?;
    if new_idx == Some(0) {
        project.activity_insert_before(target)?;
    } else {
        project.activity_insert_after(target)?;
    }
    Ok(())
}

/// One endpoint of a dependency chain operand: an entity id plus its kind.
type Endpoint = (String, EntityKind);

fn handle_dependency(node: &AstNode, project: &mut Project) -> Result<(), InterpError> {
    let mut left: Vec<Endpoint> = Vec::new();
    let mut right: Vec<Endpoint> = Vec::new();
    let mut on_right = false;
    let mut negate = false;

    for child in &node.children {
        match child.tag.as_str() {
            "negation_op" => negate = true,
            "required_by_op" => on_right = true,
            "milestone" => {
                let m = extract_milestone(child)
                    .ok_or_else(|| InterpError::MalformedInput("milestone missing id".into()))?;
                let id = m.id.clone();
                project.milestone_upsert(m);
                left = std::mem::take(&mut right);
                right = vec![(id, EntityKind::Milestone)];
                if on_right && !right.is_empty() {
                    apply_dep_expr(project, &left, &right, negate)?;
                }
            }
            "tasks" => {
                let mut ids = Vec::new();
                for c in &child.children {
                    if c.tag == "task" {
                        let t = extract_task(c).ok_or_else(|| InterpError::MalformedInput("task missing id".into()))?;
                        ids.push((t.id.clone(), EntityKind::Task));
                        project.task_upsert(t);
                    }
                }
                left = std::mem::take(&mut right);
                right = ids;
                if on_right && !right.is_empty() {
                    apply_dep_expr(project, &left, &right, negate)?;
                    negate = false;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn apply_dep_expr(project: &mut Project, left: &[Endpoint], right: &[Endpoint], negate: bool) -> Result<(), InterpError> {
    for (lid, lkind) in left {
        for (rid, rkind) in right {
            if negate {
                project.dependency_remove(lid, *lkind, rid, *rkind);
            } else if lid != rid || lkind != rkind {
                project.dependency_add(lid.clone(), *lkind, rid.clone(), *rkind)?;
            }
        }
    }
    Ok(())
}
