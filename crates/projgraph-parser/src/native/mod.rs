//! Native DSL parser for `.pgraph` files, built on `pest`.
//!
//! This module only lowers source text into the generic
//! [`projgraph_interp::AstNode`] tree; it knows nothing about what the
//! statements mean. Interpretation happens in `projgraph-interp`.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use projgraph_interp::AstNode;

use crate::ParseError;

#[derive(Parser)]
#[grammar = "native/grammar.pest"]
struct DslParser;

/// Parse `input` into the root AST node the interpreter consumes.
pub fn parse(input: &str) -> Result<AstNode, ParseError> {
    let mut pairs = DslParser::parse(Rule::file, input).map_err(|e| {
        let (line, column) = match e.line_col {
            pest::error::LineColLocation::Pos((l, c)) => (l, c),
            pest::error::LineColLocation::Span((l, c), _) => (l, c),
        };
        ParseError::Syntax { line, column, message: e.variant.message().to_string() }
    })?;

    let file_pair = pairs.next().expect("file rule always produces one pair");
    let mut children = Vec::new();
    for pair in file_pair.into_inner() {
        match pair.as_rule() {
            Rule::entity_decl => children.push(lower_entity_decl(pair)?),
            Rule::entity_remove => children.push(lower_entity_remove(pair)?),
            Rule::task_split => children.push(lower_task_split(pair)?),
            Rule::dependency_stmt => children.push(lower_dependency_stmt(pair)?),
            Rule::EOI => {}
            _ => {}
        }
    }
    Ok(AstNode::with_children("root", children))
}

fn lower_entity(pair: Pair<Rule>) -> Result<AstNode, ParseError> {
    match pair.as_rule() {
        Rule::task => lower_task(pair),
        Rule::milestone => lower_milestone(pair),
        Rule::resource => lower_resource(pair),
        other => Err(ParseError::InvalidValue(format!("expected an entity, found {other:?}"))),
    }
}

fn lower_task(pair: Pair<Rule>) -> Result<AstNode, ParseError> {
    let mut children = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::identifier => children.push(AstNode::leaf("identifier", inner.as_str())),
            Rule::attributes => children.push(lower_attributes(inner)?),
            _ => {}
        }
    }
    Ok(AstNode::with_children("task", children))
}

fn lower_milestone(pair: Pair<Rule>) -> Result<AstNode, ParseError> {
    let mut children = vec![AstNode::leaf("sigil", "%")];
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::identifier => children.push(AstNode::leaf("identifier", inner.as_str())),
            Rule::attributes => children.push(lower_attributes(inner)?),
            _ => {}
        }
    }
    Ok(AstNode::with_children("milestone", children))
}

fn lower_resource(pair: Pair<Rule>) -> Result<AstNode, ParseError> {
    let mut children = vec![AstNode::leaf("sigil", "$")];
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::identifier => children.push(AstNode::leaf("identifier", inner.as_str())),
            Rule::attributes => children.push(lower_attributes(inner)?),
            _ => {}
        }
    }
    Ok(AstNode::with_children("resource", children))
}

fn lower_attributes(pair: Pair<Rule>) -> Result<AstNode, ParseError> {
    let mut attrs = Vec::new();
    for attr in pair.into_inner() {
        let mut parts = attr.into_inner();
        let key = parts.next().ok_or_else(|| ParseError::InvalidValue("attribute missing key".into()))?;
        let value = parts.next().ok_or_else(|| ParseError::InvalidValue("attribute missing value".into()))?;
        let unquoted = value.as_str().trim_matches('"');
        attrs.push(AstNode::with_children(
            "attribute",
            vec![AstNode::leaf("key", key.as_str()), AstNode::leaf("value", unquoted)],
        ));
    }
    Ok(AstNode::with_children("attributes", attrs))
}

fn lower_entity_decl(pair: Pair<Rule>) -> Result<AstNode, ParseError> {
    let entity = pair.into_inner().next().ok_or_else(|| ParseError::InvalidValue("empty entity declaration".into()))?;
    Ok(AstNode::with_children("entity_create_or_update", vec![lower_entity(entity)?]))
}

fn lower_entity_remove(pair: Pair<Rule>) -> Result<AstNode, ParseError> {
    let entity = pair.into_inner().next().ok_or_else(|| ParseError::InvalidValue("empty entity removal".into()))?;
    Ok(AstNode::with_children("entity_remove", vec![lower_entity(entity)?]))
}

fn lower_task_split(pair: Pair<Rule>) -> Result<AstNode, ParseError> {
    let mut children = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::new_task_sigil => children.push(AstNode::leaf("new_task_sigil", "*")),
            Rule::task => children.push(lower_task(inner)?),
            _ => {}
        }
    }
    Ok(AstNode::with_children("task_split_operation", children))
}

/// A `tasks_group` lowers to either a singleton `milestone` node (when the
/// chain operand is exactly one milestone — `%M > A`) or a `tasks` node
/// wrapping every task in the group (`A, B > C`). Mixed groups and resource
/// operands aren't meaningful in a dependency chain.
fn lower_tasks_group(pair: Pair<Rule>) -> Result<AstNode, ParseError> {
    let entities: Vec<Pair<Rule>> = pair.into_inner().collect();
    if entities.len() == 1 && entities[0].as_rule() == Rule::milestone {
        return lower_milestone(entities.into_iter().next().unwrap());
    }
    let mut tasks = Vec::with_capacity(entities.len());
    for entity in entities {
        match entity.as_rule() {
            Rule::task => tasks.push(lower_task(entity)?),
            other => {
                return Err(ParseError::InvalidValue(format!(
                    "only tasks, or a single milestone, are valid dependency-chain operands; found {other:?}"
                )))
            }
        }
    }
    Ok(AstNode::with_children("tasks", tasks))
}

fn lower_dependency_stmt(pair: Pair<Rule>) -> Result<AstNode, ParseError> {
    let mut children = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::tasks_group => children.push(lower_tasks_group(inner)?),
            Rule::negation_op => children.push(AstNode::leaf("negation_op", "~")),
            Rule::required_by_op => children.push(AstNode::leaf("required_by_op", ">")),
            _ => {}
        }
    }
    Ok(AstNode::with_children("dependency", children))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_task_declaration() {
        let ast = parse("A\n").unwrap();
        assert_eq!(ast.children.len(), 1);
        assert_eq!(ast.children[0].tag, "entity_create_or_update");
    }

    #[test]
    fn parses_task_with_attributes() {
        let ast = parse(r#"A(duration: 6, title: "Do thing")"#).unwrap();
        let task = &ast.children[0].children[0];
        assert_eq!(task.tag, "task");
        let attrs = task.children.iter().find(|c| c.tag == "attributes").unwrap();
        assert_eq!(attrs.children.len(), 2);
    }

    #[test]
    fn parses_milestone_declaration() {
        let ast = parse("%M\n").unwrap();
        let milestone = &ast.children[0].children[0];
        assert_eq!(milestone.tag, "milestone");
        assert_eq!(milestone.find_identifier(), Some("M"));
    }

    #[test]
    fn parses_entity_removal() {
        let ast = parse("~ T\n").unwrap();
        assert_eq!(ast.children[0].tag, "entity_remove");
    }

    #[test]
    fn parses_dependency_chain_with_cartesian_groups() {
        let ast = parse("A, B > C, D\n").unwrap();
        let dep = &ast.children[0];
        assert_eq!(dep.tag, "dependency");
        let groups: Vec<_> = dep.children.iter().filter(|c| c.tag == "tasks").collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].children.len(), 2);
    }

    #[test]
    fn parses_dependency_to_milestone() {
        let ast = parse("A > %M\n").unwrap();
        let dep = &ast.children[0];
        assert!(dep.children.iter().any(|c| c.tag == "milestone"));
    }

    #[test]
    fn parses_negated_dependency() {
        let ast = parse("A ~> B\n").unwrap();
        let dep = &ast.children[0];
        assert!(dep.children.iter().any(|c| c.tag == "negation_op"));
    }

    #[test]
    fn parses_task_split_before() {
        let ast = parse("* > X\n").unwrap();
        let split = &ast.children[0];
        assert_eq!(split.tag, "task_split_operation");
        assert_eq!(split.children[0].tag, "new_task_sigil");
    }

    #[test]
    fn parses_task_split_after() {
        let ast = parse("X > *\n").unwrap();
        let split = &ast.children[0];
        assert_eq!(split.children[0].tag, "task");
        assert_eq!(split.children[1].tag, "new_task_sigil");
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let ast = parse("# a comment\n\nA\n# trailing\n").unwrap();
        assert_eq!(ast.children.len(), 1);
    }
}
