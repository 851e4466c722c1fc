//! # projgraph-parser
//!
//! A reference (non-normative) DSL front end for `.pgraph` files, lowering
//! source text to the generic AST that `projgraph-interp` consumes. The
//! interpreter's own contract is the AST shape, not this grammar — any
//! other front end (hand-rolled tokenizer, tree-sitter binding) can target
//! it without going through this crate.
//!
//! ## Example
//!
//! ```rust
//! use projgraph_parser::parse;
//! use projgraph_core::Project;
//!
//! let input = "A > B\nB(duration: 5)\n";
//! let ast = parse(input).unwrap();
//! let mut project = Project::new("demo");
//! projgraph_interp::interpret(&ast, &mut project).unwrap();
//! assert_eq!(project.dependencies.len(), 1);
//! ```

mod native;

use projgraph_interp::AstNode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax { line: usize, column: usize, message: String },

    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Parse `.pgraph` source text into the AST `projgraph_interp::interpret`
/// consumes.
pub fn parse(input: &str) -> Result<AstNode, ParseError> {
    native::parse(input)
}

/// Read `path` and parse it as `.pgraph` source text.
pub fn parse_file(path: &std::path::Path) -> Result<AstNode, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|e| ParseError::InvalidValue(e.to_string()))?;
    parse(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use projgraph_core::Project;

    #[test]
    fn parse_then_interpret_end_to_end() {
        let ast = parse("A\nB\nA > B\n").unwrap();
        let mut project = Project::new("p");
        projgraph_interp::interpret(&ast, &mut project).unwrap();
        assert_eq!(project.tasks.len(), 2);
        assert_eq!(project.dependencies.len(), 1);
    }

    #[test]
    fn parse_file_rejects_missing_path() {
        let err = parse_file(std::path::Path::new("/nonexistent/path.pgraph")).unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue(_)));
    }
}
