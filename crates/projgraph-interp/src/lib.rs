//! # projgraph-interp
//!
//! An interpreter that walks a generic tagged AST and applies its statements
//! to a [`projgraph_core::Project`]. The AST shape is deliberately minimal so
//! any front end — a hand-rolled tokenizer, a `pest` grammar, a tree-sitter
//! binding — can target it without this crate knowing anything about source
//! text or grammars.

mod ast;
mod error;
mod statements;

pub use ast::AstNode;
pub use error::InterpError;

use projgraph_core::Project;

/// Apply every top-level statement in `ast` to `project`, in order.
///
/// Each statement is dispatched on the tag of its immediate AST node; unknown
/// tags are ignored (they are assumed to be structural, like `newline`), and
/// the three reserved tags named in the statement table return
/// [`InterpError::NotImplemented`].
pub fn interpret(ast: &AstNode, project: &mut Project) -> Result<(), InterpError> {
    for child in &ast.children {
        statements::dispatch(child, project)?;
    }
    Ok(())
}
