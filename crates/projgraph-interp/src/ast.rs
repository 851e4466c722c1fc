//! The generic AST node consumed by the interpreter.

/// A single node in the tree a front end lowers source text to.
///
/// `value` is set only on leaves (the exact source slice); interior nodes
/// carry their meaning entirely in `tag` and `children`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AstNode {
    pub tag: String,
    pub value: Option<String>,
    pub children: Vec<AstNode>,
}

impl AstNode {
    pub fn leaf(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self { tag: tag.into(), value: Some(value.into()), children: Vec::new() }
    }

    pub fn with_children(tag: impl Into<String>, children: Vec<AstNode>) -> Self {
        Self { tag: tag.into(), value: None, children }
    }

    /// Depth-first search for the first descendant `identifier` leaf's value.
    pub fn find_identifier(&self) -> Option<&str> {
        if self.tag == "identifier" {
            return self.value.as_deref();
        }
        self.children.iter().find_map(Self::find_identifier)
    }
}
