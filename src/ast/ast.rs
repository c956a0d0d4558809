use std::slice::Iter;

use crate::Span;

use super::statements::Stmt;

/// Root of a parsed compilation unit.
///
/// Statements appear in source order. Function declarations and global
/// statements are interleaved exactly as written.
#[derive(Debug, Clone)]
pub struct Program {
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl Program {
    pub fn iter(&self) -> Iter<'_, Stmt> {
        self.body.iter()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
