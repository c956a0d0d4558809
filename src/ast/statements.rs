use std::slice::Iter;

use crate::Span;

use super::expressions::Expr;

/// A type annotation as written, e.g. `int`. Resolved by the type checker.
#[derive(Debug, Clone)]
pub struct DataType {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub data_type: DataType,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: DataType,
    pub body: Vec<Stmt>,
}

impl FnDecl {
    pub fn iter(&self) -> Iter<'_, Stmt> {
        self.body.iter()
    }
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Print(Expr),
    VarDecl {
        name: String,
        data_type: DataType,
        value: Option<Expr>,
    },
    ConstDecl {
        name: String,
        value: Expr,
    },
    /// `name <- value;`
    Write {
        name: String,
        value: Expr,
    },
    If {
        condition: Expr,
        true_block: Vec<Stmt>,
        /// Empty when the source has no `else`.
        false_block: Vec<Stmt>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    FnDecl(FnDecl),
    Return(Expr),
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }

    pub fn line(&self) -> u32 {
        self.span.start.line
    }
}
