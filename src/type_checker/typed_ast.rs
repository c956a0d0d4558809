//! Annotated tree produced by the type checker.
//!
//! Mirrors the parsed AST, with every node carrying an optional resolved
//! [`Type`]. `None` marks a node that was already reported as invalid; it
//! suppresses further diagnostics built on top of it.

use crate::ast::expressions::{BinaryOperator, Literal, UnaryOperator};

use super::types::Type;

#[derive(Debug, Clone, PartialEq)]
pub enum TypedExprKind {
    Literal(Literal),
    Read {
        name: String,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<TypedExpr>,
    },
    Call {
        name: String,
        arguments: Vec<TypedExpr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr {
    pub kind: TypedExprKind,
    pub ty: Option<Type>,
    pub line: u32,
}

impl TypedExpr {
    pub fn is_resolved(&self) -> bool {
        self.ty.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedParam {
    pub name: String,
    pub ty: Option<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedFnDecl {
    pub name: String,
    pub params: Vec<TypedParam>,
    pub return_type: Option<Type>,
    pub body: Vec<TypedStmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedStmtKind {
    Print(TypedExpr),
    VarDecl {
        name: String,
        value: Option<TypedExpr>,
    },
    ConstDecl {
        name: String,
        value: TypedExpr,
    },
    Write {
        name: String,
        value: TypedExpr,
    },
    If {
        condition: TypedExpr,
        true_block: Vec<TypedStmt>,
        false_block: Vec<TypedStmt>,
    },
    While {
        condition: TypedExpr,
        body: Vec<TypedStmt>,
    },
    FnDecl(TypedFnDecl),
    Return(TypedExpr),
}

/// A checked statement.
///
/// `ty` is the declared type for declarations, the stored type for writes,
/// the printed or returned type for `print`/`return`, the condition's type
/// for `if`/`while` and the return type for functions.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedStmt {
    pub kind: TypedStmtKind,
    pub ty: Option<Type>,
    pub line: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedProgram {
    pub body: Vec<TypedStmt>,
}

impl TypedProgram {
    /// Every function declaration in source order, including the ones
    /// declared inside a top-level `if` or `while`.
    pub fn functions(&self) -> Vec<&TypedFnDecl> {
        let mut functions = Vec::new();
        collect_functions(&self.body, &mut functions);
        functions
    }

    /// Top-level statements that are not function declarations, in source
    /// order. Nested declarations are skipped when their block is lowered.
    pub fn global_statements(&self) -> impl Iterator<Item = &TypedStmt> {
        self.body
            .iter()
            .filter(|stmt| !matches!(stmt.kind, TypedStmtKind::FnDecl(_)))
    }
}

fn collect_functions<'a>(block: &'a [TypedStmt], functions: &mut Vec<&'a TypedFnDecl>) {
    for stmt in block {
        match &stmt.kind {
            TypedStmtKind::FnDecl(function) => functions.push(function),
            TypedStmtKind::If {
                true_block,
                false_block,
                ..
            } => {
                collect_functions(true_block, functions);
                collect_functions(false_block, functions);
            }
            TypedStmtKind::While { body, .. } => collect_functions(body, functions),
            _ => {}
        }
    }
}
