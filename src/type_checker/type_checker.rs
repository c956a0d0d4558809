use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{
        ast::Program,
        expressions::{Expr, ExprKind, Literal},
        statements::{DataType, FnDecl, Stmt, StmtKind},
    },
    errors::{diagnostics::Diagnostics, errors::SemanticError},
};

use super::{
    scope::{Scope, Symbol, SymbolKind},
    typed_ast::{
        TypedExpr, TypedExprKind, TypedFnDecl, TypedParam, TypedProgram, TypedStmt, TypedStmtKind,
    },
    types::Type,
};

/// Name of the source function the native entry point calls.
pub const ENTRY_FUNCTION: &str = "main";

/// Signature of a function that may be called.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: String,
    /// `None` entries are parameters whose type did not resolve.
    pub params: Vec<Option<Type>>,
    pub return_type: Option<Type>,
    pub line: u32,
}

/// Result of checking one compilation unit.
#[derive(Debug)]
pub struct Analysis {
    pub program: TypedProgram,
    pub diagnostics: Diagnostics,
}

impl Analysis {
    /// True when later stages may run.
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// State of the function body being checked.
struct CurrentFunction {
    signature: FunctionSignature,
    saw_return: bool,
    matching_return: bool,
}

/// Single-pass checker that collects every independent error.
///
/// It never stops on an error: the offending node is annotated with `None`
/// and checking continues. Expressions built on an unresolved operand stay
/// unresolved without reporting again.
pub struct TypeChecker {
    diagnostics: Diagnostics,
    /// Functions that became callable, i.e. have at least one well-typed return.
    functions: HashMap<String, FunctionSignature>,
    /// Line of the first declaration of every function name seen so far.
    declared_functions: HashMap<String, u32>,
    current: Option<CurrentFunction>,
}

impl TypeChecker {
    pub fn new(file: Option<Rc<String>>) -> Self {
        TypeChecker {
            diagnostics: Diagnostics::new(file),
            functions: HashMap::new(),
            declared_functions: HashMap::new(),
            current: None,
        }
    }

    fn report(&mut self, line: u32, error: SemanticError) {
        self.diagnostics.report(line, error);
    }

    /// Callable functions, keyed by name.
    pub fn functions(&self) -> &HashMap<String, FunctionSignature> {
        &self.functions
    }

    fn resolve_type(&mut self, data_type: &DataType) -> Option<Type> {
        let ty = Type::from_name(&data_type.name);
        if ty.is_none() {
            self.report(
                data_type.span.start.line,
                SemanticError::UnknownType {
                    name: data_type.name.clone(),
                },
            );
        }
        ty
    }

    fn check_block(&mut self, block: &[Stmt], scope: &mut Scope<'_>) -> Vec<TypedStmt> {
        block
            .iter()
            .map(|stmt| self.check_stmt(stmt, scope))
            .collect()
    }

    pub fn check_stmt(&mut self, stmt: &Stmt, scope: &mut Scope<'_>) -> TypedStmt {
        let line = stmt.line();

        let (kind, ty) = match &stmt.kind {
            StmtKind::Print(value) => {
                let value = self.check_expr(value, scope);
                let ty = value.ty;
                (TypedStmtKind::Print(value), ty)
            }
            StmtKind::VarDecl {
                name,
                data_type,
                value,
            } => return self.check_var_decl(name, data_type, value.as_ref(), line, scope),
            StmtKind::ConstDecl { name, value } => {
                return self.check_const_decl(name, value, line, scope)
            }
            StmtKind::Write { name, value } => return self.check_write(name, value, line, scope),
            StmtKind::If {
                condition,
                true_block,
                false_block,
            } => {
                let condition = self.check_condition(condition, scope);
                // Both arms share the enclosing scope
                let true_block = self.check_block(true_block, scope);
                let false_block = self.check_block(false_block, scope);
                let ty = condition.ty;

                (
                    TypedStmtKind::If {
                        condition,
                        true_block,
                        false_block,
                    },
                    ty,
                )
            }
            StmtKind::While { condition, body } => {
                let condition = self.check_condition(condition, scope);
                let body = self.check_block(body, scope);
                let ty = condition.ty;

                (TypedStmtKind::While { condition, body }, ty)
            }
            StmtKind::FnDecl(function) => return self.check_function(function, line, scope),
            StmtKind::Return(value) => {
                let value = self.check_expr(value, scope);
                self.check_return(&value, line);
                let ty = value.ty;
                (TypedStmtKind::Return(value), ty)
            }
        };

        TypedStmt { kind, ty, line }
    }

    fn check_var_decl(
        &mut self,
        name: &str,
        data_type: &DataType,
        value: Option<&Expr>,
        line: u32,
        scope: &mut Scope<'_>,
    ) -> TypedStmt {
        let value = value.map(|value| self.check_expr(value, scope));
        let mut ty = None;

        if Type::is_type_name(name) {
            self.report(
                line,
                SemanticError::IllegalName {
                    name: name.to_string(),
                },
            );
        } else if let Some(existing) = scope.lookup_local(name) {
            let previous_line = existing.line;
            self.report(
                line,
                SemanticError::AlreadyDefined {
                    name: name.to_string(),
                    previous_line,
                },
            );
        } else if let Some(declared) = self.resolve_type(data_type) {
            let received = value.as_ref().and_then(|value| value.ty);

            match received {
                Some(received) if received != declared => self.report(
                    line,
                    SemanticError::DeclarationMismatch {
                        name: name.to_string(),
                        declared: declared.to_string(),
                        received: received.to_string(),
                    },
                ),
                _ => {
                    ty = Some(declared);
                    let _ = scope.declare(Symbol::new(name, ty, SymbolKind::Var, line));
                }
            }
        }

        TypedStmt {
            kind: TypedStmtKind::VarDecl {
                name: name.to_string(),
                value,
            },
            ty,
            line,
        }
    }

    fn check_const_decl(
        &mut self,
        name: &str,
        value: &Expr,
        line: u32,
        scope: &mut Scope<'_>,
    ) -> TypedStmt {
        let value = self.check_expr(value, scope);
        let ty = value.ty;

        if Type::is_type_name(name) {
            self.report(
                line,
                SemanticError::IllegalName {
                    name: name.to_string(),
                },
            );
        } else if let Err(previous_line) =
            scope.declare(Symbol::new(name, ty, SymbolKind::Const, line))
        {
            self.report(
                line,
                SemanticError::AlreadyDefined {
                    name: name.to_string(),
                    previous_line,
                },
            );
        }

        TypedStmt {
            kind: TypedStmtKind::ConstDecl {
                name: name.to_string(),
                value,
            },
            ty,
            line,
        }
    }

    fn check_write(
        &mut self,
        name: &str,
        value: &Expr,
        line: u32,
        scope: &mut Scope<'_>,
    ) -> TypedStmt {
        let value = self.check_expr(value, scope);
        let mut ty = None;

        match scope.lookup(name).cloned() {
            None => self.report(
                line,
                SemanticError::UndefinedName {
                    name: name.to_string(),
                },
            ),
            Some(symbol) if symbol.is_const() => self.report(
                line,
                SemanticError::WriteToConstant {
                    name: name.to_string(),
                },
            ),
            Some(symbol) => match (symbol.ty, value.ty) {
                (Some(expected), Some(received)) if expected != received => self.report(
                    line,
                    SemanticError::AssignmentMismatch {
                        name: name.to_string(),
                        expected: expected.to_string(),
                        received: received.to_string(),
                    },
                ),
                (Some(expected), Some(_)) => ty = Some(expected),
                _ => {}
            },
        }

        TypedStmt {
            kind: TypedStmtKind::Write {
                name: name.to_string(),
                value,
            },
            ty,
            line,
        }
    }

    fn check_condition(&mut self, condition: &Expr, scope: &mut Scope<'_>) -> TypedExpr {
        let condition = self.check_expr(condition, scope);

        if let Some(received) = condition.ty {
            if received != Type::Bool {
                self.report(
                    condition.line,
                    SemanticError::ConditionNotBool {
                        received: received.to_string(),
                    },
                );
            }
        }

        condition
    }

    fn check_return(&mut self, value: &TypedExpr, line: u32) {
        let Some(current) = self.current.as_mut() else {
            self.report(line, SemanticError::ReturnOutsideFunction);
            return;
        };

        current.saw_return = true;

        if let (Some(expected), Some(received)) = (current.signature.return_type, value.ty) {
            if expected == received {
                current.matching_return = true;
            } else {
                self.report(
                    line,
                    SemanticError::ReturnMismatch {
                        expected: expected.to_string(),
                        received: received.to_string(),
                    },
                );
            }
        }
    }

    fn check_function(&mut self, function: &FnDecl, line: u32, scope: &mut Scope<'_>) -> TypedStmt {
        let name = function.name.clone();

        let is_duplicate = match self.declared_functions.get(&name) {
            Some(&previous_line) => {
                self.report(
                    line,
                    SemanticError::FunctionAlreadyDefined {
                        name: name.clone(),
                        previous_line,
                    },
                );
                true
            }
            None => {
                self.declared_functions.insert(name.clone(), line);
                false
            }
        };

        let params: Vec<TypedParam> = function
            .params
            .iter()
            .map(|param| TypedParam {
                name: param.name.clone(),
                ty: self.resolve_type(&param.data_type),
            })
            .collect();

        let has_duplicate_params = params
            .iter()
            .enumerate()
            .any(|(i, param)| params[..i].iter().any(|other| other.name == param.name));
        if has_duplicate_params {
            self.report(line, SemanticError::DuplicateParameter { name: name.clone() });
        }

        let return_type = self.resolve_type(&function.return_type);

        if name == ENTRY_FUNCTION
            && (!params.is_empty() || return_type.is_some_and(|ty| ty != Type::Int32))
        {
            self.report(line, SemanticError::InvalidEntrySignature { name: name.clone() });
        }

        let signature = FunctionSignature {
            name: name.clone(),
            params: params.iter().map(|param| param.ty).collect(),
            return_type,
            line,
        };

        let mut body = vec![];

        if self.current.is_some() || !scope.is_global() {
            self.report(line, SemanticError::NestedFunction { name: name.clone() });
        } else {
            tracing::debug!(function = %name, line, "checking function body");

            let mut local = Scope::nested(scope);
            for param in &params {
                // Duplicates were reported above; the first binding wins
                let _ = local.declare(Symbol::new(&param.name, param.ty, SymbolKind::Var, line));
            }

            self.current = Some(CurrentFunction {
                signature: signature.clone(),
                saw_return: false,
                matching_return: false,
            });

            body = self.check_block(&function.body, &mut local);

            if let Some(current) = self.current.take() {
                if !current.saw_return {
                    self.report(line, SemanticError::MissingReturn { name: name.clone() });
                } else if current.matching_return && !is_duplicate {
                    self.functions.insert(name.clone(), signature);
                }
            }
        }

        TypedStmt {
            kind: TypedStmtKind::FnDecl(TypedFnDecl {
                name,
                params,
                return_type,
                body,
            }),
            ty: return_type,
            line,
        }
    }

    pub fn check_expr(&mut self, expr: &Expr, scope: &Scope<'_>) -> TypedExpr {
        let line = expr.line();

        let (kind, ty) = match &expr.kind {
            ExprKind::Literal(literal) => {
                let ty = match literal {
                    Literal::Int(_) => Type::Int32,
                    Literal::Float(_) => Type::Float64,
                    Literal::Char(_) => Type::Byte,
                    Literal::Bool(_) => Type::Bool,
                };
                (TypedExprKind::Literal(*literal), Some(ty))
            }
            ExprKind::Read { name } => {
                let ty = match scope.lookup(name) {
                    Some(symbol) => symbol.ty,
                    None => {
                        self.report(line, SemanticError::UndefinedName { name: name.clone() });
                        None
                    }
                };
                (TypedExprKind::Read { name: name.clone() }, ty)
            }
            ExprKind::Binary {
                operator,
                left,
                right,
            } => {
                let left = self.check_expr(left, scope);
                let right = self.check_expr(right, scope);

                let ty = match (left.ty, right.ty) {
                    (Some(left_ty), Some(right_ty)) => {
                        let result = Type::binary_result(*operator, left_ty, right_ty);
                        if result.is_none() {
                            self.report(
                                line,
                                SemanticError::UnsupportedBinaryOperation {
                                    operator: operator.to_string(),
                                    left: left_ty.to_string(),
                                    right: right_ty.to_string(),
                                },
                            );
                        }
                        result
                    }
                    _ => None,
                };

                (
                    TypedExprKind::Binary {
                        operator: *operator,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    ty,
                )
            }
            ExprKind::Unary { operator, operand } => {
                let operand = self.check_expr(operand, scope);

                let ty = operand.ty.and_then(|operand_ty| {
                    let result = Type::unary_result(*operator, operand_ty);
                    if result.is_none() {
                        self.report(
                            line,
                            SemanticError::UnsupportedUnaryOperation {
                                operator: operator.to_string(),
                                operand: operand_ty.to_string(),
                            },
                        );
                    }
                    result
                });

                (
                    TypedExprKind::Unary {
                        operator: *operator,
                        operand: Box::new(operand),
                    },
                    ty,
                )
            }
            ExprKind::Call { name, arguments } => {
                let arguments: Vec<TypedExpr> = arguments
                    .iter()
                    .map(|argument| self.check_expr(argument, scope))
                    .collect();
                let ty = self.check_call(name, &arguments, line);

                (
                    TypedExprKind::Call {
                        name: name.clone(),
                        arguments,
                    },
                    ty,
                )
            }
        };

        TypedExpr { kind, ty, line }
    }

    /// Resolves the callee and matches arguments positionally.
    ///
    /// The function under analysis may call itself; every other callee must
    /// already be callable.
    fn check_call(&mut self, name: &str, arguments: &[TypedExpr], line: u32) -> Option<Type> {
        let signature = match &self.current {
            Some(current) if current.signature.name == name => Some(current.signature.clone()),
            _ => self.functions.get(name).cloned(),
        };

        let Some(signature) = signature else {
            self.report(
                line,
                SemanticError::UndeclaredFunction {
                    name: name.to_string(),
                },
            );
            return None;
        };

        // The count is checked even when some argument failed to resolve
        if arguments.len() != signature.params.len() {
            self.report(
                line,
                SemanticError::CallMismatch {
                    name: name.to_string(),
                    expected: format_partial_tuple(&signature.params),
                    received: format_partial_tuple(
                        &arguments.iter().map(|argument| argument.ty).collect::<Vec<_>>(),
                    ),
                },
            );
            return None;
        }

        let received: Option<Vec<Type>> = arguments.iter().map(|argument| argument.ty).collect();
        let expected: Option<Vec<Type>> = signature.params.iter().copied().collect();

        // Unresolved arguments or parameters were reported already
        let (Some(received), Some(expected)) = (received, expected) else {
            return signature.return_type;
        };

        if received != expected {
            self.report(
                line,
                SemanticError::CallMismatch {
                    name: name.to_string(),
                    expected: format_type_tuple(&expected),
                    received: format_type_tuple(&received),
                },
            );
            return None;
        }

        signature.return_type
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }
}

fn format_type_tuple(types: &[Type]) -> String {
    let names: Vec<&str> = types.iter().map(|ty| ty.name()).collect();
    format!("({})", names.join(", "))
}

/// Like [`format_type_tuple`], with `?` standing for an unresolved type.
fn format_partial_tuple(types: &[Option<Type>]) -> String {
    let names: Vec<&str> = types
        .iter()
        .map(|ty| ty.map_or("?", |ty| ty.name()))
        .collect();
    format!("({})", names.join(", "))
}

/// Checks a whole program against one fresh global scope.
pub fn analyze(program: &Program, file: Option<Rc<String>>) -> Analysis {
    let mut checker = TypeChecker::new(file);
    let mut global = Scope::global();

    let body = program
        .iter()
        .map(|stmt| checker.check_stmt(stmt, &mut global))
        .collect();

    tracing::debug!(
        globals = global.symbols().len(),
        functions = checker.functions().len(),
        errors = checker.diagnostics.count(),
        "type checking finished"
    );

    Analysis {
        program: TypedProgram { body },
        diagnostics: checker.into_diagnostics(),
    }
}
