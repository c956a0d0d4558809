use std::collections::HashSet;

use crate::{
    ast::expressions::{Literal, UnaryOperator},
    type_checker::{
        type_checker::{Analysis, ENTRY_FUNCTION},
        typed_ast::{TypedExpr, TypedExprKind, TypedFnDecl, TypedStmt, TypedStmtKind},
        types::Type,
    },
};

use super::instruction::{
    ArithmeticOp, BitwiseOp, CompareOp, Immediate, Instruction, IrFunction, IrProgram, Label,
    Location, PhysicalType, Register,
};

/// Synthesized function holding every top-level statement.
pub const INIT_FUNCTION: &str = "__pulse_init";
/// Symbol the source entry function is renamed to.
pub const ENTRY_SYMBOL: &str = "__pulse_main";

/// Symbol a source function is emitted under.
pub fn symbol_name(name: &str) -> &str {
    if name == ENTRY_FUNCTION {
        ENTRY_SYMBOL
    } else {
        name
    }
}

fn resolved(ty: Option<Type>) -> PhysicalType {
    match ty {
        Some(ty) => PhysicalType::of(ty),
        None => panic!("unresolved node reached IR generation"),
    }
}

/// Lowers a checked program to three-address code.
///
/// Registers and labels are numbered from 1 and never reused, across the
/// whole program.
pub struct IrBuilder {
    next_register: u32,
    next_label: u32,
    /// Instruction stream of the function being lowered.
    code: Vec<Instruction>,
    /// Parameters and slots of the function being lowered. Empty while
    /// lowering top-level statements.
    locals: HashSet<String>,
    in_function: bool,
}

impl Default for IrBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IrBuilder {
    pub fn new() -> Self {
        IrBuilder {
            next_register: 0,
            next_label: 0,
            code: vec![],
            locals: HashSet::new(),
            in_function: false,
        }
    }

    fn new_register(&mut self) -> Register {
        self.next_register += 1;
        Register(self.next_register)
    }

    fn new_label(&mut self) -> Label {
        self.next_label += 1;
        Label(self.next_label)
    }

    fn emit(&mut self, instruction: Instruction) {
        self.code.push(instruction);
    }

    fn location(&self, name: &str) -> Location {
        if self.locals.contains(name) {
            Location::Local(name.to_string())
        } else {
            Location::Global(name.to_string())
        }
    }

    fn emit_move(&mut self, value: Immediate) -> Register {
        let target = self.new_register();
        self.emit(Instruction::Move { value, target });
        target
    }

    pub fn lower_expr(&mut self, expr: &TypedExpr) -> Register {
        match &expr.kind {
            TypedExprKind::Literal(literal) => {
                let value = match literal {
                    Literal::Int(value) => Immediate::Int(*value),
                    Literal::Float(value) => Immediate::Float(*value),
                    Literal::Char(value) => Immediate::Byte(*value),
                    Literal::Bool(value) => Immediate::Int(i32::from(*value)),
                };
                self.emit_move(value)
            }
            TypedExprKind::Read { name } => {
                let target = self.new_register();
                self.emit(Instruction::Load {
                    ty: resolved(expr.ty),
                    source: self.location(name),
                    target,
                });
                target
            }
            TypedExprKind::Binary {
                operator,
                left: left_expr,
                right: right_expr,
            } => {
                let left = self.lower_expr(left_expr);
                let right = self.lower_expr(right_expr);
                let ty = resolved(left_expr.ty);
                let target = self.new_register();

                let instruction = if let Some(op) = CompareOp::from_operator(*operator) {
                    Instruction::Compare {
                        op,
                        ty,
                        left,
                        right,
                        target,
                    }
                } else if let Some(op) = ArithmeticOp::from_operator(*operator) {
                    Instruction::Arithmetic {
                        op,
                        ty,
                        left,
                        right,
                        target,
                    }
                } else if let Some(op) = BitwiseOp::from_operator(*operator) {
                    Instruction::Bitwise {
                        op,
                        left,
                        right,
                        target,
                    }
                } else {
                    unreachable!("operator {} has no lowering", operator)
                };

                self.emit(instruction);
                target
            }
            TypedExprKind::Unary { operator, operand } => {
                let value = self.lower_expr(operand);
                let ty = resolved(expr.ty);

                match operator {
                    UnaryOperator::Plus => value,
                    UnaryOperator::Minus => {
                        let zero = self.emit_move(Immediate::zero(ty));
                        let target = self.new_register();
                        self.emit(Instruction::Arithmetic {
                            op: ArithmeticOp::Sub,
                            ty,
                            left: zero,
                            right: value,
                            target,
                        });
                        target
                    }
                    UnaryOperator::Not => {
                        // Booleans are always 0 or 1, so xor with 1 complements them
                        let one = self.emit_move(Immediate::Int(1));
                        let target = self.new_register();
                        self.emit(Instruction::Bitwise {
                            op: BitwiseOp::Xor,
                            left: one,
                            right: value,
                            target,
                        });
                        target
                    }
                }
            }
            TypedExprKind::Call { name, arguments } => {
                let arguments: Vec<Register> = arguments
                    .iter()
                    .map(|argument| self.lower_expr(argument))
                    .collect();
                let target = self.new_register();

                self.emit(Instruction::Call {
                    name: symbol_name(name).to_string(),
                    arguments,
                    target,
                });
                target
            }
        }
    }

    fn lower_block(&mut self, block: &[TypedStmt]) {
        for stmt in block {
            self.lower_stmt(stmt);
        }
    }

    /// Declares `name` in the current storage class, then stores `value`.
    fn lower_declaration(&mut self, name: &str, ty: PhysicalType, value: Option<&TypedExpr>) {
        let value = value.map(|value| self.lower_expr(value));

        if self.in_function {
            self.locals.insert(name.to_string());
            self.emit(Instruction::Alloc {
                ty,
                name: name.to_string(),
            });
        } else {
            self.emit(Instruction::Global {
                ty,
                name: name.to_string(),
            });
        }

        if let Some(value) = value {
            self.emit(Instruction::Store {
                ty,
                value,
                target: self.location(name),
            });
        }
    }

    pub fn lower_stmt(&mut self, stmt: &TypedStmt) {
        match &stmt.kind {
            TypedStmtKind::Print(value) => {
                let register = self.lower_expr(value);
                self.emit(Instruction::Print {
                    ty: resolved(value.ty),
                    value: register,
                });
            }
            TypedStmtKind::VarDecl { name, value } => {
                self.lower_declaration(name, resolved(stmt.ty), value.as_ref())
            }
            TypedStmtKind::ConstDecl { name, value } => {
                self.lower_declaration(name, resolved(stmt.ty), Some(value))
            }
            TypedStmtKind::Write { name, value } => {
                let register = self.lower_expr(value);
                self.emit(Instruction::Store {
                    ty: resolved(value.ty),
                    value: register,
                    target: self.location(name),
                });
            }
            TypedStmtKind::If {
                condition,
                true_block,
                false_block,
            } => {
                let condition = self.lower_expr(condition);
                let if_true = self.new_label();
                let if_false = self.new_label();
                let merge = self.new_label();

                self.emit(Instruction::CondBranch {
                    condition,
                    if_true,
                    if_false,
                });

                self.emit(Instruction::Label(if_true));
                self.lower_block(true_block);
                self.emit(Instruction::Branch(merge));

                // Emitted even when there is no else
                self.emit(Instruction::Label(if_false));
                self.lower_block(false_block);
                self.emit(Instruction::Branch(merge));

                self.emit(Instruction::Label(merge));
            }
            TypedStmtKind::While { condition, body } => {
                let test = self.new_label();
                let start = self.new_label();
                let merge = self.new_label();

                self.emit(Instruction::Branch(test));
                self.emit(Instruction::Label(test));
                let condition = self.lower_expr(condition);
                self.emit(Instruction::CondBranch {
                    condition,
                    if_true: start,
                    if_false: merge,
                });

                self.emit(Instruction::Label(start));
                self.lower_block(body);
                self.emit(Instruction::Branch(test));

                self.emit(Instruction::Label(merge));
            }
            // Hoisted by `generate_ir`
            TypedStmtKind::FnDecl(_) => {}
            TypedStmtKind::Return(value) => {
                let register = self.lower_expr(value);
                self.emit(Instruction::Return {
                    ty: resolved(value.ty),
                    value: register,
                });
            }
        }
    }

    pub fn lower_function(&mut self, function: &TypedFnDecl) -> IrFunction {
        let name = symbol_name(&function.name);
        tracing::debug!(function = %function.name, symbol = name, "lowering function");

        let params: Vec<(String, PhysicalType)> = function
            .params
            .iter()
            .map(|param| (param.name.clone(), resolved(param.ty)))
            .collect();

        let saved = std::mem::take(&mut self.code);
        self.locals = params.iter().map(|(name, _)| name.clone()).collect();
        self.in_function = true;

        self.lower_block(&function.body);

        self.in_function = false;
        self.locals.clear();

        let mut lowered = IrFunction::new(name, params, resolved(function.return_type));
        lowered.instructions = std::mem::replace(&mut self.code, saved);
        lowered
    }

    /// Lowers top-level statements into the initialization function, which
    /// returns 0.
    pub fn lower_init<'a>(&mut self, statements: impl Iterator<Item = &'a TypedStmt>) -> IrFunction {
        let saved = std::mem::take(&mut self.code);

        for stmt in statements {
            self.lower_stmt(stmt);
        }

        let zero = self.emit_move(Immediate::Int(0));
        self.emit(Instruction::Return {
            ty: PhysicalType::Int,
            value: zero,
        });

        let mut init = IrFunction::new(INIT_FUNCTION, vec![], PhysicalType::Int);
        init.instructions = std::mem::replace(&mut self.code, saved);
        init
    }
}

/// Lowers a checked program.
///
/// # Panics
///
/// When `analysis` carries any diagnostic. Callers must stop after a failed
/// analysis; reaching this point with errors is a bug in the caller.
pub fn generate_ir(analysis: &Analysis) -> IrProgram {
    assert!(
        analysis.is_ok(),
        "IR generation invoked on a program with {} semantic error(s)",
        analysis.diagnostics.count()
    );

    let mut builder = IrBuilder::new();
    let mut functions = vec![builder.lower_init(analysis.program.global_statements())];

    for function in analysis.program.functions() {
        functions.push(builder.lower_function(function));
    }

    IrProgram { functions }
}
