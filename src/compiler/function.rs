//! Emission of a single IR function into basic blocks.
//!
//! Every parameter, local and the return value live in stack slots created
//! in the entry block. Labels become blocks on first use, and any block left
//! without a terminator falls through to the next label or to the shared
//! return block.

use std::collections::HashMap;

use inkwell::{
    basic_block::BasicBlock,
    values::{BasicMetadataValueEnum, BasicValueEnum, FloatValue, FunctionValue, IntValue, PointerValue},
    FloatPredicate, IntPredicate,
};

use crate::{
    errors::errors::CodegenError,
    ir::instruction::{
        ArithmeticOp, BitwiseOp, CompareOp, Immediate, Instruction, IrFunction, Label, Location,
        PhysicalType, Register,
    },
};

use super::compiler::{print_function_name, Compiler};

pub struct FunctionEmitter<'c, 'a> {
    compiler: &'c Compiler<'a>,
    ir: &'c IrFunction,
    function: FunctionValue<'a>,

    registers: HashMap<Register, BasicValueEnum<'a>>,
    slots: HashMap<String, PointerValue<'a>>,
    blocks: HashMap<Label, BasicBlock<'a>>,

    return_slot: PointerValue<'a>,
    return_block: BasicBlock<'a>,
}

impl<'c, 'a> FunctionEmitter<'c, 'a> {
    /// Builds the prologue and the return block of `ir`, whose prototype
    /// must already be in the module.
    pub fn new(compiler: &'c Compiler<'a>, ir: &'c IrFunction) -> Result<Self, CodegenError> {
        let function = compiler.get_function(&ir.name)?;
        let builder = &compiler.builder;

        let entry = compiler.context.append_basic_block(function, "entry");
        let return_block = compiler.context.append_basic_block(function, "return");
        builder.position_at_end(entry);

        let mut slots = HashMap::new();

        for ((name, ty), value) in ir.params.iter().zip(function.get_param_iter()) {
            let slot = builder.build_alloca(compiler.convert_type(*ty), name)?;
            builder.build_store(slot, value)?;
            slots.insert(name.clone(), slot);
        }

        for instruction in &ir.instructions {
            if let Instruction::Alloc { ty, name } = instruction {
                if slots.contains_key(name) {
                    continue;
                }

                let llvm_type = compiler.convert_type(*ty);
                let slot = builder.build_alloca(llvm_type, name)?;
                builder.build_store(slot, llvm_type.const_zero())?;
                slots.insert(name.clone(), slot);
            }
        }

        let return_type = compiler.convert_type(ir.return_type);
        let return_slot = builder.build_alloca(return_type, "retval")?;
        builder.build_store(return_slot, return_type.const_zero())?;

        builder.position_at_end(return_block);
        let result = builder.build_load(return_slot, "result")?;
        builder.build_return(Some(&result))?;

        builder.position_at_end(entry);

        Ok(FunctionEmitter {
            compiler,
            ir,
            function,
            registers: HashMap::new(),
            slots,
            blocks: HashMap::new(),
            return_slot,
            return_block,
        })
    }

    pub fn emit(mut self) -> Result<(), CodegenError> {
        let compiler = self.compiler;
        let builder = &compiler.builder;
        let ir = self.ir;

        for instruction in &ir.instructions {
            if let Instruction::Label(label) = instruction {
                let block = self.block(*label);
                if !self.is_terminated() {
                    builder.build_unconditional_branch(block)?;
                }
                builder.position_at_end(block);
                continue;
            }

            if self.is_terminated() {
                // Code after a terminator and before the next label
                let dead = compiler.context.append_basic_block(self.function, "dead");
                builder.position_at_end(dead);
            }

            self.emit_instruction(instruction)?;
        }

        if !self.is_terminated() {
            builder.build_unconditional_branch(self.return_block)?;
        }

        Ok(())
    }

    fn is_terminated(&self) -> bool {
        self.compiler
            .builder
            .get_insert_block()
            .and_then(|block| block.get_terminator())
            .is_some()
    }

    fn block(&mut self, label: Label) -> BasicBlock<'a> {
        let context = self.compiler.context;
        let function = self.function;

        *self
            .blocks
            .entry(label)
            .or_insert_with(|| context.append_basic_block(function, &label.to_string()))
    }

    fn value(&self, register: Register) -> Result<BasicValueEnum<'a>, CodegenError> {
        self.registers
            .get(&register)
            .copied()
            .ok_or_else(|| CodegenError::UnknownRegister {
                function: self.ir.name.clone(),
                register: register.to_string(),
            })
    }

    fn int(&self, register: Register) -> Result<IntValue<'a>, CodegenError> {
        Ok(self.value(register)?.into_int_value())
    }

    fn float(&self, register: Register) -> Result<FloatValue<'a>, CodegenError> {
        Ok(self.value(register)?.into_float_value())
    }

    fn slot(&self, location: &Location) -> Result<PointerValue<'a>, CodegenError> {
        let slot = match location {
            Location::Local(name) => self.slots.get(name).copied(),
            Location::Global(name) => self
                .compiler
                .globals
                .get(name)
                .map(|global| global.as_pointer_value()),
        };

        slot.ok_or_else(|| CodegenError::UnknownLocation {
            function: self.ir.name.clone(),
            name: location.name().to_string(),
        })
    }

    fn constant(&self, value: Immediate) -> BasicValueEnum<'a> {
        let context = self.compiler.context;

        match value {
            Immediate::Int(value) => context.i32_type().const_int(value as u64, true).into(),
            Immediate::Float(value) => context.f64_type().const_float(value).into(),
            Immediate::Byte(value) => context.i8_type().const_int(value as u64, false).into(),
        }
    }

    fn emit_instruction(&mut self, instruction: &Instruction) -> Result<(), CodegenError> {
        let compiler = self.compiler;
        let builder = &compiler.builder;

        match instruction {
            Instruction::Move { value, target } => {
                let constant = self.constant(*value);
                self.registers.insert(*target, constant);
            }
            Instruction::Arithmetic {
                op,
                ty,
                left,
                right,
                target,
            } => {
                let name = target.to_string();

                let result: BasicValueEnum<'a> = if *ty == PhysicalType::Float {
                    let (left, right) = (self.float(*left)?, self.float(*right)?);
                    let value = match op {
                        ArithmeticOp::Add => builder.build_float_add(left, right, &name)?,
                        ArithmeticOp::Sub => builder.build_float_sub(left, right, &name)?,
                        ArithmeticOp::Mul => builder.build_float_mul(left, right, &name)?,
                        ArithmeticOp::Div => builder.build_float_div(left, right, &name)?,
                    };
                    value.into()
                } else {
                    let (left, right) = (self.int(*left)?, self.int(*right)?);
                    let value = match op {
                        ArithmeticOp::Add => builder.build_int_add(left, right, &name)?,
                        ArithmeticOp::Sub => builder.build_int_sub(left, right, &name)?,
                        ArithmeticOp::Mul => builder.build_int_mul(left, right, &name)?,
                        ArithmeticOp::Div if *ty == PhysicalType::Byte => {
                            builder.build_int_unsigned_div(left, right, &name)?
                        }
                        ArithmeticOp::Div => builder.build_int_signed_div(left, right, &name)?,
                    };
                    value.into()
                };

                self.registers.insert(*target, result);
            }
            Instruction::Bitwise {
                op,
                left,
                right,
                target,
            } => {
                let name = target.to_string();
                let (left, right) = (self.int(*left)?, self.int(*right)?);

                let result = match op {
                    BitwiseOp::And => builder.build_and(left, right, &name)?,
                    BitwiseOp::Or => builder.build_or(left, right, &name)?,
                    BitwiseOp::Xor => builder.build_xor(left, right, &name)?,
                };

                self.registers.insert(*target, result.into());
            }
            Instruction::Compare {
                op,
                ty,
                left,
                right,
                target,
            } => {
                let flag = match ty {
                    PhysicalType::Float => builder.build_float_compare(
                        float_predicate(*op),
                        self.float(*left)?,
                        self.float(*right)?,
                        "cmp",
                    )?,
                    PhysicalType::Int | PhysicalType::Byte => builder.build_int_compare(
                        int_predicate(*op, *ty == PhysicalType::Int),
                        self.int(*left)?,
                        self.int(*right)?,
                        "cmp",
                    )?,
                };

                // Widen i1 back to the int representation of booleans
                let result = builder.build_int_z_extend(
                    flag,
                    compiler.context.i32_type(),
                    &target.to_string(),
                )?;

                self.registers.insert(*target, result.into());
            }
            // Storage is created up front
            Instruction::Global { .. } | Instruction::Alloc { .. } => {}
            Instruction::Load {
                source, target, ..
            } => {
                let slot = self.slot(source)?;
                let value = builder.build_load(slot, &target.to_string())?;
                self.registers.insert(*target, value);
            }
            Instruction::Store { value, target, .. } => {
                let slot = self.slot(target)?;
                builder.build_store(slot, self.value(*value)?)?;
            }
            Instruction::Print { ty, value } => {
                let function = compiler.get_function(print_function_name(*ty))?;
                builder.build_call(function, &[self.value(*value)?.into()], "")?;
            }
            Instruction::Label(label) => {
                unreachable!("label {} handled by the block walk", label)
            }
            Instruction::Branch(label) => {
                let block = self.block(*label);
                builder.build_unconditional_branch(block)?;
            }
            Instruction::CondBranch {
                condition,
                if_true,
                if_false,
            } => {
                let condition = self.int(*condition)?;
                let if_true = self.block(*if_true);
                let if_false = self.block(*if_false);

                let flag = builder.build_int_compare(
                    IntPredicate::NE,
                    condition,
                    condition.get_type().const_zero(),
                    "cond",
                )?;
                builder.build_conditional_branch(flag, if_true, if_false)?;
            }
            Instruction::Call {
                name,
                arguments,
                target,
            } => {
                let function = compiler.get_function(name)?;
                let arguments = arguments
                    .iter()
                    .map(|argument| self.value(*argument).map(BasicMetadataValueEnum::from))
                    .collect::<Result<Vec<_>, _>>()?;

                let value = builder
                    .build_call(function, &arguments, &target.to_string())?
                    .try_as_basic_value()
                    .left()
                    .ok_or_else(|| CodegenError::VoidCall { name: name.clone() })?;

                self.registers.insert(*target, value);
            }
            Instruction::Return { value, .. } => {
                builder.build_store(self.return_slot, self.value(*value)?)?;
                builder.build_unconditional_branch(self.return_block)?;
            }
        }

        Ok(())
    }
}

fn int_predicate(op: CompareOp, signed: bool) -> IntPredicate {
    match (op, signed) {
        (CompareOp::Less, true) => IntPredicate::SLT,
        (CompareOp::LessEquals, true) => IntPredicate::SLE,
        (CompareOp::Greater, true) => IntPredicate::SGT,
        (CompareOp::GreaterEquals, true) => IntPredicate::SGE,
        (CompareOp::Less, false) => IntPredicate::ULT,
        (CompareOp::LessEquals, false) => IntPredicate::ULE,
        (CompareOp::Greater, false) => IntPredicate::UGT,
        (CompareOp::GreaterEquals, false) => IntPredicate::UGE,
        (CompareOp::Equals, _) => IntPredicate::EQ,
        (CompareOp::NotEquals, _) => IntPredicate::NE,
    }
}

fn float_predicate(op: CompareOp) -> FloatPredicate {
    match op {
        CompareOp::Less => FloatPredicate::OLT,
        CompareOp::LessEquals => FloatPredicate::OLE,
        CompareOp::Greater => FloatPredicate::OGT,
        CompareOp::GreaterEquals => FloatPredicate::OGE,
        CompareOp::Equals => FloatPredicate::OEQ,
        CompareOp::NotEquals => FloatPredicate::ONE,
    }
}
