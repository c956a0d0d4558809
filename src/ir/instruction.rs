//! Three-address instruction set.
//!
//! Every value-producing instruction writes a fresh [`Register`]; named
//! storage is only touched through `LOAD`/`STORE`. Opcodes are an operation
//! paired with a [`PhysicalType`], printed as e.g. `ADDI` or `CMPF`.

use std::fmt::Display;

use crate::{ast::expressions::BinaryOperator, type_checker::types::Type};

/// Runtime representation of a source type. `bool` is carried as an int.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalType {
    Int,
    Float,
    Byte,
}

impl PhysicalType {
    pub fn of(ty: Type) -> Self {
        match ty {
            Type::Int32 | Type::Bool => PhysicalType::Int,
            Type::Float64 => PhysicalType::Float,
            Type::Byte => PhysicalType::Byte,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            PhysicalType::Int => "I",
            PhysicalType::Float => "F",
            PhysicalType::Byte => "B",
        }
    }
}

impl Display for PhysicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Register(pub u32);

impl Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub u32);

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Named storage: a module-level cell or a slot of the current function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    Global(String),
    Local(String),
}

impl Location {
    pub fn name(&self) -> &str {
        match self {
            Location::Global(name) | Location::Local(name) => name,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Immediate {
    Int(i32),
    Float(f64),
    Byte(u8),
}

impl Immediate {
    pub fn zero(ty: PhysicalType) -> Self {
        match ty {
            PhysicalType::Int => Immediate::Int(0),
            PhysicalType::Float => Immediate::Float(0.0),
            PhysicalType::Byte => Immediate::Byte(0),
        }
    }

    pub fn physical_type(&self) -> PhysicalType {
        match self {
            Immediate::Int(_) => PhysicalType::Int,
            Immediate::Float(_) => PhysicalType::Float,
            Immediate::Byte(_) => PhysicalType::Byte,
        }
    }
}

impl Display for Immediate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Immediate::Int(value) => write!(f, "{}", value),
            Immediate::Float(value) => write!(f, "{:?}", value),
            Immediate::Byte(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithmeticOp {
    pub fn from_operator(operator: BinaryOperator) -> Option<Self> {
        match operator {
            BinaryOperator::Add => Some(ArithmeticOp::Add),
            BinaryOperator::Subtract => Some(ArithmeticOp::Sub),
            BinaryOperator::Multiply => Some(ArithmeticOp::Mul),
            BinaryOperator::Divide => Some(ArithmeticOp::Div),
            _ => None,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "ADD",
            ArithmeticOp::Sub => "SUB",
            ArithmeticOp::Mul => "MUL",
            ArithmeticOp::Div => "DIV",
        }
    }
}

/// Bitwise operations on the int representation, used for booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
}

impl BitwiseOp {
    pub fn from_operator(operator: BinaryOperator) -> Option<Self> {
        match operator {
            BinaryOperator::And => Some(BitwiseOp::And),
            BinaryOperator::Or => Some(BitwiseOp::Or),
            _ => None,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            BitwiseOp::And => "AND",
            BitwiseOp::Or => "OR",
            BitwiseOp::Xor => "XOR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    Equals,
    NotEquals,
}

impl CompareOp {
    pub fn from_operator(operator: BinaryOperator) -> Option<Self> {
        match operator {
            BinaryOperator::Less => Some(CompareOp::Less),
            BinaryOperator::LessEquals => Some(CompareOp::LessEquals),
            BinaryOperator::Greater => Some(CompareOp::Greater),
            BinaryOperator::GreaterEquals => Some(CompareOp::GreaterEquals),
            BinaryOperator::Equals => Some(CompareOp::Equals),
            BinaryOperator::NotEquals => Some(CompareOp::NotEquals),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Less => "<",
            CompareOp::LessEquals => "<=",
            CompareOp::Greater => ">",
            CompareOp::GreaterEquals => ">=",
            CompareOp::Equals => "=",
            CompareOp::NotEquals => "!=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// `MOV<t> value target`
    Move {
        value: Immediate,
        target: Register,
    },
    /// `ADD<t> left right target` and friends
    Arithmetic {
        op: ArithmeticOp,
        ty: PhysicalType,
        left: Register,
        right: Register,
        target: Register,
    },
    /// `AND`/`OR`/`XOR left right target`, always on ints
    Bitwise {
        op: BitwiseOp,
        left: Register,
        right: Register,
        target: Register,
    },
    /// `CMP<t> op left right target`, producing 0 or 1 as an int
    Compare {
        op: CompareOp,
        ty: PhysicalType,
        left: Register,
        right: Register,
        target: Register,
    },
    /// `VAR<t> name`: declares a zero-initialised global cell
    Global {
        ty: PhysicalType,
        name: String,
    },
    /// `ALLOC<t> name`: declares a local slot
    Alloc {
        ty: PhysicalType,
        name: String,
    },
    Load {
        ty: PhysicalType,
        source: Location,
        target: Register,
    },
    Store {
        ty: PhysicalType,
        value: Register,
        target: Location,
    },
    Print {
        ty: PhysicalType,
        value: Register,
    },
    Label(Label),
    Branch(Label),
    CondBranch {
        condition: Register,
        if_true: Label,
        if_false: Label,
    },
    Call {
        name: String,
        arguments: Vec<Register>,
        target: Register,
    },
    Return {
        ty: PhysicalType,
        value: Register,
    },
}

impl Instruction {
    pub fn opcode(&self) -> String {
        match self {
            Instruction::Move { value, .. } => format!("MOV{}", value.physical_type()),
            Instruction::Arithmetic { op, ty, .. } => format!("{}{}", op.mnemonic(), ty),
            Instruction::Bitwise { op, .. } => op.mnemonic().to_string(),
            Instruction::Compare { ty, .. } => format!("CMP{}", ty),
            Instruction::Global { ty, .. } => format!("VAR{}", ty),
            Instruction::Alloc { ty, .. } => format!("ALLOC{}", ty),
            Instruction::Load { ty, .. } => format!("LOAD{}", ty),
            Instruction::Store { ty, .. } => format!("STORE{}", ty),
            Instruction::Print { ty, .. } => format!("PRINT{}", ty),
            Instruction::Label(_) => String::from("LABEL"),
            Instruction::Branch(_) => String::from("BRANCH"),
            Instruction::CondBranch { .. } => String::from("CBRANCH"),
            Instruction::Call { .. } => String::from("CALL"),
            Instruction::Return { ty, .. } => format!("RET{}", ty),
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Branch(_) | Instruction::CondBranch { .. } | Instruction::Return { .. }
        )
    }

    /// Register written by this instruction, if any.
    pub fn target(&self) -> Option<Register> {
        match self {
            Instruction::Move { target, .. }
            | Instruction::Arithmetic { target, .. }
            | Instruction::Bitwise { target, .. }
            | Instruction::Compare { target, .. }
            | Instruction::Load { target, .. }
            | Instruction::Call { target, .. } => Some(*target),
            _ => None,
        }
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let opcode = self.opcode();

        match self {
            Instruction::Move { value, target } => write!(f, "{} {} {}", opcode, value, target),
            Instruction::Arithmetic {
                left,
                right,
                target,
                ..
            }
            | Instruction::Bitwise {
                left,
                right,
                target,
                ..
            } => write!(f, "{} {} {} {}", opcode, left, right, target),
            Instruction::Compare {
                op,
                left,
                right,
                target,
                ..
            } => write!(f, "{} {} {} {} {}", opcode, op.symbol(), left, right, target),
            Instruction::Global { name, .. } | Instruction::Alloc { name, .. } => {
                write!(f, "{} {}", opcode, name)
            }
            Instruction::Load { source, target, .. } => {
                write!(f, "{} {} {}", opcode, source, target)
            }
            Instruction::Store { value, target, .. } => {
                write!(f, "{} {} {}", opcode, value, target)
            }
            Instruction::Print { value, .. } | Instruction::Return { value, .. } => {
                write!(f, "{} {}", opcode, value)
            }
            Instruction::Label(label) | Instruction::Branch(label) => {
                write!(f, "{} {}", opcode, label)
            }
            Instruction::CondBranch {
                condition,
                if_true,
                if_false,
            } => write!(f, "{} {} {} {}", opcode, condition, if_true, if_false),
            Instruction::Call {
                name,
                arguments,
                target,
            } => {
                write!(f, "{} {}", opcode, name)?;
                for argument in arguments {
                    write!(f, " {}", argument)?;
                }
                write!(f, " {}", target)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrFunction {
    pub name: String,
    pub params: Vec<(String, PhysicalType)>,
    pub return_type: PhysicalType,
    pub instructions: Vec<Instruction>,
}

impl IrFunction {
    pub fn new(name: &str, params: Vec<(String, PhysicalType)>, return_type: PhysicalType) -> Self {
        IrFunction {
            name: name.to_string(),
            params,
            return_type,
            instructions: vec![],
        }
    }
}

impl Display for IrFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|(name, ty)| format!("{}:{}", name, ty))
            .collect();

        writeln!(f, "{}({}) -> {}", self.name, params.join(", "), self.return_type)?;
        for instruction in &self.instructions {
            writeln!(f, "    {}", instruction)?;
        }
        Ok(())
    }
}

/// Ordered list of functions; the initialization function comes first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IrProgram {
    pub functions: Vec<IrFunction>,
}

impl IrProgram {
    pub fn function(&self, name: &str) -> Option<&IrFunction> {
        self.functions.iter().find(|function| function.name == name)
    }

    /// Every global cell declared anywhere in the program.
    pub fn globals(&self) -> impl Iterator<Item = (&str, PhysicalType)> {
        self.functions
            .iter()
            .flat_map(|function| function.instructions.iter())
            .filter_map(|instruction| match instruction {
                Instruction::Global { ty, name } => Some((name.as_str(), *ty)),
                _ => None,
            })
    }
}

impl Display for IrProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, function) in self.functions.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", function)?;
        }
        Ok(())
    }
}
