use std::fmt::Display;

use thiserror::Error;

use crate::Position;

/// A syntax error raised while tokenizing or parsing.
#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_kind(&self) -> ErrorKind {
        ErrorKind::Syntax
    }

    pub fn get_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::InvalidCharLiteral { .. } => "InvalidCharLiteral",
            ErrorImpl::UnterminatedComment => "UnterminatedComment",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::InvalidCharLiteral { token } => ErrorTip::Suggestion(format!(
                "Invalid character literal: `{}`, only single bytes are supported",
                token
            )),
            ErrorImpl::UnterminatedComment => {
                ErrorTip::Suggestion(String::from("Block comment is missing its closing `*/`"))
            }
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.position.file, self.position.line, self.internal_error
        )
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("invalid character literal: {token}")]
    InvalidCharLiteral { token: String },
    #[error("unterminated block comment")]
    UnterminatedComment,
}

/// Error taxonomy shared by syntax and semantic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Name,
    Type,
    Structural,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Syntax => write!(f, "SyntaxError"),
            ErrorKind::Name => write!(f, "NameError"),
            ErrorKind::Type => write!(f, "TypeError"),
            ErrorKind::Structural => write!(f, "StructuralError"),
        }
    }
}

/// Errors reported by the type checker. Every one of them is node-local and
/// recoverable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    // Name errors
    #[error("Name '{name}' was not defined")]
    UndefinedName { name: String },
    #[error("Name '{name}' has already been defined at line {previous_line}")]
    AlreadyDefined { name: String, previous_line: u32 },
    #[error("Name '{name}' is not a legal name for variable declaration")]
    IllegalName { name: String },
    #[error("Cannot write to constant '{name}'")]
    WriteToConstant { name: String },

    // Type errors
    #[error("Invalid type '{name}'")]
    UnknownType { name: String },
    #[error("Binary operation '{left} {operator} {right}' not supported")]
    UnsupportedBinaryOperation {
        operator: String,
        left: String,
        right: String,
    },
    #[error("Unary operation '{operator} {operand}' not supported")]
    UnsupportedUnaryOperation { operator: String, operand: String },
    #[error("Declaring variable '{name}' of type '{declared}' but assigned expression of type '{received}'")]
    DeclarationMismatch {
        name: String,
        declared: String,
        received: String,
    },
    #[error("Cannot assign type '{received}' to variable '{name}' of type '{expected}'")]
    AssignmentMismatch {
        name: String,
        expected: String,
        received: String,
    },
    #[error("Condition must be of type 'bool' but got type '{received}'")]
    ConditionNotBool { received: String },
    #[error("Function returns '{expected}' but return statement value is of type '{received}'")]
    ReturnMismatch { expected: String, received: String },
    #[error("Function '{name}' expects {expected}, but was called with {received}")]
    CallMismatch {
        name: String,
        expected: String,
        received: String,
    },

    // Structural errors
    #[error("Illegal nested function declaration '{name}'")]
    NestedFunction { name: String },
    #[error("Return statement must be within a function")]
    ReturnOutsideFunction,
    #[error("Function '{name}' has no return statement")]
    MissingReturn { name: String },
    #[error("Function '{name}' already defined at line {previous_line}")]
    FunctionAlreadyDefined { name: String, previous_line: u32 },
    #[error("Duplicate parameter names at function definition '{name}'")]
    DuplicateParameter { name: String },
    #[error("Function '{name}' is not declared")]
    UndeclaredFunction { name: String },
    #[error("Entry function '{name}' must take no parameters and return 'int'")]
    InvalidEntrySignature { name: String },
}

impl SemanticError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SemanticError::UndefinedName { .. }
            | SemanticError::AlreadyDefined { .. }
            | SemanticError::IllegalName { .. }
            | SemanticError::WriteToConstant { .. } => ErrorKind::Name,
            SemanticError::UnknownType { .. }
            | SemanticError::UnsupportedBinaryOperation { .. }
            | SemanticError::UnsupportedUnaryOperation { .. }
            | SemanticError::DeclarationMismatch { .. }
            | SemanticError::AssignmentMismatch { .. }
            | SemanticError::ConditionNotBool { .. }
            | SemanticError::ReturnMismatch { .. }
            | SemanticError::CallMismatch { .. } => ErrorKind::Type,
            SemanticError::NestedFunction { .. }
            | SemanticError::ReturnOutsideFunction
            | SemanticError::MissingReturn { .. }
            | SemanticError::FunctionAlreadyDefined { .. }
            | SemanticError::DuplicateParameter { .. }
            | SemanticError::UndeclaredFunction { .. }
            | SemanticError::InvalidEntrySignature { .. } => ErrorKind::Structural,
        }
    }
}

/// Failures while turning IR into an LLVM module.
///
/// Apart from `Builder` and `Verify` these mean the IR itself is malformed.
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error(transparent)]
    Builder(#[from] inkwell::builder::BuilderError),
    #[error("register {register} used before it was written in '{function}'")]
    UnknownRegister { function: String, register: String },
    #[error("unknown storage location '{name}' in '{function}'")]
    UnknownLocation { function: String, name: String },
    #[error("call to unknown function '{name}'")]
    UnknownFunction { name: String },
    #[error("function '{function}' has no parameter {index}")]
    MissingParameter { function: String, index: u32 },
    #[error("call to '{name}' produced no value")]
    VoidCall { name: String },
    #[error("target machine error: {0}")]
    Target(String),
    #[error("could not link runtime: {0}")]
    Link(String),
    #[error("module failed verification: {0}")]
    Verify(String),
    #[error("could not write '{path}': {message}")]
    Write { path: String, message: String },
}
