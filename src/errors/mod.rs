//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout the compilation
//! process. It includes:
//!
//! - Syntax errors with source position information (lexer and parser)
//! - Semantic errors collected by the type checker, grouped by kind
//! - The diagnostics sink that accumulates semantic errors for a unit
//! - Backend errors raised while emitting LLVM IR
//! - Helpful error messages and suggestions

pub mod diagnostics;
pub mod errors;

#[cfg(test)]
mod tests;
