//! Code generation module for the compiler.
//!
//! This module contains the LLVM-based backend that turns the three-address
//! IR into an LLVM module. It handles:
//!
//! - Runtime declarations, global cells and function prototypes
//! - Lowering of each function's instruction stream into basic blocks
//! - The runtime module providing the print functions and native `main`

pub mod compiler;
pub mod function;
pub mod runtime;
