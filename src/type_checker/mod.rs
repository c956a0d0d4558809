//! Type checking and semantic analysis module.
//!
//! This module checks the parsed AST and produces an annotated tree while:
//!
//! - Resolving type names and applying the operator typing table
//! - Resolving variable reads and writes through the scope chain
//! - Checking function signatures, returns and call sites
//! - Collecting every independent error into a diagnostics sink
//!
//! Scoping is flat inside a function: `if` and `while` bodies do not open a
//! new scope, so their declarations stay visible after the construct.

pub mod scope;
pub mod type_checker;
pub mod typed_ast;
pub mod types;
