//! Compiler driver.
//!
//! Runs the pipeline over one source file and hands the result to the
//! external toolchain when a native object or executable is requested.

pub mod driver;
