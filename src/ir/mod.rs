//! Three-address intermediate representation.
//!
//! A checked program is flattened into functions made of register-based
//! instructions, labels and branches. Top-level statements end up in a
//! synthesized initialization function that always comes first.

pub mod builder;
pub mod instruction;

#[cfg(test)]
mod tests;
