/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: The program root
/// - expressions: Expression nodes, literals and operators
/// - statements: Statement nodes, parameters and type annotations
pub mod ast;
pub mod expressions;
pub mod statements;
