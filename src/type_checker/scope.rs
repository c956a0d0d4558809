//! Symbol tables.
//!
//! A [`Scope`] owns its symbols and borrows its enclosing scope, so lookups
//! walk outward through plain references. Only two levels ever exist: the
//! global scope, and one function scope chained in front of it while a
//! function body is being checked.

use std::collections::HashMap;

use super::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Var,
    Const,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    /// `None` when the declaration's type could not be resolved.
    pub ty: Option<Type>,
    pub kind: SymbolKind,
    pub line: u32,
}

impl Symbol {
    pub fn new(name: &str, ty: Option<Type>, kind: SymbolKind, line: u32) -> Self {
        Symbol {
            name: name.to_string(),
            ty,
            kind,
            line,
        }
    }

    pub fn is_const(&self) -> bool {
        self.kind == SymbolKind::Const
    }
}

#[derive(Debug, Default)]
pub struct Scope<'p> {
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
    parent: Option<&'p Scope<'p>>,
}

impl<'p> Scope<'p> {
    pub fn global() -> Self {
        Scope {
            symbols: vec![],
            index: HashMap::new(),
            parent: None,
        }
    }

    pub fn nested(parent: &'p Scope<'p>) -> Self {
        Scope {
            symbols: vec![],
            index: HashMap::new(),
            parent: Some(parent),
        }
    }

    pub fn is_global(&self) -> bool {
        self.parent.is_none()
    }

    /// Adds `symbol` to this scope.
    ///
    /// Fails with the line of the earlier declaration when the name is
    /// already bound here. Bindings in enclosing scopes are shadowed, not
    /// rejected.
    pub fn declare(&mut self, symbol: Symbol) -> Result<(), u32> {
        if let Some(existing) = self.lookup_local(&symbol.name) {
            return Err(existing.line);
        }

        tracing::trace!(
            name = %symbol.name,
            ty = ?symbol.ty,
            kind = ?symbol.kind,
            global = self.is_global(),
            "declared symbol"
        );

        self.index.insert(symbol.name.clone(), self.symbols.len());
        self.symbols.push(symbol);
        Ok(())
    }

    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&slot| &self.symbols[slot])
    }

    /// Innermost binding of `name`, searching this scope and then its parents.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let mut scope = Some(self);

        while let Some(current) = scope {
            if let Some(symbol) = current.lookup_local(name) {
                return Some(symbol);
            }
            scope = current.parent;
        }

        None
    }

    /// Symbols declared directly in this scope, in declaration order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}
