//! Diagnostics sink for semantic errors.
//!
//! The type checker never stops on the first error; it reports into a
//! [`Diagnostics`] value and keeps going. Later stages must only run when
//! [`Diagnostics::has_errors`] is false.

use std::{fmt::Display, rc::Rc};

use super::errors::{ErrorKind, SemanticError};

/// One reported semantic error.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub line: u32,
    pub file: Option<Rc<String>>,
    pub error: SemanticError,
}

impl Diagnostic {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}: {}", file, self.line, self.error),
            None => write!(f, "{}: {}", self.line, self.error),
        }
    }
}

/// Ordered collection of diagnostics for one compilation unit.
#[derive(Debug, Default)]
pub struct Diagnostics {
    file: Option<Rc<String>>,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(file: Option<Rc<String>>) -> Self {
        Diagnostics {
            file,
            entries: vec![],
        }
    }

    pub fn report(&mut self, line: u32, error: SemanticError) {
        tracing::debug!(line, kind = %error.kind(), "{}", error);

        self.entries.push(Diagnostic {
            line,
            file: self.file.clone(),
            error,
        });
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
