// SPDX-FileCopyrightText: 2023 Marshall Wace <opensource@mwam.com>
// SPDX-License-Identifier: Apache-2.0
// SPDX-FileContributor: Tim Kendrick <t.kendrick@mwam.com> https://github.com/timkendrickmw
use std::{cell::RefCell, fmt, rc::Rc};

use crate::value::Value;

/// Named storage cells standing in for the enclosing function's automatic
/// variables. Reference captures alias these cells directly, so a `set` on
/// the scope is visible to any closure holding a reference capture and vice
/// versa.
#[derive(Debug, Default, Clone)]
pub struct Scope {
    bindings: Vec<(String, Rc<RefCell<Value>>)>,
}
impl Scope {
    pub fn new() -> Self {
        Self::default()
    }
    /// Introduce a new variable. Redeclaring an existing name shadows the
    /// earlier binding; existing captures keep aliasing the old storage.
    pub fn declare(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.bindings
            .push((name.into(), Rc::new(RefCell::new(value.into()))));
    }
    pub fn get(&self, name: &str) -> Option<Value> {
        self.cell(name).map(|cell| cell.borrow().clone())
    }
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), ScopeError> {
        match self.cell(name) {
            Some(cell) => {
                *cell.borrow_mut() = value.into();
                Ok(())
            }
            None => Err(ScopeError::UndeclaredVariable(String::from(name))),
        }
    }
    pub(crate) fn cell(&self, name: &str) -> Option<Rc<RefCell<Value>>> {
        self.bindings
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, cell)| Rc::clone(cell))
    }
}

#[derive(Debug, PartialEq)]
pub enum ScopeError {
    UndeclaredVariable(String),
}
impl std::error::Error for ScopeError {}
impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndeclaredVariable(name) => {
                write!(f, "Undeclared variable: {}", name)
            }
        }
    }
}
