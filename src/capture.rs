// SPDX-FileCopyrightText: 2023 Marshall Wace <opensource@mwam.com>
// SPDX-License-Identifier: Apache-2.0
// SPDX-FileContributor: Tim Kendrick <t.kendrick@mwam.com> https://github.com/timkendrickmw
use std::{cell::RefCell, rc::Rc};

use serde::{Deserialize, Serialize};

use crate::{
    closure::{ClosureError, EvalError},
    scope::Scope,
    value::Value,
};

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum CaptureMode {
    ByValue,
    ByReference,
}

/// Capture declaration for a closure: an optional default mode plus explicit
/// per-name overrides, mirroring the `[]` / `[=]` / `[&]` / `[n]` / `[&n]` /
/// `[=, &count]` capture-list forms.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct CaptureList {
    default_mode: Option<CaptureMode>,
    entries: Vec<(String, CaptureMode)>,
}
impl CaptureList {
    pub fn none() -> Self {
        Self::default()
    }
    pub fn by_value() -> Self {
        Self {
            default_mode: Some(CaptureMode::ByValue),
            entries: Vec::new(),
        }
    }
    pub fn by_reference() -> Self {
        Self {
            default_mode: Some(CaptureMode::ByReference),
            entries: Vec::new(),
        }
    }
    pub fn with_value(mut self, name: impl Into<String>) -> Self {
        self.entries.push((name.into(), CaptureMode::ByValue));
        self
    }
    pub fn with_reference(mut self, name: impl Into<String>) -> Self {
        self.entries.push((name.into(), CaptureMode::ByReference));
        self
    }
    pub fn default_mode(&self) -> Option<CaptureMode> {
        self.default_mode
    }
    /// Fix the captured environment for a closure whose body references the
    /// given free variables. Explicit entries are captured whether or not the
    /// body references them; remaining free variables fall back to the
    /// default mode.
    pub(crate) fn resolve(
        &self,
        free_variables: &[String],
        scope: &Scope,
    ) -> Result<CapturedEnvironment, ClosureError> {
        let mut bindings = Vec::with_capacity(self.entries.len() + free_variables.len());
        for (name, mode) in self.entries.iter() {
            if bindings.iter().any(|(key, _)| key == name) {
                return Err(ClosureError::DuplicateCapture(name.clone()));
            }
            bindings.push((name.clone(), capture_slot(name, *mode, scope)?));
        }
        for name in free_variables {
            if bindings.iter().any(|(key, _)| key == name) {
                continue;
            }
            match self.default_mode {
                Some(mode) => bindings.push((name.clone(), capture_slot(name, mode, scope)?)),
                None => return Err(ClosureError::UncapturedVariable(name.clone())),
            }
        }
        Ok(CapturedEnvironment { bindings })
    }
}

fn capture_slot(name: &str, mode: CaptureMode, scope: &Scope) -> Result<CaptureSlot, ClosureError> {
    let cell = scope
        .cell(name)
        .ok_or_else(|| ClosureError::UnknownVariable(String::from(name)))?;
    Ok(match mode {
        CaptureMode::ByValue => CaptureSlot::Value(cell.borrow().clone()),
        CaptureMode::ByReference => CaptureSlot::Reference(cell),
    })
}

#[derive(Debug)]
pub enum CaptureSlot {
    Value(Value),
    Reference(Rc<RefCell<Value>>),
}
impl CaptureSlot {
    fn mode(&self) -> CaptureMode {
        match self {
            CaptureSlot::Value(_) => CaptureMode::ByValue,
            CaptureSlot::Reference(_) => CaptureMode::ByReference,
        }
    }
}

/// Ordered (name, slot) bindings fixed at closure construction. Value slots
/// are private copies; reference slots alias the originating scope cell.
#[derive(Debug, Default)]
pub struct CapturedEnvironment {
    bindings: Vec<(String, CaptureSlot)>,
}
impl CapturedEnvironment {
    pub fn len(&self) -> usize {
        self.bindings.len()
    }
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|(name, _)| name.as_str())
    }
    pub fn mode(&self, name: &str) -> Option<CaptureMode> {
        self.bindings
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, slot)| slot.mode())
    }
    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, slot)| match slot {
                CaptureSlot::Value(value) => value.clone(),
                CaptureSlot::Reference(cell) => cell.borrow().clone(),
            })
    }
    pub(crate) fn set(&mut self, name: &str, value: Value) -> Result<(), EvalError> {
        match self.bindings.iter_mut().find(|(key, _)| key == name) {
            Some((_, CaptureSlot::Value(slot))) => {
                *slot = value;
                Ok(())
            }
            Some((_, CaptureSlot::Reference(cell))) => {
                *cell.borrow_mut() = value;
                Ok(())
            }
            None => Err(EvalError::UnboundVariable(String::from(name))),
        }
    }
}
