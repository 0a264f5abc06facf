// SPDX-FileCopyrightText: 2023 Marshall Wace <opensource@mwam.com>
// SPDX-License-Identifier: Apache-2.0
// SPDX-FileContributor: Tim Kendrick <t.kendrick@mwam.com> https://github.com/timkendrickmw
use std::{fmt, rc::Rc};

use serde::{Deserialize, Serialize};

pub type IntValue = i64;

#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Unit,
    Boolean(bool),
    Int(IntValue),
    String(StringValue),
}
impl Value {
    pub fn string(value: impl Into<StringValue>) -> Self {
        Value::String(value.into())
    }
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Unit => ValueType::Unit,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Int(_) => ValueType::Int,
            Value::String(_) => ValueType::String,
        }
    }
}
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}
impl From<IntValue> for Value {
    fn from(value: IntValue) -> Self {
        Value::Int(value)
    }
}
impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(IntValue::from(value))
    }
}
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Boolean(value) => write!(f, "{}", value),
            Value::Int(value) => write!(f, "{}", value),
            Value::String(value) => write!(f, "{}", value.get()),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Unit,
    Boolean,
    Int,
    String,
}
impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValueType::Unit => write!(f, "Unit"),
            ValueType::Boolean => write!(f, "Boolean"),
            ValueType::Int => write!(f, "Int"),
            ValueType::String => write!(f, "String"),
        }
    }
}

#[derive(Clone)]
pub enum StringValue {
    Literal(&'static str),
    Runtime(Rc<String>),
}
impl StringValue {
    pub fn literal(value: &'static str) -> StringValue {
        StringValue::Literal(value)
    }
    pub fn new(value: String) -> StringValue {
        StringValue::Runtime(Rc::new(value))
    }
    pub fn get(&self) -> &str {
        match self {
            StringValue::Literal(value) => value,
            StringValue::Runtime(value) => value,
        }
    }
}
impl From<&'static str> for StringValue {
    fn from(value: &'static str) -> Self {
        StringValue::literal(value)
    }
}
impl From<String> for StringValue {
    fn from(value: String) -> Self {
        StringValue::new(value)
    }
}
impl PartialEq for StringValue {
    fn eq(&self, other: &StringValue) -> bool {
        self.get() == other.get()
    }
}
impl fmt::Display for StringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}
impl fmt::Debug for StringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.get())
    }
}
