// SPDX-FileCopyrightText: 2023 Marshall Wace <opensource@mwam.com>
// SPDX-License-Identifier: Apache-2.0
// SPDX-FileContributor: Tim Kendrick <t.kendrick@mwam.com> https://github.com/timkendrickmw
use std::fmt;

use fnv::FnvHashSet;
use serde::{Deserialize, Serialize};

use crate::value::{IntValue, StringValue, Value};

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    Literal(Value),
    Variable(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Assign(String, Box<Expr>),
    PostIncrement(String),
    Print(Vec<Expr>),
    If {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Option<Box<Expr>>,
    },
}
impl Expr {
    pub fn int(value: IntValue) -> Self {
        Expr::Literal(Value::Int(value))
    }
    pub fn boolean(value: bool) -> Self {
        Expr::Literal(Value::Boolean(value))
    }
    pub fn string(value: impl Into<StringValue>) -> Self {
        Expr::Literal(Value::String(value.into()))
    }
    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }
    pub fn abs(operand: Expr) -> Self {
        Expr::Unary(UnaryOp::Abs, Box::new(operand))
    }
    pub fn add(left: Expr, right: Expr) -> Self {
        Expr::Binary(BinaryOp::Add, Box::new(left), Box::new(right))
    }
    pub fn modulo(left: Expr, right: Expr) -> Self {
        Expr::Binary(BinaryOp::Modulo, Box::new(left), Box::new(right))
    }
    pub fn lt(left: Expr, right: Expr) -> Self {
        Expr::Binary(BinaryOp::LessThan, Box::new(left), Box::new(right))
    }
    pub fn eq(left: Expr, right: Expr) -> Self {
        Expr::Binary(BinaryOp::Equal, Box::new(left), Box::new(right))
    }
    pub fn concat(left: Expr, right: Expr) -> Self {
        Expr::Binary(BinaryOp::Concat, Box::new(left), Box::new(right))
    }
    pub fn assign(name: impl Into<String>, value: Expr) -> Self {
        Expr::Assign(name.into(), Box::new(value))
    }
    pub fn post_increment(name: impl Into<String>) -> Self {
        Expr::PostIncrement(name.into())
    }
    pub fn print(segments: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Print(segments.into_iter().collect())
    }
    pub fn if_then(condition: Expr, then: Expr) -> Self {
        Expr::If {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: None,
        }
    }
    pub fn if_else(condition: Expr, then: Expr, otherwise: Expr) -> Self {
        Expr::If {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Some(Box::new(otherwise)),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Stmt {
    Expr(Expr),
    Return(Option<Expr>),
}
impl Stmt {
    pub fn expression(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }
    pub fn ret(expr: Expr) -> Self {
        Stmt::Return(Some(expr))
    }
    pub fn ret_unit() -> Self {
        Stmt::Return(None)
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Abs,
}
impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnaryOp::Abs => write!(f, "abs"),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Modulo,
    LessThan,
    Equal,
    Concat,
}
impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Modulo => write!(f, "%"),
            BinaryOp::LessThan => write!(f, "<"),
            BinaryOp::Equal => write!(f, "=="),
            BinaryOp::Concat => write!(f, "++"),
        }
    }
}

/// Names referenced by the body that are not parameters, in first-reference
/// order. These are the variables a capture list must account for.
pub fn free_variables<'a>(
    body: &[Stmt],
    params: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let params = params.into_iter().collect::<FnvHashSet<_>>();
    let mut seen = FnvHashSet::default();
    let mut results = Vec::new();
    for stmt in body {
        match stmt {
            Stmt::Expr(expr) => visit_free_variables(expr, &params, &mut seen, &mut results),
            Stmt::Return(Some(expr)) => {
                visit_free_variables(expr, &params, &mut seen, &mut results)
            }
            Stmt::Return(None) => {}
        }
    }
    results
}

fn visit_free_variables(
    expr: &Expr,
    params: &FnvHashSet<&str>,
    seen: &mut FnvHashSet<String>,
    results: &mut Vec<String>,
) {
    match expr {
        Expr::Literal(_) => {}
        Expr::Variable(name) => record_free_variable(name, params, seen, results),
        Expr::Unary(_, operand) => visit_free_variables(operand, params, seen, results),
        Expr::Binary(_, left, right) => {
            visit_free_variables(left, params, seen, results);
            visit_free_variables(right, params, seen, results);
        }
        Expr::Assign(name, value) => {
            record_free_variable(name, params, seen, results);
            visit_free_variables(value, params, seen, results);
        }
        Expr::PostIncrement(name) => record_free_variable(name, params, seen, results),
        Expr::Print(segments) => {
            for segment in segments {
                visit_free_variables(segment, params, seen, results);
            }
        }
        Expr::If {
            condition,
            then,
            otherwise,
        } => {
            visit_free_variables(condition, params, seen, results);
            visit_free_variables(then, params, seen, results);
            if let Some(otherwise) = otherwise {
                visit_free_variables(otherwise, params, seen, results);
            }
        }
    }
}

fn record_free_variable(
    name: &str,
    params: &FnvHashSet<&str>,
    seen: &mut FnvHashSet<String>,
    results: &mut Vec<String>,
) {
    if !params.contains(name) && seen.insert(String::from(name)) {
        results.push(String::from(name));
    }
}
