// SPDX-FileCopyrightText: 2023 Marshall Wace <opensource@mwam.com>
// SPDX-License-Identifier: Apache-2.0
// SPDX-FileContributor: Tim Kendrick <t.kendrick@mwam.com> https://github.com/timkendrickmw
use std::{
    fmt,
    io::{self, Write},
};

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    capture::{CaptureList, CaptureMode, CapturedEnvironment},
    expr::{free_variables, BinaryOp, Expr, Stmt, UnaryOp},
    scope::Scope,
    value::{Value, ValueType},
};

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Parameter {
    name: String,
    value_type: ValueType,
}
impl Parameter {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Mutability {
    Immutable,
    Mutable,
}
impl Mutability {
    pub fn is_mutable(self) -> bool {
        matches!(self, Self::Mutable)
    }
}

/// Polymorphic callable wrapper: any first-class callable value that can be
/// stored behind a trait object and invoked with a list of arguments.
pub trait Callable {
    fn invoke(&mut self, args: &[Value], output: &mut dyn io::Write)
        -> Result<Value, EvalError>;
}

/// A callable value: parameter list, body, captured environment and return
/// type, with the environment fixed at construction time. All static
/// validation happens in [`Closure::new`]; an invalid closure is never
/// constructed.
#[derive(Debug)]
pub struct Closure {
    params: Vec<Parameter>,
    body: Vec<Stmt>,
    env: CapturedEnvironment,
    mutability: Mutability,
    return_type: ValueType,
}
impl Closure {
    pub fn new(
        scope: &Scope,
        captures: CaptureList,
        params: Vec<Parameter>,
        mutability: Mutability,
        return_type: Option<ValueType>,
        body: Vec<Stmt>,
    ) -> Result<Self, ClosureError> {
        for (index, param) in params.iter().enumerate() {
            if params[..index].iter().any(|existing| existing.name() == param.name()) {
                return Err(ClosureError::DuplicateParameter(String::from(param.name())));
            }
        }
        let free = free_variables(&body, params.iter().map(|param| param.name()));
        let env = captures.resolve(&free, scope)?;
        let bindings = create_binding_table(&params, &env);
        let return_type = analyze_body(&body, &bindings, mutability, return_type)?;
        trace!(
            params = params.len(),
            captures = env.len(),
            return_type = %return_type,
            "constructed closure"
        );
        Ok(Self {
            params,
            body,
            env,
            mutability,
            return_type,
        })
    }
    pub fn return_type(&self) -> ValueType {
        self.return_type
    }
    pub fn mutability(&self) -> Mutability {
        self.mutability
    }
    pub fn captures(&self) -> &CapturedEnvironment {
        &self.env
    }
    /// Execute the body against the given arguments and the captured
    /// environment, writing any `Print` output to the supplied sink. Writes
    /// to reference captures are immediately visible in the originating
    /// scope; writes to value captures persist across invocations of this
    /// instance only.
    pub fn call(
        &mut self,
        args: &[Value],
        output: &mut dyn io::Write,
    ) -> Result<Value, EvalError> {
        if args.len() != self.params.len() {
            return Err(EvalError::ArityMismatch {
                expected: self.params.len(),
                received: args.len(),
            });
        }
        for (index, (param, arg)) in self.params.iter().zip(args).enumerate() {
            if arg.value_type() != param.value_type() {
                return Err(EvalError::ArgumentType {
                    index,
                    expected: param.value_type(),
                    received: arg.value_type(),
                });
            }
        }
        trace!(args = args.len(), captures = self.env.len(), "invoking closure");
        let mut frame = Frame {
            locals: self
                .params
                .iter()
                .zip(args)
                .map(|(param, arg)| (String::from(param.name()), arg.clone()))
                .collect(),
            env: &mut self.env,
            output,
        };
        for stmt in self.body.iter() {
            match stmt {
                Stmt::Expr(expr) => {
                    eval_expr(expr, &mut frame)?;
                }
                Stmt::Return(Some(expr)) => return eval_expr(expr, &mut frame),
                Stmt::Return(None) => return Ok(Value::Unit),
            }
        }
        Ok(Value::Unit)
    }
}
impl Callable for Closure {
    fn invoke(
        &mut self,
        args: &[Value],
        output: &mut dyn io::Write,
    ) -> Result<Value, EvalError> {
        self.call(args, output)
    }
}

#[derive(Clone, Copy)]
enum BindingOrigin {
    Parameter,
    ValueCapture,
    ReferenceCapture,
}

#[derive(Clone, Copy)]
struct BindingInfo {
    value_type: ValueType,
    origin: BindingOrigin,
}

fn create_binding_table(
    params: &[Parameter],
    env: &CapturedEnvironment,
) -> FnvHashMap<String, BindingInfo> {
    let mut bindings = FnvHashMap::default();
    for name in env.names() {
        if let (Some(value), Some(mode)) = (env.get(name), env.mode(name)) {
            bindings.insert(
                String::from(name),
                BindingInfo {
                    value_type: value.value_type(),
                    origin: match mode {
                        CaptureMode::ByValue => BindingOrigin::ValueCapture,
                        CaptureMode::ByReference => BindingOrigin::ReferenceCapture,
                    },
                },
            );
        }
    }
    // Parameters shadow captures of the same name
    for param in params {
        bindings.insert(
            String::from(param.name()),
            BindingInfo {
                value_type: param.value_type(),
                origin: BindingOrigin::Parameter,
            },
        );
    }
    bindings
}

fn analyze_body(
    body: &[Stmt],
    bindings: &FnvHashMap<String, BindingInfo>,
    mutability: Mutability,
    declared_return_type: Option<ValueType>,
) -> Result<ValueType, ClosureError> {
    let mut exit_types = Vec::new();
    for stmt in body {
        match stmt {
            Stmt::Expr(expr) => {
                check_expr(expr, bindings, mutability)?;
            }
            Stmt::Return(Some(expr)) => {
                exit_types.push(check_expr(expr, bindings, mutability)?)
            }
            Stmt::Return(None) => exit_types.push(ValueType::Unit),
        }
    }
    if !matches!(body.last(), Some(Stmt::Return(_))) {
        // Implicit void exit when control falls off the end of the body
        exit_types.push(ValueType::Unit);
    }
    match declared_return_type {
        Some(declared) => match exit_types.iter().find(|exit| **exit != declared) {
            Some(found) => Err(ClosureError::ReturnTypeMismatch {
                declared,
                found: *found,
            }),
            None => Ok(declared),
        },
        None => {
            let mut unique = Vec::new();
            for exit in exit_types {
                if !unique.contains(&exit) {
                    unique.push(exit);
                }
            }
            match unique.as_slice() {
                [single] => Ok(*single),
                _ => Err(ClosureError::AmbiguousReturnType(unique)),
            }
        }
    }
}

fn check_expr(
    expr: &Expr,
    bindings: &FnvHashMap<String, BindingInfo>,
    mutability: Mutability,
) -> Result<ValueType, ClosureError> {
    match expr {
        Expr::Literal(value) => Ok(value.value_type()),
        Expr::Variable(name) => lookup_binding(name, bindings).map(|info| info.value_type),
        Expr::Unary(operator @ UnaryOp::Abs, operand) => {
            let operand_type = check_expr(operand, bindings, mutability)?;
            expect_operand_type(*operator, ValueType::Int, operand_type)?;
            Ok(ValueType::Int)
        }
        Expr::Binary(operator, left, right) => {
            let left_type = check_expr(left, bindings, mutability)?;
            let right_type = check_expr(right, bindings, mutability)?;
            match operator {
                BinaryOp::Add | BinaryOp::Modulo => {
                    expect_operand_type(*operator, ValueType::Int, left_type)?;
                    expect_operand_type(*operator, ValueType::Int, right_type)?;
                    Ok(ValueType::Int)
                }
                BinaryOp::LessThan => {
                    expect_operand_type(*operator, ValueType::Int, left_type)?;
                    expect_operand_type(*operator, ValueType::Int, right_type)?;
                    Ok(ValueType::Boolean)
                }
                BinaryOp::Equal => {
                    if left_type != right_type {
                        return Err(ClosureError::TypeMismatch {
                            expected: left_type,
                            received: right_type,
                        });
                    }
                    Ok(ValueType::Boolean)
                }
                BinaryOp::Concat => {
                    expect_operand_type(*operator, ValueType::String, left_type)?;
                    expect_operand_type(*operator, ValueType::String, right_type)?;
                    Ok(ValueType::String)
                }
            }
        }
        Expr::Assign(name, value) => {
            let info = lookup_binding(name, bindings)?;
            check_mutation(name, info, mutability)?;
            let value_type = check_expr(value, bindings, mutability)?;
            if value_type != info.value_type {
                return Err(ClosureError::TypeMismatch {
                    expected: info.value_type,
                    received: value_type,
                });
            }
            Ok(ValueType::Unit)
        }
        Expr::PostIncrement(name) => {
            let info = lookup_binding(name, bindings)?;
            check_mutation(name, info, mutability)?;
            if info.value_type != ValueType::Int {
                return Err(ClosureError::TypeMismatch {
                    expected: ValueType::Int,
                    received: info.value_type,
                });
            }
            Ok(ValueType::Int)
        }
        Expr::Print(segments) => {
            for segment in segments {
                check_expr(segment, bindings, mutability)?;
            }
            Ok(ValueType::Unit)
        }
        Expr::If {
            condition,
            then,
            otherwise,
        } => {
            let condition_type = check_expr(condition, bindings, mutability)?;
            if condition_type != ValueType::Boolean {
                return Err(ClosureError::TypeMismatch {
                    expected: ValueType::Boolean,
                    received: condition_type,
                });
            }
            let then_type = check_expr(then, bindings, mutability)?;
            match otherwise {
                Some(otherwise) => {
                    let else_type = check_expr(otherwise, bindings, mutability)?;
                    if then_type != else_type {
                        return Err(ClosureError::IncompatibleBranches {
                            then_type,
                            else_type,
                        });
                    }
                    Ok(then_type)
                }
                None => {
                    if then_type != ValueType::Unit {
                        return Err(ClosureError::TypeMismatch {
                            expected: ValueType::Unit,
                            received: then_type,
                        });
                    }
                    Ok(ValueType::Unit)
                }
            }
        }
    }
}

fn lookup_binding<'a>(
    name: &str,
    bindings: &'a FnvHashMap<String, BindingInfo>,
) -> Result<&'a BindingInfo, ClosureError> {
    bindings
        .get(name)
        .ok_or_else(|| ClosureError::UnknownVariable(String::from(name)))
}

fn check_mutation(
    name: &str,
    info: &BindingInfo,
    mutability: Mutability,
) -> Result<(), ClosureError> {
    match info.origin {
        BindingOrigin::ValueCapture if !mutability.is_mutable() => Err(
            ClosureError::ImmutableCaptureMutation(String::from(name)),
        ),
        _ => Ok(()),
    }
}

fn expect_operand_type(
    operator: impl fmt::Display,
    expected: ValueType,
    received: ValueType,
) -> Result<(), ClosureError> {
    if received != expected {
        Err(ClosureError::OperandType {
            operator: operator.to_string(),
            expected,
            received,
        })
    } else {
        Ok(())
    }
}

struct Frame<'a> {
    locals: Vec<(String, Value)>,
    env: &'a mut CapturedEnvironment,
    output: &'a mut dyn io::Write,
}
impl Frame<'_> {
    fn get(&self, name: &str) -> Result<Value, EvalError> {
        match self
            .locals
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
        {
            Some(value) => Ok(value),
            None => self
                .env
                .get(name)
                .ok_or_else(|| EvalError::UnboundVariable(String::from(name))),
        }
    }
    fn set(&mut self, name: &str, value: Value) -> Result<(), EvalError> {
        match self.locals.iter_mut().rev().find(|(key, _)| key == name) {
            Some((_, slot)) => {
                *slot = value;
                Ok(())
            }
            None => self.env.set(name, value),
        }
    }
}

fn eval_expr(expr: &Expr, frame: &mut Frame) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Variable(name) => frame.get(name),
        Expr::Unary(operator @ UnaryOp::Abs, operand) => match eval_expr(operand, frame)? {
            Value::Int(value) => value
                .checked_abs()
                .map(Value::Int)
                .ok_or(EvalError::ArithmeticOverflow),
            value => Err(EvalError::OperandType {
                operator: operator.to_string(),
                received: value.value_type(),
            }),
        },
        Expr::Binary(operator, left, right) => {
            let left = eval_expr(left, frame)?;
            let right = eval_expr(right, frame)?;
            apply_binary(*operator, left, right)
        }
        Expr::Assign(name, value) => {
            let value = eval_expr(value, frame)?;
            frame.set(name, value)?;
            Ok(Value::Unit)
        }
        Expr::PostIncrement(name) => match frame.get(name)? {
            Value::Int(current) => {
                let next = current
                    .checked_add(1)
                    .ok_or(EvalError::ArithmeticOverflow)?;
                frame.set(name, Value::Int(next))?;
                Ok(Value::Int(current))
            }
            value => Err(EvalError::OperandType {
                operator: String::from("++"),
                received: value.value_type(),
            }),
        },
        Expr::Print(segments) => {
            for segment in segments {
                let value = eval_expr(segment, frame)?;
                write!(frame.output, "{}", value)?;
            }
            Ok(Value::Unit)
        }
        Expr::If {
            condition,
            then,
            otherwise,
        } => match eval_expr(condition, frame)? {
            Value::Boolean(true) => eval_expr(then, frame),
            Value::Boolean(false) => match otherwise {
                Some(otherwise) => eval_expr(otherwise, frame),
                None => Ok(Value::Unit),
            },
            value => Err(EvalError::OperandType {
                operator: String::from("if"),
                received: value.value_type(),
            }),
        },
    }
}

fn apply_binary(operator: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    match (operator, &left, &right) {
        (BinaryOp::Add, Value::Int(left), Value::Int(right)) => left
            .checked_add(*right)
            .map(Value::Int)
            .ok_or(EvalError::ArithmeticOverflow),
        (BinaryOp::Modulo, Value::Int(_), Value::Int(0)) => Err(EvalError::DivisionByZero),
        (BinaryOp::Modulo, Value::Int(left), Value::Int(right)) => left
            .checked_rem(*right)
            .map(Value::Int)
            .ok_or(EvalError::ArithmeticOverflow),
        (BinaryOp::LessThan, Value::Int(left), Value::Int(right)) => {
            Ok(Value::Boolean(left < right))
        }
        (BinaryOp::Equal, left, right) => Ok(Value::Boolean(left == right)),
        (BinaryOp::Concat, Value::String(left), Value::String(right)) => {
            Ok(Value::string(format!("{}{}", left.get(), right.get())))
        }
        _ => Err(EvalError::OperandType {
            operator: operator.to_string(),
            received: left.value_type(),
        }),
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum ClosureError {
    UnknownVariable(String),
    UncapturedVariable(String),
    DuplicateCapture(String),
    DuplicateParameter(String),
    ImmutableCaptureMutation(String),
    TypeMismatch {
        expected: ValueType,
        received: ValueType,
    },
    OperandType {
        operator: String,
        expected: ValueType,
        received: ValueType,
    },
    IncompatibleBranches {
        then_type: ValueType,
        else_type: ValueType,
    },
    ReturnTypeMismatch {
        declared: ValueType,
        found: ValueType,
    },
    AmbiguousReturnType(Vec<ValueType>),
}
impl std::error::Error for ClosureError {}
impl fmt::Display for ClosureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVariable(name) => {
                write!(f, "Capture refers to unknown variable: {}", name)
            }
            Self::UncapturedVariable(name) => {
                write!(f, "Variable referenced by body is not captured: {}", name)
            }
            Self::DuplicateCapture(name) => {
                write!(f, "Variable captured multiple times: {}", name)
            }
            Self::DuplicateParameter(name) => {
                write!(f, "Duplicate parameter name: {}", name)
            }
            Self::ImmutableCaptureMutation(name) => write!(
                f,
                "Cannot mutate value capture of non-mutable closure: {}",
                name
            ),
            Self::TypeMismatch { expected, received } => {
                write!(f, "Expected {}, received {}", expected, received)
            }
            Self::OperandType {
                operator,
                expected,
                received,
            } => write!(
                f,
                "Invalid {} operand: expected {}, received {}",
                operator, expected, received
            ),
            Self::IncompatibleBranches {
                then_type,
                else_type,
            } => write!(
                f,
                "Incompatible branch types: {} and {}",
                then_type, else_type
            ),
            Self::ReturnTypeMismatch { declared, found } => write!(
                f,
                "Declared return type {} does not match {} exit",
                declared, found
            ),
            Self::AmbiguousReturnType(types) => write!(
                f,
                "Unable to infer return type from divergent exits: {}",
                types
                    .iter()
                    .map(|value_type| format!("{}", value_type))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

#[derive(Debug)]
pub enum EvalError {
    ArityMismatch {
        expected: usize,
        received: usize,
    },
    ArgumentType {
        index: usize,
        expected: ValueType,
        received: ValueType,
    },
    UnboundVariable(String),
    OperandType {
        operator: String,
        received: ValueType,
    },
    ArithmeticOverflow,
    DivisionByZero,
    Io(io::Error),
}
impl std::error::Error for EvalError {}
impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArityMismatch { expected, received } => write!(
                f,
                "Invalid number of arguments: expected {}, received {}",
                expected, received
            ),
            Self::ArgumentType {
                index,
                expected,
                received,
            } => write!(
                f,
                "Invalid argument {}: expected {}, received {}",
                index, expected, received
            ),
            Self::UnboundVariable(name) => write!(f, "Unbound variable: {}", name),
            Self::OperandType { operator, received } => {
                write!(f, "Invalid {} operand: {}", operator, received)
            }
            Self::ArithmeticOverflow => write!(f, "Arithmetic overflow"),
            Self::DivisionByZero => write!(f, "Division by zero"),
            Self::Io(err) => write!(f, "Output write failed: {}", err),
        }
    }
}
impl From<io::Error> for EvalError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
