// SPDX-FileCopyrightText: 2023 Marshall Wace <opensource@mwam.com>
// SPDX-License-Identifier: Apache-2.0
// SPDX-FileContributor: Tim Kendrick <t.kendrick@mwam.com> https://github.com/timkendrickmw
use std::{
    cmp::Ordering,
    io::{self, Write},
};

use anyhow::Result;

use crate::{
    capture::CaptureList,
    closure::{Callable, Closure, Mutability, Parameter},
    expr::{Expr, Stmt},
    numbers::Numbers,
    scope::Scope,
    value::{IntValue, Value, ValueType},
};

/// Run every capture demonstration in sequence, writing a deterministic
/// transcript to the supplied sink. Sections are separated by blank lines.
pub fn run(output: &mut impl io::Write) -> Result<()> {
    find_first_divisible(output)?;
    sort_by_magnitude(output)?;
    writeln!(output)?;
    stored_callables(output)?;
    writeln!(output)?;
    value_capture(output)?;
    writeln!(output)?;
    mutable_value_capture(output)?;
    writeln!(output)?;
    reference_capture(output)?;
    writeln!(output)?;
    mixed_capture_count(output)?;
    writeln!(output)?;
    aggregate_print_all(output)?;
    Ok(())
}

fn int_param(name: &'static str) -> Parameter {
    Parameter::new(name, ValueType::Int)
}

/// Predicate closure capturing the divisor by value, used to locate the
/// first element divisible by it.
pub fn find_first_divisible(output: &mut impl io::Write) -> Result<()> {
    let data: [IntValue; 10] = [9, 7, 5, 3, 1, -2, -4, -6, -8, 0];
    let divisor = 4;
    let mut scope = Scope::new();
    scope.declare("n", Value::Int(divisor));
    let mut predicate = Closure::new(
        &scope,
        CaptureList::none().with_value("n"),
        vec![int_param("x")],
        Mutability::Immutable,
        None,
        vec![Stmt::ret(Expr::eq(
            Expr::modulo(Expr::variable("x"), Expr::variable("n")),
            Expr::int(0),
        ))],
    )?;
    let mut found = None;
    for item in data {
        if predicate.call(&[Value::Int(item)], output)? == Value::Boolean(true) {
            found = Some(item);
            break;
        }
    }
    if let Some(item) = found {
        writeln!(output, "{} can be divided by {}", item, divisor)?;
    }
    Ok(())
}

/// Capture-free comparator closure sorting by absolute value, followed by a
/// capture-free printer closure applied to each element.
pub fn sort_by_magnitude(output: &mut impl io::Write) -> Result<()> {
    let mut data: Vec<IntValue> = vec![9, 7, 5, 3, 1, -2, -4, -6, -8, 0];
    let scope = Scope::new();
    let mut comparator = Closure::new(
        &scope,
        CaptureList::none(),
        vec![int_param("x"), int_param("y")],
        Mutability::Immutable,
        None,
        vec![Stmt::ret(Expr::lt(
            Expr::abs(Expr::variable("x")),
            Expr::abs(Expr::variable("y")),
        ))],
    )?;
    data.sort_by(|&left, &right| {
        let mut less = |x: IntValue, y: IntValue| {
            matches!(
                comparator.call(&[Value::Int(x), Value::Int(y)], &mut io::sink()),
                Ok(Value::Boolean(true))
            )
        };
        if less(left, right) {
            Ordering::Less
        } else if less(right, left) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    });
    let mut print_item = Closure::new(
        &scope,
        CaptureList::none(),
        vec![int_param("x")],
        Mutability::Immutable,
        None,
        vec![Stmt::expression(Expr::print(vec![
            Expr::variable("x"),
            Expr::string(" "),
        ]))],
    )?;
    for item in data {
        print_item.call(&[Value::Int(item)], output)?;
    }
    writeln!(output)?;
    Ok(())
}

/// Closures stored in an inferred-type variable and behind the polymorphic
/// callable wrapper, invoked with constructed string arguments.
pub fn stored_callables(output: &mut impl io::Write) -> Result<()> {
    let scope = Scope::new();
    let mut println_str = Closure::new(
        &scope,
        CaptureList::none(),
        vec![Parameter::new("str", ValueType::String)],
        Mutability::Immutable,
        None,
        vec![Stmt::expression(Expr::print(vec![
            Expr::variable("str"),
            Expr::string("\n"),
        ]))],
    )?;
    let mut polite: Box<dyn Callable> = Box::new(Closure::new(
        &scope,
        CaptureList::none(),
        vec![Parameter::new("str", ValueType::String)],
        Mutability::Immutable,
        Some(ValueType::String),
        vec![Stmt::ret(Expr::concat(
            Expr::variable("str"),
            Expr::string(" SIR "),
        ))],
    )?);
    let message = polite.invoke(&[Value::string("Ben")], output)?;
    println_str.call(&[message], output)?;
    let message = polite.invoke(&[Value::string("Bingshiue")], output)?;
    println_str.call(&[message], output)?;
    Ok(())
}

/// Value capture snapshots at construction time: mutating the source
/// variable afterwards does not affect the closure.
pub fn value_capture(output: &mut impl io::Write) -> Result<()> {
    let mut scope = Scope::new();
    scope.declare("number", 123);
    let mut capture_print = Closure::new(
        &scope,
        CaptureList::none().with_value("number"),
        vec![],
        Mutability::Immutable,
        None,
        vec![Stmt::expression(Expr::print(vec![
            Expr::variable("number"),
            Expr::string(" Captured \n"),
        ]))],
    )?;
    scope.set("number", 456)?;
    capture_print.call(&[], output)?;
    Ok(())
}

/// Mutable value capture: each invocation increments the closure's private
/// copy; the source variable is untouched.
pub fn mutable_value_capture(output: &mut impl io::Write) -> Result<()> {
    let mut scope = Scope::new();
    scope.declare("number2", 123);
    let mut capture_print = Closure::new(
        &scope,
        CaptureList::none().with_value("number2"),
        vec![],
        Mutability::Mutable,
        None,
        vec![Stmt::expression(Expr::print(vec![
            Expr::post_increment("number2"),
            Expr::string(" Captured \n"),
        ]))],
    )?;
    capture_print.call(&[], output)?;
    capture_print.call(&[], output)?;
    capture_print.call(&[], output)?;
    if let Some(value) = scope.get("number2") {
        writeln!(output, "number2 = {}", value)?;
    }
    Ok(())
}

/// Reference capture: increments write through to the source variable, and
/// external reassignment is reflected on the next invocation.
pub fn reference_capture(output: &mut impl io::Write) -> Result<()> {
    let mut scope = Scope::new();
    scope.declare("number3", 123);
    let mut capture_print = Closure::new(
        &scope,
        CaptureList::none().with_reference("number3"),
        vec![],
        Mutability::Immutable,
        None,
        vec![Stmt::expression(Expr::print(vec![
            Expr::post_increment("number3"),
            Expr::string(" Captured \n"),
        ]))],
    )?;
    capture_print.call(&[], output)?;
    capture_print.call(&[], output)?;
    capture_print.call(&[], output)?;
    if let Some(value) = scope.get("number3") {
        writeln!(output, "number3 = {}", value)?;
    }
    scope.set("number3", 456)?;
    capture_print.call(&[], output)?;
    if let Some(value) = scope.get("number3") {
        writeln!(output, "number3 = {}", value)?;
    }
    Ok(())
}

/// Counting visitor capturing one variable by reference and one by value at
/// the same time.
pub fn mixed_capture_count(output: &mut impl io::Write) -> Result<()> {
    let data: [IntValue; 8] = [1, 3, 5, 7, 2, 4, 6, 8];
    let mut scope = Scope::new();
    scope.declare("target", 5);
    scope.declare("count", 0);
    let mut count_less = Closure::new(
        &scope,
        CaptureList::none().with_reference("count").with_value("target"),
        vec![int_param("x")],
        Mutability::Immutable,
        None,
        vec![Stmt::expression(Expr::if_then(
            Expr::lt(Expr::variable("x"), Expr::variable("target")),
            Expr::assign("count", Expr::add(Expr::variable("count"), Expr::int(1))),
        ))],
    )?;
    for item in data {
        count_less.call(&[Value::Int(item)], output)?;
    }
    if let (Some(count), Some(target)) = (scope.get("count"), scope.get("target")) {
        writeln!(output, "{} Numbers Less Than {}", count, target)?;
    }
    Ok(())
}

/// The aggregate's member operation builds a closure over the aggregate's
/// identity to print all stored elements in insertion order.
pub fn aggregate_print_all(output: &mut impl io::Write) -> Result<()> {
    let mut ints = Numbers::new();
    ints.add(1);
    ints.add(2);
    ints.add(3);
    ints.print_all(output)?;
    writeln!(output)?;
    Ok(())
}
