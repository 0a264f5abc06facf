// SPDX-FileCopyrightText: 2023 Marshall Wace <opensource@mwam.com>
// SPDX-License-Identifier: Apache-2.0
// SPDX-FileContributor: Tim Kendrick <t.kendrick@mwam.com> https://github.com/timkendrickmw
pub mod capture;
pub mod closure;
pub mod demo;
pub mod expr;
pub mod json;
pub mod numbers;
pub mod scope;
pub mod value;

#[cfg(test)]
mod tests {
    use crate::{
        capture::CaptureList,
        closure::{Closure, Mutability, Parameter},
        expr::{Expr, Stmt},
        numbers::Numbers,
        scope::Scope,
        value::{IntValue, Value, ValueType},
    };

    fn divisibility_predicate(scope: &Scope) -> Closure {
        Closure::new(
            scope,
            CaptureList::none().with_value("n"),
            vec![Parameter::new("x", ValueType::Int)],
            Mutability::Immutable,
            None,
            vec![Stmt::ret(Expr::eq(
                Expr::modulo(Expr::variable("x"), Expr::variable("n")),
                Expr::int(0),
            ))],
        )
        .unwrap()
    }

    #[test]
    fn first_divisible_match_respects_traversal_order() {
        let data: [IntValue; 10] = [9, 7, 5, 3, 1, -2, -4, -6, -8, 0];
        let mut scope = Scope::new();
        scope.declare("n", 4);
        let mut predicate = divisibility_predicate(&scope);
        let mut output = Vec::new();
        let mut found = None;
        for item in data {
            if predicate.call(&[Value::Int(item)], &mut output).unwrap() == Value::Boolean(true) {
                found = Some(item);
                break;
            }
        }
        assert_eq!(found, Some(-4));
    }

    #[test]
    fn no_divisible_match_yields_none() {
        let data: [IntValue; 3] = [1, 3, 5];
        let mut scope = Scope::new();
        scope.declare("n", 2);
        let mut predicate = divisibility_predicate(&scope);
        let mut output = Vec::new();
        let mut found = None;
        for item in data {
            if predicate.call(&[Value::Int(item)], &mut output).unwrap() == Value::Boolean(true) {
                found = Some(item);
                break;
            }
        }
        assert_eq!(found, None);
    }

    #[test]
    fn sort_by_magnitude_orders_by_absolute_value() {
        let mut output = Vec::new();
        crate::demo::sort_by_magnitude(&mut output).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "0 1 -2 3 -4 5 -6 7 -8 9 \n"
        );
    }

    #[test]
    fn value_capture_is_isolated_from_source() {
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
        )
        .unwrap();
        scope.set("number", 456).unwrap();
        let mut output = Vec::new();
        capture_print.call(&[], &mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "123 Captured \n");
        assert_eq!(scope.get("number"), Some(Value::Int(456)));
    }

    #[test]
    fn mutable_capture_persists_across_invocations() {
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
        )
        .unwrap();
        let mut output = Vec::new();
        capture_print.call(&[], &mut output).unwrap();
        capture_print.call(&[], &mut output).unwrap();
        capture_print.call(&[], &mut output).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "123 Captured \n124 Captured \n125 Captured \n"
        );
        assert_eq!(scope.get("number2"), Some(Value::Int(123)));
    }

    #[test]
    fn reference_capture_writes_through_to_source() {
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
        )
        .unwrap();
        let mut output = Vec::new();
        capture_print.call(&[], &mut output).unwrap();
        capture_print.call(&[], &mut output).unwrap();
        capture_print.call(&[], &mut output).unwrap();
        assert_eq!(scope.get("number3"), Some(Value::Int(126)));
        scope.set("number3", 456).unwrap();
        capture_print.call(&[], &mut output).unwrap();
        assert_eq!(scope.get("number3"), Some(Value::Int(457)));
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "123 Captured \n124 Captured \n125 Captured \n456 Captured \n"
        );
    }

    #[test]
    fn mixed_capture_counts_matching_elements() {
        let data: [IntValue; 8] = [1, 3, 5, 7, 2, 4, 6, 8];
        let mut scope = Scope::new();
        scope.declare("target", 5);
        scope.declare("count", 0);
        let mut count_less = Closure::new(
            &scope,
            CaptureList::none().with_reference("count").with_value("target"),
            vec![Parameter::new("x", ValueType::Int)],
            Mutability::Immutable,
            None,
            vec![Stmt::expression(Expr::if_then(
                Expr::lt(Expr::variable("x"), Expr::variable("target")),
                Expr::assign("count", Expr::add(Expr::variable("count"), Expr::int(1))),
            ))],
        )
        .unwrap();
        let mut output = Vec::new();
        for item in data {
            count_less.call(&[Value::Int(item)], &mut output).unwrap();
        }
        assert_eq!(scope.get("count"), Some(Value::Int(4)));
        assert_eq!(scope.get("target"), Some(Value::Int(5)));
    }

    #[test]
    fn aggregate_prints_in_insertion_order() {
        let mut ints = Numbers::new();
        ints.add(1);
        ints.add(2);
        ints.add(3);
        let mut output = Vec::new();
        ints.print_all(&mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "1 2 3 ");
    }
}
