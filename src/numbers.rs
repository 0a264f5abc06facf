// SPDX-FileCopyrightText: 2023 Marshall Wace <opensource@mwam.com>
// SPDX-License-Identifier: Apache-2.0
// SPDX-FileContributor: Tim Kendrick <t.kendrick@mwam.com> https://github.com/timkendrickmw
use std::{
    fmt,
    io::{self, Write},
};

/// Ordered aggregate whose printing operation is built as a closure over the
/// aggregate's own identity (`&self`), so the closure can invoke other
/// operations on the same instance. The borrow rules guarantee the instance
/// outlives the closure.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct Numbers<T: fmt::Display> {
    data: Vec<T>,
}
impl<T: fmt::Display> Numbers<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }
    pub fn add(&mut self, value: T) {
        self.data.push(value);
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    /// Print every element in insertion order.
    pub fn print_all(&self, output: &mut dyn io::Write) -> io::Result<()> {
        let mut print_item = |value: &T| self.print_one(value, output);
        self.data.iter().try_for_each(|value| print_item(value))
    }
    fn print_one(&self, value: &T, output: &mut dyn io::Write) -> io::Result<()> {
        write!(output, "{} ", value)
    }
}
