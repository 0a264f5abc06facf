// SPDX-FileCopyrightText: 2023 Marshall Wace <opensource@mwam.com>
// SPDX-License-Identifier: Apache-2.0
// SPDX-FileContributor: Tim Kendrick <t.kendrick@mwam.com> https://github.com/timkendrickmw
use std::io::{self, Write};

use enclose::demo;

pub fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so the demonstration transcript on stdout
    // stays unbroken
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let stdout = io::stdout();
    let mut output = stdout.lock();
    demo::run(&mut output)?;
    output.flush()?;
    Ok(())
}
