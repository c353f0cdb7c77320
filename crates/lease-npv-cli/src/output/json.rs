use colored::Colorize;
use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print the full result envelope to stdout.
pub fn print_json(value: &Value) {
    if let Err(e) = write_json(io::stdout().lock(), value) {
        eprintln!("{}: could not write JSON output: {}", "error".red().bold(), e);
    }
}

fn write_json<W: Write>(mut out: W, value: &Value) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)
}
