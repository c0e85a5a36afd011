use std::io::Write;

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use tender_core::AnalysisResult;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the human-readable report: the analyzed path, then one
/// `key: value` line per field. Missing fields print as `None`.
pub fn print_report(
    w: &mut dyn Write,
    result: &AnalysisResult,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "Analyzed:".bold(), result.path.cyan())?;
    } else {
        writeln!(w, "Analyzed: {}", result.path)?;
    }

    for (key, value) in result.parsed.fields() {
        match (value, color.enabled()) {
            (Some(value), true) => writeln!(w, "{}: {}", key.bold(), value.green())?,
            (Some(value), false) => writeln!(w, "{}: {}", key, value)?,
            (None, true) => writeln!(w, "{}: {}", key.bold(), "None".dimmed())?,
            (None, false) => writeln!(w, "{}: None", key)?,
        }
    }
    Ok(())
}

/// JSON layout used by Python's `json.dumps` defaults: `", "` and `": "`
/// separators, and every character outside printable ASCII escaped as
/// `\uXXXX` (UTF-16 code units, lowercase hex).
struct AsciiSpacedFormatter;

impl Formatter for AsciiSpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> std::io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> std::io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> std::io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> std::io::Result<()>
    where
        W: ?Sized + Write,
    {
        for c in fragment.chars() {
            if (' '..='~').contains(&c) {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Print the full result as one line of JSON.
pub fn print_json(w: &mut dyn Write, result: &AnalysisResult) -> std::io::Result<()> {
    let mut serializer = Serializer::with_formatter(&mut *w, AsciiSpacedFormatter);
    result.serialize(&mut serializer)?;
    writeln!(w)?;
    Ok(())
}
