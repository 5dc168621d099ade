/// cli/src/output.rs
/// Output utilities for the CLI
/// description: Styled rendering of diagnostics and status lines. Styling
/// goes through `console`, which drops colors when the stream is not a
/// terminal.

use std::io::{self, Write};

use console::Style;
use funkytrees_core::{FunkyErrorExt, Level};

/// Styles for different output elements
pub struct FormatStyle {
    pub info: Style,
    pub warning: Style,
    pub error: Style,
    pub critical: Style,
    pub location: Style,
    pub issuer: Style,
}

impl Default for FormatStyle {
    fn default() -> Self {
        FormatStyle {
            info: Style::new().for_stderr().cyan(),
            warning: Style::new().for_stderr().yellow(),
            error: Style::new().for_stderr().red().bold(),
            critical: Style::new().for_stderr().red().bold().underlined(),
            location: Style::new().for_stderr().bold(),
            issuer: Style::new().for_stderr().dim(),
        }
    }
}

impl FormatStyle {
    fn for_level(&self, level: Level) -> &Style {
        match level {
            Level::Info => &self.info,
            Level::Warning => &self.warning,
            Level::Error => &self.error,
            Level::Critical => &self.critical,
        }
    }
}

/// Printer that writes diagnostics and status lines into any `Write`.
pub struct OutputHandler<T: Write> {
    out: T,
    formatting: FormatStyle,
}

impl<T: Write> OutputHandler<T> {
    pub fn new(out: T) -> Self {
        OutputHandler { out, formatting: FormatStyle::default() }
    }

    /// One diagnostic per line: `LEVEL | location | issuer | message`.
    pub fn diagnostic(&mut self, diagnostic: &dyn FunkyErrorExt) -> io::Result<()> {
        let level = diagnostic.level();
        let location = match diagnostic.location() {
            Some(loc) => loc.to_string(),
            None => "unknown location".to_string(),
        };
        writeln!(
            self.out,
            "{} | {} | {} | {}",
            self.formatting.for_level(level).apply_to(level),
            self.formatting.location.apply_to(location),
            self.formatting.issuer.apply_to(diagnostic.issuer()),
            diagnostic.message()
        )
    }

    pub fn diagnostics(&mut self, diagnostics: &[Box<dyn FunkyErrorExt>]) -> io::Result<()> {
        for diagnostic in diagnostics {
            self.diagnostic(diagnostic.as_ref())?;
        }
        let count = diagnostics.len();
        let summary = format!("{} error{} reported", count, if count == 1 { "" } else { "s" });
        writeln!(self.out, "{}", self.formatting.error.apply_to(summary))
    }
}
