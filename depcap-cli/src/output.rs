//! Report rendering for `--output text|json`
//!
//! Command handlers build a payload and hand it to [`OutputWriter`]; they never
//! branch on the output format themselves.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Human-readable rendering of a command payload.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> io::Result<()>;
}

/// Writes command payloads to stdout in the selected format.
#[derive(Debug, Clone, Copy)]
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render to stdout and flush.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let mut out = io::stdout().lock();
        self.render_to(payload, &mut out)?;
        out.flush()?;
        Ok(())
    }

    /// Render to any writer. JSON is pretty-printed and newline-terminated.
    pub fn render_to<T: Render + Serialize>(
        &self,
        payload: &T,
        w: &mut dyn Write,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => payload.render_text(w)?,
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(payload)?;
                writeln!(w, "{json}")?;
            }
        }
        Ok(())
    }
}
