//! Output formatting and writing utilities
//!
//! Results go to stdout (or a chosen writer) in the selected format; status
//! messages only appear in human mode.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use tracing::trace;

/// Formats serializable values for the selected output format
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty | OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "Outputting data");

        if formatted.ends_with('\n') {
            self.write(&formatted)
        } else {
            self.writeln(&formatted)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Writer sharing its buffer with the test
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_format_variants() {
        let value = json!({"b": 1, "a": [true]});
        assert_eq!(OutputFormat::Json.format(&value).unwrap(), r#"{"b":1,"a":[true]}"#);
        assert!(OutputFormat::JsonPretty.format(&value).unwrap().contains("\n  \"b\": 1"));
        assert_eq!(OutputFormat::Yaml.format(&value).unwrap(), "b: 1\na:\n- true\n");
    }

    #[test]
    fn test_status_messages_only_in_human_mode() {
        let buffer = Captured::default();
        let mut output = OutputWriter::with_writer(OutputFormat::Json, false, false, Box::new(buffer.clone()));
        output.success("done").unwrap();
        output.section("Refs").unwrap();
        output.data(&json!({"x": 1})).unwrap();
        assert_eq!(buffer.text(), "{\"x\":1}\n");

        let buffer = Captured::default();
        let mut output = OutputWriter::with_writer(OutputFormat::Human, false, false, Box::new(buffer.clone()));
        output.section("Refs").unwrap();
        output.success("done").unwrap();
        assert_eq!(buffer.text(), "=== Refs ===\ndone\n");
    }

    #[test]
    fn test_quiet_suppresses_status_but_not_data() {
        let buffer = Captured::default();
        let mut output = OutputWriter::with_writer(OutputFormat::Human, false, true, Box::new(buffer.clone()));
        output.success("done").unwrap();
        output.data(&json!(7)).unwrap();
        assert_eq!(buffer.text(), "7\n");
    }
}
