//! Line-oriented player I/O.

use std::fmt::Display;
use std::io::{BufRead, Write};

use crate::error::{EngineError, EngineResult};

/// The player's side of a game: a source of input lines and a sink for text.
pub struct Console<'a> {
    input: &'a mut dyn BufRead,
    output: &'a mut dyn Write,
}

impl<'a> Console<'a> {
    /// Wrap an input and an output stream.
    pub fn new(input: &'a mut dyn BufRead, output: &'a mut dyn Write) -> Self {
        Self { input, output }
    }

    /// Read one line without its line ending. `None` at end of input.
    pub fn read_line(&mut self) -> EngineResult<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(len);
        Ok(Some(line))
    }

    /// Read one line, treating end of input as an error.
    pub fn expect_line(&mut self) -> EngineResult<String> {
        self.read_line()?.ok_or(EngineError::InputClosed)
    }

    /// Print a line of text.
    pub fn say(&mut self, text: impl Display) -> EngineResult<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Print text verbatim; used for pre-formatted blocks.
    pub fn write(&mut self, text: &str) -> EngineResult<()> {
        self.output.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Flush pending output.
    pub fn flush(&mut self) -> EngineResult<()> {
        self.output.flush()?;
        Ok(())
    }
}
