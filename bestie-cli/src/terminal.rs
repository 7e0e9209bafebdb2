//! Line-oriented terminal: async line input, synchronous flushed output.

use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

pub struct Terminal<R, W> {
    lines: Lines<R>,
    out: W,
}

impl<R: AsyncBufRead + Unpin, W: Write> Terminal<R, W> {
    pub fn new(reader: R, out: W) -> Self {
        Self {
            lines: reader.lines(),
            out,
        }
    }

    /// Next input line without its terminator; `None` at end of input. Cancel-safe.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.lines.next_line().await
    }

    pub fn say(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.out, "{}", text.as_ref())?;
        self.out.flush()
    }

    /// Prints `question` and reads the trimmed answer.
    pub async fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.out, "{} ", question)?;
        self.out.flush()?;
        Ok(self.next_line().await?.map(|s| s.trim().to_string()))
    }

    pub fn output(&self) -> &W {
        &self.out
    }
}
