use std::io::{self, BufRead, Write};

/// Line-at-a-time console input with an optional prompt.
pub struct Console<R, P> {
    input: R,
    prompt_out: P,
    prompt: Option<String>,
}

impl<R: BufRead, P: Write> Console<R, P> {
    pub fn new(input: R, prompt_out: P, prompt: Option<String>) -> Self {
        Self {
            input,
            prompt_out,
            prompt,
        }
    }

    /// Read the next console line without its line ending.
    ///
    /// Returns `Ok(None)` at end of input.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        if let Some(prompt) = &self.prompt {
            write!(self.prompt_out, "{prompt}")?;
            self.prompt_out.flush()?;
        }

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed = line.strip_suffix('\n').unwrap_or(&line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Ok(Some(trimmed.to_string()))
    }
}
