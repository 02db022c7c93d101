// SPDX-License-Identifier: MIT

//! Newline-delimited JSON decoder for test event streams.

use crate::error::DecodeError;
use crate::event::TestEvent;
use std::io::BufRead;

/// Forward-only decoder over a byte stream of newline-delimited test
/// events.
///
/// Logical lines are reassembled even when the underlying reader delivers
/// them in fragments, with no upper bound on line length. Blank lines are
/// skipped, and a final line lacking its terminator is still decoded.
/// End of stream ends iteration cleanly; it is never reported as an
/// error. A parse error is scoped to its line and iteration may continue
/// past it; an IO error exhausts the iterator.
pub struct EventDecoder<R> {
    reader: R,
    line_no: usize,
    done: bool,
}

impl<R: BufRead> EventDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            done: false,
        }
    }

    /// Number of the last line consumed (1-based); 0 before any read.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    fn next_event(&mut self) -> Result<Option<TestEvent>, DecodeError> {
        let mut line = Vec::new();
        loop {
            line.clear();
            self.line_no += 1;
            let read = self
                .reader
                .read_until(b'\n', &mut line)
                .map_err(|source| DecodeError::Io {
                    line_no: self.line_no,
                    source,
                })?;
            if read == 0 {
                return Ok(None);
            }

            while matches!(line.last(), Some(b'\n' | b'\r')) {
                line.pop();
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let event =
                serde_json::from_slice(&line).map_err(|source| DecodeError::Parse {
                    line_no: self.line_no,
                    line: String::from_utf8_lossy(&line).into_owned(),
                    source,
                })?;
            return Ok(Some(event));
        }
    }
}

impl<R: BufRead> Iterator for EventDecoder<R> {
    type Item = Result<TestEvent, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_event() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                if matches!(err, DecodeError::Io { .. }) {
                    self.done = true;
                }
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
#[path = "decoder_tests.rs"]
mod tests;
