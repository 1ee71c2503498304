use std::io::Write;
use crate::format::RecordFormat;
use crate::timer_entry::TimerEntry;

/// Destination of flushed timer entries.
///
/// A sink pairs the caller's stream with the format used to render each
/// entry. The stream is only written to and flushed, never closed; the log
/// hands it back to the caller when it is destroyed.
pub struct Sink<W> {
    stream: Option<W>,
    format: RecordFormat,
    scratch: Vec<u8>,
}

/// How many entries one flush managed to write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushOutcome {
    pub written: usize,
    pub failed: usize,
}

impl<W: Write> Sink<W> {
    pub fn new(stream: W, format: RecordFormat) -> Self {
        Self {
            stream: Some(stream),
            format,
            scratch: Vec::with_capacity(256),
        }
    }

    pub fn format(&self) -> &RecordFormat {
        &self.format
    }

    /// Writes every entry, one record each, then flushes the stream.
    ///
    /// A failed write does not stop the remaining entries from being
    /// attempted. Nothing is retried.
    pub fn write_entries(&mut self, entries: &[TimerEntry]) -> FlushOutcome {
        let mut outcome = FlushOutcome::default();
        let Some(stream) = self.stream.as_mut() else {
            outcome.failed = entries.len();
            return outcome;
        };

        for entry in entries {
            self.scratch.clear();
            // Rendering into a Vec cannot fail.
            let _ = self.format.render(entry, &mut self.scratch);
            match stream.write_all(&self.scratch) {
                Ok(()) => outcome.written += 1,
                Err(_) => outcome.failed += 1,
            }
        }

        if !entries.is_empty() && stream.flush().is_err() {
            tracing::warn!("timer log sink failed to flush");
        }
        outcome
    }

    /// Detaches the stream. Later writes count as failures.
    pub fn take_stream(&mut self) -> Option<W> {
        self.stream.take()
    }
}
