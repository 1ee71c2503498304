use std::alloc::{handle_alloc_error, Layout};
use std::io::Write;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};
use crate::clock::{ClockSource, MonotonicClock};
use crate::config::TimerLogConfig;
use crate::format::RecordFormat;
use crate::sink::Sink;
use crate::timer_entry::TimerEntry;

/// Counters describing what a timer log has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerLogStats {
    /// Flushes forced by an append finding the buffer full.
    pub flushes_on_full: u64,
    /// Records successfully handed to the stream.
    pub records_written: u64,
    /// Records dropped because the stream rejected them.
    pub write_failures: u64,
}

/// A fixed-capacity, thread-safe buffer of timing events.
///
/// The log pre-allocates room for `capacity_limit` entries when it is
/// created and never grows. Every [`append`](TimerLog::append) takes the
/// lock, and the append that finds the buffer full first drains it to the
/// sink, so no event is ever rejected and I/O is paid once per
/// `capacity_limit` appends.
///
/// # Thread Safety
///
/// `TimerLog<W>` is `Sync` whenever `W: Send`. Share it by reference or
/// through an `Arc`. A single mutex serializes all appends and flushes,
/// so entries from one log are written in the order their appends
/// acquired the lock.
///
/// # Examples
///
/// ```
/// # use timer_log::{TimerLog, RecordFormat, timer_mark};
/// let log = TimerLog::new(16, Vec::new(), RecordFormat::default());
/// timer_mark!(log, "request_start", 1);
/// timer_mark!(log, "request_end", 1);
///
/// let output = String::from_utf8(log.destroy()).unwrap();
/// assert_eq!(output.lines().count(), 2);
/// assert!(output.starts_with("TIMER "));
/// ```
pub struct TimerLog<W: Write, C: ClockSource = MonotonicClock> {
    buffer: Mutex<Buffer<W>>,
    capacity_limit: usize,
    clock: C,
}

struct Buffer<W> {
    entries: Box<[TimerEntry]>,
    count: usize,
    sink: Sink<W>,
    stats: TimerLogStats,
}

impl<W: Write> TimerLog<W> {
    /// Creates a log holding up to `capacity_limit` entries, stamped by the
    /// monotonic clock and flushed to `stream` using `format`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity_limit` is zero. Aborts the process if the entry
    /// array cannot be allocated.
    pub fn new(capacity_limit: usize, stream: W, format: RecordFormat) -> Self {
        Self::with_clock(capacity_limit, stream, format, MonotonicClock)
    }

    /// Creates a log from a [`TimerLogConfig`].
    pub fn from_config(config: TimerLogConfig, stream: W) -> Self {
        Self::new(config.capacity_limit, stream, config.format)
    }
}

impl<W: Write, C: ClockSource> TimerLog<W, C> {
    /// Like [`TimerLog::new`], with a caller-chosen timestamp source.
    pub fn with_clock(capacity_limit: usize, stream: W, format: RecordFormat, clock: C) -> Self {
        assert!(capacity_limit > 0, "timer log capacity must be positive");

        debug!(capacity_limit, template = %format.template().escape_default(), "timer log created");
        Self {
            buffer: Mutex::new(Buffer {
                entries: allocate_entries(capacity_limit),
                count: 0,
                sink: Sink::new(stream, format),
                stats: TimerLogStats::default(),
            }),
            capacity_limit,
            clock,
        }
    }

    /// Records one event.
    ///
    /// `tag` and `source_file` are stored by reference. If the buffer is
    /// full it is flushed first, on this thread, while the lock is held.
    #[inline]
    pub fn append(
        &self,
        tag: &'static str,
        sequence: i64,
        source_file: &'static str,
        source_line: u32,
    ) {
        let mut buffer = self.buffer.lock();
        if buffer.count == self.capacity_limit {
            buffer.flush_on_full();
        }

        let slot = buffer.count;
        buffer.entries[slot] = TimerEntry {
            timestamp: self.clock.now(),
            tag,
            sequence,
            source_file,
            source_line,
        };
        buffer.count = slot + 1;
    }

    /// Number of entries currently buffered.
    pub fn len(&self) -> usize {
        self.buffer.lock().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity_limit
    }

    pub fn stats(&self) -> TimerLogStats {
        self.buffer.lock().stats
    }

    pub fn format(&self) -> RecordFormat {
        self.buffer.lock().sink.format().clone()
    }

    /// Flushes whatever is buffered and returns the stream to the caller.
    ///
    /// The stream is flushed but not closed.
    pub fn destroy(self) -> W {
        let stream = {
            let mut buffer = self.buffer.lock();
            buffer.flush();
            debug!(
                records_written = buffer.stats.records_written,
                write_failures = buffer.stats.write_failures,
                "timer log destroyed"
            );
            buffer.sink.take_stream()
        };
        stream.unwrap_or_else(|| unreachable!("timer log stream detached before destroy"))
    }
}

impl<W: Write> Buffer<W> {
    #[cold]
    #[inline(never)]
    fn flush_on_full(&mut self) {
        self.stats.flushes_on_full += 1;
        self.flush();
    }

    /// Writes out `entries[..count]` and empties the buffer, even if some
    /// writes failed.
    fn flush(&mut self) {
        let count = self.count;
        if count == 0 {
            return;
        }

        let outcome = self.sink.write_entries(&self.entries[..count]);
        self.count = 0;
        self.stats.records_written += outcome.written as u64;
        self.stats.write_failures += outcome.failed as u64;

        if outcome.failed > 0 {
            warn!(failed = outcome.failed, records = count, "timer log flush lost records");
        }
        trace!(records = count, "timer log flushed");
    }
}

impl<W: Write, C: ClockSource> Drop for TimerLog<W, C> {
    fn drop(&mut self) {
        // No-op after destroy: the buffer is already empty.
        self.buffer.get_mut().flush();
    }
}

fn allocate_entries(capacity: usize) -> Box<[TimerEntry]> {
    let mut entries = Vec::new();
    if entries.try_reserve_exact(capacity).is_err() {
        match Layout::array::<TimerEntry>(capacity) {
            Ok(layout) => handle_alloc_error(layout),
            Err(_) => panic!("timer log capacity {capacity} exceeds addressable memory"),
        }
    }
    entries.resize(capacity, TimerEntry::EMPTY);
    entries.into_boxed_slice()
}
