//! Stand-in compiled when the `profiler` feature is off.
//!
//! Mirrors the real timer log's API but holds no buffer and no lock:
//! appends are discarded and `destroy` hands the untouched stream back.

use std::io::Write;
use std::marker::PhantomData;
use crate::clock::{ClockSource, MonotonicClock};
use crate::config::TimerLogConfig;
use crate::format::RecordFormat;

/// Counters describing what a timer log has done so far. Always zero here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerLogStats {
    /// Flushes forced by an append finding the buffer full.
    pub flushes_on_full: u64,
    /// Records successfully handed to the stream.
    pub records_written: u64,
    /// Records dropped because the stream rejected them.
    pub write_failures: u64,
}

/// A timer log that records nothing.
///
/// Keeps the stream only so [`destroy`](TimerLog::destroy) can hand it back.
pub struct TimerLog<W: Write, C: ClockSource = MonotonicClock> {
    stream: W,
    format: RecordFormat,
    capacity_limit: usize,
    _clock: PhantomData<C>,
}

impl<W: Write> TimerLog<W> {
    /// Creates a log that discards every append. No entry array is allocated.
    ///
    /// # Panics
    ///
    /// Panics if `capacity_limit` is zero.
    pub fn new(capacity_limit: usize, stream: W, format: RecordFormat) -> Self {
        Self::with_clock(capacity_limit, stream, format, MonotonicClock)
    }

    /// Creates a log from a [`TimerLogConfig`].
    pub fn from_config(config: TimerLogConfig, stream: W) -> Self {
        Self::new(config.capacity_limit, stream, config.format)
    }
}

impl<W: Write, C: ClockSource> TimerLog<W, C> {
    /// Like [`TimerLog::new`]; the clock is never read.
    pub fn with_clock(capacity_limit: usize, stream: W, format: RecordFormat, _clock: C) -> Self {
        assert!(capacity_limit > 0, "timer log capacity must be positive");
        Self {
            stream,
            format,
            capacity_limit,
            _clock: PhantomData,
        }
    }

    /// Discards the event.
    #[inline(always)]
    pub fn append(
        &self,
        _tag: &'static str,
        _sequence: i64,
        _source_file: &'static str,
        _source_line: u32,
    ) {
    }

    /// Number of entries currently buffered. Always zero.
    pub fn len(&self) -> usize {
        0
    }

    pub fn is_empty(&self) -> bool {
        true
    }

    pub fn capacity(&self) -> usize {
        self.capacity_limit
    }

    pub fn stats(&self) -> TimerLogStats {
        TimerLogStats::default()
    }

    pub fn format(&self) -> RecordFormat {
        self.format.clone()
    }

    /// Returns the stream to the caller untouched.
    pub fn destroy(self) -> W {
        self.stream
    }
}
