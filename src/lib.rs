//! # Timer Log
//!
//! An in-process event timing log for instrumenting latency-sensitive code:
//!
//! * **Cheap recording**: an append takes a lock, reads the clock and stores
//!   four words; strings are kept by `'static` reference, never copied
//! * **Bounded memory**: the entry array is allocated once, at creation
//! * **No silent loss**: a full buffer is drained to the sink before the
//!   next entry is stored, never rejected
//!
//! ## Main Components
//!
//! * `TimerLog`: fixed-capacity, mutex-guarded entry buffer with flush-on-full
//! * `global`: the process-wide instance (`global_init` / `global_destroy`)
//! * `format`: positional record templates rendered at flush time
//! * `clock`: timestamp strategies
//! * `record_reader`: parses default-format output back into records
//!
//! ## Build Features
//!
//! * `profiler` (default): the real implementation. Without it `TimerLog`
//!   and the `global_*` functions compile to no-ops with the same API.
//! * `rdtsc`: hardware counter timestamps. Not implemented; enabling it is
//!   a compile error.
//!
//! ## Quick Start
//!
//! ```
//! use timer_log::{TimerLog, RecordFormat, timer_mark};
//!
//! let log = TimerLog::new(1024, Vec::new(), RecordFormat::default());
//! for request in 0..3 {
//!     timer_mark!(log, "parse", request);
//!     timer_mark!(log, "respond", request);
//! }
//!
//! // Destroying flushes what is left and returns the stream.
//! let output = String::from_utf8(log.destroy()).unwrap();
//! # #[cfg(feature = "profiler")]
//! assert_eq!(output.lines().count(), 6);
//! ```

pub mod clock;
pub mod config;
pub mod format;
pub mod global;
pub mod record_reader;
pub mod sink;
pub mod timer_entry;

#[cfg(feature = "profiler")]
pub mod timer_log;

#[cfg(not(feature = "profiler"))]
#[path = "noop.rs"]
pub mod timer_log;

pub use clock::{ClockSource, FixedClock, MonotonicClock, Timestamp};
pub use config::{ConfigError, TimerLogConfig};
pub use format::{FormatError, RecordFormat, DEFAULT_TEMPLATE};
pub use global::{
    global_append, global_destroy, global_init, global_init_with, with_global, GLOBAL_CAPACITY,
};
pub use record_reader::{RecordReader, TimerRecord};
pub use timer_entry::TimerEntry;
pub use timer_log::{TimerLog, TimerLogStats};

/// Records an event into a [`TimerLog`], tagging it with the call site.
///
/// The sequence must convert losslessly into `i64`:
///
/// ```
/// # use timer_log::{TimerLog, RecordFormat, timer_mark};
/// let log = TimerLog::new(8, Vec::new(), RecordFormat::default());
/// timer_mark!(log, "checkpoint", 42);
/// timer_mark!(log, "checkpoint", u32::MAX);
/// ```
///
/// ```compile_fail
/// # use timer_log::{TimerLog, RecordFormat, timer_mark};
/// let log = TimerLog::new(8, Vec::new(), RecordFormat::default());
/// timer_mark!(log, "checkpoint", u64::MAX);
/// ```
#[macro_export]
macro_rules! timer_mark {
    ($log:expr, $tag:expr, $seq:expr) => {
        $log.append($tag, ::core::primitive::i64::from($seq), file!(), line!())
    };
}

/// Records an event into the global log, tagging it with the call site.
///
/// Does nothing if the global log is not installed or the `profiler`
/// feature is off. The sequence must convert losslessly into `i64`.
///
/// ```compile_fail
/// # use timer_log::global_timer_mark;
/// global_timer_mark!("request", 7usize);
/// ```
#[macro_export]
macro_rules! global_timer_mark {
    ($tag:expr, $seq:expr) => {
        $crate::global::global_append(
            $tag,
            ::core::primitive::i64::from($seq),
            file!(),
            line!(),
        )
    };
}
