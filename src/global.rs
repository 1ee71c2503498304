//! The process-wide timer log.
//!
//! Call [`global_init`] once before any thread records into the global log
//! and [`global_destroy`] after the last one has finished. Nothing here
//! reference-counts the instance: that ordering is up to the caller.
//! Appends made while no instance is installed are ignored.
//!
//! With the `profiler` feature off every function here is a no-op and no
//! buffer or lock is ever created, so call sites need no `#[cfg]` of their own.

use std::io::Write;
use crate::config::TimerLogConfig;
use crate::TimerLog;

/// Stream type of the global log.
pub type GlobalStream = Box<dyn Write + Send>;

pub use crate::config::GLOBAL_CAPACITY;

#[cfg(feature = "profiler")]
mod active {
    use std::io;
    use lazy_static::lazy_static;
    use parking_lot::RwLock;
    use tracing::warn;
    use super::*;

    lazy_static! {
        static ref GLOBAL: RwLock<Option<TimerLog<GlobalStream>>> = RwLock::new(None);
    }

    pub fn global_init() {
        // Stdout is line-buffered; batch a whole flush into few writes.
        let stream = io::BufWriter::new(io::stdout());
        global_init_with(TimerLogConfig::default(), Box::new(stream));
    }

    pub fn global_init_with(config: TimerLogConfig, stream: GlobalStream) {
        let log = TimerLog::from_config(config, stream);
        let previous = GLOBAL.write().replace(log);
        if let Some(previous) = previous {
            warn!("global timer log initialized twice; flushing the previous instance");
            drop(previous.destroy());
        }
    }

    pub fn global_destroy() {
        let log = GLOBAL.write().take();
        if let Some(log) = log {
            // Stdout needs no closing; a substituted stream is dropped here.
            drop(log.destroy());
        }
    }

    #[inline]
    pub fn global_append(
        tag: &'static str,
        sequence: i64,
        source_file: &'static str,
        source_line: u32,
    ) {
        if let Some(log) = GLOBAL.read().as_ref() {
            log.append(tag, sequence, source_file, source_line);
        }
    }

    pub fn with_global<R>(f: impl FnOnce(&TimerLog<GlobalStream>) -> R) -> Option<R> {
        GLOBAL.read().as_ref().map(f)
    }
}

#[cfg(not(feature = "profiler"))]
mod active {
    use super::*;

    #[inline(always)]
    pub fn global_init() {}

    #[inline(always)]
    pub fn global_init_with(_config: TimerLogConfig, _stream: GlobalStream) {}

    #[inline(always)]
    pub fn global_destroy() {}

    #[inline(always)]
    pub fn global_append(
        _tag: &'static str,
        _sequence: i64,
        _source_file: &'static str,
        _source_line: u32,
    ) {
    }

    #[inline(always)]
    pub fn with_global<R>(_f: impl FnOnce(&TimerLog<GlobalStream>) -> R) -> Option<R> {
        None
    }
}

/// Installs the global log: capacity [`GLOBAL_CAPACITY`], stdout, default format.
pub use active::global_init;
/// Installs a global log with the given parameters and stream.
///
/// Replaces (and flushes) any instance already installed.
pub use active::global_init_with;
/// Flushes and removes the global log.
pub use active::global_destroy;
/// Records one event into the global log, if one is installed.
pub use active::global_append;
/// Runs `f` against the global log, if one is installed.
pub use active::with_global;
