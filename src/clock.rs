//! Timestamp sources for timer entries.
//!
//! Every entry is stamped by a [`ClockSource`] while the log lock is held.
//! The only implemented strategy is [`MonotonicClock`]; the hardware counter
//! hook (`rdtsc` feature) refuses to build rather than fall back to it.

use std::time::{Instant, SystemTime, UNIX_EPOCH};
use lazy_static::lazy_static;

#[cfg(feature = "rdtsc")]
compile_error!("rdtsc timestamps are not supported yet; disable the `rdtsc` feature");

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A point in time split into whole seconds and nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    pub secs: u64,
    /// Always in `0..1_000_000_000`.
    pub nanos: u32,
}

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp { secs: 0, nanos: 0 };

    /// Builds a timestamp, carrying whole seconds out of `nanos`.
    pub const fn new(secs: u64, nanos: u32) -> Self {
        let carry = nanos as u64 / NANOS_PER_SEC;
        Self {
            secs: secs + carry,
            nanos: (nanos as u64 % NANOS_PER_SEC) as u32,
        }
    }

    pub const fn from_nanos(total: u64) -> Self {
        Self {
            secs: total / NANOS_PER_SEC,
            nanos: (total % NANOS_PER_SEC) as u32,
        }
    }

    pub const fn as_nanos(&self) -> u128 {
        self.secs as u128 * NANOS_PER_SEC as u128 + self.nanos as u128
    }
}

/// Strategy used by a timer log to stamp entries.
///
/// Implementations are called on the append path with the log lock held,
/// so they must be cheap and must not block.
pub trait ClockSource: Send + Sync {
    fn now(&self) -> Timestamp;
}

lazy_static! {
    /// Wall-clock reading paired with the instant it was taken.
    ///
    /// Captured once per process; later readings are this wall time plus the
    /// monotonic time elapsed since, so they never go backwards.
    static ref ANCHOR: (Instant, u64) = {
        let instant = Instant::now();
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        (instant, wall)
    };
}

/// Monotonic clock aligned to seconds since the UNIX epoch.
///
/// # Examples
///
/// ```
/// # use timer_log::clock::{ClockSource, MonotonicClock};
/// let clock = MonotonicClock;
/// let first = clock.now();
/// let second = clock.now();
/// assert!(second >= first);
/// assert!(first.nanos < 1_000_000_000);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl ClockSource for MonotonicClock {
    #[inline(always)]
    fn now(&self) -> Timestamp {
        now()
    }
}

/// Reads the process-wide monotonic clock.
#[inline(always)]
pub fn now() -> Timestamp {
    let (anchor, wall) = *ANCHOR;
    let elapsed = anchor.elapsed().as_nanos() as u64;
    Timestamp::from_nanos(wall.saturating_add(elapsed))
}

/// A clock that always returns the same reading. Useful for deterministic output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClock(pub Timestamp);

impl ClockSource for FixedClock {
    #[inline(always)]
    fn now(&self) -> Timestamp {
        self.0
    }
}
