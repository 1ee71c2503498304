use crate::clock::Timestamp;

/// One recorded timing event.
///
/// The tag and source file are borrowed for `'static`: the log keeps only the
/// reference and reads it back when the entry is flushed, which may happen
/// long after the call site returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEntry {
    pub timestamp: Timestamp,
    pub tag: &'static str,
    pub sequence: i64,
    pub source_file: &'static str,
    pub source_line: u32,
}

impl TimerEntry {
    /// Placeholder used to pre-fill a log's backing array.
    pub const EMPTY: TimerEntry = TimerEntry {
        timestamp: Timestamp::ZERO,
        tag: "",
        sequence: 0,
        source_file: "",
        source_line: 0,
    };
}

impl Default for TimerEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}
