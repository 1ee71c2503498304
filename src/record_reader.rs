//! Reading back records written with the default template.
//!
//! Lines look like `TIMER <sec>.<nsec> <tag> seq <seq> @ <file>:<line>`.
//! Tags and file names must not contain whitespace for a line to parse.

use std::fmt;
use std::str::Lines;
use crate::timer_entry::TimerEntry;

/// One record parsed from a captured timer stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerRecord {
    pub secs: u64,
    pub nanos: u32,
    pub tag: String,
    pub sequence: i64,
    pub file: String,
    pub line: u32,
}

impl TimerRecord {
    /// Parses one line in the default format. Returns `None` for anything else.
    ///
    /// ```
    /// # use timer_log::record_reader::TimerRecord;
    /// let record = TimerRecord::parse_line("TIMER 3.000000250 rpc seq 9 @ main.rs:17").unwrap();
    /// assert_eq!(record.nanos, 250);
    /// assert_eq!(record.tag, "rpc");
    /// assert_eq!(record.line, 17);
    /// ```
    pub fn parse_line(line: &str) -> Option<TimerRecord> {
        let rest = line.trim_end_matches(['\r', '\n']).strip_prefix("TIMER ")?;
        let mut fields = rest.split(' ');

        let (secs, nanos) = fields.next()?.split_once('.')?;
        if nanos.len() != 9 {
            return None;
        }
        let tag = fields.next()?;
        if fields.next()? != "seq" {
            return None;
        }
        let sequence = fields.next()?.parse().ok()?;
        if fields.next()? != "@" {
            return None;
        }
        let (file, line_no) = fields.next()?.rsplit_once(':')?;
        if fields.next().is_some() {
            return None;
        }

        Some(TimerRecord {
            secs: secs.parse().ok()?,
            nanos: nanos.parse().ok().filter(|&n: &u32| n < 1_000_000_000)?,
            tag: tag.to_owned(),
            sequence,
            file: file.to_owned(),
            line: line_no.parse().ok()?,
        })
    }

    /// Nanoseconds since the epoch of the log's clock.
    pub fn as_nanos(&self) -> u128 {
        self.secs as u128 * 1_000_000_000 + self.nanos as u128
    }
}

impl From<&TimerEntry> for TimerRecord {
    fn from(entry: &TimerEntry) -> Self {
        Self {
            secs: entry.timestamp.secs,
            nanos: entry.timestamp.nanos,
            tag: entry.tag.to_owned(),
            sequence: entry.sequence,
            file: entry.source_file.to_owned(),
            line: entry.source_line,
        }
    }
}

impl fmt::Display for TimerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TIMER {}.{:09} {} seq {} @ {}:{}",
            self.secs, self.nanos, self.tag, self.sequence, self.file, self.line
        )
    }
}

/// Iterates the timer records in captured output, skipping other lines.
///
/// ```
/// # use timer_log::record_reader::RecordReader;
/// let captured = "hello\n\
///                 TIMER 1.000000000 a seq 0 @ x.rs:1\n\
///                 TIMER 1.000000005 b seq 1 @ x.rs:2\n";
/// let tags: Vec<_> = RecordReader::new(captured).map(|r| r.tag).collect();
/// assert_eq!(tags, ["a", "b"]);
/// ```
pub struct RecordReader<'a> {
    lines: Lines<'a>,
    skipped: usize,
}

impl<'a> RecordReader<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            skipped: 0,
        }
    }

    /// Lines seen so far that were not timer records.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for RecordReader<'_> {
    type Item = TimerRecord;

    fn next(&mut self) -> Option<TimerRecord> {
        for line in self.lines.by_ref() {
            match TimerRecord::parse_line(line) {
                Some(record) => return Some(record),
                None => self.skipped += 1,
            }
        }
        None
    }
}
