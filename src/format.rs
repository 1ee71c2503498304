//! Textual record templates.
//!
//! A template is literal text with positional fields: `{N}` substitutes field
//! `N`, `{N:W}` pads it to width `W` and `{N:0W}` zero-pads it. `{{` and `}}`
//! produce literal braces. Fields may appear in any order, repeat, or be left
//! out entirely.
//!
//! | index | field       |
//! |-------|-------------|
//! | 1     | seconds     |
//! | 2     | nanoseconds |
//! | 3     | tag         |
//! | 4     | sequence    |
//! | 5     | source file |
//! | 6     | source line |

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use thiserror::Error;
use crate::timer_entry::TimerEntry;

/// Template used by the global log.
pub const DEFAULT_TEMPLATE: &str = "TIMER {1}.{2:09} {3} seq {4} @ {5}:{6}\n";

/// Errors produced while parsing a record template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unclosed '{{' at byte {offset}")]
    UnclosedBrace { offset: usize },
    #[error("unmatched '}}' at byte {offset}")]
    UnmatchedClose { offset: usize },
    #[error("unknown field '{index}' at byte {offset}; expected 1-6")]
    UnknownField { index: String, offset: usize },
    #[error("invalid width '{spec}' at byte {offset}")]
    InvalidWidth { spec: String, offset: usize },
}

/// One of the six substitutable entry fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Seconds,
    Nanos,
    Tag,
    Sequence,
    File,
    Line,
}

impl Field {
    fn from_index(index: &str) -> Option<Field> {
        match index {
            "1" => Some(Field::Seconds),
            "2" => Some(Field::Nanos),
            "3" => Some(Field::Tag),
            "4" => Some(Field::Sequence),
            "5" => Some(Field::File),
            "6" => Some(Field::Line),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field { field: Field, width: usize, zero_pad: bool },
}

/// A parsed record template, ready to render entries.
///
/// # Examples
///
/// ```
/// # use timer_log::format::RecordFormat;
/// let format: RecordFormat = "{3}#{4} at {5}:{6}\n".parse().unwrap();
/// assert_eq!(format.template(), "{3}#{4} at {5}:{6}\n");
/// assert!("{7}".parse::<RecordFormat>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFormat {
    template: String,
    segments: Vec<Segment>,
}

impl RecordFormat {
    /// Parses `template`, rejecting unknown fields and unbalanced braces.
    pub fn parse(template: &str) -> Result<Self, FormatError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let rest = &template[offset + 1..];
                    let close = rest
                        .find('}')
                        .ok_or(FormatError::UnclosedBrace { offset })?;
                    let segment = parse_field(&rest[..close], offset)?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                    // Skip the field body and its closing brace.
                    for _ in 0..rest[..=close].chars().count() {
                        chars.next();
                    }
                }
                '}' => return Err(FormatError::UnmatchedClose { offset }),
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            template: template.to_owned(),
            segments,
        })
    }

    /// Builds a format from a literal already checked by [`validate_template`].
    #[doc(hidden)]
    pub fn from_validated(template: &'static str) -> Self {
        match Self::parse(template) {
            Ok(format) => format,
            Err(err) => panic!("record template passed validation but failed to parse: {err}"),
        }
    }

    /// The template text this format was parsed from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Appends the rendering of `entry` to `out`.
    pub fn render<W: Write + ?Sized>(&self, entry: &TimerEntry, out: &mut W) -> io::Result<()> {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.write_all(text.as_bytes())?,
                Segment::Field { field, width, zero_pad } => {
                    let width = *width;
                    let zero_pad = *zero_pad;
                    match field {
                        Field::Seconds => write_number(out, entry.timestamp.secs, width, zero_pad)?,
                        Field::Nanos => write_number(out, entry.timestamp.nanos, width, zero_pad)?,
                        Field::Sequence => write_number(out, entry.sequence, width, zero_pad)?,
                        Field::Line => write_number(out, entry.source_line, width, zero_pad)?,
                        Field::Tag => write!(out, "{:width$}", entry.tag)?,
                        Field::File => write!(out, "{:width$}", entry.source_file)?,
                    }
                }
            }
        }
        Ok(())
    }
}

fn write_number<W, N>(out: &mut W, value: N, width: usize, zero_pad: bool) -> io::Result<()>
where
    W: Write + ?Sized,
    N: fmt::Display,
{
    if zero_pad {
        write!(out, "{:0width$}", value)
    } else {
        write!(out, "{:width$}", value)
    }
}

fn parse_field(body: &str, offset: usize) -> Result<Segment, FormatError> {
    let (index, spec) = match body.split_once(':') {
        Some((index, spec)) => (index, Some(spec)),
        None => (body, None),
    };

    let field = Field::from_index(index).ok_or_else(|| FormatError::UnknownField {
        index: index.to_owned(),
        offset,
    })?;

    let (width, zero_pad) = match spec {
        None => (0, false),
        Some(spec) => {
            let width = spec
                .parse::<usize>()
                .ok()
                .filter(|_| spec.bytes().all(|b| b.is_ascii_digit()))
                .ok_or_else(|| FormatError::InvalidWidth {
                    spec: spec.to_owned(),
                    offset,
                })?;
            (width, spec.len() > 1 && spec.starts_with('0'))
        }
    };

    Ok(Segment::Field { field, width, zero_pad })
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self::from_validated(DEFAULT_TEMPLATE)
    }
}

impl FromStr for RecordFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

/// Compile-time check that a template only names fields 1-6 and has
/// balanced braces. Accepts exactly what [`RecordFormat::parse`] accepts.
#[doc(hidden)]
pub const fn validate_template(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                if i + 1 < bytes.len() && bytes[i + 1] == b'{' {
                    i += 2;
                    continue;
                }
                i += 1;
                if i >= bytes.len() || bytes[i] < b'1' || bytes[i] > b'6' {
                    return false;
                }
                i += 1;
                if i < bytes.len() && bytes[i] == b':' {
                    i += 1;
                    let start = i;
                    let mut width: usize = 0;
                    while i < bytes.len() && bytes[i].is_ascii_digit() {
                        let digit = (bytes[i] - b'0') as usize;
                        width = match width.checked_mul(10) {
                            Some(scaled) => match scaled.checked_add(digit) {
                                Some(width) => width,
                                None => return false,
                            },
                            None => return false, // Width overflows usize
                        };
                        i += 1;
                    }
                    if i == start {
                        return false;
                    }
                }
                if i >= bytes.len() || bytes[i] != b'}' {
                    return false;
                }
            }
            b'}' => {
                if i + 1 < bytes.len() && bytes[i + 1] == b'}' {
                    i += 2;
                    continue;
                }
                return false; // Unmatched closing brace
            }
            _ => {}
        }
        i += 1;
    }
    true
}

/// Builds a [`RecordFormat`] from a literal, checking it at compile time.
///
/// ```
/// # use timer_log::record_format;
/// let format = record_format!("{3} {1}.{2:09}\n");
/// assert_eq!(format.template(), "{3} {1}.{2:09}\n");
/// ```
#[macro_export]
macro_rules! record_format {
    ($fmt:literal) => {{
        const _: () = assert!(
            $crate::format::validate_template($fmt),
            "malformed timer record template"
        );
        $crate::format::RecordFormat::from_validated($fmt)
    }};
}
