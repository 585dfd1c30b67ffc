//! `%(key)s`-style record layouts.
//!
//! The layout string is parsed once into segments so rendering a record is a
//! single pass over pre-validated fields. Unknown keys and malformed
//! directives are rejected at construction time.

use std::fmt::Write as _;
use std::path::Path;
use std::time::UNIX_EPOCH;

use chrono::{
    DateTime, Local,
    format::{Item, StrftimeItems},
};
use thiserror::Error;

use super::FemtoFormatter;
use crate::log_record::FemtoLogRecord;

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Errors raised while parsing a layout or date format.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown record attribute '{key}' in log format '{format}'")]
    UnknownKey { key: String, format: String },
    #[error("malformed directive at offset {offset} in log format '{format}'")]
    Malformed { offset: usize, format: String },
    #[error("invalid date format '{0}'")]
    InvalidDateFormat(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Key {
    Name,
    LevelNo,
    LevelName,
    Message,
    Msg,
    AscTime,
    Created,
    Msecs,
    FileName,
    PathName,
    Module,
    LineNo,
    Thread,
    ThreadName,
    Process,
}

impl Key {
    fn parse(key: &str) -> Option<Self> {
        Some(match key {
            "name" => Self::Name,
            "levelno" => Self::LevelNo,
            "levelname" => Self::LevelName,
            "message" => Self::Message,
            "msg" => Self::Msg,
            "asctime" => Self::AscTime,
            "created" => Self::Created,
            "msecs" => Self::Msecs,
            "filename" => Self::FileName,
            "pathname" => Self::PathName,
            "module" => Self::Module,
            "lineno" => Self::LineNo,
            "thread" => Self::Thread,
            "threadName" => Self::ThreadName,
            "process" => Self::Process,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug)]
struct Field {
    key: Key,
    left_align: bool,
    zero_pad: bool,
    width: usize,
    precision: Option<usize>,
    conversion: char,
}

#[derive(Clone, Debug)]
enum Segment {
    Literal(String),
    Field(Field),
}

enum Value {
    Str(String),
    Int(i64),
    Float(f64),
}

/// Formatter driven by a stdlib-style layout string and a strftime date
/// format.
#[derive(Clone, Debug)]
pub struct PatternFormatter {
    segments: Vec<Segment>,
    date_format: String,
}

impl PatternFormatter {
    /// Parse `format` and validate `date_format`.
    pub fn new(format: &str, date_format: Option<&str>) -> Result<Self, FormatError> {
        let date_format = date_format.unwrap_or(DEFAULT_DATE_FORMAT).to_owned();
        if StrftimeItems::new(&date_format).any(|item| matches!(item, Item::Error)) {
            return Err(FormatError::InvalidDateFormat(date_format));
        }
        Ok(Self {
            segments: parse_segments(format)?,
            date_format,
        })
    }

    fn value(&self, key: Key, record: &FemtoLogRecord) -> Value {
        let meta = record.metadata();
        match key {
            Key::Name => Value::Str(record.logger().to_owned()),
            Key::LevelNo => Value::Int(i64::from(record.level().value())),
            Key::LevelName => Value::Str(record.level_name().to_owned()),
            Key::Message => Value::Str(record.message().to_owned()),
            Key::Msg => Value::Str(record.template().to_owned()),
            Key::AscTime => {
                let local: DateTime<Local> = meta.timestamp.into();
                let mut out = String::new();
                // Validated in `new`, so the write cannot fail on bad items.
                let _ = write!(out, "{}", local.format(&self.date_format));
                Value::Str(out)
            }
            Key::Created => Value::Float(
                meta.timestamp
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs_f64())
                    .unwrap_or_default(),
            ),
            Key::Msecs => Value::Float(
                meta.timestamp
                    .duration_since(UNIX_EPOCH)
                    .map(|d| f64::from(d.subsec_millis()))
                    .unwrap_or_default(),
            ),
            Key::FileName => Value::Str(
                Path::new(&meta.filename)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            ),
            Key::PathName => Value::Str(meta.filename.clone()),
            Key::Module => Value::Str(module_name(&meta.module_path, &meta.filename)),
            Key::LineNo => Value::Int(i64::from(meta.line_number)),
            Key::Thread => Value::Str(thread_number(&format!("{:?}", meta.thread_id))),
            Key::ThreadName => Value::Str(meta.thread_name.clone().unwrap_or_default()),
            Key::Process => Value::Int(i64::from(std::process::id())),
        }
    }
}

impl FemtoFormatter for PatternFormatter {
    fn format(&self, record: &FemtoLogRecord) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => {
                    let rendered = render_value(self.value(field.key, record), field);
                    pad_into(&mut out, &rendered, field);
                }
            }
        }
        out
    }
}

fn module_name(module_path: &str, filename: &str) -> String {
    if let Some(last) = module_path.rsplit("::").next().filter(|s| !s.is_empty()) {
        return last.to_owned();
    }
    Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn thread_number(debug: &str) -> String {
    let digits: String = debug.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        debug.to_owned()
    } else {
        digits
    }
}

fn render_value(value: Value, field: &Field) -> String {
    match (field.conversion, value) {
        ('d' | 'i', Value::Int(n)) => n.to_string(),
        ('d' | 'i', Value::Float(f)) => (f.trunc() as i64).to_string(),
        ('f', Value::Int(n)) => format!("{:.*}", field.precision.unwrap_or(6), n as f64),
        ('f', Value::Float(f)) => format!("{:.*}", field.precision.unwrap_or(6), f),
        (_, Value::Str(s)) => match field.precision {
            Some(p) => s.chars().take(p).collect(),
            None => s,
        },
        (_, Value::Int(n)) => n.to_string(),
        (_, Value::Float(f)) => f.to_string(),
    }
}

fn pad_into(out: &mut String, rendered: &str, field: &Field) {
    let width = field.width;
    let _ = if field.left_align {
        write!(out, "{rendered:<width$}")
    } else if field.zero_pad && matches!(field.conversion, 'd' | 'i' | 'f') {
        write!(out, "{rendered:0>width$}")
    } else {
        write!(out, "{rendered:>width$}")
    };
}

fn parse_segments(format: &str) -> Result<Vec<Segment>, FormatError> {
    let malformed = |offset| FormatError::Malformed {
        offset,
        format: format.to_owned(),
    };
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = format.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }
        match chars.next() {
            Some((_, '%')) => literal.push('%'),
            Some((_, '(')) => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some((_, ')')) => break,
                        Some((_, k)) => key.push(k),
                        None => return Err(malformed(offset)),
                    }
                }
                let key = Key::parse(&key).ok_or_else(|| FormatError::UnknownKey {
                    key: key.clone(),
                    format: format.to_owned(),
                })?;
                let mut field = Field {
                    key,
                    left_align: false,
                    zero_pad: false,
                    width: 0,
                    precision: None,
                    conversion: 's',
                };
                while let Some(&(_, flag)) = chars.peek() {
                    match flag {
                        '-' => field.left_align = true,
                        '0' => field.zero_pad = true,
                        ' ' | '+' | '#' => {}
                        _ => break,
                    }
                    chars.next();
                }
                field.width = take_number(&mut chars).unwrap_or(0);
                if matches!(chars.peek(), Some(&(_, '.'))) {
                    chars.next();
                    field.precision = Some(take_number(&mut chars).unwrap_or(0));
                }
                match chars.next() {
                    Some((_, conv @ ('s' | 'r' | 'd' | 'i' | 'f'))) => field.conversion = conv,
                    _ => return Err(malformed(offset)),
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Field(field));
            }
            _ => return Err(malformed(offset)),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn take_number(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> Option<usize> {
    let mut digits = String::new();
    while let Some(&(_, d)) = chars.peek() {
        if !d.is_ascii_digit() {
            break;
        }
        digits.push(d);
        chars.next();
    }
    digits.parse().ok()
}
