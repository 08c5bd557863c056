//! The line-oriented student marks file.
//!
//! ```text
//! 3
//! 1, Alice, 10, 10, 10, 80
//! 2, Bob, 5, 5, 5, 50
//! 3, Cara, 20, 20, 20, 100
//! ```
//!
//! The first line declares a record count. It is informational: the records
//! actually present win, and a mismatch is only reported.

use thiserror::Error;

use crate::students::record::StudentRecord;

/// Fields per record line.
pub const FIELD_COUNT: usize = 6;

/// Problems with the header that make the whole file unreadable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("file is empty")]
    Empty,
    #[error("record count is not an integer: '{0}'")]
    BadCount(String),
}

/// Why a record line was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    FieldCount(usize),
    InvalidMark(String),
}

/// A data line that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the file.
    pub line: usize,
    pub content: String,
    pub reason: SkipReason,
}

impl std::fmt::Display for SkippedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            SkipReason::FieldCount(n) => write!(
                f,
                "line {}: expected {FIELD_COUNT} fields, found {n}: {}",
                self.line, self.content
            ),
            SkipReason::InvalidMark(mark) => write!(
                f,
                "line {}: invalid mark '{mark}': {}",
                self.line, self.content
            ),
        }
    }
}

/// Everything read from a marks file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecords {
    pub declared: usize,
    pub records: Vec<StudentRecord>,
    pub skipped: Vec<SkippedLine>,
}

impl ParsedRecords {
    pub fn count_matches(&self) -> bool {
        self.declared == self.records.len()
    }
}

/// Parse the contents of a marks file.
pub fn parse_records(content: &str) -> Result<ParsedRecords, HeaderError> {
    let mut lines = content.lines().enumerate();
    let (_, header) = lines
        .by_ref()
        .find(|(_, l)| !l.trim().is_empty())
        .ok_or(HeaderError::Empty)?;
    let header = header.trim();
    let declared = header
        .parse::<usize>()
        .map_err(|_| HeaderError::BadCount(header.to_string()))?;

    let mut parsed = ParsedRecords {
        declared,
        ..Default::default()
    };

    for (idx, line) in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match parse_line(trimmed) {
            Ok(record) => parsed.records.push(record),
            Err(reason) => parsed.skipped.push(SkippedLine {
                line: idx + 1,
                content: trimmed.to_string(),
                reason,
            }),
        }
    }

    Ok(parsed)
}

fn parse_line(line: &str) -> Result<StudentRecord, SkipReason> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(SkipReason::FieldCount(fields.len()));
    }
    let mark = |s: &str| {
        s.parse::<i32>()
            .map_err(|_| SkipReason::InvalidMark(s.to_string()))
    };
    Ok(StudentRecord {
        id: fields[0].to_string(),
        name: fields[1].to_string(),
        coursework: [mark(fields[2])?, mark(fields[3])?, mark(fields[4])?],
        exam: mark(fields[5])?,
    })
}

/// Render the whole file: count line, then one line per record.
pub fn render_records(records: &[StudentRecord]) -> String {
    let mut out = format!("{}\n", records.len());
    for r in records {
        out.push_str(&format!(
            "{}, {}, {}, {}, {}, {}\n",
            r.id, r.name, r.coursework[0], r.coursework[1], r.coursework[2], r.exam
        ));
    }
    out
}
