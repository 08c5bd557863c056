//! A single student's marks and the results derived from them.

use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

/// Upper bound for each coursework component.
pub const MAX_COURSEWORK_MARK: i32 = 20;
/// Upper bound for the exam.
pub const MAX_EXAM_MARK: i32 = 100;
/// Three coursework components plus the exam.
pub const MAX_OVERALL_TOTAL: i32 = 3 * MAX_COURSEWORK_MARK + MAX_EXAM_MARK;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub coursework: [i32; 3],
    pub exam: i32,
}

impl StudentRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, coursework: [i32; 3], exam: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coursework,
            exam,
        }
    }

    /// Sum of the coursework components (max 60 for valid marks).
    ///
    /// Summed as `i64`: loaded files are not bounds-checked, and three
    /// arbitrary `i32` marks cannot overflow it.
    pub fn coursework_total(&self) -> i64 {
        self.coursework.iter().copied().map(i64::from).sum()
    }

    /// Coursework plus exam (max 160 for valid marks).
    pub fn overall_total(&self) -> i64 {
        self.coursework_total() + i64::from(self.exam)
    }

    pub fn percentage(&self) -> f64 {
        self.overall_total() as f64 / f64::from(MAX_OVERALL_TOTAL) * 100.0
    }

    pub fn grade(&self) -> LetterGrade {
        LetterGrade::from_percentage(self.percentage())
    }

    /// Check every field against its bounds.
    pub fn validate(&self) -> Result<(), StoreError> {
        validate_text("student number", &self.id)?;
        validate_text("name", &self.name)?;
        for (i, mark) in self.coursework.iter().enumerate() {
            validate_mark(&format!("coursework {}", i + 1), *mark, MAX_COURSEWORK_MARK)?;
        }
        validate_mark("exam mark", self.exam, MAX_EXAM_MARK)
    }
}

/// Reject empty text and anything that would break the comma-separated file.
pub fn validate_text(field: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation {
            field: field.to_string(),
            reason: "must not be empty".into(),
        });
    }
    if value.contains([',', '\n', '\r']) {
        return Err(StoreError::Validation {
            field: field.to_string(),
            reason: "must not contain commas or line breaks".into(),
        });
    }
    Ok(())
}

pub fn validate_mark(field: &str, value: i32, max: i32) -> Result<(), StoreError> {
    if (0..=max).contains(&value) {
        Ok(())
    } else {
        Err(StoreError::Validation {
            field: field.to_string(),
            reason: format!("{value} is outside 0..={max}"),
        })
    }
}

/// Letter grade derived from the overall percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    pub fn from_percentage(percent: f64) -> Self {
        if percent >= 70.0 {
            LetterGrade::A
        } else if percent >= 60.0 {
            LetterGrade::B
        } else if percent >= 50.0 {
            LetterGrade::C
        } else if percent >= 40.0 {
            LetterGrade::D
        } else {
            LetterGrade::F
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        };
        f.write_str(letter)
    }
}

/// A field that can be changed by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Name,
    /// Coursework component, 1-based.
    Coursework(u8),
    Exam,
}

impl RecordField {
    pub fn label(self) -> String {
        match self {
            RecordField::Name => "name".into(),
            RecordField::Coursework(n) => format!("coursework {n}"),
            RecordField::Exam => "exam mark".into(),
        }
    }
}

impl FromStr for RecordField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "n" | "name" => Ok(RecordField::Name),
            "c1" => Ok(RecordField::Coursework(1)),
            "c2" => Ok(RecordField::Coursework(2)),
            "c3" => Ok(RecordField::Coursework(3)),
            "e" | "exam" => Ok(RecordField::Exam),
            other => Err(format!(
                "unknown field: {other} (expected name, c1, c2, c3 or exam)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_totals() {
        let r = StudentRecord::new("2", "Bob", [5, 5, 5], 50);
        assert_eq!(r.coursework_total(), 15);
        assert_eq!(r.overall_total(), 65);
        assert!((r.percentage() - 40.625).abs() < 1e-9);
        assert_eq!(r.grade(), LetterGrade::D);
    }

    #[test]
    fn perfect_record() {
        let r = StudentRecord::new("3", "Cara", [20, 20, 20], 100);
        assert_eq!(r.overall_total(), i64::from(MAX_OVERALL_TOTAL));
        assert!((r.percentage() - 100.0).abs() < 1e-9);
        assert_eq!(r.grade(), LetterGrade::A);
    }

    #[test]
    fn unbounded_marks_do_not_overflow_totals() {
        let r = StudentRecord::new("1", "Big", [i32::MAX, i32::MAX, 1], i32::MAX);
        assert_eq!(r.coursework_total(), 2 * i64::from(i32::MAX) + 1);
        assert_eq!(r.overall_total(), 3 * i64::from(i32::MAX) + 1);
        assert!(r.percentage() > 100.0);

        let r = StudentRecord::new("2", "Low", [i32::MIN, i32::MIN, 0], i32::MIN);
        assert_eq!(r.overall_total(), 3 * i64::from(i32::MIN));
        assert_eq!(r.grade(), LetterGrade::F);
    }

    #[test]
    fn grade_thresholds_are_inclusive() {
        assert_eq!(LetterGrade::from_percentage(70.0), LetterGrade::A);
        assert_eq!(LetterGrade::from_percentage(69.99), LetterGrade::B);
        assert_eq!(LetterGrade::from_percentage(60.0), LetterGrade::B);
        assert_eq!(LetterGrade::from_percentage(50.0), LetterGrade::C);
        assert_eq!(LetterGrade::from_percentage(40.0), LetterGrade::D);
        assert_eq!(LetterGrade::from_percentage(39.9), LetterGrade::F);
    }

    #[test]
    fn validation_bounds() {
        assert!(StudentRecord::new("1", "Al", [20, 0, 10], 100).validate().is_ok());
        assert!(StudentRecord::new("1", "Al", [21, 0, 10], 100).validate().is_err());
        assert!(StudentRecord::new("1", "Al", [0, -1, 10], 100).validate().is_err());
        assert!(StudentRecord::new("1", "Al", [0, 0, 0], 101).validate().is_err());
        assert!(StudentRecord::new("", "Al", [0, 0, 0], 0).validate().is_err());
        assert!(StudentRecord::new("1", "Smith, Al", [0, 0, 0], 0).validate().is_err());
    }

    #[test]
    fn parse_field_names() {
        assert_eq!("N".parse::<RecordField>().unwrap(), RecordField::Name);
        assert_eq!("c2".parse::<RecordField>().unwrap(), RecordField::Coursework(2));
        assert_eq!("exam".parse::<RecordField>().unwrap(), RecordField::Exam);
        assert!("c4".parse::<RecordField>().is_err());
    }
}
