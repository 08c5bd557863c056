//! Student store error types.
//!
//! Every variant maps to a user-visible message; the store never leaves the
//! process in a state where continuing is unsafe, with the single exception
//! of [`StoreError::CriticalPersistence`], where memory and disk may differ.

use std::path::PathBuf;

use thiserror::Error;

/// A matched record, as shown back to the user when a search is ambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub name: String,
}

/// Errors raised by the student record store and its backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file does not exist and the load mode is strict.
    #[error("student file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The file exists but its header cannot be interpreted.
    #[error("malformed student file {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    /// Reading or writing the backing file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record with this id already exists.
    #[error("student number already exists: {0}")]
    DuplicateId(String),

    /// No record matched the search term.
    #[error("no student found matching '{0}'")]
    NoMatch(String),

    /// More than one record matched a name prefix.
    #[error("multiple students match '{term}' ({}); use the exact student number", format_candidates(.candidates))]
    Ambiguous {
        term: String,
        candidates: Vec<Candidate>,
    },

    /// A field value is outside its declared bounds or would corrupt the file.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// The store is read-only and cannot be mutated.
    #[error("student store is read-only")]
    ReadOnly,

    /// Saving failed and the in-memory change was rolled back.
    #[error("failed to save student data, change reverted: {0}")]
    Persistence(#[source] Box<StoreError>),

    /// Saving failed after a deletion; memory and disk now disagree.
    #[error("failed to save deletion of {id}; data in memory may not match file: {source}")]
    CriticalPersistence {
        id: String,
        #[source]
        source: Box<StoreError>,
    },
}

impl StoreError {
    /// Returns `true` for errors that describe the backing file rather than
    /// a rejected operation. Callers fall back to an empty store on these.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. } | StoreError::Malformed { .. } | StoreError::Io { .. }
        )
    }
}

fn format_candidates(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| format!("{} [{}]", c.name, c.id))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_lists_every_candidate() {
        let err = StoreError::Ambiguous {
            term: "alice".into(),
            candidates: vec![
                Candidate {
                    id: "2".into(),
                    name: "Alice Jones".into(),
                },
                Candidate {
                    id: "1".into(),
                    name: "Alice Smith".into(),
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("Alice Jones [2]"));
        assert!(msg.contains("Alice Smith [1]"));
        assert!(msg.contains("exact student number"));
    }

    #[test]
    fn load_failures_are_classified() {
        let not_found = StoreError::NotFound {
            path: PathBuf::from("missing.txt"),
        };
        assert!(not_found.is_load_failure());
        assert!(!StoreError::DuplicateId("1".into()).is_load_failure());
        assert!(!StoreError::ReadOnly.is_load_failure());
    }
}
