//! In-memory student records backed by a [`RecordBackend`].
//!
//! Every successful mutation rewrites the whole backing file.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Candidate, StoreError};
use crate::students::backend::{FileBackend, RecordBackend};
use crate::students::record::{
    validate_mark, validate_text, RecordField, StudentRecord, MAX_COURSEWORK_MARK, MAX_EXAM_MARK,
};

/// Which checks a store applies and whether it may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorePolicy {
    /// Bounds-check marks, reject bad text, and refuse duplicate ids.
    pub validate: bool,
    /// Allow mutations and saves. When `false` the store is read-only.
    pub persist: bool,
}

impl StorePolicy {
    pub const fn read_only() -> Self {
        Self {
            validate: true,
            persist: false,
        }
    }

    /// Writes without bounds or duplicate checks.
    pub const fn strict() -> Self {
        Self {
            validate: false,
            persist: true,
        }
    }

    pub const fn validating() -> Self {
        Self {
            validate: true,
            persist: true,
        }
    }
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self::validating()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Case-insensitive name.
    Name,
    /// Overall total.
    Total,
    Percentage,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "total" => Ok(SortKey::Total),
            "percentage" | "percent" => Ok(SortKey::Percentage),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Class-wide figures shown under the record list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassSummary {
    pub count: usize,
    pub average_percentage: f64,
}

/// The student record repository.
pub struct StudentStore<B: RecordBackend = FileBackend> {
    backend: B,
    policy: StorePolicy,
    records: Vec<StudentRecord>,
}

impl<B: RecordBackend> StudentStore<B> {
    /// Load every record from `backend`.
    ///
    /// Unreadable lines are skipped and logged; a declared count that does
    /// not match the records found is only a warning.
    pub fn open(backend: B, policy: StorePolicy) -> Result<Self, StoreError> {
        let parsed = backend.load()?;
        let location = backend.location();
        for skipped in &parsed.skipped {
            tracing::warn!(file = %location, "skipping record: {skipped}");
        }
        if !parsed.count_matches() {
            tracing::warn!(
                file = %location,
                declared = parsed.declared,
                found = parsed.records.len(),
                "record count does not match header"
            );
        }
        tracing::info!(file = %location, records = parsed.records.len(), "loaded student records");
        Ok(Self {
            backend,
            policy,
            records: parsed.records,
        })
    }

    /// A store with no records, used when loading failed and the caller
    /// carries on in a degraded state. Never writes.
    pub fn empty(backend: B) -> Self {
        Self {
            backend,
            policy: StorePolicy::read_only(),
            records: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn policy(&self) -> StorePolicy {
        self.policy
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Exact id match.
    pub fn find_by_id(&self, id: &str) -> Option<&StudentRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Case-insensitive "starts with" match on the name. Several matches
    /// come back ordered by name.
    pub fn find_by_name_prefix(&self, prefix: &str) -> Vec<&StudentRecord> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Vec::new();
        }
        let mut matches: Vec<&StudentRecord> = self
            .records
            .iter()
            .filter(|r| r.name.to_lowercase().starts_with(&prefix))
            .collect();
        if matches.len() > 1 {
            matches.sort_by_cached_key(|r| r.name.to_lowercase());
        }
        matches
    }

    /// An id match wins outright, exact before case-insensitive; otherwise
    /// fall back to a name prefix.
    pub fn find_by_search_term(&self, term: &str) -> Vec<&StudentRecord> {
        let term = term.trim();
        if term.is_empty() {
            return Vec::new();
        }
        let by_id = self
            .find_by_id(term)
            .or_else(|| self.records.iter().find(|r| r.id.eq_ignore_ascii_case(term)));
        if let Some(record) = by_id {
            return vec![record];
        }
        self.find_by_name_prefix(term)
    }

    /// Highest overall total. The first record wins ties.
    pub fn highest(&self) -> Option<&StudentRecord> {
        self.records.iter().fold(None, |best, r| match best {
            Some(b) if r.overall_total() <= b.overall_total() => Some(b),
            _ => Some(r),
        })
    }

    /// Lowest overall total. The first record wins ties.
    pub fn lowest(&self) -> Option<&StudentRecord> {
        self.records.iter().fold(None, |best, r| match best {
            Some(b) if r.overall_total() >= b.overall_total() => Some(b),
            _ => Some(r),
        })
    }

    /// Reorder the records in place. Stable in both directions.
    pub fn sort_by(&mut self, key: SortKey, order: SortOrder) {
        let compare = |a: &StudentRecord, b: &StudentRecord| -> Ordering {
            match key {
                SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                SortKey::Total => a.overall_total().cmp(&b.overall_total()),
                SortKey::Percentage => a.percentage().total_cmp(&b.percentage()),
            }
        };
        match order {
            SortOrder::Asc => self.records.sort_by(compare),
            SortOrder::Desc => self.records.sort_by(|a, b| compare(b, a)),
        }
    }

    /// Append a record and persist. The append is undone if saving fails.
    pub fn add(&mut self, record: StudentRecord) -> Result<(), StoreError> {
        self.ensure_writable()?;
        if self.policy.validate {
            record.validate()?;
            if self
                .records
                .iter()
                .any(|r| r.id.eq_ignore_ascii_case(&record.id))
            {
                return Err(StoreError::DuplicateId(record.id));
            }
        }

        let id = record.id.clone();
        self.records.push(record);
        if let Err(e) = self.backend.save(&self.records) {
            self.records.pop();
            return Err(StoreError::Persistence(Box::new(e)));
        }
        tracing::info!(id = %id, "added student");
        Ok(())
    }

    /// Change one field of the record `term` resolves to and persist.
    ///
    /// The previous value is restored if saving fails. Returns the updated
    /// record.
    pub fn update(
        &mut self,
        term: &str,
        field: RecordField,
        value: &str,
    ) -> Result<StudentRecord, StoreError> {
        self.ensure_writable()?;
        let idx = self.resolve(term)?;

        let mut updated = self.records[idx].clone();
        match field {
            RecordField::Name => {
                let name = value.trim();
                if self.policy.validate {
                    validate_text("name", name)?;
                }
                updated.name = name.to_string();
            }
            RecordField::Coursework(n) => {
                let slot = usize::from(n)
                    .checked_sub(1)
                    .filter(|i| *i < updated.coursework.len())
                    .ok_or_else(|| StoreError::Validation {
                        field: field.label(),
                        reason: "coursework component must be 1, 2 or 3".into(),
                    })?;
                let mark = parse_mark(field, value)?;
                if self.policy.validate {
                    validate_mark(&field.label(), mark, MAX_COURSEWORK_MARK)?;
                }
                updated.coursework[slot] = mark;
            }
            RecordField::Exam => {
                let mark = parse_mark(field, value)?;
                if self.policy.validate {
                    validate_mark(&field.label(), mark, MAX_EXAM_MARK)?;
                }
                updated.exam = mark;
            }
        }

        let previous = std::mem::replace(&mut self.records[idx], updated);
        if let Err(e) = self.backend.save(&self.records) {
            self.records[idx] = previous;
            return Err(StoreError::Persistence(Box::new(e)));
        }
        tracing::info!(id = %self.records[idx].id, field = %field.label(), "updated student");
        Ok(self.records[idx].clone())
    }

    /// Remove the record `term` resolves to and persist.
    ///
    /// A failed save does not bring the record back; the error says so.
    pub fn delete(&mut self, term: &str) -> Result<StudentRecord, StoreError> {
        self.ensure_writable()?;
        let idx = self.resolve(term)?;
        let removed = self.records.remove(idx);
        if let Err(e) = self.backend.save(&self.records) {
            tracing::error!(id = %removed.id, "deletion could not be saved: {e}");
            return Err(StoreError::CriticalPersistence {
                id: removed.id,
                source: Box::new(e),
            });
        }
        tracing::info!(id = %removed.id, "deleted student");
        Ok(removed)
    }

    /// Mean percentage across all records, or `None` for an empty store.
    pub fn class_summary_average(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let sum: f64 = self.records.iter().map(StudentRecord::percentage).sum();
        Some(sum / self.records.len() as f64)
    }

    pub fn summary(&self) -> Option<ClassSummary> {
        self.class_summary_average().map(|average_percentage| ClassSummary {
            count: self.records.len(),
            average_percentage,
        })
    }

    /// Write the current records, including any reordering.
    pub fn save(&self) -> Result<(), StoreError> {
        self.ensure_writable()?;
        self.backend.save(&self.records)?;
        tracing::info!(file = %self.backend.location(), records = self.records.len(), "saved student records");
        Ok(())
    }

    fn ensure_writable(&self) -> Result<(), StoreError> {
        if self.policy.persist {
            Ok(())
        } else {
            Err(StoreError::ReadOnly)
        }
    }

    /// Resolve a search term to exactly one record index.
    fn resolve(&self, term: &str) -> Result<usize, StoreError> {
        let matches = self.find_by_search_term(term);
        match matches.as_slice() {
            [] => Err(StoreError::NoMatch(term.trim().to_string())),
            [only] => {
                let id = only.id.clone();
                self.records
                    .iter()
                    .position(|r| r.id == id)
                    .ok_or_else(|| StoreError::NoMatch(term.trim().to_string()))
            }
            many => Err(StoreError::Ambiguous {
                term: term.trim().to_string(),
                candidates: many
                    .iter()
                    .map(|r| Candidate {
                        id: r.id.clone(),
                        name: r.name.clone(),
                    })
                    .collect(),
            }),
        }
    }
}

fn parse_mark(field: RecordField, value: &str) -> Result<i32, StoreError> {
    value.trim().parse().map_err(|_| StoreError::Validation {
        field: field.label(),
        reason: format!("'{}' is not a whole number", value.trim()),
    })
}
