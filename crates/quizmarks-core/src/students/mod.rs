//! Student marks: the record model, the flat-file format, and the store.

pub mod backend;
pub mod format;
pub mod record;
pub mod store;

pub use backend::{FileBackend, LoadMode, MemoryBackend, RecordBackend, WriteMode};
pub use format::{parse_records, render_records, ParsedRecords, SkippedLine};
pub use record::{LetterGrade, RecordField, StudentRecord, MAX_COURSEWORK_MARK, MAX_EXAM_MARK};
pub use store::{ClassSummary, SortKey, SortOrder, StorePolicy, StudentStore};
