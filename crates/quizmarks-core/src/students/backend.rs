//! Where student records live between runs.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::StoreError;
use crate::students::format::{parse_records, render_records, ParsedRecords};
use crate::students::record::StudentRecord;

/// Storage for the whole record set. Saves always replace everything.
pub trait RecordBackend: Send + Sync {
    /// Human-readable location, used in log lines.
    fn location(&self) -> String;

    fn load(&self) -> Result<ParsedRecords, StoreError>;

    fn save(&self, records: &[StudentRecord]) -> Result<(), StoreError>;
}

/// What to do when the marks file does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// Fail with [`StoreError::NotFound`].
    Strict,
    /// Create an empty file (`0` records) and carry on.
    #[default]
    CreateIfMissing,
}

/// How the file is rewritten on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Truncate and rewrite the file directly. A crash mid-write can leave
    /// a partial file.
    InPlace,
    /// Write a temporary file next to the target, then rename over it.
    #[default]
    Atomic,
}

/// A marks file on disk.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    load_mode: LoadMode,
    write_mode: WriteMode,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            load_mode: LoadMode::default(),
            write_mode: WriteMode::default(),
        }
    }

    pub fn with_load_mode(mut self, mode: LoadMode) -> Self {
        self.load_mode = mode;
        self
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn write_atomic(&self, content: &str) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(content.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        Ok(())
    }
}

impl RecordBackend for FileBackend {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<ParsedRecords, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return match self.load_mode {
                    LoadMode::Strict => Err(StoreError::NotFound {
                        path: self.path.clone(),
                    }),
                    LoadMode::CreateIfMissing => {
                        tracing::info!(path = %self.path.display(), "student file missing, creating an empty one");
                        self.save(&[])?;
                        Ok(ParsedRecords::default())
                    }
                };
            }
            Err(e) => return Err(self.io_error(e)),
        };

        parse_records(&content).map_err(|e| StoreError::Malformed {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    fn save(&self, records: &[StudentRecord]) -> Result<(), StoreError> {
        let content = render_records(records);
        match self.write_mode {
            WriteMode::InPlace => {
                std::fs::write(&self.path, content).map_err(|e| self.io_error(e))
            }
            WriteMode::Atomic => self.write_atomic(&content),
        }
    }
}

/// An in-memory marks file for tests and dry runs.
///
/// Saves can be made to fail on demand to exercise rollback paths.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    content: Mutex<Option<String>>,
    fail_saves: AtomicBool,
    save_count: AtomicU32,
}

impl MemoryBackend {
    /// A backend whose "file" does not exist yet.
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn with_content(content: &str) -> Self {
        Self {
            content: Mutex::new(Some(content.to_string())),
            ..Default::default()
        }
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::Relaxed);
    }

    /// Current file contents, if anything has been written.
    pub fn content(&self) -> Option<String> {
        self.content
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> u32 {
        self.save_count.load(Ordering::Relaxed)
    }
}

impl RecordBackend for MemoryBackend {
    fn location(&self) -> String {
        "<memory>".into()
    }

    fn load(&self) -> Result<ParsedRecords, StoreError> {
        let path = PathBuf::from(self.location());
        match self.content() {
            Some(content) => parse_records(&content).map_err(|e| StoreError::Malformed {
                path,
                reason: e.to_string(),
            }),
            None => Err(StoreError::NotFound { path }),
        }
    }

    fn save(&self, records: &[StudentRecord]) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::Relaxed) {
            return Err(StoreError::Io {
                path: PathBuf::from(self.location()),
                source: std::io::Error::new(std::io::ErrorKind::Other, "simulated write failure"),
            });
        }
        *self
            .content
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(render_records(records));
        self.save_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
