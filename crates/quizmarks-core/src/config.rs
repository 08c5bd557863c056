//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::quiz::QuizSettings;
use crate::students::{FileBackend, LoadMode, StorePolicy, WriteMode};

/// Name of the per-directory config file.
pub const CONFIG_FILE_NAME: &str = "quizmarks.toml";

/// Top-level quizmarks configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizmarksConfig {
    #[serde(default)]
    pub quiz: QuizSettings,
    #[serde(default)]
    pub students: StudentsConfig,
    #[serde(default)]
    pub jokes: JokesConfig,
}

/// Where student marks live and how they are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentsConfig {
    #[serde(default = "default_students_path")]
    pub path: PathBuf,
    /// Behaviour when the marks file is missing.
    #[serde(default)]
    pub load_mode: LoadMode,
    #[serde(default)]
    pub write_mode: WriteMode,
    /// Bounds and duplicate checks on add/update.
    #[serde(default = "default_true")]
    pub validate: bool,
}

fn default_students_path() -> PathBuf {
    PathBuf::from("studentMarks.txt")
}
fn default_true() -> bool {
    true
}

impl Default for StudentsConfig {
    fn default() -> Self {
        Self {
            path: default_students_path(),
            load_mode: LoadMode::default(),
            write_mode: WriteMode::default(),
            validate: true,
        }
    }
}

impl StudentsConfig {
    pub fn backend(&self) -> FileBackend {
        FileBackend::new(&self.path)
            .with_load_mode(self.load_mode)
            .with_write_mode(self.write_mode)
    }

    pub fn policy(&self) -> StorePolicy {
        StorePolicy {
            validate: self.validate,
            persist: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JokesConfig {
    #[serde(default = "default_jokes_path")]
    pub path: PathBuf,
}

fn default_jokes_path() -> PathBuf {
    PathBuf::from("randomJokes.txt")
}

impl Default for JokesConfig {
    fn default() -> Self {
        Self {
            path: default_jokes_path(),
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizmarks.toml` in the current directory
/// 2. `~/.config/quizmarks/config.toml`
///
/// Environment variable overrides: `QUIZMARKS_STUDENTS_FILE`, `QUIZMARKS_JOKES_FILE`.
pub fn load_config() -> Result<QuizmarksConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizmarksConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<QuizmarksConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => QuizmarksConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
        .quiz
        .validate()
        .context("invalid [quiz] configuration")?;

    Ok(config)
}

fn apply_env_overrides(config: &mut QuizmarksConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(path) = lookup("QUIZMARKS_STUDENTS_FILE").filter(|p| !p.is_empty()) {
        config.students.path = PathBuf::from(path);
    }
    if let Some(path) = lookup("QUIZMARKS_JOKES_FILE").filter(|p| !p.is_empty()) {
        config.jokes.path = PathBuf::from(path);
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizmarks"))
}

/// Render a config as TOML, for `quizmarks init`.
pub fn to_toml(config: &QuizmarksConfig) -> Result<String> {
    toml::to_string_pretty(config).context("failed to serialize config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::GradePreset;

    #[test]
    fn default_config() {
        let config = QuizmarksConfig::default();
        assert_eq!(config.quiz.length, 10);
        assert_eq!(config.students.path, PathBuf::from("studentMarks.txt"));
        assert_eq!(config.students.load_mode, LoadMode::CreateIfMissing);
        assert_eq!(config.students.write_mode, WriteMode::Atomic);
        assert!(config.students.validate);
        assert_eq!(config.jokes.path, PathBuf::from("randomJokes.txt"));
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
[quiz]
length = 5
time_limit_secs = 30
non_negative_subtraction = true

[quiz.grading]
preset = "inclusive"

[students]
path = "data/marks.txt"
load_mode = "strict"
write_mode = "in_place"
"#;
        let config: QuizmarksConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.quiz.length, 5);
        assert_eq!(config.quiz.time_limit_secs, 30);
        assert_eq!(config.quiz.first_attempt_points, 10);
        assert!(config.quiz.non_negative_subtraction);
        assert_eq!(config.quiz.grading.preset, GradePreset::Inclusive);
        assert_eq!(config.students.load_mode, LoadMode::Strict);
        assert_eq!(config.students.write_mode, WriteMode::InPlace);
        assert!(config.students.validate);
        assert_eq!(config.jokes, JokesConfig::default());
    }

    #[test]
    fn explicit_missing_path_fails() {
        let err = load_config_from(Some(Path::new("/no/such/quizmarks.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_loaded_and_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizmarks.toml");
        std::fs::write(&path, "[quiz]\nlength = 3\n").unwrap();
        assert_eq!(load_config_from(Some(&path)).unwrap().quiz.length, 3);

        std::fs::write(&path, "[quiz]\nlength = 0\n").unwrap();
        assert!(load_config_from(Some(&path)).is_err());
    }

    #[test]
    fn env_overrides_paths() {
        let mut config = QuizmarksConfig::default();
        apply_env_overrides(&mut config, |key| match key {
            "QUIZMARKS_STUDENTS_FILE" => Some("other.txt".into()),
            "QUIZMARKS_JOKES_FILE" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.students.path, PathBuf::from("other.txt"));
        assert_eq!(config.jokes.path, PathBuf::from("randomJokes.txt"));
    }

    #[test]
    fn rendered_config_parses_back() {
        let config = QuizmarksConfig::default();
        let rendered = to_toml(&config).unwrap();
        let parsed: QuizmarksConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
