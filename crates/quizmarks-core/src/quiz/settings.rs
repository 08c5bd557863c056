//! Quiz tuning knobs.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::grading::{GradeScale, GradingConfig};
use crate::quiz::question::{Difficulty, DigitRange};

/// Per-difficulty digit ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyRanges {
    #[serde(default = "easy_range")]
    pub easy: DigitRange,
    #[serde(default = "moderate_range")]
    pub moderate: DigitRange,
    #[serde(default = "advanced_range")]
    pub advanced: DigitRange,
}

fn easy_range() -> DigitRange {
    Difficulty::Easy.default_range()
}
fn moderate_range() -> DigitRange {
    Difficulty::Moderate.default_range()
}
fn advanced_range() -> DigitRange {
    Difficulty::Advanced.default_range()
}

impl Default for DifficultyRanges {
    fn default() -> Self {
        Self {
            easy: easy_range(),
            moderate: moderate_range(),
            advanced: advanced_range(),
        }
    }
}

/// Settings for a single quiz run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSettings {
    /// Number of questions per quiz.
    #[serde(default = "default_length")]
    pub length: u32,
    /// Seconds allowed per attempt.
    #[serde(default = "default_time_limit")]
    pub time_limit_secs: u32,
    /// Points for a correct first attempt.
    #[serde(default = "default_first_points")]
    pub first_attempt_points: u32,
    /// Points for a correct second attempt.
    #[serde(default = "default_second_points")]
    pub second_attempt_points: u32,
    /// Swap subtraction operands so answers are never negative.
    #[serde(default)]
    pub non_negative_subtraction: bool,
    /// Pause between a resolved question and the next one.
    #[serde(default = "default_resolve_delay")]
    pub resolve_delay_ms: u64,
    #[serde(default)]
    pub difficulties: DifficultyRanges,
    #[serde(default)]
    pub grading: GradingConfig,
}

fn default_length() -> u32 {
    10
}
fn default_time_limit() -> u32 {
    20
}
fn default_first_points() -> u32 {
    10
}
fn default_second_points() -> u32 {
    5
}
fn default_resolve_delay() -> u64 {
    1000
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            length: default_length(),
            time_limit_secs: default_time_limit(),
            first_attempt_points: default_first_points(),
            second_attempt_points: default_second_points(),
            non_negative_subtraction: false,
            resolve_delay_ms: default_resolve_delay(),
            difficulties: DifficultyRanges::default(),
            grading: GradingConfig::default(),
        }
    }
}

impl QuizSettings {
    pub fn range_for(&self, difficulty: Difficulty) -> DigitRange {
        match difficulty {
            Difficulty::Easy => self.difficulties.easy,
            Difficulty::Moderate => self.difficulties.moderate,
            Difficulty::Advanced => self.difficulties.advanced,
        }
    }

    /// Highest achievable score. Saturates for settings that fail
    /// [`validate`](Self::validate).
    pub fn max_score(&self) -> u32 {
        self.length.saturating_mul(self.first_attempt_points)
    }

    pub fn grade_scale(&self) -> GradeScale {
        GradeScale::from_config(&self.grading)
    }

    pub fn resolve_delay(&self) -> Duration {
        Duration::from_millis(self.resolve_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.length >= 1, "quiz length must be at least 1");
        anyhow::ensure!(
            self.time_limit_secs >= 1,
            "time limit must be at least 1 second"
        );
        anyhow::ensure!(
            self.second_attempt_points <= self.first_attempt_points,
            "second attempt cannot be worth more than the first"
        );
        anyhow::ensure!(
            self.length.checked_mul(self.first_attempt_points).is_some(),
            "quiz length {} at {} points per question exceeds the maximum score",
            self.length,
            self.first_attempt_points
        );
        for difficulty in Difficulty::ALL {
            self.range_for(difficulty)
                .validate()
                .map_err(|e| anyhow::anyhow!("{difficulty} range: {e}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_quiz() {
        let settings = QuizSettings::default();
        assert_eq!(settings.length, 10);
        assert_eq!(settings.time_limit_secs, 20);
        assert_eq!(settings.max_score(), 100);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let settings: QuizSettings = toml::from_str(
            r#"
length = 5
non_negative_subtraction = true

[difficulties.advanced]
min_digits = 3
max_digits = 3
"#,
        )
        .unwrap();
        assert_eq!(settings.length, 5);
        assert_eq!(settings.time_limit_secs, 20);
        assert!(settings.non_negative_subtraction);
        assert_eq!(settings.range_for(Difficulty::Advanced).bounds(), (100, 999));
        assert_eq!(settings.range_for(Difficulty::Easy).bounds(), (1, 9));
    }

    #[test]
    fn rejects_invalid_settings() {
        let settings = QuizSettings {
            length: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = QuizSettings {
            second_attempt_points: 20,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_score_that_overflows() {
        let settings = QuizSettings {
            length: 500_000_000,
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum score"));
        assert_eq!(settings.max_score(), u32::MAX);

        let settings = QuizSettings {
            length: u32::MAX / 10,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }
}
