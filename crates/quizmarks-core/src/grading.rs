//! Final-score grading for quizzes.
//!
//! The quiz skins never agreed on rank boundaries (`> 90` in one revision,
//! `>= 90` in another), so the mapping is data: a [`GradeScale`] is an
//! ordered list of bands checked from the top, falling back to a failing
//! grade when none matches.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One rank boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeBand {
    /// Score the band is measured against.
    pub threshold: u32,
    /// `true` for `score >= threshold`, `false` for `score > threshold`.
    #[serde(default)]
    pub inclusive: bool,
    /// Short grade, e.g. "A+".
    pub grade: String,
    /// Human-readable remark, e.g. "Outstanding".
    #[serde(default)]
    pub remark: String,
}

impl GradeBand {
    fn new(threshold: u32, inclusive: bool, grade: &str, remark: &str) -> Self {
        Self {
            threshold,
            inclusive,
            grade: grade.to_string(),
            remark: remark.to_string(),
        }
    }

    /// Whether `score` falls into this band.
    pub fn admits(&self, score: u32) -> bool {
        if self.inclusive {
            score >= self.threshold
        } else {
            score > self.threshold
        }
    }
}

/// A grade with its remark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub grade: String,
    pub remark: String,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.remark.is_empty() {
            write!(f, "{}", self.grade)
        } else {
            write!(f, "{} ({})", self.grade, self.remark)
        }
    }
}

/// Built-in grade scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradePreset {
    /// Exclusive boundaries: `> 90`, `> 80`, `> 70`, `> 60`.
    #[default]
    Strict,
    /// Inclusive boundaries: `>= 90`, `>= 80`, `>= 70`, `>= 60`.
    Inclusive,
}

/// Grading section of the quiz configuration.
///
/// When `bands` is non-empty it replaces the preset entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingConfig {
    #[serde(default)]
    pub preset: GradePreset,
    #[serde(default)]
    pub bands: Vec<GradeBand>,
    #[serde(default)]
    pub fallback: Option<Grade>,
}

/// An ordered set of grade bands plus the grade used when none match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeScale {
    bands: Vec<GradeBand>,
    fallback: Grade,
}

impl GradeScale {
    /// Build a scale from bands. Bands are sorted highest threshold first so
    /// configuration order does not matter.
    pub fn new(mut bands: Vec<GradeBand>, fallback: Grade) -> Self {
        bands.sort_by(|a, b| {
            b.threshold
                .cmp(&a.threshold)
                .then_with(|| a.inclusive.cmp(&b.inclusive))
        });
        Self { bands, fallback }
    }

    pub fn preset(preset: GradePreset) -> Self {
        let inclusive = matches!(preset, GradePreset::Inclusive);
        Self::new(
            vec![
                GradeBand::new(90, inclusive, "A+", "Outstanding"),
                GradeBand::new(80, inclusive, "A", "Excellent"),
                GradeBand::new(70, inclusive, "B", "Good"),
                GradeBand::new(60, inclusive, "C", "Pass"),
            ],
            default_fallback(),
        )
    }

    pub fn from_config(config: &GradingConfig) -> Self {
        if config.bands.is_empty() {
            let mut scale = Self::preset(config.preset);
            if let Some(fallback) = &config.fallback {
                scale.fallback = fallback.clone();
            }
            scale
        } else {
            Self::new(
                config.bands.clone(),
                config.fallback.clone().unwrap_or_else(default_fallback),
            )
        }
    }

    /// Grade a final score.
    pub fn grade(&self, score: u32) -> Grade {
        self.bands
            .iter()
            .find(|band| band.admits(score))
            .map(|band| Grade {
                grade: band.grade.clone(),
                remark: band.remark.clone(),
            })
            .unwrap_or_else(|| self.fallback.clone())
    }

    pub fn bands(&self) -> &[GradeBand] {
        &self.bands
    }
}

impl Default for GradeScale {
    fn default() -> Self {
        Self::preset(GradePreset::Strict)
    }
}

fn default_fallback() -> Grade {
    Grade {
        grade: "F".into(),
        remark: "Needs Practice".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_scale_literal_mapping() {
        let scale = GradeScale::preset(GradePreset::Strict);
        assert_eq!(scale.grade(95).grade, "A+");
        assert_eq!(scale.grade(85).grade, "A");
        assert_eq!(scale.grade(75).grade, "B");
        assert_eq!(scale.grade(65).grade, "C");
        assert_eq!(scale.grade(30).grade, "F");
    }

    #[test]
    fn strict_scale_excludes_boundaries() {
        let scale = GradeScale::preset(GradePreset::Strict);
        assert_eq!(scale.grade(90).grade, "A");
        assert_eq!(scale.grade(80).grade, "B");
        assert_eq!(scale.grade(60).grade, "F");
        assert_eq!(scale.grade(100).grade, "A+");
    }

    #[test]
    fn inclusive_scale_includes_boundaries() {
        let scale = GradeScale::preset(GradePreset::Inclusive);
        assert_eq!(scale.grade(90).grade, "A+");
        assert_eq!(scale.grade(80).grade, "A");
        assert_eq!(scale.grade(70).grade, "B");
        assert_eq!(scale.grade(60).grade, "C");
        assert_eq!(scale.grade(59).grade, "F");
        assert_eq!(scale.grade(0).grade, "F");
    }

    #[test]
    fn display_includes_remark() {
        let scale = GradeScale::default();
        assert_eq!(scale.grade(95).to_string(), "A+ (Outstanding)");
        assert_eq!(scale.grade(10).to_string(), "F (Needs Practice)");
    }

    #[test]
    fn custom_bands_from_toml_are_ordered() {
        let config: GradingConfig = toml::from_str(
            r#"
[[bands]]
threshold = 50
inclusive = true
grade = "Pass"

[[bands]]
threshold = 100
inclusive = true
grade = "Perfect"

[fallback]
grade = "Retry"
remark = ""
"#,
        )
        .unwrap();
        let scale = GradeScale::from_config(&config);
        assert_eq!(scale.bands()[0].grade, "Perfect");
        assert_eq!(scale.grade(100).grade, "Perfect");
        assert_eq!(scale.grade(50).grade, "Pass");
        assert_eq!(scale.grade(49).to_string(), "Retry");
    }

    #[test]
    fn preset_selected_from_config() {
        let config: GradingConfig = toml::from_str(r#"preset = "inclusive""#).unwrap();
        assert_eq!(GradeScale::from_config(&config).grade(90).grade, "A+");
    }
}
