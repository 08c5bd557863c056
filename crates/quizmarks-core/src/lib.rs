//! quizmarks-core — quiz sessions, grading, and the student marks store.
//!
//! This crate holds all of the non-presentational logic. The runner crate
//! drives a [`quiz::QuizSession`] in real time and the CLI is a thin adapter
//! over both.

pub mod config;
pub mod error;
pub mod grading;
pub mod jokes;
pub mod quiz;
pub mod report;
pub mod students;
