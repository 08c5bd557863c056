//! quizmarks-runner — real-time driving of quiz sessions.
//!
//! Wraps a [`quizmarks_core::quiz::QuizSession`] in a tokio event loop that
//! owns the per-question countdown and the pause between questions.

pub mod countdown;
pub mod driver;

pub use countdown::{Countdown, ScheduledTask};
pub use driver::{NoopObserver, QuizDriver, QuizEvent, QuizObserver};
