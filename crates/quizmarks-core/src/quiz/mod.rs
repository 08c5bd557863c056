//! Arithmetic quiz: question generation, settings, and the session state machine.

pub mod question;
pub mod session;
pub mod settings;

pub use question::{Difficulty, DigitRange, Operator, Question};
pub use session::{
    AnswerFeedback, Phase, Presented, QuestionOutcome, QuestionRecord, QuizSession, QuizSummary,
    TickOutcome,
};
pub use settings::QuizSettings;
