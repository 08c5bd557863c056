//! The quiz state machine.
//!
//! A session moves each question through
//! `AwaitingAnswer(1) -> AwaitingAnswer(2) -> Resolved`, or straight to
//! `Resolved` on a correct answer or timeout, and ends in `Finished` once
//! the configured number of questions has been presented.
//!
//! The session does not own a clock. The caller arms a countdown whenever
//! [`QuizSession::countdown_epoch`] changes while the session is awaiting an
//! answer and feeds one [`QuizSession::tick`] per elapsed second. Every
//! transition that stops or re-arms the countdown bumps the epoch first,
//! so ticks from a superseded countdown are rejected as stale instead of
//! expiring the wrong question.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::grading::{Grade, GradeScale};
use crate::quiz::question::{Difficulty, Question};
use crate::quiz::settings::QuizSettings;

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    /// Waiting for attempt 1 or 2 of the current question.
    AwaitingAnswer { attempt: u8 },
    /// The current question is settled; the next one has not been presented.
    Resolved,
    Finished,
}

/// How a question ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionOutcome {
    FirstAttempt,
    SecondAttempt,
    Incorrect,
    TimedOut,
    /// A new question was presented before this one was answered.
    Skipped,
}

/// Result of submitting an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerFeedback {
    Correct { points: u32 },
    /// First attempt was wrong; the countdown restarted at the full limit.
    TryAgain { hint: String },
    /// Second attempt was wrong.
    Incorrect { correct_answer: i64 },
    /// No question is awaiting an answer.
    Ignored,
}

/// Result of presenting the next question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presented {
    Question(Question),
    Finished(QuizSummary),
}

/// Result of one countdown second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick from a cancelled countdown, or no question awaiting an answer.
    Stale,
    Remaining(u32),
    TimedOut { correct_answer: i64 },
}

/// One settled question, kept for the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub number: u32,
    pub question: Question,
    pub outcome: QuestionOutcome,
    pub points: u32,
}

/// Final tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub difficulty: Difficulty,
    pub score: u32,
    pub max_score: u32,
    pub questions: u32,
    pub grade: Grade,
}

/// A single quiz run.
#[derive(Debug)]
pub struct QuizSession<R = StdRng> {
    settings: QuizSettings,
    difficulty: Difficulty,
    scale: GradeScale,
    rng: R,
    phase: Phase,
    question_index: u32,
    score: u32,
    attempt_count: u8,
    time_remaining: u32,
    countdown_epoch: u64,
    current: Option<Question>,
    history: Vec<QuestionRecord>,
}

impl QuizSession<StdRng> {
    pub fn new(settings: QuizSettings, difficulty: Difficulty) -> Self {
        Self::with_rng(settings, difficulty, StdRng::from_entropy())
    }
}

impl<R: Rng> QuizSession<R> {
    /// Build a session with an explicit random source.
    pub fn with_rng(settings: QuizSettings, difficulty: Difficulty, rng: R) -> Self {
        let scale = settings.grade_scale();
        Self {
            settings,
            difficulty,
            scale,
            rng,
            phase: Phase::NotStarted,
            question_index: 0,
            score: 0,
            attempt_count: 0,
            time_remaining: 0,
            countdown_epoch: 0,
            current: None,
            history: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// 1-based number of the current question; 0 before the first one.
    pub fn question_index(&self) -> u32 {
        self.question_index
    }

    /// Answers submitted for the current question (0, 1 or 2).
    pub fn attempt_count(&self) -> u8 {
        self.attempt_count
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// Identifies the live countdown; changes whenever it is armed or stopped.
    pub fn countdown_epoch(&self) -> u64 {
        self.countdown_epoch
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &[QuestionRecord] {
        &self.history
    }

    pub fn is_awaiting_answer(&self) -> bool {
        matches!(self.phase, Phase::AwaitingAnswer { .. })
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Move to the next question, or finish when the quiz is complete.
    ///
    /// Presenting while a question is still open settles it as
    /// [`QuestionOutcome::Skipped`].
    pub fn present_question(&mut self) -> Presented {
        match self.phase {
            Phase::Finished => return Presented::Finished(self.summary()),
            Phase::AwaitingAnswer { .. } => {
                self.stop_countdown();
                self.resolve(QuestionOutcome::Skipped, 0);
            }
            Phase::NotStarted | Phase::Resolved => {}
        }

        if self.question_index >= self.settings.length {
            self.stop_countdown();
            self.phase = Phase::Finished;
            self.current = None;
            let summary = self.summary();
            tracing::debug!(score = summary.score, grade = %summary.grade, "quiz finished");
            return Presented::Finished(summary);
        }

        self.question_index += 1;
        let range = self.settings.range_for(self.difficulty);
        let question =
            Question::generate(&mut self.rng, range, self.settings.non_negative_subtraction);
        self.current = Some(question);
        self.attempt_count = 0;
        self.arm_countdown();
        self.phase = Phase::AwaitingAnswer { attempt: 1 };
        tracing::debug!(number = self.question_index, %question, "question presented");
        Presented::Question(question)
    }

    /// Submit a textual answer. Anything that does not parse as an integer
    /// counts as a wrong answer.
    pub fn submit_answer(&mut self, input: &str) -> AnswerFeedback {
        let (Phase::AwaitingAnswer { .. }, Some(question)) = (self.phase, self.current) else {
            return AnswerFeedback::Ignored;
        };

        self.stop_countdown();
        self.attempt_count += 1;

        let correct = input
            .trim()
            .parse::<i64>()
            .is_ok_and(|value| value == question.answer);

        if correct {
            let (points, outcome) = if self.attempt_count == 1 {
                (self.settings.first_attempt_points, QuestionOutcome::FirstAttempt)
            } else {
                (self.settings.second_attempt_points, QuestionOutcome::SecondAttempt)
            };
            self.score = self.score.saturating_add(points);
            self.resolve(outcome, points);
            AnswerFeedback::Correct { points }
        } else if self.attempt_count == 1 {
            self.arm_countdown();
            self.phase = Phase::AwaitingAnswer { attempt: 2 };
            AnswerFeedback::TryAgain {
                hint: question.hint(),
            }
        } else {
            self.resolve(QuestionOutcome::Incorrect, 0);
            AnswerFeedback::Incorrect {
                correct_answer: question.answer,
            }
        }
    }

    /// Expire the current question. Returns the correct answer, or `None`
    /// when nothing was awaiting an answer.
    pub fn on_timeout(&mut self) -> Option<i64> {
        if !self.is_awaiting_answer() {
            return None;
        }
        self.stop_countdown();
        let answer = self.current.map(|q| q.answer);
        self.resolve(QuestionOutcome::TimedOut, 0);
        answer
    }

    /// Count down one second on the countdown identified by `epoch`.
    pub fn tick(&mut self, epoch: u64) -> TickOutcome {
        if epoch != self.countdown_epoch || !self.is_awaiting_answer() {
            return TickOutcome::Stale;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining > 0 {
            return TickOutcome::Remaining(self.time_remaining);
        }
        match self.on_timeout() {
            Some(correct_answer) => TickOutcome::TimedOut { correct_answer },
            None => TickOutcome::Stale,
        }
    }

    pub fn summary(&self) -> QuizSummary {
        QuizSummary {
            difficulty: self.difficulty,
            score: self.score,
            max_score: self.settings.max_score(),
            questions: self.history.len() as u32,
            grade: self.scale.grade(self.score),
        }
    }

    fn arm_countdown(&mut self) {
        self.countdown_epoch += 1;
        self.time_remaining = self.settings.time_limit_secs;
    }

    fn stop_countdown(&mut self) {
        self.countdown_epoch += 1;
    }

    fn resolve(&mut self, outcome: QuestionOutcome, points: u32) {
        if let Some(question) = self.current {
            self.history.push(QuestionRecord {
                number: self.question_index,
                question,
                outcome,
                points,
            });
        }
        self.phase = Phase::Resolved;
        tracing::debug!(number = self.question_index, ?outcome, points, "question resolved");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::question::Operator;

    fn session(settings: QuizSettings) -> QuizSession<StdRng> {
        QuizSession::with_rng(settings, Difficulty::Easy, StdRng::seed_from_u64(99))
    }

    fn answer(s: &QuizSession<StdRng>) -> String {
        s.current_question().unwrap().answer.to_string()
    }

    fn wrong(s: &QuizSession<StdRng>) -> String {
        (s.current_question().unwrap().answer + 1).to_string()
    }

    #[test]
    fn first_attempt_scores_ten() {
        let mut s = session(QuizSettings::default());
        assert!(matches!(s.present_question(), Presented::Question(_)));
        assert_eq!(s.attempt_count(), 0);
        let a = answer(&s);
        assert_eq!(s.submit_answer(&a), AnswerFeedback::Correct { points: 10 });
        assert_eq!(s.score(), 10);
        assert_eq!(s.phase(), Phase::Resolved);
    }

    #[test]
    fn second_attempt_scores_five_and_gives_hint() {
        let mut s = session(QuizSettings::default());
        s.present_question();
        let w = wrong(&s);
        assert!(matches!(s.submit_answer(&w), AnswerFeedback::TryAgain { .. }));
        assert_eq!(s.phase(), Phase::AwaitingAnswer { attempt: 2 });
        assert_eq!(s.attempt_count(), 1);
        let a = answer(&s);
        assert_eq!(s.submit_answer(&a), AnswerFeedback::Correct { points: 5 });
        assert_eq!(s.score(), 5);
        assert_eq!(s.history()[0].outcome, QuestionOutcome::SecondAttempt);
    }

    #[test]
    fn two_wrong_answers_score_nothing() {
        let mut s = session(QuizSettings::default());
        s.present_question();
        let w = wrong(&s);
        s.submit_answer(&w);
        let expected = s.current_question().unwrap().answer;
        assert_eq!(
            s.submit_answer("not a number"),
            AnswerFeedback::Incorrect {
                correct_answer: expected
            }
        );
        assert_eq!(s.score(), 0);
        assert_eq!(s.attempt_count(), 2);
        assert_eq!(s.submit_answer(&expected.to_string()), AnswerFeedback::Ignored);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn non_numeric_input_is_a_wrong_answer() {
        let mut s = session(QuizSettings::default());
        s.present_question();
        assert!(matches!(s.submit_answer(""), AnswerFeedback::TryAgain { .. }));
    }

    #[test]
    fn answer_is_trimmed_before_parsing() {
        let mut s = session(QuizSettings::default());
        s.present_question();
        let a = format!("  {}\n", answer(&s));
        assert_eq!(s.submit_answer(&a), AnswerFeedback::Correct { points: 10 });
    }

    #[test]
    fn countdown_expires_after_time_limit() {
        let mut s = session(QuizSettings {
            time_limit_secs: 3,
            ..Default::default()
        });
        s.present_question();
        let epoch = s.countdown_epoch();
        assert_eq!(s.tick(epoch), TickOutcome::Remaining(2));
        assert_eq!(s.tick(epoch), TickOutcome::Remaining(1));
        let expected = s.current_question().unwrap().answer;
        assert_eq!(
            s.tick(epoch),
            TickOutcome::TimedOut {
                correct_answer: expected
            }
        );
        assert_eq!(s.phase(), Phase::Resolved);
        assert_eq!(s.history()[0].outcome, QuestionOutcome::TimedOut);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn wrong_first_attempt_restarts_countdown() {
        let mut s = session(QuizSettings {
            time_limit_secs: 5,
            ..Default::default()
        });
        s.present_question();
        let first_epoch = s.countdown_epoch();
        s.tick(first_epoch);
        s.tick(first_epoch);
        assert_eq!(s.time_remaining(), 3);
        let w = wrong(&s);
        s.submit_answer(&w);
        assert_eq!(s.time_remaining(), 5);
        assert_ne!(s.countdown_epoch(), first_epoch);
        assert_eq!(s.tick(first_epoch), TickOutcome::Stale);
        assert_eq!(s.time_remaining(), 5);
    }

    #[test]
    fn stale_tick_cannot_expire_next_question() {
        let mut s = session(QuizSettings {
            time_limit_secs: 1,
            ..Default::default()
        });
        s.present_question();
        let old_epoch = s.countdown_epoch();
        let a = answer(&s);
        s.submit_answer(&a);
        s.present_question();
        assert_eq!(s.tick(old_epoch), TickOutcome::Stale);
        assert!(s.is_awaiting_answer());
        assert_eq!(s.score(), 10);
    }

    #[test]
    fn timeout_when_resolved_is_a_no_op() {
        let mut s = session(QuizSettings::default());
        assert_eq!(s.on_timeout(), None);
        s.present_question();
        let a = answer(&s);
        s.submit_answer(&a);
        assert_eq!(s.on_timeout(), None);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn presenting_over_open_question_skips_it() {
        let mut s = session(QuizSettings::default());
        s.present_question();
        s.present_question();
        assert_eq!(s.question_index(), 2);
        assert_eq!(s.history()[0].outcome, QuestionOutcome::Skipped);
        assert_eq!(s.history()[0].points, 0);
    }

    #[test]
    fn full_quiz_finishes_after_length_questions() {
        let mut s = session(QuizSettings::default());
        let mut presented = 0;
        loop {
            match s.present_question() {
                Presented::Question(_) => {
                    presented += 1;
                    let a = answer(&s);
                    s.submit_answer(&a);
                }
                Presented::Finished(summary) => {
                    assert_eq!(summary.score, 100);
                    assert_eq!(summary.max_score, 100);
                    assert_eq!(summary.questions, 10);
                    assert_eq!(summary.grade.grade, "A+");
                    break;
                }
            }
        }
        assert_eq!(presented, 10);
        assert_eq!(s.question_index(), 10);
        assert!(s.is_finished());
        assert!(matches!(s.present_question(), Presented::Finished(_)));
    }

    #[test]
    fn per_question_points_are_bounded_for_every_attempt_pattern() {
        // Each question follows one of the five possible paths.
        let patterns: [&[bool]; 5] = [&[true], &[false, true], &[false, false], &[], &[false]];
        let mut s = session(QuizSettings {
            length: 50,
            time_limit_secs: 1,
            ..Default::default()
        });
        for i in 0..50 {
            s.present_question();
            for &correct in patterns[i % patterns.len()] {
                let input = if correct { answer(&s) } else { wrong(&s) };
                s.submit_answer(&input);
            }
            if s.is_awaiting_answer() {
                let epoch = s.countdown_epoch();
                s.tick(epoch);
            }
        }
        assert!(s.history().iter().all(|r| [0, 5, 10].contains(&r.points)));
        let total: u32 = s.history().iter().map(|r| r.points).sum();
        assert_eq!(total, s.score());
        assert_eq!(total, 10 * 10 + 10 * 5);
        assert!(s.score() <= s.settings().max_score());
    }

    #[test]
    fn unvalidated_huge_length_still_summarises() {
        let mut s = session(QuizSettings {
            length: 500_000_000,
            ..Default::default()
        });
        s.present_question();
        let input = answer(&s);
        s.submit_answer(&input);
        let summary = s.summary();
        assert_eq!(summary.max_score, u32::MAX);
        assert_eq!(summary.score, 10);
    }

    #[test]
    fn history_keeps_question_text() {
        let mut s = session(QuizSettings::default());
        s.present_question();
        s.on_timeout();
        let record = &s.history()[0];
        assert_eq!(record.number, 1);
        assert!(matches!(
            record.question.operator,
            Operator::Add | Operator::Sub
        ));
    }
}
