//! Single-consumer event loop around a [`QuizSession`].

use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use quizmarks_core::quiz::{
    AnswerFeedback, Presented, Question, QuizSession, QuizSummary, TickOutcome,
};

use crate::countdown::{Countdown, ScheduledTask};

/// Everything that can happen to a running quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    /// Raw text typed by the player.
    Answer(String),
    /// One countdown second elapsed on the countdown armed at `epoch`.
    Tick { epoch: u64 },
    /// The pause after a resolved question is over.
    Advance,
    /// Stop the quiz now.
    Quit,
}

/// Receives quiz progress from a [`QuizDriver`].
pub trait QuizObserver: Send + Sync {
    fn on_question(&self, number: u32, total: u32, question: &Question, time_limit_secs: u32);
    fn on_feedback(&self, feedback: &AnswerFeedback);
    fn on_tick(&self, remaining_secs: u32);
    fn on_timeout(&self, correct_answer: i64);
    fn on_finished(&self, summary: &QuizSummary);
}

/// No-op observer.
pub struct NoopObserver;

impl QuizObserver for NoopObserver {
    fn on_question(&self, _: u32, _: u32, _: &Question, _: u32) {}
    fn on_feedback(&self, _: &AnswerFeedback) {}
    fn on_tick(&self, _: u32) {}
    fn on_timeout(&self, _: i64) {}
    fn on_finished(&self, _: &QuizSummary) {}
}

/// Drives a session in real time.
///
/// All events, including timer ticks, arrive through one channel and are
/// handled one at a time, so the session is never touched concurrently.
pub struct QuizDriver<R = StdRng> {
    session: QuizSession<R>,
    tx: UnboundedSender<QuizEvent>,
    rx: UnboundedReceiver<QuizEvent>,
    tick_period: Duration,
    countdown: Option<ScheduledTask>,
    advance: Option<ScheduledTask>,
}

impl<R: Rng> QuizDriver<R> {
    pub fn new(session: QuizSession<R>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session,
            tx,
            rx,
            tick_period: Duration::from_secs(1),
            countdown: None,
            advance: None,
        }
    }

    /// Length of one countdown second.
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// A handle for feeding answers or quitting from other tasks.
    pub fn sender(&self) -> UnboundedSender<QuizEvent> {
        self.tx.clone()
    }

    pub fn session(&self) -> &QuizSession<R> {
        &self.session
    }

    /// Run until the quiz finishes or a `Quit` arrives. Returns the session
    /// so the caller can report on it.
    pub async fn run(mut self, observer: &dyn QuizObserver) -> QuizSession<R> {
        if self.present(observer) {
            return self.session;
        }

        while let Some(event) = self.rx.recv().await {
            match event {
                QuizEvent::Answer(input) => self.handle_answer(&input, observer),
                QuizEvent::Tick { epoch } => self.handle_tick(epoch, observer),
                QuizEvent::Advance => {
                    self.advance = None;
                    if self.present(observer) {
                        break;
                    }
                }
                QuizEvent::Quit => {
                    tracing::debug!(
                        question = self.session.question_index(),
                        "quiz abandoned"
                    );
                    break;
                }
            }
        }

        self.countdown = None;
        self.advance = None;
        self.session
    }

    fn handle_answer(&mut self, input: &str, observer: &dyn QuizObserver) {
        if !self.session.is_awaiting_answer() {
            tracing::debug!("answer ignored outside a question");
            return;
        }
        self.countdown = None;

        let feedback = self.session.submit_answer(input);
        observer.on_feedback(&feedback);
        match feedback {
            AnswerFeedback::TryAgain { .. } => self.arm_countdown(),
            AnswerFeedback::Correct { .. } | AnswerFeedback::Incorrect { .. } => {
                self.schedule_advance()
            }
            AnswerFeedback::Ignored => {}
        }
    }

    fn handle_tick(&mut self, epoch: u64, observer: &dyn QuizObserver) {
        let expiring = epoch == self.session.countdown_epoch()
            && self.session.is_awaiting_answer()
            && self.session.time_remaining() <= 1;
        if expiring {
            self.countdown = None;
        }

        match self.session.tick(epoch) {
            TickOutcome::Stale => tracing::trace!(epoch, "stale tick"),
            TickOutcome::Remaining(secs) => observer.on_tick(secs),
            TickOutcome::TimedOut { correct_answer } => {
                observer.on_timeout(correct_answer);
                self.schedule_advance();
            }
        }
    }

    /// Present the next question. Returns `true` once the quiz is over.
    fn present(&mut self, observer: &dyn QuizObserver) -> bool {
        self.countdown = None;
        match self.session.present_question() {
            Presented::Question(question) => {
                let settings = self.session.settings();
                observer.on_question(
                    self.session.question_index(),
                    settings.length,
                    &question,
                    settings.time_limit_secs,
                );
                self.arm_countdown();
                false
            }
            Presented::Finished(summary) => {
                observer.on_finished(&summary);
                true
            }
        }
    }

    fn arm_countdown(&mut self) {
        self.countdown = Some(Countdown::start(
            self.session.countdown_epoch(),
            self.tick_period,
            self.tx.clone(),
        ));
    }

    fn schedule_advance(&mut self) {
        self.advance = Some(ScheduledTask::after(
            self.session.settings().resolve_delay(),
            self.tx.clone(),
            QuizEvent::Advance,
        ));
    }
}
