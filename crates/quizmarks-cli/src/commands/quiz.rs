//! The `quizmarks quiz` command.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;

use quizmarks_core::config::load_config_from;
use quizmarks_core::quiz::{AnswerFeedback, Difficulty, Question, QuizSession, QuizSummary};
use quizmarks_core::report::QuizReport;
use quizmarks_runner::{QuizDriver, QuizEvent, QuizObserver};

/// Prints quiz progress to the terminal.
struct ConsoleObserver;

impl QuizObserver for ConsoleObserver {
    fn on_question(&self, number: u32, total: u32, question: &Question, time_limit_secs: u32) {
        println!("\nQuestion {number}/{total} ({time_limit_secs}s): {question}");
    }

    fn on_feedback(&self, feedback: &AnswerFeedback) {
        match feedback {
            AnswerFeedback::Correct { points } => println!("Correct! +{points} points"),
            AnswerFeedback::TryAgain { hint } => {
                println!("Not quite. Hint: {hint}");
                println!("Try again:");
            }
            AnswerFeedback::Incorrect { correct_answer } => {
                println!("Wrong. The answer was {correct_answer}.")
            }
            AnswerFeedback::Ignored => {}
        }
    }

    fn on_tick(&self, remaining_secs: u32) {
        if remaining_secs <= 3 || remaining_secs % 10 == 0 {
            println!("  {remaining_secs}s left");
        }
    }

    fn on_timeout(&self, correct_answer: i64) {
        println!("Time's up! The answer was {correct_answer}.");
    }

    fn on_finished(&self, summary: &QuizSummary) {
        println!(
            "\nFinal score: {}/{}  Rank: {}",
            summary.score, summary.max_score, summary.grade
        );
    }
}

pub async fn execute(
    difficulty: String,
    length: Option<u32>,
    time_limit: Option<u32>,
    non_negative: bool,
    save_result: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let difficulty: Difficulty = difficulty.parse().map_err(anyhow::Error::msg)?;

    let mut settings = load_config_from(config_path.as_deref())?.quiz;
    if let Some(length) = length {
        settings.length = length;
    }
    if let Some(secs) = time_limit {
        settings.time_limit_secs = secs;
    }
    if non_negative {
        settings.non_negative_subtraction = true;
    }
    settings.validate()?;

    println!(
        "{difficulty} quiz: {} questions, {}s per attempt. Type each answer and press Enter.",
        settings.length, settings.time_limit_secs
    );

    let driver = QuizDriver::new(QuizSession::new(settings, difficulty));
    spawn_stdin_reader(driver.sender());
    let session = driver.run(&ConsoleObserver).await;

    if !session.is_finished() {
        let summary = session.summary();
        println!(
            "\nQuiz ended early after {} question(s). Score: {}/{}",
            summary.questions, summary.score, summary.max_score
        );
    }

    if let Some(path) = save_result {
        QuizReport::from_session(&session).save_json(&path)?;
        println!("Result saved to {}", path.display());
    }

    Ok(())
}

/// Forward stdin lines as answers; end of input quits the quiz.
///
/// Uses a plain thread so a pending read never holds up runtime shutdown.
fn spawn_stdin_reader(tx: UnboundedSender<QuizEvent>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(QuizEvent::Answer(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!("failed to read answer: {e}");
                    break;
                }
            }
        }
        let _ = tx.send(QuizEvent::Quit);
    });
}
