//! quizmarks CLI — arithmetic quizzes, student marks, and jokes.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::students::StudentsCommand;

const DEFAULT_LOG_FILTER: &str = "warn,quizmarks_core=info";

#[derive(Parser)]
#[command(
    name = "quizmarks",
    version,
    about = "Timed arithmetic quizzes and a student marks manager"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a timed arithmetic quiz
    Quiz {
        /// Difficulty: easy, moderate, advanced
        #[arg(long, default_value = "easy")]
        difficulty: String,

        /// Number of questions
        #[arg(long)]
        length: Option<u32>,

        /// Seconds allowed per attempt
        #[arg(long)]
        time_limit: Option<u32>,

        /// Never ask subtractions with a negative answer
        #[arg(long)]
        non_negative: bool,

        /// Write the result as JSON to this path
        #[arg(long)]
        save_result: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Manage student marks
    Students {
        /// Student marks file (overrides config)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        action: StudentsCommand,
    },

    /// Tell a random joke
    Joke {
        /// Jokes file (overrides config)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Show the punchline without waiting for Enter
        #[arg(long)]
        reveal: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config, marks file, and jokes file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Quiz {
            difficulty,
            length,
            time_limit,
            non_negative,
            save_result,
            config,
        } => {
            commands::quiz::execute(
                difficulty,
                length,
                time_limit,
                non_negative,
                save_result,
                config,
            )
            .await
        }
        Commands::Students {
            file,
            config,
            action,
        } => commands::students::execute(file, config, action),
        Commands::Joke {
            file,
            reveal,
            config,
        } => commands::joke::execute(file, reveal, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
