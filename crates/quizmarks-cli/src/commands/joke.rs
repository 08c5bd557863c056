//! The `quizmarks joke` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use quizmarks_core::config::load_config_from;
use quizmarks_core::jokes::JokeBook;

pub fn execute(file: Option<PathBuf>, reveal: bool, config_path: Option<PathBuf>) -> Result<()> {
    let path = match file {
        Some(path) => path,
        None => load_config_from(config_path.as_deref())?.jokes.path,
    };

    let book = JokeBook::load_or_seed(&path)?;
    let Some(joke) = book.random(&mut rand::thread_rng()) else {
        anyhow::bail!("no jokes found in {}", path.display());
    };

    println!("{}", joke.question());
    if !reveal {
        print!("(press Enter for the punchline) ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
    }
    println!("{}", joke.punchline);

    Ok(())
}
