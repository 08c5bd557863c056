//! The `quizmarks init` command.

use std::path::Path;

use anyhow::Result;

use quizmarks_core::config::{to_toml, QuizmarksConfig, CONFIG_FILE_NAME};
use quizmarks_core::jokes::write_default_jokes;

pub fn execute() -> Result<()> {
    let config = QuizmarksConfig::default();

    let config_path = Path::new(CONFIG_FILE_NAME);
    if config_path.exists() {
        println!("{CONFIG_FILE_NAME} already exists, skipping.");
    } else {
        let content = format!("# quizmarks configuration\n\n{}", to_toml(&config)?);
        std::fs::write(config_path, content)?;
        println!("Created {CONFIG_FILE_NAME}");
    }

    let marks_path = &config.students.path;
    if marks_path.exists() {
        println!("{} already exists, skipping.", marks_path.display());
    } else {
        std::fs::write(marks_path, SAMPLE_MARKS)?;
        println!("Created {}", marks_path.display());
    }

    let jokes_path = &config.jokes.path;
    if jokes_path.exists() {
        println!("{} already exists, skipping.", jokes_path.display());
    } else {
        write_default_jokes(jokes_path)?;
        println!("Created {}", jokes_path.display());
    }

    println!("\nNext steps:");
    println!("  1. Run: quizmarks students list");
    println!("  2. Run: quizmarks quiz --difficulty moderate");
    println!("  3. Run: quizmarks joke");

    Ok(())
}

const SAMPLE_MARKS: &str = "3
1, Alice, 10, 10, 10, 80
2, Bob, 5, 5, 5, 50
3, Cara, 20, 20, 20, 100
";
