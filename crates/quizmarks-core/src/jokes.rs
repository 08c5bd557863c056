//! Setup/punchline jokes read from a line-oriented text file.
//!
//! Each line holds one joke; the first `?` separates the setup from the
//! punchline. Lines without a `?` are ignored.

use std::path::Path;

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;

/// Jokes written to a fresh jokes file.
pub const DEFAULT_JOKES: &[&str] = &[
    "Why did the chicken cross the road?To get to the other side.",
    "What happens if you boil a clown?You get a laughing stock.",
    "Why did the car get a flat tire?Because there was a fork in the road!",
    "How did the hipster burn his mouth?He ate his pizza before it was cool.",
    "What did the janitor say when he jumped out of the closet?SUPPLIES!!!!",
    "Why should you wear glasses to maths class?Because it helps with division.",
    "Why does it take pirates so long to learn the alphabet?Because they could spend years at C.",
    "Why do bananas never get lonely?Because they hang out in bunches.",
    "What did the buffalo say when his kid went to college?Bison.",
    "Why shouldn't you tell secrets in a cornfield?Too many ears.",
    "What do you call someone who doesn't like carbs?Lack-Toast Intolerant.",
    "Why did the can crusher quit his job?Because it was soda pressing.",
    "Why didn't the bike want to go anywhere?Because it was two-tired!",
    "Want to hear a pizza joke?Nahhh, it's too cheesy!",
    "Why are chemists great at solving problems?Because they have all of the solutions!",
    "What did the cheese say when it looked in the mirror?Halloumi!",
    "Why did the developer go broke?Because he used up all his cache.",
    "Why did the donut go to the dentist?To get a filling.",
    "What do you call a bear with no teeth?A gummy bear!",
    "What did one ocean say to the other?Nothing, they just waved.",
    "Why don't scientists trust Atoms?They make up everything.",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joke {
    /// The question, without its trailing `?`.
    pub setup: String,
    pub punchline: String,
}

impl Joke {
    /// The setup as it is asked.
    pub fn question(&self) -> String {
        format!("{}?", self.setup)
    }
}

/// Parse every joke in `text`.
pub fn parse_jokes(text: &str) -> Vec<Joke> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let (setup, punchline) = line.split_once('?')?;
            Some(Joke {
                setup: setup.trim().to_string(),
                punchline: punchline.trim().to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct JokeBook {
    jokes: Vec<Joke>,
}

impl JokeBook {
    pub fn new(jokes: Vec<Joke>) -> Self {
        Self { jokes }
    }

    /// Load jokes from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read jokes from {}", path.display()))?;
        let jokes = parse_jokes(&content);
        tracing::info!(path = %path.display(), jokes = jokes.len(), "loaded jokes");
        Ok(Self { jokes })
    }

    /// Load jokes, first writing [`DEFAULT_JOKES`] if the file does not exist.
    pub fn load_or_seed(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "jokes file missing, writing defaults");
            write_default_jokes(path)?;
        }
        Self::load(path)
    }

    pub fn len(&self) -> usize {
        self.jokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jokes.is_empty()
    }

    pub fn jokes(&self) -> &[Joke] {
        &self.jokes
    }

    /// A uniformly random joke, or `None` if the book is empty.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Joke> {
        self.jokes.choose(rng)
    }
}

/// Write the built-in joke list to `path`, creating parent directories.
pub fn write_default_jokes(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut content = DEFAULT_JOKES.join("\n");
    content.push('\n');
    std::fs::write(path, content)
        .with_context(|| format!("failed to write jokes to {}", path.display()))?;
    Ok(())
}
