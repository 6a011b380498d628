//! Target phrase providers
//!
//! Every session pulls exactly one phrase when it starts. Sources are shared
//! by all session tasks through an `Arc<dyn TextSource>`, so implementations
//! must be safe to call concurrently without outside coordination.

use crate::error::ConfigError;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::sync::Mutex;

/// Practice sentences used when no corpus is configured
pub const DEFAULT_CORPUS: [&str; 10] = [
    "The quick brown fox jumps over the lazy dog while the wind blows softly through the quiet evening forest.",
    "Typing fast requires focus, rhythm, and regular practice. Start slow, stay accurate, and your speed will naturally improve over time.",
    "Every mistake is a lesson. Keep your hands relaxed, eyes on the screen, and trust your muscle memory.",
    "Technology changes quickly, but good typing skills remain useful for work, study, and everyday communication.",
    "Consistency matters more than talent. Ten minutes of daily typing can bring better results than long sessions once a week.",
    "In 2024, I practiced typing for 15 minutes a day and increased my speed from 42 to 68 words per minute.",
    "The meeting starts at 9:30, ends at 11:45, and includes 3 main topics and 12 action items.",
    "She bought 2 monitors, 1 keyboard, and 5 cables for $120, saving 20% during the sale.",
    "Version 3.1.4 was released after 27 tests, 8 bug fixes, and 0 critical errors.",
    "Room 404 is on floor 7, code 9832 opens the door, and the timer locks it again after 60 seconds.",
];

/// Supplies the target phrase for a session. Never returns an empty string.
pub trait TextSource: Send + Sync {
    fn next_phrase(&self) -> String;
}

/// Always hands out the same phrase
#[derive(Debug, Clone)]
pub struct FixedText {
    phrase: String,
}

impl FixedText {
    pub fn new(phrase: impl Into<String>) -> Result<Self, ConfigError> {
        let phrase = phrase.into();
        if phrase.is_empty() {
            return Err(ConfigError::EmptyPhrase);
        }
        Ok(Self { phrase })
    }
}

impl TextSource for FixedText {
    fn next_phrase(&self) -> String {
        self.phrase.clone()
    }
}

/// Uniform random pick from a fixed corpus
///
/// The generator is injected so tests can pass a seeded one. It is guarded by
/// a mutex that is held only for the duration of a single draw; picks made by
/// concurrent sessions are independent of each other.
#[derive(Debug)]
pub struct RandomText<R> {
    corpus: Vec<String>,
    rng: Mutex<R>,
}

impl<R: Rng + Send> RandomText<R> {
    pub fn new(corpus: Vec<String>, rng: R) -> Result<Self, ConfigError> {
        let corpus: Vec<String> = corpus.into_iter().filter(|p| !p.is_empty()).collect();
        if corpus.is_empty() {
            return Err(ConfigError::EmptyCorpus);
        }
        Ok(Self {
            corpus,
            rng: Mutex::new(rng),
        })
    }

    pub fn corpus(&self) -> &[String] {
        &self.corpus
    }
}

impl RandomText<StdRng> {
    /// The built-in corpus with an OS-seeded generator
    pub fn with_default_corpus() -> Self {
        Self {
            corpus: DEFAULT_CORPUS.iter().map(|s| s.to_string()).collect(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Loads one phrase per line, skipping blank lines
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let corpus: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        let source = Self::new(corpus, StdRng::from_entropy())?;
        info!(
            "Loaded {} phrases from {}",
            source.corpus.len(),
            path.display()
        );
        Ok(source)
    }
}

impl<R: Rng + Send> TextSource for RandomText<R> {
    fn next_phrase(&self) -> String {
        let index = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            rng.gen_range(0..self.corpus.len())
        };
        self.corpus[index].clone()
    }
}
