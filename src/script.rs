use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Ordered script of sentences to be read by the speaker.
///
/// Fixed at load time and never mutated. An index past the end does not
/// address a sentence; it signals that the script is complete.
#[derive(Debug, Clone)]
pub struct ScriptCorpus {
    sentences: Vec<String>,
}

impl ScriptCorpus {
    /// Load a script from a plain-text file, one sentence per line.
    /// Blank lines are skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script file: {}", path.display()))?;

        let sentences: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        anyhow::ensure!(
            !sentences.is_empty(),
            "Script file contains no sentences: {}",
            path.display()
        );

        info!(
            "Script loaded: {} sentences from {}",
            sentences.len(),
            path.display()
        );

        Ok(Self { sentences })
    }

    pub fn from_sentences(sentences: Vec<String>) -> Self {
        Self { sentences }
    }

    /// Sentence at `index`, or `None` once the script is complete.
    pub fn sentence(&self, index: usize) -> Option<&str> {
        self.sentences.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Completion ratio in `[0.0, 1.0]`, for progress rendering.
    pub fn progress(&self, index: usize) -> f64 {
        if self.sentences.is_empty() {
            return 1.0;
        }
        index.min(self.sentences.len()) as f64 / self.sentences.len() as f64
    }
}
