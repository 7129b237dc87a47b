use crate::error::{Result, StoreError};
use crate::text::{split_sentences, tokenize};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Summarization capability used at ingest time.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Stable provider name, used in fallback logging.
    fn name(&self) -> &'static str;

    async fn summarize(&self, text: &str) -> Result<String>;
}

/// Which summarizer chain to construct at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarizerProvider {
    #[default]
    Extractive,
}

/// Extractive summarizer: scores sentences by stopword-filtered word
/// frequency and keeps the top `sentence_count` in original order.
pub struct ExtractiveSummarizer {
    sentence_count: usize,
}

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "in",
    "is", "it", "its", "of", "on", "or", "that", "the", "this", "to", "was", "were", "will",
    "with",
];

impl ExtractiveSummarizer {
    #[must_use]
    pub const fn new(sentence_count: usize) -> Self {
        Self { sentence_count }
    }
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self::new(3)
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    fn name(&self) -> &'static str {
        "extractive"
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Err(StoreError::Summarization(
                "no sentences to summarize".to_string(),
            ));
        }

        let mut frequencies: HashMap<String, f32> = HashMap::new();
        for sentence in &sentences {
            for term in tokenize(sentence) {
                if STOPWORDS.contains(&term.as_str()) {
                    continue;
                }
                *frequencies.entry(term).or_insert(0.0) += 1.0;
            }
        }

        // Mean term frequency per sentence; short sentences aren't
        // penalized for length.
        let mut scored: Vec<(usize, f32)> = sentences
            .iter()
            .enumerate()
            .map(|(position, sentence)| {
                let terms = tokenize(sentence);
                if terms.is_empty() {
                    return (position, 0.0);
                }
                let total: f32 = terms
                    .iter()
                    .map(|t| frequencies.get(t).copied().unwrap_or(0.0))
                    .sum();
                (position, total / terms.len() as f32)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let mut keep: Vec<usize> = scored
            .into_iter()
            .take(self.sentence_count)
            .map(|(position, _)| position)
            .collect();
        keep.sort_unstable();

        let summary = keep
            .into_iter()
            .map(|position| format!("{}.", sentences[position]))
            .collect::<Vec<_>>()
            .join(" ");
        Ok(summary)
    }
}

/// Last-resort summarizer: the leading characters of the text, cut at a
/// word boundary. Never fails on non-blank input.
pub struct TruncatingSummarizer {
    max_chars: usize,
}

impl TruncatingSummarizer {
    #[must_use]
    pub const fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl Default for TruncatingSummarizer {
    fn default() -> Self {
        Self::new(280)
    }
}

#[async_trait]
impl Summarizer for TruncatingSummarizer {
    fn name(&self) -> &'static str {
        "truncating"
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(StoreError::Summarization(
                "cannot summarize blank text".to_string(),
            ));
        }

        if trimmed.chars().count() <= self.max_chars {
            return Ok(trimmed.to_string());
        }

        let cut: String = trimmed.chars().take(self.max_chars).collect();
        let boundary = cut.rfind(char::is_whitespace).unwrap_or(cut.len());
        Ok(format!("{}…", cut[..boundary].trim_end()))
    }
}

/// Ordered fallback chain: providers are tried in sequence and the first
/// success wins. Failures short of the last link are logged, not surfaced.
pub struct SummarizerChain {
    links: Vec<Arc<dyn Summarizer>>,
}

impl SummarizerChain {
    #[must_use]
    pub fn new(links: Vec<Arc<dyn Summarizer>>) -> Self {
        Self { links }
    }
}

#[async_trait]
impl Summarizer for SummarizerChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let mut last_error = StoreError::Summarization("empty summarizer chain".to_string());
        for link in &self.links {
            match link.summarize(text).await {
                Ok(summary) => return Ok(summary),
                Err(err) => {
                    log::warn!("Summarizer '{}' failed, trying next: {err}", link.name());
                    last_error = err;
                }
            }
        }
        Err(last_error)
    }
}

/// Build the summarizer chain for the configured provider. The truncating
/// summarizer always terminates the chain so ingest keeps working when the
/// primary provider chokes on a given text.
#[must_use]
pub fn build_summarizer(provider: SummarizerProvider, sentence_count: usize) -> Arc<dyn Summarizer> {
    match provider {
        SummarizerProvider::Extractive => Arc::new(SummarizerChain::new(vec![
            Arc::new(ExtractiveSummarizer::new(sentence_count)),
            Arc::new(TruncatingSummarizer::default()),
        ])),
    }
}
