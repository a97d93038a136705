//! Combines per-source summaries into a single research report.

use crate::client::ChunkSummarizer;
use crate::summarizer::Summarizer;
use crate::summary::{render, SummaryResult};
use std::fmt;

const PROS_KEYWORDS: &[&str] = &[
    "connect",
    "benefit",
    "positive",
    "advantage",
    "strength",
    "improve",
    "help",
];

const CONS_KEYWORDS: &[&str] = &[
    "misinformation",
    "negative",
    "harm",
    "risk",
    "problem",
    "weakness",
    "issue",
];

const CONTRADICTION_NOTE: &str = "Some sources highlight benefits, while others warn of dangers.";

const CONCLUSION: &str =
    "Balanced research with multiple perspectives helps make informed decisions.";

/// Number of pros and cons shown in the rendered report
const TOP_MATCHES: usize = 3;

/// The synthesized research report.
///
/// Holds every classified match; rendering shows only the first few.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub summary: SummaryResult,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub contradictions: Vec<String>,
}

/// Keyword classification of a set of summaries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub contradictions: Vec<String>,
}

pub struct Synthesizer<S> {
    summarizer: Summarizer<S>,
}

impl<S: ChunkSummarizer> Synthesizer<S> {
    pub fn new(summarizer: Summarizer<S>) -> Self {
        Self { summarizer }
    }

    pub fn summarizer(&self) -> &Summarizer<S> {
        &self.summarizer
    }

    /// Summarize all source summaries together and tag pros, cons and contradictions
    pub async fn synthesize(&self, summaries: &[String]) -> Report {
        let summary = self.summarizer.summarize(&summaries.join("\n")).await;
        let Classification {
            pros,
            cons,
            contradictions,
        } = classify(summaries);

        Report {
            summary,
            pros,
            cons,
            contradictions,
        }
    }
}

/// Tag each summary as a pro, a con, or both, by keyword.
pub fn classify(summaries: &[String]) -> Classification {
    let mut classification = Classification::default();

    for summary in summaries {
        let text = normalize(summary);
        if PROS_KEYWORDS.iter().any(|k| text.contains(k)) {
            classification.pros.push(summary.clone());
        }
        if CONS_KEYWORDS.iter().any(|k| text.contains(k)) {
            classification.cons.push(summary.clone());
        }
    }

    if !classification.pros.is_empty() && !classification.cons.is_empty() {
        classification
            .contradictions
            .push(CONTRADICTION_NOTE.to_string());
    }

    classification
}

/// Lowercase and strip ASCII punctuation
fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_ascii_punctuation())
        .flat_map(char::to_lowercase)
        .collect()
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return writeln!(f, "None");
    }
    for item in items {
        writeln!(f, "- {item}")?;
    }
    Ok(())
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "**Synthesized Summary:**\n{}\n", render(&self.summary))?;

        writeln!(f, "**Pros Identified:**")?;
        write_list(f, &self.pros[..self.pros.len().min(TOP_MATCHES)])?;

        writeln!(f, "\n**Cons Identified:**")?;
        write_list(f, &self.cons[..self.cons.len().min(TOP_MATCHES)])?;

        writeln!(f, "\n**Contradictions:**")?;
        write_list(f, &self.contradictions)?;

        write!(f, "\n**Conclusion:**\n{CONCLUSION}")
    }
}
