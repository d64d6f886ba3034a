use serde::{Deserialize, Serialize};

use crate::verdict::{self, Verdict};

/// One reflection: the trimmed raw response and what was read from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionSample {
    pub response: String,
    pub verdict: Verdict,
    pub score: Option<f64>,
}

impl ReflectionSample {
    /// Parse a raw completion. Surrounding whitespace is trimmed first.
    pub fn from_response(raw: &str) -> Self {
        let response = raw.trim().to_string();
        let verdict = verdict::extract_verdict(&response);
        Self {
            score: verdict.score(),
            verdict,
            response,
        }
    }
}

/// Aggregate over all samples of one scoring call. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionResult {
    prompt: String,
    samples: Vec<ReflectionSample>,
    #[serde(rename = "score_mean")]
    mean_score: Option<f64>,
}

impl ReflectionResult {
    pub fn new(prompt: String, samples: Vec<ReflectionSample>) -> Self {
        let mean_score = mean(samples.iter().filter_map(|s| s.score));
        Self {
            prompt,
            samples,
            mean_score,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Samples in call-issue order.
    pub fn samples(&self) -> &[ReflectionSample] {
        &self.samples
    }

    /// Mean over parseable samples; `None` when no sample produced a verdict.
    pub fn mean_score(&self) -> Option<f64> {
        self.mean_score
    }

    pub fn responses(&self) -> Vec<&str> {
        self.samples.iter().map(|s| s.response.as_str()).collect()
    }

    pub fn verdicts(&self) -> Vec<Verdict> {
        self.samples.iter().map(|s| s.verdict).collect()
    }

    pub fn letters(&self) -> Vec<Option<char>> {
        self.samples.iter().map(|s| s.verdict.letter()).collect()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.samples.iter().filter_map(|s| s.score).collect()
    }

    pub fn parsed_count(&self) -> usize {
        self.samples.iter().filter(|s| s.verdict.is_parsed()).count()
    }

    /// Justification sentence of the first parseable sample.
    pub fn reasoning(&self) -> Option<&str> {
        self.samples
            .iter()
            .filter(|s| s.verdict.is_parsed())
            .find_map(|s| verdict::justification(&s.response))
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}
