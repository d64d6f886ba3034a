//! Reflection prompt template.
//!
//! Templates use two named slots, `{question}` and `{answer}`. Literal braces
//! are written `{{` and `}}`. Slot values are inserted verbatim.

use crate::error::ConfigError;

pub const DEFAULT_REFLECTION_PROMPT: &str = "\
Question: {question}
Answer: {answer}

Explain why the answer is correct, incorrect, or uncertain
in **one short sentence** and use critical thinking to justify your answer.
Immediately on the **next line** write exactly one of the letters A, B, or C.

A  the answer is correct
B  the answer is incorrect
C  I'm not sure

(If even slightly unsure, choose C.)
";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Question,
    Answer,
}

/// A parsed prompt template. Rendering is total once construction succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_REFLECTION_PROMPT).expect("default reflection prompt is valid")
    }
}

impl PromptTemplate {
    pub fn new(source: impl Into<String>) -> Result<Self, ConfigError> {
        let source = source.into();
        let segments = parse(&source)?;

        for (slot, segment) in [("question", Segment::Question), ("answer", Segment::Answer)] {
            if !segments.contains(&segment) {
                return Err(ConfigError::TemplateSlot {
                    message: format!("missing required slot '{{{}}}'", slot),
                });
            }
        }

        Ok(Self { source, segments })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn render(&self, question: &str, answer: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + question.len() + answer.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Question => out.push_str(question),
                Segment::Answer => out.push_str(answer),
            }
        }
        out
    }
}

fn parse(source: &str) -> Result<Vec<Segment>, ConfigError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = source.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        match c {
            '{' if chars.peek().map(|&(_, n)| n) == Some('{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek().map(|&(_, n)| n) == Some('}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let rest = &source[idx + 1..];
                let end = rest.find('}').ok_or_else(|| ConfigError::TemplateSlot {
                    message: format!("unclosed '{{' at byte {}", idx),
                })?;
                let name = &rest[..end];
                let slot = match name {
                    "question" => Segment::Question,
                    "answer" => Segment::Answer,
                    other => {
                        return Err(ConfigError::TemplateSlot {
                            message: format!(
                                "unknown slot '{{{}}}' (only {{question}} and {{answer}} are supported)",
                                other
                            ),
                        })
                    }
                };
                // Skip the slot name and its closing brace.
                for _ in 0..=name.chars().count() {
                    chars.next();
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(slot);
            }
            '}' => {
                return Err(ConfigError::TemplateSlot {
                    message: format!("single '}}' at byte {}; write '}}}}' for a literal brace", idx),
                })
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
