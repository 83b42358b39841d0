//! Conversation artifacts passed between research steps.

use serde::{Deserialize, Serialize};

/// A non-empty, trimmed research topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic(String);

impl Topic {
    /// Returns `None` for blank input — nothing is sent to the model then.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() { None } else { Some(Self(trimmed.to_string())) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Research goal plus the initial search queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub goal: String,
    pub queries: Vec<String>,
}

/// One executed web search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedResult {
    pub query: String,
    pub resp_id: String,
    pub research_output: String,
}

/// Accumulated search results, deduplicated by exact query string only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collected(Vec<CollectedResult>);

impl Collected {
    pub fn contains(&self, query: &str) -> bool {
        self.0.iter().any(|r| r.query == query)
    }

    /// Append unless a result for the same query exists. Returns whether it was added.
    pub fn push(&mut self, result: CollectedResult) -> bool {
        if self.contains(&result.query) {
            return false;
        }
        self.0.push(result);
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn queries(&self) -> Vec<String> {
        self.0.iter().map(|r| r.query.clone()).collect()
    }

    /// JSON array handed to the model as assistant context.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Result of one search/evaluate round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// The goal was judged satisfied and the report was written.
    Report { report: String, searched: Vec<String> },
    /// Not satisfied yet; these queries are pending for the next round.
    NeedsMore { new_queries: Vec<String> },
    /// Not satisfied, and the model proposed nothing that has not been searched.
    Exhausted,
}
