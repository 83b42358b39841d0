//! Prompt templates for the research calls.
//!
//! Every call has a built-in template. A prompts directory may override any of
//! them with a file of the same name (`clarify.md`, `plan.md`, …); missing
//! files fall back to the built-in text.
//!
//! Variable substitution uses `{{key}}` syntax and is applied once at
//! [`build()`](PromptBuilder::build) time, after all parts are joined.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const SEPARATOR: &str = "\n\n";

const CLARIFY: &str = "\
Ask 5 numbered clarifying questions about: {{topic}}.
The goal of the questions is to understand the intended purpose of the research.
Reply only with the questions.";

const PLAN: &str = "\
Using the user answers {{answers}}, write a short goal sentence for the research about {{topic}}.
Output a JSON list of 5 web search queries that will reach it.
Format: {\"goal\": \"...\", \"queries\": [\"q1\", ...]}";

const SEARCH: &str = "Search: {{query}}";

const EVALUATE: &str = "Does this information fully satisfy the goal? Answer Yes or No only.";

const SYNTHESIZE: &str = "\
Write a complete answer that meets the goal: {{goal}}. \
Cite sources inline using [n] and append a reference list mapping [n] to url.";

const MORE_QUERIES: &str = "\
We still haven't met the goal. Give 5 more, new, high-value web search queries only as a JSON list.";

/// The model calls that take a templated prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    Clarify,
    Plan,
    Search,
    Evaluate,
    Synthesize,
    MoreQueries,
}

impl Template {
    pub const ALL: [Template; 6] = [
        Template::Clarify,
        Template::Plan,
        Template::Search,
        Template::Evaluate,
        Template::Synthesize,
        Template::MoreQueries,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Template::Clarify => "clarify.md",
            Template::Plan => "plan.md",
            Template::Search => "search.md",
            Template::Evaluate => "evaluate.md",
            Template::Synthesize => "synthesize.md",
            Template::MoreQueries => "more_queries.md",
        }
    }

    pub fn builtin(self) -> &'static str {
        match self {
            Template::Clarify => CLARIFY,
            Template::Plan => PLAN,
            Template::Search => SEARCH,
            Template::Evaluate => EVALUATE,
            Template::Synthesize => SYNTHESIZE,
            Template::MoreQueries => MORE_QUERIES,
        }
    }
}

/// Fluent builder that assembles a prompt from template parts.
pub struct PromptBuilder {
    prompts_dir: Option<PathBuf>,
    parts: Vec<String>,
    vars: HashMap<String, String>,
}

impl PromptBuilder {
    /// Create a builder; `prompts_dir` is where override files are looked up.
    pub fn new(prompts_dir: Option<&Path>) -> Self {
        Self {
            prompts_dir: prompts_dir.map(Path::to_path_buf),
            parts: Vec::new(),
            vars: HashMap::new(),
        }
    }

    /// Append `template`, preferring its override file when one exists.
    pub fn template(self, template: Template) -> Self {
        let overridden = self
            .prompts_dir
            .as_ref()
            .map(|dir| dir.join(template.file_name()))
            .and_then(|path| match fs::read_to_string(&path) {
                Ok(text) => Some(text),
                Err(_) => {
                    tracing::debug!("prompt: override '{}' not found — using built-in", path.display());
                    None
                }
            });
        match overridden {
            Some(text) => self.append(text),
            None => self.append(template.builtin()),
        }
    }

    /// Directly append a text fragment.
    pub fn append(mut self, text: impl Into<String>) -> Self {
        let s = text.into();
        let trimmed = s.trim().to_string();
        if !trimmed.is_empty() {
            self.parts.push(trimmed);
        }
        self
    }

    /// Register a single `{{key}}` → `value` substitution.
    pub fn var(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }

    /// Assemble all parts, join with blank lines, and apply variable substitution.
    ///
    /// Substitution is a single pass over the template text; substituted
    /// values are never scanned for placeholders. Unknown `{{name}}`
    /// placeholders are left as written.
    pub fn build(self) -> String {
        let template = self.parts.join(SEPARATOR);
        let mut out = String::with_capacity(template.len());
        let mut rest = template.as_str();
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}").and_then(|end| self.vars.get(&after[..end]).map(|v| (end, v))) {
                Some((end, value)) => {
                    out.push_str(value);
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str("{{");
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Renders templates against an optional overrides directory.
#[derive(Debug, Clone, Default)]
pub struct Prompts {
    dir: Option<PathBuf>,
}

impl Prompts {
    pub fn new(dir: Option<PathBuf>) -> Self {
        let prompts = Self { dir };
        if let Some(dir) = &prompts.dir {
            let found = prompts.overridden();
            tracing::info!(dir = %dir.display(), overrides = ?found, "prompt overrides");
        }
        prompts
    }

    /// Templates that have an override file in the prompts directory.
    pub fn overridden(&self) -> Vec<Template> {
        let Some(dir) = &self.dir else { return Vec::new() };
        Template::ALL.into_iter().filter(|t| dir.join(t.file_name()).is_file()).collect()
    }

    pub fn render(&self, template: Template, vars: &[(&str, &str)]) -> String {
        vars.iter()
            .fold(PromptBuilder::new(self.dir.as_deref()).template(template), |b, (k, v)| {
                b.var(k, *v)
            })
            .build()
    }
}
