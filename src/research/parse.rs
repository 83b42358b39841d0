//! Optimistic parsing of model text.
//!
//! The model is asked for a specific shape but nothing guarantees it. These
//! helpers accept the shapes seen in practice (bare JSON or JSON wrapped in a
//! Markdown code fence) and report anything else as a [`ParseError`].

use serde::Deserialize;
use thiserror::Error;

use super::types::Plan;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("plan is not valid JSON with `goal` and `queries`: {0}")]
    Plan(String),
    #[error("queries are not a JSON list of strings: {0}")]
    Queries(String),
    #[error("reply contains no clarifying questions")]
    NoQuestions,
}

/// Strip a surrounding ```` ``` ```` / ```` ```json ```` fence, if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.split_once('\n') {
        // Drop the info string (e.g. `json`) on the opening line.
        Some((_, body)) => body,
        // Single-line fence: ```json[...]``` or ```[...]```.
        None => rest.strip_prefix("json").unwrap_or(rest),
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Split model output into questions: one per line, blank lines dropped.
pub fn split_questions(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_plan(text: &str) -> Result<Plan, ParseError> {
    let body = strip_code_fence(text);
    let mut plan: Plan = serde_json::from_str(body).map_err(|e| ParseError::Plan(e.to_string()))?;
    plan.goal = plan.goal.trim().to_string();
    plan.queries = clean_queries(plan.queries);
    Ok(plan)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QueryList {
    List(Vec<String>),
    Wrapped { queries: Vec<String> },
}

/// Parse a JSON list of queries, also accepting `{"queries": [...]}`.
pub fn parse_queries(text: &str) -> Result<Vec<String>, ParseError> {
    let body = strip_code_fence(text);
    let list: QueryList = serde_json::from_str(body).map_err(|e| ParseError::Queries(e.to_string()))?;
    Ok(match list {
        QueryList::List(q) | QueryList::Wrapped { queries: q } => clean_queries(q),
    })
}

fn clean_queries(queries: Vec<String>) -> Vec<String> {
    queries
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect()
}

/// `true` when the reply contains "yes" anywhere, case-insensitively.
pub fn is_affirmative(text: &str) -> bool {
    text.to_lowercase().contains("yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn questions_split_on_newlines() {
        let text = "1. Who is the audience?\n\n2. What depth?\n   \n3. Any deadline?\n";
        assert_eq!(
            split_questions(text),
            vec!["1. Who is the audience?", "2. What depth?", "3. Any deadline?"]
        );
    }

    #[test]
    fn question_count_is_not_enforced() {
        assert_eq!(split_questions("Only one?").len(), 1);
        assert!(split_questions("").is_empty());
    }

    #[test]
    fn plan_parses_bare_json() {
        let plan = parse_plan(r#"{"goal": "Compare X and Y", "queries": ["x vs y", " y benchmarks "]}"#).unwrap();
        assert_eq!(plan.goal, "Compare X and Y");
        assert_eq!(plan.queries, vec!["x vs y", "y benchmarks"]);
    }

    #[test]
    fn plan_parses_fenced_json() {
        let text = "```json\n{\"goal\": \"g\", \"queries\": [\"q1\"]}\n```";
        assert_eq!(parse_plan(text).unwrap().queries, vec!["q1"]);
    }

    #[test]
    fn plan_without_queries_is_error() {
        let err = parse_plan(r#"{"goal": "g"}"#).unwrap_err();
        assert!(matches!(err, ParseError::Plan(_)));
    }

    #[test]
    fn prose_plan_is_error() {
        assert!(parse_plan("Sure! Here is your plan: ...").is_err());
    }

    #[test]
    fn queries_parse_list_and_wrapped() {
        assert_eq!(parse_queries(r#"["a", "b"]"#).unwrap(), vec!["a", "b"]);
        assert_eq!(parse_queries(r#"{"queries": ["c"]}"#).unwrap(), vec!["c"]);
        assert_eq!(parse_queries("```\n[\"d\", \"\"]\n```").unwrap(), vec!["d"]);
    }

    #[test]
    fn single_line_fence_is_stripped() {
        assert_eq!(parse_queries(r#"```["a","b"]```"#).unwrap(), vec!["a", "b"]);
        assert_eq!(parse_queries(r#"```json["c"]```"#).unwrap(), vec!["c"]);
        assert_eq!(parse_plan(r#"```json{"goal": "g", "queries": ["q"]}```"#).unwrap().goal, "g");
    }

    #[test]
    fn queries_reject_non_strings() {
        assert!(matches!(parse_queries("[1, 2]").unwrap_err(), ParseError::Queries(_)));
    }

    #[test]
    fn affirmative_is_substring_match() {
        assert!(is_affirmative("Yes"));
        assert!(is_affirmative("YES."));
        assert!(is_affirmative("I would say yes, mostly"));
        assert!(!is_affirmative("No"));
        assert!(!is_affirmative(""));
    }

    #[test]
    fn unterminated_fence_keeps_body() {
        assert_eq!(strip_code_fence("```json\n[\"a\"]"), "[\"a\"]");
    }
}
