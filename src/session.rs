//! Persistent research session state.
//!
//! One JSON document per session under `{sessions_dir}/{id}/state.json`.
//! The state is the key/value record of where a research run stands: which
//! topic the questions belong to, which answers the plan was made from, what
//! has been searched. Later steps are invalidated when an earlier input
//! changes, so resuming never mixes artifacts from different topics.
//!
//! Writes go to a temp file in the same directory and are renamed into place.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;
use crate::research::{Collected, Plan};

const STATE_FILENAME: &str = "state.json";

/// Serialized session record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub last_topic: Option<String>,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub clarify_id: Option<String>,
    /// Answers as last entered, aligned with `questions`.
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub plan: Option<Plan>,
    /// Answers the current plan was generated from.
    #[serde(default)]
    pub plan_answers: Vec<String>,
    #[serde(default)]
    pub plan_id: Option<String>,
    /// Queries pending for the next round.
    #[serde(default)]
    pub queries: Vec<String>,
    #[serde(default)]
    pub collected: Collected,
    #[serde(default)]
    pub research_started: bool,
    #[serde(default)]
    pub rounds: u32,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl SessionState {
    /// Record `topic`. A different topic discards everything derived from the
    /// old one. Returns `true` when the topic changed.
    pub fn set_topic(&mut self, topic: &str) -> bool {
        if self.last_topic.as_deref() == Some(topic) {
            return false;
        }
        *self = SessionState { last_topic: Some(topic.to_string()), ..SessionState::default() };
        true
    }

    pub fn set_questions(&mut self, questions: Vec<String>, clarify_id: String) {
        self.questions = questions;
        self.clarify_id = Some(clarify_id);
        self.answers.clear();
        self.clear_plan();
    }

    /// Record answers. Answers that differ from the ones the plan was made
    /// from discard the plan and any research done for it.
    pub fn set_answers(&mut self, answers: Vec<String>) {
        if self.plan.is_some() && answers != self.plan_answers {
            self.clear_plan();
        }
        self.answers = answers;
    }

    /// There is at least one question and every question has a non-blank answer.
    pub fn answers_complete(&self) -> bool {
        !self.questions.is_empty()
            && self.answers.len() == self.questions.len()
            && self.answers.iter().all(|a| !a.trim().is_empty())
    }

    /// A plan exists and was made from the current answers.
    pub fn plan_is_current(&self) -> bool {
        self.plan.is_some() && self.plan_answers == self.answers
    }

    /// Store a fresh plan; any research done for an older plan is dropped.
    pub fn set_plan(&mut self, plan: Plan, plan_id: String) {
        self.clear_research();
        self.plan_answers = self.answers.clone();
        self.queries = plan.queries.clone();
        self.plan = Some(plan);
        self.plan_id = Some(plan_id);
    }

    /// Queries for the next round: the plan's while nothing is collected yet,
    /// otherwise the pending follow-ups.
    pub fn queries_to_run(&self) -> Vec<String> {
        let initial = || self.plan.as_ref().map(|p| p.queries.clone()).unwrap_or_default();
        if self.collected.is_empty() || self.queries.is_empty() {
            initial()
        } else {
            self.queries.clone()
        }
    }

    /// Reset after a report: results are dropped, the plan is kept.
    pub fn finish_research(&mut self) {
        self.research_started = false;
        self.collected.clear();
        self.rounds = 0;
    }

    fn clear_plan(&mut self) {
        self.plan = None;
        self.plan_answers.clear();
        self.plan_id = None;
        self.clear_research();
    }

    fn clear_research(&mut self) {
        self.queries.clear();
        self.collected.clear();
        self.research_started = false;
        self.rounds = 0;
    }
}

/// Root directory of all sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open session `id`, creating its directory. A missing state file yields
    /// an empty state.
    pub fn open(&self, id: &str) -> Result<Session, AppError> {
        validate_id(id)?;
        let dir = self.root.join(id);
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::Session(format!("cannot create {}: {e}", dir.display())))?;
        let path = dir.join(STATE_FILENAME);
        let state = if path.exists() { read_state(&path)? } else { SessionState::default() };
        debug!(session = %id, path = %path.display(), "session opened");
        Ok(Session { id: id.to_string(), path, state })
    }

    /// Delete the stored state of `id`. Missing state is not an error.
    pub fn reset(&self, id: &str) -> Result<(), AppError> {
        validate_id(id)?;
        let path = self.root.join(id).join(STATE_FILENAME);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Session(format!("cannot remove {}: {e}", path.display()))),
        }
    }
}

/// An open session: its id, on-disk location and in-memory state.
#[derive(Debug)]
pub struct Session {
    id: String,
    path: PathBuf,
    pub state: SessionState,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn save(&mut self) -> Result<(), AppError> {
        self.state.updated_at = Some(chrono::Utc::now().to_rfc3339());
        let data = serde_json::to_string_pretty(&self.state)
            .map_err(|e| AppError::Session(format!("serialise state: {e}")))?;
        let tmp = self.path.with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4()));
        fs::write(&tmp, data)
            .map_err(|e| AppError::Session(format!("cannot write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            AppError::Session(format!("cannot replace {}: {e}", self.path.display()))
        })
    }
}

fn read_state(path: &Path) -> Result<SessionState, AppError> {
    let data = fs::read_to_string(path)
        .map_err(|e| AppError::Session(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&data)
        .map_err(|e| AppError::Session(format!("malformed {}: {e}", path.display())))
}

fn validate_id(id: &str) -> Result<(), AppError> {
    let valid = !id.is_empty()
        && id.len() <= 64
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::Session(format!(
            "invalid session id '{id}': use 1-64 letters, digits, '-' or '_'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::CollectedResult;
    use tempfile::TempDir;

    fn plan(queries: &[&str]) -> Plan {
        Plan { goal: "g".into(), queries: queries.iter().map(|q| q.to_string()).collect() }
    }

    fn result(q: &str) -> CollectedResult {
        CollectedResult { query: q.into(), resp_id: "ws".into(), research_output: "out".into() }
    }

    fn planned_state() -> SessionState {
        let mut s = SessionState::default();
        s.set_topic("topic");
        s.set_questions(vec!["q1".into()], "resp_c".into());
        s.set_answers(vec!["a1".into()]);
        s.set_plan(plan(&["x", "y"]), "resp_p".into());
        s
    }

    #[test]
    fn same_topic_keeps_state() {
        let mut s = planned_state();
        assert!(!s.set_topic("topic"));
        assert!(s.plan.is_some());
        assert_eq!(s.questions, vec!["q1"]);
    }

    #[test]
    fn new_topic_discards_everything() {
        let mut s = planned_state();
        s.collected.push(result("x"));
        assert!(s.set_topic("other"));
        assert_eq!(s, SessionState { last_topic: Some("other".into()), ..SessionState::default() });
    }

    #[test]
    fn changed_answers_discard_plan_and_research() {
        let mut s = planned_state();
        s.research_started = true;
        s.rounds = 2;
        s.collected.push(result("x"));
        assert!(s.plan_is_current());

        s.set_answers(vec!["different".into()]);
        assert!(!s.plan_is_current());
        assert!(s.plan.is_none());
        assert!(s.plan_id.is_none());
        assert!(s.collected.is_empty());
        assert!(s.queries.is_empty());
        assert!(!s.research_started);
        assert_eq!(s.rounds, 0);
        assert_eq!(s.answers, vec!["different"]);
    }

    #[test]
    fn same_answers_keep_research() {
        let mut s = planned_state();
        s.collected.push(result("x"));
        s.set_answers(vec!["a1".into()]);
        assert!(s.plan_is_current());
        assert!(s.collected.contains("x"));
    }

    #[test]
    fn no_questions_is_never_complete() {
        let mut s = SessionState::default();
        s.set_answers(Vec::new());
        assert!(!s.answers_complete());
    }

    #[test]
    fn answers_complete_requires_alignment_and_content() {
        let mut s = SessionState::default();
        s.set_questions(vec!["q1".into(), "q2".into()], "c".into());
        s.set_answers(vec!["a".into()]);
        assert!(!s.answers_complete());
        s.set_answers(vec!["a".into(), "  ".into()]);
        assert!(!s.answers_complete());
        s.set_answers(vec!["a".into(), "b".into()]);
        assert!(s.answers_complete());
    }

    #[test]
    fn queries_to_run_uses_plan_until_something_is_collected() {
        let mut s = planned_state();
        s.queries = vec!["follow-up".into()];
        assert_eq!(s.queries_to_run(), vec!["x", "y"]);

        s.collected.push(result("x"));
        assert_eq!(s.queries_to_run(), vec!["follow-up"]);
    }

    #[test]
    fn finish_research_keeps_plan() {
        let mut s = planned_state();
        s.research_started = true;
        s.collected.push(result("x"));
        s.finish_research();
        assert!(!s.research_started);
        assert!(s.collected.is_empty());
        assert!(s.plan.is_some());
        assert_eq!(s.queries_to_run(), vec!["x", "y"]);
    }

    #[test]
    fn save_and_reopen_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        let mut session = store.open("alpha").unwrap();
        session.state = planned_state();
        session.state.collected.push(result("x"));
        session.save().unwrap();

        let reopened = store.open("alpha").unwrap();
        assert_eq!(reopened.state.plan, session.state.plan);
        assert!(reopened.state.collected.contains("x"));
        assert!(reopened.state.updated_at.is_some());
        // No temp files left behind.
        let entries: Vec<_> = fs::read_dir(dir.path().join("alpha")).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn reset_removes_state() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        let mut session = store.open("beta").unwrap();
        session.state.set_topic("t");
        session.save().unwrap();

        store.reset("beta").unwrap();
        assert_eq!(store.open("beta").unwrap().state, SessionState::default());
        // Resetting again is fine.
        store.reset("beta").unwrap();
    }

    #[test]
    fn invalid_ids_are_rejected() {
        let store = SessionStore::new("/tmp/unused");
        for id in ["", "../escape", "a/b", "sp ace"] {
            assert!(store.open(id).is_err(), "expected '{id}' to be rejected");
        }
    }

    #[test]
    fn malformed_state_errors() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("gamma")).unwrap();
        fs::write(dir.path().join("gamma").join(STATE_FILENAME), "{not json").unwrap();
        let err = SessionStore::new(dir.path()).open("gamma").unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }
}
