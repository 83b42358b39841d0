//! Session driver — runs the research conversation end to end.
//!
//! Sequence, with each artifact cached in the session until an earlier input
//! changes:
//!   1. Topic (blank → informational message, nothing sent)
//!   2. Clarifying questions (re-asked only for a new topic)
//!   3. Answers (always asked, stored value as default; any blank →
//!      informational message, stop)
//!   4. Plan (re-made only when answers change)
//!   5. Rounds: search pending queries → evaluate → report or more queries
//!
//! State is saved after every model call, so an interrupted run resumes where
//! it stopped.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::console::Console;
use crate::error::AppError;
use crate::report;
use crate::research::{Researcher, RoundOutcome, Topic};
use crate::session::Session;

pub const MSG_ENTER_TOPIC: &str = "Enter a research topic to begin.";
pub const MSG_ANSWER_ALL: &str = "Please answer all clarifying questions.";
pub const MSG_SATISFIED: &str = "Goal satisfied! Generating final report...";
pub const MSG_NEEDS_MORE: &str = "More research needed. New queries generated.";

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Topic from the command line; prompted for when `None`.
    pub topic: Option<String>,
    /// Chain the plan request to the clarifying-questions response.
    pub chain_plan_to_questions: bool,
    /// Start rounds without asking.
    pub auto_continue: bool,
    /// Rounds allowed in this run; `0` means unlimited.
    pub max_rounds: u32,
    pub report_dir: PathBuf,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Blank topic; nothing was sent to the model.
    NoTopic,
    /// Some clarifying question is unanswered.
    AwaitingAnswers,
    /// The user declined the next round or the round limit was hit.
    Paused { rounds: u32 },
    /// The model had no new queries to offer.
    Exhausted { rounds: u32 },
    /// The report was produced and saved.
    Report { path: PathBuf, report: String },
}

pub async fn run_session<C: Console>(
    researcher: &Researcher,
    session: &mut Session,
    console: &mut C,
    options: &RunOptions,
) -> Result<SessionOutcome, AppError> {
    // ── 1. Topic ─────────────────────────────────────────────────────────
    let raw_topic = match &options.topic {
        Some(t) => t.clone(),
        None => console.ask_topic(session.state.last_topic.as_deref())?,
    };
    let Some(topic) = Topic::parse(&raw_topic) else {
        console.info(MSG_ENTER_TOPIC);
        return Ok(SessionOutcome::NoTopic);
    };

    if session.state.set_topic(topic.as_str()) {
        info!(session = %session.id(), %topic, "new topic");
        session.save()?;
    }

    // ── 2. Clarifying questions ──────────────────────────────────────────
    if session.state.questions.is_empty() {
        console.start_task("Thinking of clarifying questions…");
        let clarification = researcher.clarifying_questions(&topic).await;
        console.finish_task();
        let clarification = clarification?;
        session.state.set_questions(clarification.questions, clarification.response_id);
        session.save()?;
    } else {
        debug!(count = session.state.questions.len(), "reusing clarifying questions");
    }

    // ── 3. Answers ───────────────────────────────────────────────────────
    // Always asked, with the stored answer as default; a changed answer
    // discards the plan and everything researched for it.
    let questions = session.state.questions.clone();
    let mut answers = Vec::with_capacity(questions.len());
    for (i, question) in questions.iter().enumerate() {
        let previous = session.state.answers.get(i).map(String::as_str);
        answers.push(console.ask_answer(i, question, previous)?.trim().to_string());
    }
    let had_plan = session.state.plan.is_some();
    session.state.set_answers(answers);
    if had_plan && session.state.plan.is_none() {
        info!(session = %session.id(), "answers changed; plan discarded");
    }
    session.save()?;
    if !session.state.answers_complete() {
        console.info(MSG_ANSWER_ALL);
        return Ok(SessionOutcome::AwaitingAnswers);
    }

    // ── 4. Plan ──────────────────────────────────────────────────────────
    if !session.state.plan_is_current() {
        let previous = if options.chain_plan_to_questions { session.state.clarify_id.clone() } else { None };
        console.start_task("Planning research…");
        let planned = researcher.plan(&topic, &session.state.answers, previous.as_deref()).await;
        console.finish_task();
        let planned = planned?;
        session.state.set_plan(planned.plan, planned.response_id);
        session.save()?;
    }
    let Some(plan) = session.state.plan.clone() else {
        return Err(AppError::Session("plan missing after planning step".into()));
    };
    console.show_plan(&plan);

    // ── 5. Rounds ────────────────────────────────────────────────────────
    let mut rounds_this_run = 0u32;
    loop {
        if options.max_rounds > 0 && rounds_this_run >= options.max_rounds {
            console.warn(&format!("Stopped after {rounds_this_run} round(s); run again to continue."));
            return Ok(SessionOutcome::Paused { rounds: rounds_this_run });
        }
        let round = session.state.rounds + 1;
        if !options.auto_continue && !console.confirm_round(round)? {
            info!(session = %session.id(), round, "research paused by user");
            return Ok(SessionOutcome::Paused { rounds: rounds_this_run });
        }

        let outcome = run_round(researcher, session, console, &plan.goal).await?;
        rounds_this_run += 1;

        match outcome {
            RoundOutcome::Report { report: body, searched } => {
                let now = chrono::Utc::now();
                let doc = report::render(topic.as_str(), &plan, &body, &searched, now);
                let path = report::write(&options.report_dir, session.id(), &doc, now)?;
                console.show_report(&body);
                console.success(&format!("Report saved to {}", path.display()));
                info!(session = %session.id(), path = %path.display(), "report written");
                return Ok(SessionOutcome::Report { path, report: body });
            }
            RoundOutcome::NeedsMore { new_queries } => {
                console.warn(MSG_NEEDS_MORE);
                for q in &new_queries {
                    console.info(&format!("next: {q}"));
                }
            }
            RoundOutcome::Exhausted => {
                console.warn("The model proposed no queries that have not been searched already.");
                return Ok(SessionOutcome::Exhausted { rounds: rounds_this_run });
            }
        }
    }
}

/// Search every pending query not collected yet, then evaluate.
///
/// Satisfied → synthesize and reset research state. Otherwise ask for more
/// queries and store them as pending.
pub async fn run_round<C: Console>(
    researcher: &Researcher,
    session: &mut Session,
    console: &mut C,
    goal: &str,
) -> Result<RoundOutcome, AppError> {
    session.state.research_started = true;
    session.state.rounds += 1;
    let queries = session.state.queries_to_run();
    session.state.queries = queries.clone();
    session.save()?;

    for query in &queries {
        if session.state.collected.contains(query) {
            debug!(%query, "already searched — skipped");
            continue;
        }
        console.start_task(&format!("Searching: {query}"));
        let result = researcher.run_search(query).await;
        console.finish_task();
        session.state.collected.push(result?);
        session.save()?;
    }

    console.start_task("Evaluating collected results…");
    let satisfied = researcher.evaluate(goal, &session.state.collected).await;
    console.finish_task();

    if satisfied? {
        console.success(MSG_SATISFIED);
        console.start_task("Writing report…");
        let report = researcher.synthesize(goal, &session.state.collected).await;
        console.finish_task();
        let report = report?;
        let searched = session.state.collected.queries();
        session.state.finish_research();
        session.save()?;
        return Ok(RoundOutcome::Report { report, searched });
    }

    console.start_task("Asking for more queries…");
    let previous = session.state.plan_id.clone();
    let new_queries = researcher.more_queries(&session.state.collected, previous.as_deref()).await;
    console.finish_task();
    let new_queries = new_queries?;

    let fresh = new_queries.iter().any(|q| !session.state.collected.contains(q));
    session.state.queries = new_queries.clone();
    session.save()?;

    if fresh {
        Ok(RoundOutcome::NeedsMore { new_queries })
    } else {
        warn!(session = %session.id(), "no unsearched follow-up queries");
        Ok(RoundOutcome::Exhausted)
    }
}
