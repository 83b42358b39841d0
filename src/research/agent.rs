//! The researcher: one method per model call.
//!
//! Each method sends exactly one request and parses the reply optimistically.
//! Nothing here retries, and nothing here persists state — the session driver
//! in `app` owns sequencing and the session store.

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::llm::{LlmProvider, Message, ResponseInput, ResponseRequest};

use super::parse::{is_affirmative, parse_plan, parse_queries, split_questions, ParseError};
use super::prompt::{Prompts, Template};
use super::types::{Collected, CollectedResult, Plan, Topic};

/// Model names and request options shared by every call.
#[derive(Debug, Clone)]
pub struct ResearchSettings {
    pub model: String,
    pub mini_model: String,
    pub instructions: String,
    pub web_search_tool: String,
    pub include: Vec<String>,
}

impl ResearchSettings {
    pub fn from_config(config: &Config) -> Self {
        let oai = &config.llm.openai;
        Self {
            model: oai.model.clone(),
            mini_model: oai.mini_model.clone(),
            instructions: oai.instructions.clone(),
            web_search_tool: oai.web_search_tool.clone(),
            include: oai.include.clone(),
        }
    }
}

/// Clarifying questions and the id of the response that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clarification {
    pub questions: Vec<String>,
    pub response_id: String,
}

/// A parsed plan and the id of the response that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedResearch {
    pub plan: Plan,
    pub response_id: String,
}

pub struct Researcher {
    provider: LlmProvider,
    settings: ResearchSettings,
    prompts: Prompts,
}

impl Researcher {
    pub fn new(provider: LlmProvider, settings: ResearchSettings, prompts: Prompts) -> Self {
        Self { provider, settings, prompts }
    }

    pub async fn clarifying_questions(&self, topic: &Topic) -> Result<Clarification, AppError> {
        let prompt = self.prompts.render(Template::Clarify, &[("topic", topic.as_str())]);
        let request = ResponseRequest::new(&self.settings.mini_model, ResponseInput::Text(prompt))
            .instructions(&self.settings.instructions);

        let response = self.provider.respond(&request).await?;
        let questions = split_questions(response.require_text()?);
        if questions.is_empty() {
            return Err(ParseError::NoQuestions.into());
        }
        info!(%topic, count = questions.len(), "clarifying questions received");
        Ok(Clarification { questions, response_id: response.id })
    }

    /// Ask for the goal sentence and initial queries.
    ///
    /// `previous_response_id` chains the request to the clarifying call so the
    /// model sees which questions the answers belong to.
    pub async fn plan(
        &self,
        topic: &Topic,
        answers: &[String],
        previous_response_id: Option<&str>,
    ) -> Result<PlannedResearch, AppError> {
        let answers_json = serde_json::to_string(answers).unwrap_or_else(|_| "[]".to_string());
        let prompt = self.prompts.render(
            Template::Plan,
            &[("answers", answers_json.as_str()), ("topic", topic.as_str())],
        );
        let request = ResponseRequest::new(&self.settings.model, ResponseInput::Text(prompt))
            .previous_response_id(previous_response_id)
            .instructions(&self.settings.instructions);

        let response = self.provider.respond(&request).await?;
        let plan = parse_plan(response.require_text()?)?;
        info!(goal = %plan.goal, queries = plan.queries.len(), "research plan ready");
        Ok(PlannedResearch { plan, response_id: response.id })
    }

    pub async fn run_search(&self, query: &str) -> Result<CollectedResult, AppError> {
        let prompt = self.prompts.render(Template::Search, &[("query", query)]);
        let request = ResponseRequest::new(&self.settings.model, ResponseInput::Text(prompt))
            .tool(&self.settings.web_search_tool)
            .include(self.settings.include.iter().cloned());

        let response = self.provider.respond(&request).await?;
        if let Some(status) = response.search_status().filter(|s| *s != "completed") {
            warn!(%query, %status, "web search did not complete; keeping model text");
        }
        let research_output = response.require_text()?.to_string();
        let resp_id = response.search_call_id().unwrap_or(response.id.as_str()).to_string();
        debug!(%query, %resp_id, output_len = research_output.len(), "search finished");
        Ok(CollectedResult { query: query.to_string(), resp_id, research_output })
    }

    /// `true` when the model's reply contains "yes".
    pub async fn evaluate(&self, goal: &str, collected: &Collected) -> Result<bool, AppError> {
        let question = self.prompts.render(Template::Evaluate, &[("goal", goal)]);
        let request = ResponseRequest::new(
            &self.settings.model,
            ResponseInput::Messages(vec![
                Message::developer(format!("Research goal: {goal}")),
                Message::assistant(collected.to_json()),
                Message::user(question),
            ]),
        )
        .instructions(&self.settings.instructions);

        let response = self.provider.respond(&request).await?;
        let verdict = response.require_text()?;
        let satisfied = is_affirmative(verdict);
        info!(results = collected.len(), satisfied, verdict = %verdict.trim(), "goal evaluated");
        Ok(satisfied)
    }

    pub async fn synthesize(&self, goal: &str, collected: &Collected) -> Result<String, AppError> {
        let instruction = self.prompts.render(Template::Synthesize, &[("goal", goal)]);
        let request = ResponseRequest::new(
            &self.settings.model,
            ResponseInput::Messages(vec![
                Message::developer(instruction),
                Message::assistant(collected.to_json()),
            ]),
        )
        .instructions(&self.settings.instructions);

        let response = self.provider.respond(&request).await?;
        let report = response.require_text()?.to_string();
        info!(results = collected.len(), report_len = report.len(), "report synthesized");
        Ok(report)
    }

    /// Ask for follow-up queries, chained to the planning response.
    pub async fn more_queries(
        &self,
        collected: &Collected,
        previous_response_id: Option<&str>,
    ) -> Result<Vec<String>, AppError> {
        let ask = self.prompts.render(Template::MoreQueries, &[]);
        let request = ResponseRequest::new(
            &self.settings.model,
            ResponseInput::Messages(vec![
                Message::assistant(format!("Current data: {}", collected.to_json())),
                Message::user(ask),
            ]),
        )
        .previous_response_id(previous_response_id);

        let response = self.provider.respond(&request).await?;
        let queries = parse_queries(response.require_text()?)?;
        info!(count = queries.len(), "follow-up queries received");
        Ok(queries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::scripted::ScriptedProvider;
    use crate::llm::{ModelResponse, Role};

    fn researcher(replies: Vec<ModelResponse>) -> (Researcher, ScriptedProvider) {
        let provider = ScriptedProvider::new(replies);
        let settings = ResearchSettings {
            model: "big".into(),
            mini_model: "mini".into(),
            instructions: "You are a deep researcher".into(),
            web_search_tool: "web_search".into(),
            include: vec!["web_search_call.results".into()],
        };
        let r = Researcher::new(LlmProvider::Scripted(provider.clone()), settings, Prompts::default());
        (r, provider)
    }

    fn collected_one() -> Collected {
        let mut c = Collected::default();
        c.push(CollectedResult { query: "q".into(), resp_id: "ws".into(), research_output: "found".into() });
        c
    }

    #[tokio::test]
    async fn clarify_uses_mini_model_and_instructions() {
        let (r, p) = researcher(vec![ModelResponse::text("resp_c", "1. Why?\n2. Who?\n")]);
        let topic = Topic::parse("tidal power").unwrap();
        let c = r.clarifying_questions(&topic).await.unwrap();

        assert_eq!(c.questions, vec!["1. Why?", "2. Who?"]);
        assert_eq!(c.response_id, "resp_c");
        let requests = p.requests();
        let req = &requests[0];
        assert_eq!(req.model, "mini");
        assert_eq!(req.instructions.as_deref(), Some("You are a deep researcher"));
        assert!(req.tools.is_empty());
    }

    #[tokio::test]
    async fn blank_clarify_reply_is_error() {
        let (r, _) = researcher(vec![ModelResponse::text("resp_c", "\n  \n")]);
        let topic = Topic::parse("tidal power").unwrap();
        let err = r.clarifying_questions(&topic).await.unwrap_err();
        assert!(matches!(err, AppError::Parse(ParseError::NoQuestions)));
    }

    #[tokio::test]
    async fn plan_chains_and_parses() {
        let (r, p) = researcher(vec![ModelResponse::text(
            "resp_p",
            r#"{"goal": "Assess tidal power", "queries": ["tidal cost", "tidal sites"]}"#,
        )]);
        let topic = Topic::parse("tidal power").unwrap();
        let planned = r
            .plan(&topic, &["engineers".to_string(), "europe".to_string()], Some("resp_c"))
            .await
            .unwrap();

        assert_eq!(planned.plan.goal, "Assess tidal power");
        assert_eq!(planned.response_id, "resp_p");
        let requests = p.requests();
        let req = &requests[0];
        assert_eq!(req.previous_response_id.as_deref(), Some("resp_c"));
        match &req.input {
            ResponseInput::Text(t) => assert!(t.contains(r#"["engineers","europe"]"#)),
            other => panic!("unexpected input {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_plan_is_parse_error() {
        let (r, _) = researcher(vec![ModelResponse::text("resp_p", "Here you go: goal is X")]);
        let topic = Topic::parse("t").unwrap();
        let err = r.plan(&topic, &[], None).await.unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[tokio::test]
    async fn search_enables_tool_and_records_call_id() {
        let (r, p) = researcher(vec![ModelResponse::search("resp_s", "ws_7", "Findings [1]")]);
        let result = r.run_search("tidal cost").await.unwrap();

        assert_eq!(result.query, "tidal cost");
        assert_eq!(result.resp_id, "ws_7");
        assert_eq!(result.research_output, "Findings [1]");
        let requests = p.requests();
        let req = &requests[0];
        assert_eq!(req.input, ResponseInput::Text("Search: tidal cost".into()));
        assert_eq!(req.tools[0].kind, "web_search");
        assert_eq!(req.include, vec!["web_search_call.results".to_string()]);
        assert!(req.instructions.is_none());
    }

    #[tokio::test]
    async fn evaluate_sends_goal_data_and_question() {
        let (r, p) = researcher(vec![ModelResponse::text("resp_e", "Yes.")]);
        assert!(r.evaluate("the goal", &collected_one()).await.unwrap());

        let requests = p.requests();
        let ResponseInput::Messages(msgs) = &requests[0].input else { panic!("expected messages") };
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[0], Message::developer("Research goal: the goal"));
        assert_eq!(msgs[1].role, Role::Assistant);
        assert!(msgs[1].content.contains("\"research_output\":\"found\""));
        assert_eq!(msgs[2].role, Role::User);
    }

    #[tokio::test]
    async fn evaluate_no_is_false() {
        let (r, _) = researcher(vec![ModelResponse::text("resp_e", "No")]);
        assert!(!r.evaluate("g", &collected_one()).await.unwrap());
    }

    #[tokio::test]
    async fn synthesize_asks_for_citations() {
        let (r, p) = researcher(vec![ModelResponse::text("resp_f", "Report [1]\n\n[1] https://x")]);
        let report = r.synthesize("g", &collected_one()).await.unwrap();
        assert!(report.starts_with("Report"));

        let requests = p.requests();
        let ResponseInput::Messages(msgs) = &requests[0].input else { panic!("expected messages") };
        assert_eq!(msgs[0].role, Role::Developer);
        assert!(msgs[0].content.contains("meets the goal: g."));
        assert!(msgs[0].content.contains("[n]"));
    }

    #[tokio::test]
    async fn more_queries_chain_to_plan_without_instructions() {
        let (r, p) = researcher(vec![ModelResponse::text("resp_m", r#"["a", "b"]"#)]);
        let q = r.more_queries(&collected_one(), Some("resp_p")).await.unwrap();
        assert_eq!(q, vec!["a", "b"]);

        let requests = p.requests();
        let req = &requests[0];
        assert_eq!(req.previous_response_id.as_deref(), Some("resp_p"));
        assert!(req.instructions.is_none());
        let ResponseInput::Messages(msgs) = &req.input else { panic!("expected messages") };
        assert!(msgs[0].content.starts_with("Current data: ["));
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let (r, _) = researcher(vec![]);
        let err = r.run_search("q").await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
