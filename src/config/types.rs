//! Public configuration types.
//!
//! These are the resolved, ready-to-use structs the rest of the crate consumes.
//! Raw TOML deserialization types live in `raw.rs`.

use std::path::PathBuf;

// ── LLM ──────────────────────────────────────────────────────────────────────

/// OpenAI Responses API configuration, populated from `[llm.openai]`.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full `/v1/responses` endpoint URL.
    pub api_base_url: String,
    /// Model used for planning, searching, evaluation and synthesis.
    pub model: String,
    /// Smaller model used for the clarifying questions.
    pub mini_model: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Instructions sent with every request that carries them.
    pub instructions: String,
    /// Hosted tool type used for web search requests.
    pub web_search_tool: String,
    /// Extra output fields requested on search calls.
    pub include: Vec<String>,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active. Only `"openai"` is buildable from config.
    pub provider: String,
    pub openai: OpenAiConfig,
}

// ── Research ─────────────────────────────────────────────────────────────────

/// Research loop configuration, populated from `[research]`.
#[derive(Debug, Clone)]
pub struct ResearchConfig {
    /// Upper bound on search rounds per run; `0` means unlimited.
    pub max_rounds: u32,
    /// Start every round without asking.
    pub auto_continue: bool,
    /// Where final reports are written (already expanded).
    pub report_dir: PathBuf,
    /// Optional directory of prompt template overrides.
    pub prompts_dir: Option<PathBuf>,
    /// Chain the planning request to the clarifying-questions response.
    pub chain_plan_to_questions: bool,
}

// ── Top level ────────────────────────────────────────────────────────────────

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for sessions and reports (already expanded, no `~`).
    pub work_dir: PathBuf,
    pub log_level: String,
    /// Optional log file; stderr when `None`.
    pub log_file: Option<PathBuf>,
    pub llm: LlmConfig,
    pub research: ResearchConfig,
    /// API key from `OPENAI_API_KEY` env var. Never sourced from TOML.
    pub openai_api_key: Option<String>,
}

impl Config {
    /// Directory holding one sub-directory per research session.
    pub fn sessions_dir(&self) -> PathBuf {
        self.work_dir.join("sessions")
    }
}
