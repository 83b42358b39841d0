//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults, so an
//! empty document resolves to a complete configuration.
//! The `load` module converts them into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

/// Raw TOML shape — serde target before resolution.
#[derive(Deserialize, Default)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub app: RawApp,
    #[serde(default)]
    pub llm: RawLlm,
    #[serde(default)]
    pub research: RawResearch,
}

#[derive(Deserialize)]
pub(super) struct RawApp {
    #[serde(default = "default_work_dir")]
    pub work_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_file: Option<String>,
}

impl Default for RawApp {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

// ── LLM ──────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawLlm {
    /// `default = "..."` in `[llm]`; `provider = "..."` is accepted too.
    #[serde(rename = "default", alias = "provider", default = "default_llm_provider")]
    pub provider: String,
    #[serde(default)]
    pub openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
pub(super) struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_mini_model")]
    pub mini_model: String,
    #[serde(default = "default_openai_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_instructions")]
    pub instructions: String,
    #[serde(default = "default_web_search_tool")]
    pub web_search_tool: String,
    #[serde(default = "default_include")]
    pub include: Vec<String>,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            mini_model: default_openai_mini_model(),
            timeout_seconds: default_openai_timeout_seconds(),
            instructions: default_instructions(),
            web_search_tool: default_web_search_tool(),
            include: default_include(),
        }
    }
}

// ── Research ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawResearch {
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    #[serde(default = "default_false")]
    pub auto_continue: bool,
    #[serde(default)]
    pub report_dir: Option<String>,
    #[serde(default)]
    pub prompts_dir: Option<String>,
    /// Off by default: the plan request is sent unchained.
    #[serde(default)]
    pub chain_plan_to_questions: bool,
}

impl Default for RawResearch {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            auto_continue: false,
            report_dir: None,
            prompts_dir: None,
            chain_plan_to_questions: false,
        }
    }
}

// ── Defaults ─────────────────────────────────────────────────────────────────

pub(super) fn default_work_dir() -> String { "~/.deep-research".to_string() }
pub(super) fn default_log_level() -> String { "warn".to_string() }
fn default_llm_provider() -> String { "openai".to_string() }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/responses".to_string() }
fn default_openai_model() -> String { "gpt-4.1".to_string() }
fn default_openai_mini_model() -> String { "gpt-4.1-mini".to_string() }
fn default_openai_timeout_seconds() -> u64 { 180 }
fn default_instructions() -> String { "You are a deep researcher".to_string() }
fn default_web_search_tool() -> String { "web_search".to_string() }
fn default_include() -> Vec<String> { vec!["web_search_call.results".to_string()] }
fn default_max_rounds() -> u32 { 0 }

fn default_false() -> bool {
    false
}
