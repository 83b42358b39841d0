//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (built-in defaults when it is absent), then applies `DEEP_RESEARCH_WORK_DIR`
//! and `DEEP_RESEARCH_LOG_LEVEL` env overrides. The API key is read from
//! `OPENAI_API_KEY` only.
//!
//! # Module layout
//!
//! - **types** — Public configuration structs (`Config`, `LlmConfig`,
//!   `ResearchConfig`, …).
//! - **raw** — Raw TOML deserialization types. These mirror the file shape
//!   and use serde defaults; kept private.
//! - **load** — Loading logic: `merge_toml`, `load_raw_merged`, `load`,
//!   `load_from`, `expand_home`.

mod load;
mod raw;
mod types;

pub use load::{expand_home, load, load_from, API_KEY_ENV};
pub use types::*;

impl Config {
    /// Safe `Config` for tests — no API key, everything under `work_dir`.
    pub fn test_default(work_dir: &std::path::Path) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
            log_level: "info".into(),
            log_file: None,
            llm: LlmConfig {
                provider: "scripted".into(),
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/responses".into(),
                    model: "test-model".into(),
                    mini_model: "test-mini".into(),
                    timeout_seconds: 1,
                    instructions: "You are a deep researcher".into(),
                    web_search_tool: "web_search".into(),
                    include: vec!["web_search_call.results".into()],
                },
            },
            research: ResearchConfig {
                max_rounds: 0,
                auto_continue: true,
                report_dir: work_dir.join("reports"),
                prompts_dir: None,
                chain_plan_to_questions: true,
            },
            openai_api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::{NamedTempFile, TempDir};

    const MINIMAL_TOML: &str = r#"
[app]
work_dir = "~/.deep-research"
log_level = "info"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_basic_config() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.work_dir.ends_with(".deep-research"));
    }

    #[test]
    fn empty_file_uses_default_models() {
        let f = write_toml("");
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.llm.openai.model, "gpt-4.1");
        assert_eq!(cfg.llm.openai.mini_model, "gpt-4.1-mini");
        assert_eq!(cfg.llm.openai.instructions, "You are a deep researcher");
        assert_eq!(cfg.llm.openai.web_search_tool, "web_search");
        assert_eq!(cfg.llm.openai.include, vec!["web_search_call.results".to_string()]);
        assert_eq!(cfg.research.max_rounds, 0);
        assert!(!cfg.research.auto_continue);
        assert!(!cfg.research.chain_plan_to_questions);
    }

    #[test]
    fn provider_key_is_accepted_for_llm_default() {
        let f = write_toml("[llm]\nprovider = \"scripted\"\n");
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.llm.provider, "scripted");

        let f = write_toml("[llm]\ndefault = \"openai\"\n[research]\nchain_plan_to_questions = true\n");
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.llm.provider, "openai");
        assert!(cfg.research.chain_plan_to_questions);
    }

    #[test]
    fn report_dir_defaults_under_work_dir() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), Some("/tmp/dr-test"), None).unwrap();
        assert_eq!(cfg.research.report_dir, PathBuf::from("/tmp/dr-test/reports"));
        assert_eq!(cfg.sessions_dir(), PathBuf::from("/tmp/dr-test/sessions"));
    }

    #[test]
    fn relative_report_dir_resolves_against_work_dir() {
        let f = write_toml(
            r#"
[app]
work_dir = "/srv/research"

[research]
report_dir = "out"
max_rounds = 3
auto_continue = true
"#,
        );
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.research.report_dir, PathBuf::from("/srv/research/out"));
        assert_eq!(cfg.research.max_rounds, 3);
        assert!(cfg.research.auto_continue);
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let f = write_toml("[llm.openai]\ntimeout_seconds = 0\n");
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.llm.openai.timeout_seconds, 1);
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/.deep-research");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with(".deep-research"));
    }

    #[test]
    fn absolute_path_unchanged() {
        assert_eq!(expand_home("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn relative_path_unchanged() {
        assert_eq!(expand_home("relative/path"), PathBuf::from("relative/path"));
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/config.toml"), None, None);
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    #[test]
    fn malformed_toml_errors() {
        let f = write_toml("[app\nwork_dir = ");
        let msg = load_from(f.path(), None, None).unwrap_err().to_string();
        assert!(msg.contains("parse error"));
    }

    #[test]
    fn env_overrides_apply() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), Some("/tmp/test-override"), Some("debug")).unwrap();
        assert_eq!(cfg.work_dir, PathBuf::from("/tmp/test-override"));
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn base_chain_merges_tables() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("base.toml"),
            "[llm.openai]\nmodel = \"base-model\"\nmini_model = \"base-mini\"\n",
        )
        .unwrap();
        let overlay = dir.path().join("overlay.toml");
        std::fs::write(
            &overlay,
            "[meta]\nbase = \"base.toml\"\n\n[llm.openai]\nmodel = \"overlay-model\"\n",
        )
        .unwrap();

        let cfg = load_from(&overlay, None, None).unwrap();
        assert_eq!(cfg.llm.openai.model, "overlay-model");
        assert_eq!(cfg.llm.openai.mini_model, "base-mini");
    }

    #[test]
    fn circular_base_errors() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.toml"), "[meta]\nbase = \"b.toml\"\n").unwrap();
        std::fs::write(dir.path().join("b.toml"), "[meta]\nbase = \"a.toml\"\n").unwrap();

        let msg = load_from(&dir.path().join("a.toml"), None, None)
            .unwrap_err()
            .to_string();
        assert!(msg.contains("circular"));
    }
}
