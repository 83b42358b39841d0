//! Interactive terminal console: `dialoguer` prompts, `console` styling and
//! an `indicatif` spinner for long model calls.

use std::time::Duration;

use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::AppError;
use crate::research::Plan;

use super::Console;

pub struct TerminalConsole {
    term: Term,
    theme: ColorfulTheme,
    spinner: Option<ProgressBar>,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self { term: Term::stdout(), theme: ColorfulTheme::default(), spinner: None }
    }

    /// Print the banner shown at startup.
    pub fn banner(&self, session_id: &str, model: &str) {
        let _ = self.term.write_line(&format!("{}", style("Deep Research").bold().cyan()));
        let _ = self.term.write_line(&format!(
            "{}",
            style(format!("AI-powered research assistant with web search · session={session_id} model={model}")).dim()
        ));
        let _ = self.term.write_line("");
    }

    fn line(&self, text: String) {
        // Output errors on a closed stdout are not worth failing a run over.
        let _ = self.term.write_line(&text);
    }

    fn input(&self, prompt: &str, previous: Option<&str>) -> Result<String, AppError> {
        let mut input = Input::<String>::with_theme(&self.theme).with_prompt(prompt).allow_empty(true);
        if let Some(prev) = previous.filter(|p| !p.is_empty()) {
            input = input.default(prev.to_string());
        }
        input
            .interact_text_on(&self.term)
            .map(|s| s.trim().to_string())
            .map_err(|e| AppError::Console(e.to_string()))
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TerminalConsole {
    fn ask_topic(&mut self, previous: Option<&str>) -> Result<String, AppError> {
        self.input("Research topic", previous)
    }

    fn ask_answer(&mut self, _index: usize, question: &str, previous: Option<&str>) -> Result<String, AppError> {
        self.input(question, previous)
    }

    fn confirm_round(&mut self, round: u32) -> Result<bool, AppError> {
        let prompt = if round == 1 { "Run research?".to_string() } else { format!("Run research round {round}?") };
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(true)
            .interact_on(&self.term)
            .map_err(|e| AppError::Console(e.to_string()))
    }

    fn info(&mut self, message: &str) {
        self.line(format!("{} {message}", style("ℹ").blue()));
    }

    fn success(&mut self, message: &str) {
        self.line(format!("{} {message}", style("✓").green()));
    }

    fn warn(&mut self, message: &str) {
        self.line(format!("{} {}", style("!").yellow().bold(), style(message).yellow()));
    }

    fn show_plan(&mut self, plan: &Plan) {
        self.line(format!("\n{}", style("Research Goal").bold().underlined()));
        self.line(plan.goal.clone());
        self.line(format!("\n{}", style("Initial Search Queries").bold().underlined()));
        for (i, q) in plan.queries.iter().enumerate() {
            self.line(format!("  {}. {q}", i + 1));
        }
        self.line(String::new());
    }

    fn show_report(&mut self, report: &str) {
        self.line(format!("\n{}\n", style("─".repeat(60)).dim()));
        self.line(report.to_string());
        self.line(format!("\n{}", style("─".repeat(60)).dim()));
    }

    fn start_task(&mut self, label: &str) {
        self.finish_task();
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(label.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(pb);
    }

    fn finish_task(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}
