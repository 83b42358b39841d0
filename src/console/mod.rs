//! User interaction seam.
//!
//! The session driver talks to the user only through [`Console`]. The
//! terminal implementation prompts on the controlling TTY; the scripted one
//! replays canned input and records everything shown, for tests.

mod scripted;
mod terminal;

pub use scripted::{ConsoleEvent, ScriptedConsole};
pub use terminal::TerminalConsole;

use crate::error::AppError;
use crate::research::Plan;

pub trait Console {
    /// Ask for the research topic. `previous` is offered as the default.
    fn ask_topic(&mut self, previous: Option<&str>) -> Result<String, AppError>;

    /// Ask clarifying question `index`. `previous` is offered as the default.
    fn ask_answer(&mut self, index: usize, question: &str, previous: Option<&str>) -> Result<String, AppError>;

    /// Ask whether to run research round `round` (1-based).
    fn confirm_round(&mut self, round: u32) -> Result<bool, AppError>;

    fn info(&mut self, message: &str);
    fn success(&mut self, message: &str);
    fn warn(&mut self, message: &str);

    fn show_plan(&mut self, plan: &Plan);
    fn show_report(&mut self, report: &str);

    /// Show a busy indicator until [`finish_task`](Console::finish_task).
    fn start_task(&mut self, label: &str);
    fn finish_task(&mut self);
}
