//! Console that replays canned input and records what it was asked to show.

use std::collections::VecDeque;

use crate::error::AppError;
use crate::research::Plan;

use super::Console;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    AskedTopic,
    AskedAnswer(usize),
    Confirm(u32),
    Info(String),
    Success(String),
    Warn(String),
    Plan(Plan),
    Report(String),
    Task(String),
}

/// Input is consumed front to back. An exhausted answer queue repeats the
/// offered default (as if the user pressed Enter); an exhausted confirm queue
/// answers "no".
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    topics: VecDeque<String>,
    answers: VecDeque<String>,
    confirms: VecDeque<bool>,
    pub events: Vec<ConsoleEvent>,
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topic(mut self, topic: &str) -> Self {
        self.topics.push_back(topic.to_string());
        self
    }

    pub fn answers<I, S>(mut self, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.answers.extend(answers.into_iter().map(Into::into));
        self
    }

    pub fn confirms<I>(mut self, confirms: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        self.confirms.extend(confirms);
        self
    }

    /// Messages of every info/success/warn event, in order.
    pub fn messages(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ConsoleEvent::Info(m) | ConsoleEvent::Success(m) | ConsoleEvent::Warn(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Labels of every busy indicator shown, in order.
    pub fn tasks(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ConsoleEvent::Task(label) => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Console for ScriptedConsole {
    fn ask_topic(&mut self, previous: Option<&str>) -> Result<String, AppError> {
        self.events.push(ConsoleEvent::AskedTopic);
        Ok(self
            .topics
            .pop_front()
            .or_else(|| previous.map(str::to_string))
            .unwrap_or_default())
    }

    fn ask_answer(&mut self, index: usize, _question: &str, previous: Option<&str>) -> Result<String, AppError> {
        self.events.push(ConsoleEvent::AskedAnswer(index));
        Ok(self
            .answers
            .pop_front()
            .or_else(|| previous.map(str::to_string))
            .unwrap_or_default())
    }

    fn confirm_round(&mut self, round: u32) -> Result<bool, AppError> {
        self.events.push(ConsoleEvent::Confirm(round));
        Ok(self.confirms.pop_front().unwrap_or(false))
    }

    fn info(&mut self, message: &str) {
        self.events.push(ConsoleEvent::Info(message.to_string()));
    }

    fn success(&mut self, message: &str) {
        self.events.push(ConsoleEvent::Success(message.to_string()));
    }

    fn warn(&mut self, message: &str) {
        self.events.push(ConsoleEvent::Warn(message.to_string()));
    }

    fn show_plan(&mut self, plan: &Plan) {
        self.events.push(ConsoleEvent::Plan(plan.clone()));
    }

    fn show_report(&mut self, report: &str) {
        self.events.push(ConsoleEvent::Report(report.to_string()));
    }

    fn start_task(&mut self, label: &str) {
        self.events.push(ConsoleEvent::Task(label.to_string()));
    }

    fn finish_task(&mut self) {}
}
