//! Research steps: prompts, model calls and optimistic parsing of replies.
//!
//! ```text
//! topic → clarifying questions → answers → plan → search → evaluate
//!                                                   ↑          │ no
//!                                                   └─ more queries
//!                                                              │ yes
//!                                                          synthesize
//! ```

pub mod agent;
pub mod parse;
pub mod prompt;
pub mod types;

pub use agent::{Clarification, PlannedResearch, ResearchSettings, Researcher};
pub use types::{Collected, CollectedResult, Plan, RoundOutcome, Topic};
