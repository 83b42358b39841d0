//! Deep Research — interactive research assistant entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI args
//!   3. Load config
//!   4. Resolve effective log level (CLI `-v` flags > env > config)
//!   5. Init logger once
//!   6. Build the model provider (fails without `OPENAI_API_KEY`)
//!   7. Open (or reset) the session
//!   8. Spawn Ctrl-C watcher
//!   9. Run the session on the terminal console

use tracing::info;

use deep_research::app::{self, RunOptions, SessionOutcome};
use deep_research::console::TerminalConsole;
use deep_research::error::AppError;
use deep_research::llm::providers;
use deep_research::research::{prompt::Prompts, ResearchSettings, Researcher};
use deep_research::session::SessionStore;
use deep_research::logger::{self, LogSettings};
use deep_research::config;

const DEFAULT_SESSION: &str = "default";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let mut config = config::load(args.config_path.as_deref())?;
    if args.yes {
        config.research.auto_continue = true;
    }

    let log = LogSettings::resolve(args.verbosity, &config.log_level, config.log_file.as_deref());
    logger::init(&log)?;

    info!(
        work_dir = %config.work_dir.display(),
        configured_log_level = %config.log_level,
        effective_log_level = %log.level,
        model = %config.llm.openai.model,
        session = %args.session,
        "config loaded"
    );

    let provider = providers::build(&config.llm, config.openai_api_key.clone())?;
    let researcher = Researcher::new(
        provider,
        ResearchSettings::from_config(&config),
        Prompts::new(config.research.prompts_dir.clone()),
    );

    let store = SessionStore::new(config.sessions_dir());
    if args.reset {
        store.reset(&args.session)?;
        info!(session = %args.session, "session state discarded");
    }
    let mut session = store.open(&args.session)?;

    // Ctrl-C — state is saved after every step, so exiting here loses at most
    // the call in flight. Runs on its own task because prompts block.
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\ninterrupted — session saved, run again to resume");
            std::process::exit(130);
        }
    });

    let mut console = TerminalConsole::new();
    console.banner(session.id(), &config.llm.openai.model);

    let options = RunOptions {
        topic: args.topic,
        chain_plan_to_questions: config.research.chain_plan_to_questions,
        auto_continue: config.research.auto_continue,
        max_rounds: config.research.max_rounds,
        report_dir: config.research.report_dir.clone(),
    };

    let outcome = app::run_session(&researcher, &mut session, &mut console, &options).await?;
    info!(session = %session.id(), outcome = %outcome_label(&outcome), "session finished");
    Ok(())
}

fn outcome_label(outcome: &SessionOutcome) -> &'static str {
    match outcome {
        SessionOutcome::NoTopic => "no-topic",
        SessionOutcome::AwaitingAnswers => "awaiting-answers",
        SessionOutcome::Paused { .. } => "paused",
        SessionOutcome::Exhausted { .. } => "exhausted",
        SessionOutcome::Report { .. } => "report",
    }
}

struct CliArgs {
    verbosity: u8,
    config_path: Option<String>,
    session: String,
    yes: bool,
    reset: bool,
    topic: Option<String>,
}

fn print_help() {
    println!("Usage: deep-research [OPTIONS] [TOPIC...]");
    println!();
    println!("Options:");
    println!("  -h, --help                 Print help");
    println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
    println!("  -s, --session <ID>         Session to create or resume (default: {DEFAULT_SESSION})");
    println!("  -y, --yes                  Run research rounds without asking");
    println!("      --reset                Discard stored session state before starting");
    println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
    println!();
    println!("Environment:");
    println!("  OPENAI_API_KEY             Model service API key (required; .env is read)");
    println!("  DEEP_RESEARCH_WORK_DIR     Overrides [app] work_dir");
    println!("  DEEP_RESEARCH_LOG_LEVEL    Overrides [app] log_level");
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;
    let mut session = DEFAULT_SESSION.to_string();
    let mut yes = false;
    let mut reset = false;
    let mut words: Vec<String> = Vec::new();

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            words.extend(iter.by_ref());
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-f" | "--config" => match iter.next() {
                Some(path) => config_path = Some(path),
                None => {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(1);
                }
            },
            "-s" | "--session" => match iter.next() {
                Some(id) => session = id,
                None => {
                    eprintln!("error: -s/--session requires an id argument");
                    std::process::exit(1);
                }
            },
            "-y" | "--yes" => yes = true,
            "--reset" => reset = true,
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            a if a.starts_with('-') && a.len() > 1 => {
                eprintln!("error: unknown option '{a}' (see --help)");
                std::process::exit(1);
            }
            _ => words.push(arg),
        }
    }

    let topic = if words.is_empty() { None } else { Some(words.join(" ")) };

    CliArgs { verbosity, config_path, session, yes, reset, topic }
}
