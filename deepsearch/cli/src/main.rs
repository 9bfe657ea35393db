//! DeepSearch CLI - plan, search and write a research report for a topic

use clap::{Parser, ValueEnum};
use deepsearch_lib::export::{report_filename, save_report};
use deepsearch_lib::{DefaultAgent, ResearchError, WorkflowState};
use owo_colors::OwoColorize;
use std::io::{self, BufRead};
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "deepsearch")]
#[command(about = "Research a topic on the web and write a cited markdown report", long_about = None)]
struct Cli {
    /// The topic to research (use "-" to read from stdin)
    #[arg(value_name = "TOPIC")]
    topic: String,

    /// Save the report as report_<topic>.md in the current directory
    #[arg(long)]
    save: bool,

    /// Save the report to this path instead
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// How to print the result
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    log_verbosity: u8,

    /// Output logs as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Narrated steps followed by the report
    Text,
    /// The whole workflow state as pretty JSON
    Json,
}

fn read_topic_from_stdin() -> io::Result<String> {
    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Trimmed topic, or `None` when nothing usable was given.
fn normalize_topic(raw: &str) -> Option<String> {
    let topic = raw.trim();
    (!topic.is_empty()).then(|| topic.to_string())
}

/// Where the report should be written, if anywhere.
fn report_path(cli: &Cli, topic: &str) -> Option<PathBuf> {
    match (&cli.output, cli.save) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(PathBuf::from(report_filename(topic))),
        (None, false) => None,
    }
}

/// Initialize tracing subscriber based on verbosity and output format
fn init_tracing(verbose: u8, json: bool) {
    // RUST_LOG wins over -v flags; default keeps stderr to warnings only
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            // -v: step progress and per-query outcomes
            1 => "warn,deepsearch_lib=info".to_string(),
            2 => "info,deepsearch_lib=debug".to_string(),
            _ => "debug,deepsearch_lib=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(false)
                    .with_file(verbose >= 3)
                    .with_line_number(verbose >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

/// Post-run narration: keywords, document count, then the report.
fn narration(state: &WorkflowState) -> String {
    format!(
        "{} {}\n{} {} web documents\n\n{}\n\n{}",
        "Generated keywords:".bold(),
        state.plan.join(", "),
        "Extracted".bold(),
        state.content.len(),
        "=".repeat(60).dimmed(),
        state.final_report
    )
}

/// What gets printed to stdout for a finished run.
fn render_output(
    state: &WorkflowState,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(narration(state)),
        OutputFormat::Json => serde_json::to_string_pretty(state),
    }
}

async fn research(cli: &Cli, topic: &str) -> Result<(), ResearchError> {
    let agent = DefaultAgent::from_env()?;

    if cli.format == OutputFormat::Text {
        eprintln!("{} {}", "Researching".cyan().bold(), topic);
    }

    let state = agent.run(topic).await?;

    let output = render_output(&state, cli.format).map_err(io::Error::from)?;
    println!("{output}");

    if let Some(path) = report_path(cli, topic) {
        let saved = save_report(&path, &state.final_report).await?;
        eprintln!("{} {}", "Saved report to".green(), saved.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_verbosity, cli.json);

    let raw_topic = if cli.topic == "-" {
        match read_topic_from_stdin() {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Error reading from stdin: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        cli.topic.clone()
    };

    let Some(topic) = normalize_topic(&raw_topic) else {
        eprintln!("{}", "Please enter a topic first".yellow());
        std::process::exit(1);
    };

    if let Err(e) = research(&cli, &topic).await {
        eprintln!("{} {}", "Runtime Error:".red().bold(), e);
        if e.is_config() {
            eprintln!(
                "Check that GROQ_API_KEY and your search API key (TAVILY_API_KEY or BRAVE_API_KEY) are set, e.g. in a .env file."
            );
        }
        std::process::exit(1);
    }
}
