//! Planner CLI
//!
//! Usage:
//!   planner serve --port 8000
//!   planner form
//!   planner crew

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use project_planner::config::{LlmProvider, PlannerFileConfig};
use project_planner::crew::{Crew, CrewConfigs};
use project_planner::{form, llm, CrewRunner};

#[derive(Parser)]
#[command(name = "planner")]
#[command(about = "Multi-agent project planner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding agents.yaml and tasks.yaml (default: from .planner.toml or ./config)
    #[arg(long, env = "PLANNER_CONFIG_DIR", global = true)]
    config_dir: Option<PathBuf>,

    /// LLM base URL
    #[arg(long, env = "PLANNER_LLM_URL", global = true)]
    llm_url: Option<String>,

    /// Model to use
    #[arg(short = 'm', long, env = "PLANNER_MODEL", global = true)]
    model: Option<String>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    #[cfg(feature = "web")]
    Serve {
        /// Address to bind (default: from .planner.toml or 0.0.0.0)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (default: from .planner.toml or 8000)
        #[arg(long, short)]
        port: Option<u16>,
    },
    /// Fill in the project form interactively and print the plan
    Form,
    /// Show the crew's agents and tasks in execution order
    Crew,
}

/// Initialize tracing with the given verbosity level
///
/// - 0: warn (default)
/// - 1: info (-v)
/// - 2: debug (-vv)
/// - 3+: trace (-vvv)
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    // Allow RUST_LOG to override if set
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    project_planner::config::load_dotenv();

    let mut file_config = PlannerFileConfig::load()?;
    if let Some(url) = cli.llm_url {
        file_config.llm.base_url = Some(url);
    }
    if let Some(model) = cli.model {
        file_config.llm.model = model;
    }

    let config_dir = cli
        .config_dir
        .unwrap_or_else(|| file_config.crew.resolve_config_dir());
    let configs = CrewConfigs::load(&config_dir)
        .with_context(|| format!("Failed to load crew config from {}", config_dir.display()))?;
    let crew = Crew::assemble(&configs)?;

    match cli.command {
        #[cfg(feature = "web")]
        Commands::Serve { host, port } => {
            use project_planner::web::{self, AppState, WebConfig};

            let runner = build_runner(crew, &file_config)?;
            let config = WebConfig {
                host: host.unwrap_or(file_config.server.host),
                port: port.unwrap_or(file_config.server.port),
            };
            web::serve(config, AppState::new(runner)).await
        }
        Commands::Form => {
            let runner = build_runner(crew, &file_config)?;
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            form::run_form(runner.as_ref(), &mut stdin.lock(), &mut stdout).await?;
            Ok(())
        }
        Commands::Crew => {
            print_crew(&crew, &file_config);
            Ok(())
        }
    }
}

fn build_runner(crew: Crew, file_config: &PlannerFileConfig) -> Result<Arc<CrewRunner>> {
    let llm = llm::from_config(&file_config.llm)?;
    tracing::info!("Using {:?} model {}", file_config.llm.provider, llm.model());

    if file_config.llm.provider == LlmProvider::OpenAi && file_config.llm.api_key().is_none() {
        tracing::warn!(
            "{} is not set; LLM calls may be rejected",
            file_config.llm.api_key_env
        );
    }

    Ok(Arc::new(
        CrewRunner::new(crew, llm).with_reference_policy(file_config.crew.reference_policy),
    ))
}

fn print_crew(crew: &Crew, file_config: &PlannerFileConfig) {
    println!(
        "Crew ({:?} at {}, default model {}):\n",
        file_config.llm.provider,
        file_config.llm.base_url(),
        file_config.llm.model
    );

    for (i, task) in crew.tasks().iter().enumerate() {
        println!("  {}. [Task: {}] -> {}", i + 1, task.name(), task.agent.name);
        println!("     Agent role: {}", task.agent.role);
        if let Some(model) = &task.agent.llm {
            println!("     Model: {}", model);
        }
        println!("     Output: {:?}", task.output);
        println!("     Expected: {}", task.config.expected_output.trim());
    }
}
