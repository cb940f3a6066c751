use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bankscope::cli::commands::classify::{ClassifyOptions, OutputFormat, Strategy};

#[derive(Parser)]
#[command(name = "bankscope")]
#[command(version, about = "Classify bank product pages into sector, product and details")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Config file (skips global/project/env resolution)")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify page text files (stdin when none given)
    Classify {
        #[arg(help = "Text files with extracted page content")]
        files: Vec<PathBuf>,
        #[arg(long, short, value_enum, default_value = "llm", help = "Classification strategy")]
        strategy: Strategy,
        #[arg(long, help = "Analyze the page first, then classify the analysis")]
        two_stage: bool,
        #[arg(long, help = "LLM provider (openai, ollama)")]
        provider: Option<String>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
        #[arg(long, help = "Keyword dictionary (.json/.yaml) for the heuristic strategy")]
        keywords: Option<PathBuf>,
        #[arg(short = 'f', long, value_enum, default_value = "text", help = "Output format")]
        format: OutputFormat,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mBankscope encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Classify {
            files,
            strategy,
            two_stage,
            provider,
            model,
            keywords,
            format,
        } => {
            let rt = Runtime::new()?;
            let failed = rt.block_on(bankscope::cli::commands::classify::run(ClassifyOptions {
                inputs: files,
                strategy,
                two_stage,
                provider,
                model,
                keywords,
                format,
                config_path: cli.config,
            }))?;
            if failed > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => {
                bankscope::cli::commands::config::show(global, &format)?;
            }
            ConfigAction::Path => {
                bankscope::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                bankscope::cli::commands::config::init(global, force)?;
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}
