use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reviewlens::cli::{ConfigFormat, OutputFormat};
use reviewlens::cli::commands::analyze::AnalyzeOptions;
use reviewlens::{Config, ConfigLoader, ModelOverrides};

#[derive(Parser)]
#[command(name = "reviewlens")]
#[command(version, about = "LLM sentiment analysis for customer reviews")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, default_value = "reviewlens.toml", help = "Project config file")]
    config: PathBuf,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a JSON file of reviews
    Analyze {
        #[arg(long, short, help = "JSON array of reviews")]
        input: PathBuf,
        #[arg(long, short, help = "Business name")]
        business: String,
        #[arg(long, help = "Total reviews in the account (defaults to the input count)")]
        total: Option<usize>,
        #[arg(long, help = "Model override")]
        model: Option<String>,
        #[arg(long, help = "Temperature override (0.0-2.0)")]
        temperature: Option<f32>,
        #[arg(long, help = "Max output tokens override")]
        max_tokens: Option<u32>,
        #[arg(long, help = "Request timeout override (ms)")]
        timeout_ms: Option<u64>,
        #[arg(long, default_value = "0", help = "Retries for retryable failures")]
        retries: usize,
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Estimate token usage and cost without calling the model
    Estimate {
        #[arg(long, short, help = "Number of reviews")]
        reviews: usize,
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Validate saved model output
    Validate {
        #[arg(long, short, help = "File with the raw model response")]
        input: PathBuf,
        #[arg(long, required_unless_present = "reviews", help = "Number of analyzed reviews")]
        review_count: Option<usize>,
        #[arg(long, help = "Reviews file; enables review id checks")]
        reviews: Option<PathBuf>,
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
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
        #[arg(short = 'f', long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
    /// Show configuration file paths
    Path,
    /// Write a default project configuration
    Init {
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
        eprintln!("\x1b[31mreviewlens encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }

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

    let load_config = || -> anyhow::Result<Config> { Ok(ConfigLoader::load_from(&cli.config)?) };

    match cli.command {
        Commands::Analyze {
            input,
            business,
            total,
            model,
            temperature,
            max_tokens,
            timeout_ms,
            retries,
            format,
        } => {
            let config = load_config()?;
            let options = AnalyzeOptions {
                input,
                business,
                total,
                overrides: ModelOverrides {
                    model,
                    temperature,
                    max_tokens,
                    timeout_ms,
                },
                retries,
                format,
            };
            let rt = Runtime::new()?;
            rt.block_on(reviewlens::cli::commands::analyze::run(&config, options))?;
        }
        Commands::Estimate { reviews, format } => {
            let config = load_config()?;
            reviewlens::cli::commands::estimate::run(&config, reviews, format)?;
        }
        Commands::Validate {
            input,
            review_count,
            reviews,
            format,
        } => {
            let accepted = reviewlens::cli::commands::validate::run(
                &input,
                review_count,
                reviews.as_deref(),
                format,
            )?;
            if !accepted {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                let config = load_config()?;
                reviewlens::cli::commands::config::show(&config, format)?;
            }
            ConfigAction::Path => {
                reviewlens::cli::commands::config::path(&cli.config)?;
            }
            ConfigAction::Init { force } => {
                reviewlens::cli::commands::config::init(&cli.config, force)?;
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}
