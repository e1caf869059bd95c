use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use serpscope::cli::commands;
use serpscope::cli::commands::coverage::CoverageFormat;
use serpscope::cli::ui::Output;
use serpscope::config::ConfigFormat;
use serpscope::types::SerpError;

#[derive(Parser)]
#[command(name = "serpscope")]
#[command(
    version,
    about = "Grounded keyword research and SEO content strategy"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full keyword analysis for a topic
    Analyze {
        #[arg(help = "Topic or seed keyword")]
        topic: String,
        #[arg(long, short, help = "Content language (default from config)")]
        language: Option<String>,
        #[arg(long, short, help = "Target search platform (default from config)")]
        platform: Option<String>,
        #[arg(long, short, help = "Write the JSON document to a file")]
        output: Option<PathBuf>,
    },

    /// Add new clusters to a saved analysis
    Expand {
        #[arg(help = "Saved analysis document (JSON)")]
        document: PathBuf,
        #[arg(long, short, help = "Topic the document was built for")]
        topic: String,
        #[arg(long, short, help = "Content language (default from config)")]
        language: Option<String>,
        #[arg(long, short, help = "Target search platform (default from config)")]
        platform: Option<String>,
        #[arg(long, short, help = "Write the merged document here instead of in place")]
        output: Option<PathBuf>,
    },

    /// Study the pages ranking for a keyword
    Competitors {
        #[arg(help = "Keyword to analyze")]
        keyword: String,
        #[arg(long, short, help = "Write the JSON result to a file")]
        output: Option<PathBuf>,
    },

    /// Score a draft against the keywords of a saved analysis
    Coverage {
        #[arg(help = "Saved analysis document (JSON)")]
        document: PathBuf,
        #[arg(help = "Draft content file")]
        content: PathBuf,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: CoverageFormat,
    },

    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Store an API key (use '-' to read it from stdin)
    Set {
        #[arg(help = "API key, or '-' for stdin")]
        key: String,
    },
    /// Remove the stored API key
    Clear,
    /// Show where the API key is resolved from
    Status,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: ConfigFormat,
    },
    /// Show configuration file paths
    Path,
    /// Initialize global configuration
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
        eprintln!("\x1b[31mSerpScope encountered an unexpected error:\x1b[0m");
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
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

/// Generation failures get the user-facing message plus the cause;
/// local failures (config, files) print as they are.
fn report_error(error: &anyhow::Error) {
    let output = Output::new();
    match error.downcast_ref::<SerpError>() {
        Some(err @ (SerpError::MissingCredentials | SerpError::RateLimited { .. })) => {
            output.error(err.user_message());
        }
        Some(
            err @ (SerpError::Upstream(_)
            | SerpError::EmptyResponse
            | SerpError::MalformedResponse { .. }),
        ) => {
            output.error(err.user_message());
            output.detail(&err.to_string());
        }
        _ => output.error(&format!("Error: {}", error)),
    }
}

fn run_cli() -> anyhow::Result<()> {
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
        Commands::Analyze {
            topic,
            language,
            platform,
            output,
        } => {
            commands::analyze::run(&topic, language, platform, output.as_deref())?;
        }
        Commands::Expand {
            document,
            topic,
            language,
            platform,
            output,
        } => {
            commands::expand::run(&document, &topic, language, platform, output.as_deref())?;
        }
        Commands::Competitors { keyword, output } => {
            commands::competitors::run(&keyword, output.as_deref())?;
        }
        Commands::Coverage {
            document,
            content,
            format,
        } => {
            commands::coverage::run(&document, &content, format)?;
        }
        Commands::Key { action } => match action {
            KeyAction::Set { key } => commands::key::set(&key)?,
            KeyAction::Clear => commands::key::clear()?,
            KeyAction::Status => commands::key::status()?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => commands::config::show(format)?,
            ConfigAction::Path => commands::config::path()?,
            ConfigAction::Init { force } => commands::config::init(force)?,
        },
    }

    Ok(())
}
