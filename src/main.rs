// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;

use ipetrans::app_config::{Config, LogLevel, TranslationService};
use ipetrans::app_controller::{Controller, RunOptions};

/// CLI Wrapper for TranslationService to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationService {
    Automated,
    Dictionary,
    Null,
}

impl From<CliTranslationService> for TranslationService {
    fn from(cli_service: CliTranslationService) -> Self {
        match cli_service {
            CliTranslationService::Automated => TranslationService::Automated,
            CliTranslationService::Dictionary => TranslationService::Dictionary,
            CliTranslationService::Null => TranslationService::Null,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for ipetrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// ipetrans - batch translation of Ipe drawing documents
///
/// Decodes each document container into its XML payload, replaces
/// translatable text with placeholder tokens, translates the extracted
/// lines, substitutes the translations back and re-encodes the container.
#[derive(Parser, Debug)]
#[command(name = "ipetrans")]
#[command(version = "1.0.0")]
#[command(about = "Batch translation of Ipe drawing documents")]
#[command(long_about = "ipetrans runs each document through decode, extract, translate, restore
and encode, leaving every intermediate artifact in the working directory.

EXAMPLES:
    ipetrans                               # Process every container in the input directory
    ipetrans lecture01 lecture02           # Process only the named documents
    ipetrans --no-translate                # Round-trip without calling the backend
    ipetrans --reuse-downloads             # Skip fetching the course page
    ipetrans --service dictionary          # Use the offline glossaries
    ipetrans completions bash              # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Document names (container file stems); all containers when empty
    #[arg(value_name = "NAMES")]
    names: Vec<String>,

    /// Run the pipeline without translating, keeping the source text
    #[arg(short, long)]
    no_translate: bool,

    /// Use containers already downloaded instead of fetching the course page
    #[arg(short, long)]
    reuse_downloads: bool,

    /// Translation backend to use
    #[arg(short, long, value_enum)]
    service: Option<CliTranslationService>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} [{}] {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "ipetrans", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::from_file_or_default(&cli.config_path)?;
    if let Some(service) = cli.service {
        config.translation.service = service.into();
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    let options = RunOptions {
        names: cli.names,
        no_translate: cli.no_translate,
        reuse_downloads: cli.reuse_downloads,
    };
    let controller = Controller::with_config(config)?;
    let summary = controller.run(&options).await?;

    if summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
