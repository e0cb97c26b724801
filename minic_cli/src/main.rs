use clap::{Parser, ValueEnum};
use minic_compiler::config::{
    build_info, ConfigError, LogLevel, OutputFormat, RuntimeConfig, TriviaMode,
};
use minic_compiler::driver::{self, DriverError, DumpSummary};
use minic_compiler::lexical::{self, Scanner};
use minic_compiler::logging::{self, codes, Code, LogEvent};
use std::error::Error;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "minic-lex")]
#[command(about = "Dump the token stream of a minic source file", long_about = None)]
#[command(version = build_info::version())]
struct Cli {
    /// Source file to scan
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Destination file (defaults to stdout)
    #[arg(short, long, value_name = "DEST")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Append the start position of each token
    #[arg(long)]
    positions: bool,

    /// Comment and whitespace skipping policy
    #[arg(long, value_enum)]
    trivia: Option<TriviaArg>,

    /// Exit with failure when the source contains illegal tokens
    #[arg(long)]
    fail_on_illegal: bool,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Minimum log level
    #[arg(long, value_enum)]
    log_level: Option<LevelArg>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TriviaArg {
    Strict,
    Compatible,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LevelArg {
    Error,
    Warning,
    Info,
    Debug,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

impl From<TriviaArg> for TriviaMode {
    fn from(arg: TriviaArg) -> Self {
        match arg {
            TriviaArg::Strict => TriviaMode::Strict,
            TriviaArg::Compatible => TriviaMode::Compatible,
        }
    }
}

impl From<LevelArg> for LogLevel {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Error => LogLevel::Error,
            LevelArg::Warning => LogLevel::Warning,
            LevelArg::Info => LogLevel::Info,
            LevelArg::Debug => LogLevel::Debug,
        }
    }
}

/// Configuration file first, then command-line overrides
fn resolve_config(cli: &Cli) -> Result<RuntimeConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::from_toml_file(path)?,
        None => RuntimeConfig::default(),
    };

    if let Some(format) = cli.format {
        config.driver.output_format = format.into();
    }
    if cli.positions {
        config.driver.include_positions = true;
    }
    if cli.fail_on_illegal {
        config.driver.fail_on_illegal = true;
    }
    if let Some(trivia) = cli.trivia {
        config.scanner.trivia_mode = trivia.into();
    }
    if let Some(level) = cli.log_level {
        config.logging.min_log_level = level.into();
    }
    if cli.json_logs {
        config.logging.use_structured_logging = true;
    }

    Ok(config)
}

/// Logging problems are reported and the dump goes ahead without it
fn init_logging(config: &RuntimeConfig) {
    let initialized = logging::config::init_runtime_preferences(config.logging.clone())
        .and_then(|()| logging::init_global_logging())
        .and_then(|()| lexical::init_lexical_analysis_logging());

    if let Err(message) = initialized {
        logging::safe_log_error(codes::system::INITIALIZATION_FAILURE, &message);
    }
}

fn run(cli: &Cli) -> Result<DumpSummary, Box<dyn Error>> {
    let config = resolve_config(cli)?;
    init_logging(&config);

    let summary = match &cli.output {
        Some(destination) => driver::dump_file_with_preferences(
            &cli.source,
            destination,
            &config.driver,
            config.scanner.clone(),
        )?,
        None => logging::with_file_context(cli.source.clone(), || -> Result<_, DriverError> {
            let mut scanner =
                Scanner::open_with_preferences(&cli.source, config.scanner.clone())
                    .map_err(DriverError::from)?;
            let stdout = io::stdout();
            let result = driver::dump_to_writer(
                &mut scanner,
                BufWriter::new(stdout.lock()),
                &config.driver,
            );
            scanner.close();
            result
        })?,
    };

    Ok(summary)
}

fn failure_code(error: &(dyn Error + 'static)) -> Code {
    if let Some(driver) = error.downcast_ref::<DriverError>() {
        driver.error_code()
    } else if let Some(config) = error.downcast_ref::<ConfigError>() {
        config.error_code()
    } else {
        codes::system::INTERNAL_ERROR
    }
}

/// Final failure report with the registry's description and recommended action
fn failure_report(error: &(dyn Error + 'static)) -> String {
    LogEvent::error(failure_code(error), &error.to_string()).format_detailed()
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", failure_report(e.as_ref()));
            ExitCode::FAILURE
        }
    }
}
