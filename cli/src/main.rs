use clap::Parser;
use mathbox::{Engine, EngineOptions, ExecutionOptions, render_error};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// mathbox - evaluate one untrusted numeric function in a sandbox
#[derive(Parser, Debug)]
#[command(name = "mathbox")]
#[command(about = "Evaluate a single math function definition", long_about = None)]
struct Args {
    /// Read the function source from a file
    #[arg(long, value_name = "PATH", conflicts_with = "source")]
    file: Option<PathBuf>,

    /// Wall-clock limit in milliseconds (0 disables it)
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Maximum number of evaluation steps
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,

    /// Maximum source length in characters
    #[arg(long, value_name = "N")]
    max_len: Option<usize>,

    /// Print the parsed syntax tree (for debugging)
    #[arg(long)]
    debug_parse: bool,

    /// Function source (if not provided, reads --file or stdin)
    source: Option<String>,
}

impl Args {
    fn engine_options(&self) -> EngineOptions {
        let defaults = ExecutionOptions::default();
        EngineOptions {
            max_source_len: self
                .max_len
                .unwrap_or(EngineOptions::default().max_source_len),
            default_execution_options: ExecutionOptions {
                max_steps: self.max_steps.unwrap_or(defaults.max_steps),
                timeout: match self.timeout_ms {
                    Some(0) => None,
                    Some(ms) => Some(Duration::from_millis(ms)),
                    None => defaults.timeout,
                },
                ..defaults
            },
            ..EngineOptions::default()
        }
    }

    fn read_source(&self) -> Result<String> {
        if let Some(source) = &self.source {
            return Ok(source.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("reading {}", path.display()));
        }
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .into_diagnostic()
            .wrap_err("reading stdin")?;
        Ok(source)
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // Use RUST_LOG environment variable to control log level
    // Default to WARN if not set
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .into_diagnostic()?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let source = args.read_source()?;
    let engine = Engine::new(args.engine_options());

    if args.debug_parse {
        match engine.syntax_tree(&source) {
            Ok(tree) => {
                println!("=== Syntax Tree ===");
                println!("{}", tree);
                println!();
            }
            Err(e) => {
                render_error(&e, &source);
                return Ok(ExitCode::from(1));
            }
        }
    }

    match engine.evaluate(&source) {
        Ok(evaluation) => {
            println!("{}", evaluation);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::debug!(stage = %e.stage(), "Rejected");
            render_error(&e, &source);
            Ok(ExitCode::from(if e.is_policy_rejection() { 1 } else { 2 }))
        }
    }
}
