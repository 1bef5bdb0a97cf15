//! lhpc - LHP template compiler
//!
//! Transpiles `<name>.lhp` into `<name>.c` and builds `<name>.exe`.
//! Details of every run go to the diagnostic log (LHP.log).
//! Returns non-zero on any failure.

use clap::error::ErrorKind;
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use lhp_compiler::{
    diagnostics::DEFAULT_LOG_FILE,
    naming::{output_base, source_path, template_path},
    toolchain, DiagnosticLog, Document, PipelineError, TranspileConfig, TranspilePipeline,
};

#[derive(Parser)]
#[command(name = "lhpc", version)]
#[command(about = "LHP Compiler - turns LHP templates into FastCGI programs")]
struct Cli {
    /// Template file, with or without the .lhp extension
    file: String,

    /// JSON file overriding tags, markers and emitted literals
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Diagnostic log, appended to on every run
    #[arg(short, long, default_value = DEFAULT_LOG_FILE)]
    log: PathBuf,

    /// Write the generated program but do not build it
    #[arg(long)]
    no_build: bool,

    /// Print the generated program to stdout instead of writing <name>.c
    #[arg(long)]
    emit_stdout: bool,

    /// Print a rejection as a JSON report on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return usage_error(e),
    };

    let mut log = match DiagnosticLog::open(&cli.log) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Error opening {}, please try again... ({})", cli.log.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &mut log) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            if let Err(e) = log.record(&message) {
                tracing::error!("could not write diagnostic log: {}", e);
            }
            if !cli.json {
                println!(
                    "There was an error processing this file. Please check {} for further details!",
                    log.path().display()
                );
            }
            ExitCode::FAILURE
        }
    }
}

/// Argument errors are recorded in the default log before exiting.
fn usage_error(error: clap::Error) -> ExitCode {
    if let Err(e) = error.print() {
        tracing::error!("could not print usage: {}", e);
    }
    if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        return ExitCode::SUCCESS;
    }

    let mut entries = vec!["Insufficient number of argument parameters supplied!"];
    if error.kind() == ErrorKind::MissingRequiredArgument {
        entries.push("No LHP file specified. Please specify the LHP file as an argument parameter.");
    }
    match DiagnosticLog::open(Path::new(DEFAULT_LOG_FILE)) {
        Ok(mut log) => {
            for entry in entries {
                if let Err(e) = log.record(entry) {
                    tracing::error!("could not write diagnostic log: {}", e);
                }
            }
        }
        Err(e) => tracing::error!("could not open {}: {}", DEFAULT_LOG_FILE, e),
    }
    println!("The program encountered an error. Please check {} for further details!", DEFAULT_LOG_FILE);
    ExitCode::FAILURE
}

fn run(cli: &Cli, log: &mut DiagnosticLog) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => TranspileConfig::from_file(path).map_err(|e| e.to_string())?,
        None => TranspileConfig::default(),
    };
    let pipeline = TranspilePipeline::new(config).map_err(|e| e.to_string())?;

    let input = template_path(&cli.file);
    let document = Document::read(&input).map_err(|e| e.to_string())?;

    let program = match pipeline.transpile(&document) {
        Ok(program) => program,
        Err(PipelineError::Rejected(rejection)) => {
            let file_name = input.display().to_string();
            log.record_rejection(&file_name, &rejection)
                .map_err(|e| e.to_string())?;
            if cli.json {
                let report = serde_json::to_string_pretty(&rejection)
                    .map_err(|e| format!("Error writing rejection report: {}", e))?;
                println!("{}", report);
            }
            return Err(format!("{} was rejected.", file_name));
        }
        Err(e) => return Err(e.to_string()),
    };

    if cli.emit_stdout {
        io::stdout()
            .write_all(&program.source)
            .map_err(|e| format!("Error writing to stdout: {}", e))?;
        return Ok(());
    }

    let base = output_base(&cli.file);
    let output = source_path(&base);
    fs::write(&output, &program.source)
        .map_err(|e| format!("Error opening {}, please try again... ({})", output.display(), e))?;

    log.record(&format!(
        "Transpiled {} -> {} (source sha256 {}, program sha256 {}).",
        input.display(),
        output.display(),
        program.source_hash,
        program.program_hash
    ))
    .map_err(|e| e.to_string())?;

    if cli.no_build {
        return Ok(());
    }

    toolchain::build(&base, log).map_err(|e| e.to_string())
}
