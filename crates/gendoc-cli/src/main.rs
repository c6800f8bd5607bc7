use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gendoc_core::{
    Build, Diagnostic, Event, EventWriter, GendocError, HtmlWriter, Position, RuleRegistry,
    Session, Toc, Writer,
};
use gendoc_renderer::PageTemplate;
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const INCOMPLETE: &str = "gendoc: there were errors during generation, your documentation is although saved, but probably is incomplete!";

#[derive(Parser)]
#[command(name = "gendoc", version)]
#[command(about = "Generates a single-file HTML documentation from gendoc markup")]
struct Cli {
    /// Output file; a `.json` extension writes the TOC and event stream instead of HTML
    output: PathBuf,
    /// Markup files, processed in order as if included one after another
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Directory with `hl_<lang>.json` highlight rule sets
    #[arg(long, env = "GENDOC_RULES")]
    rules: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = DiagnosticsMode::Pretty)]
    diagnostics: DiagnosticsMode,
    /// Log debug details to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DiagnosticsMode {
    Pretty,
    Json,
}

#[derive(Serialize)]
struct EventDump<'a> {
    toc: &'a Toc,
    events: &'a [Event],
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(&cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(errors) => {
            debug!(errors, "generation finished with errors");
            eprintln!("{INCOMPLETE}");
            ExitCode::from(1)
        }
        Err(err) => {
            eprintln!("gendoc: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Builds the documentation and returns the number of errors reported.
fn run(cli: &Cli) -> Result<usize> {
    let rules = match &cli.rules {
        Some(dir) => RuleRegistry::load_dir(dir).unwrap_or_else(|err| {
            warn!(%err, "continuing with generic highlight rules");
            RuleRegistry::new()
        }),
        None => RuleRegistry::new(),
    };
    let is_json = cli
        .output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let build = generate(cli, Session::new(EventWriter::new()).with_rules(rules))?;
        let dump = EventDump {
            toc: &build.toc,
            events: build.writer.events(),
        };
        let json = serde_json::to_string_pretty(&dump)?;
        save(cli, &json)?;
        emit_diagnostics(&build.diagnostics, cli.diagnostics)?;
        Ok(build.error_count())
    } else {
        let build = generate(cli, Session::new(HtmlWriter::new()).with_rules(rules))?;
        let mut diagnostics = build.diagnostics;
        let template = PageTemplate::load(&build.vars, &mut diagnostics);
        let html = template.render(&build.writer.finish(), &build.toc, build.welcome);
        save(cli, &html)?;
        emit_diagnostics(&diagnostics, cli.diagnostics)?;
        Ok(gendoc_core::error_count(&diagnostics))
    }
}

fn generate<W: Writer>(cli: &Cli, mut session: Session<W>) -> Result<Build<W>> {
    for input in &cli.inputs {
        debug!(input = %input.display(), "processing");
        session.include(input);
    }
    session.set_position(Position::new(cli.output.clone(), 0));
    match session.finish() {
        Ok(build) => Ok(build),
        Err(err) => {
            if let GendocError::EmptyToc { diagnostics } = &err {
                emit_diagnostics(diagnostics, cli.diagnostics)?;
            }
            Err(err.into())
        }
    }
}

fn save(cli: &Cli, contents: &str) -> Result<()> {
    fs::write(&cli.output, contents)
        .with_context(|| format!("unable to write {}", cli.output.display()))?;
    info!(output = %cli.output.display(), "documentation saved");
    Ok(())
}

fn emit_diagnostics(diagnostics: &[Diagnostic], mode: DiagnosticsMode) -> Result<()> {
    match mode {
        DiagnosticsMode::Pretty => {
            for diag in diagnostics {
                eprintln!("{diag}");
            }
        }
        DiagnosticsMode::Json => {
            eprintln!("{}", serde_json::to_string_pretty(diagnostics)?);
        }
    }
    Ok(())
}
