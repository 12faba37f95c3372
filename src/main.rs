use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, Command};
use std::fs;
use std::io;
use std::path::Path;
use std::process::ExitCode;

use plox::runner::exit;
use plox::{ErrorStyle, Interpreter, RunOptions, StderrReporter};

fn main() -> ExitCode {
    init_tracing();

    let matches = match cli().try_get_matches() {
        Ok(matches) => matches,
        Err(error) => {
            let code = match error.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit::SUCCESS,
                _ => exit::USAGE,
            };
            if let Err(e) = error.print() {
                tracing::warn!("could not print usage error: {}", e);
            }
            return ExitCode::from(code);
        }
    };

    let options = RunOptions {
        print_ast: matches.get_flag("print-ast"),
    };
    let style = if matches.get_flag("rich-errors") {
        ErrorStyle::Rich
    } else {
        ErrorStyle::Plain
    };

    let code = match matches.get_one::<String>("script") {
        Some(path) if !matches.get_flag("interactive") => run_file(Path::new(path), options, style),
        _ => match plox::start_repl(options, style) {
            Ok(()) => exit::SUCCESS,
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                exit::IO_ERROR
            }
        },
    };

    ExitCode::from(code)
}

fn cli() -> Command {
    Command::new("plox")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tree-walking interpreter for a small Lox-style scripting language")
        .arg(
            Arg::new("script")
                .help("The script file to execute")
                .value_name("SCRIPT")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start the interactive prompt even when a script is given")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("print-ast")
                .long("print-ast")
                .help("Print each parsed statement as a parenthesized tree on stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("rich-errors")
                .long("rich-errors")
                .help("Render errors with source snippets instead of one-line messages")
                .action(ArgAction::SetTrue),
        )
}

fn run_file(path: &Path, options: RunOptions, style: ErrorStyle) -> u8 {
    let source = match read_source(path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("error: {:#}", error);
            return exit::IO_ERROR;
        }
    };

    let filename = path.to_string_lossy();
    let mut reporter = StderrReporter::new(&source, Some(&*filename), style);
    let mut interpreter = Interpreter::new();
    let status = plox::run(&source, &mut interpreter, options, &mut reporter);
    tracing::debug!(?status, path = %path.display(), "script finished");
    status.exit_code()
}

fn read_source(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(source) => Ok(source),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            anyhow::bail!("file not found: {}", path.display())
        }
        Err(error) => Err(error).with_context(|| format!("could not read '{}'", path.display())),
    }
}

/// Installs a stderr subscriber when `RUST_LOG` is set, e.g. `RUST_LOG=plox=debug`.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}
