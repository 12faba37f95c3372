use crate::ast::{Expr, Stmt};
use crate::error::{ErrorStyle, Reporter, StderrReporter};
use crate::interpreter::Interpreter;
use crate::runner::{parse_source, RunOptions, RunStatus, StatusTracker};
use std::io::{self, Write};

/// Interactive prompt. Bindings persist between lines; errors never end the session.
pub fn start(options: RunOptions, style: ErrorStyle) -> io::Result<()> {
    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            // EOF reached (Ctrl+D or piped input ended)
            println!();
            return Ok(());
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            return Ok(());
        }

        let mut reporter = StderrReporter::new(line, None, style);
        let status = run_line(line, &mut interpreter, options, &mut reporter);
        tracing::debug!(?status, "prompt line finished");
    }
}

/// Runs one prompt line. A line holding a single bare expression (other than
/// an assignment) has its value echoed back.
pub fn run_line<W: Write>(
    source: &str,
    interpreter: &mut Interpreter<W>,
    options: RunOptions,
    reporter: &mut dyn Reporter,
) -> RunStatus {
    let mut tracker = StatusTracker::new(reporter);

    let statements = parse_source(source, options, &mut tracker);
    if tracker.had_error() {
        return tracker.status();
    }

    if let [Stmt::Expression { expr }] = statements.as_slice() {
        if !matches!(expr, Expr::Assign { .. }) {
            match interpreter.evaluate(expr) {
                Ok(value) => {
                    if let Err(e) = writeln!(interpreter.output_mut(), "{}", value) {
                        tracing::warn!("could not echo value: {}", e);
                    }
                }
                Err(error) => tracker.runtime_error(&error),
            }
            return tracker.status();
        }
    }

    interpreter.interpret(&statements, &mut tracker);
    tracker.status()
}
