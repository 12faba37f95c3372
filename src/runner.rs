use std::io::Write;

use crate::ast::Stmt;
use crate::ast_printer::AstPrinter;
use crate::error::{Reporter, RuntimeError, SyntaxError};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::scanner::Scanner;

/// Process exit codes, following sysexits.h.
pub mod exit {
    pub const SUCCESS: u8 = 0;
    /// File missing or unreadable.
    pub const IO_ERROR: u8 = 1;
    pub const USAGE: u8 = 64;
    pub const DATA_ERROR: u8 = 65;
    pub const SOFTWARE: u8 = 70;
}

/// Driver switches shared by file and prompt mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub print_ast: bool,
}

/// Outcome of one run. Fresh for every file and every prompt line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    SyntaxError,
    RuntimeError,
}

impl RunStatus {
    pub fn exit_code(self) -> u8 {
        match self {
            RunStatus::Success => exit::SUCCESS,
            RunStatus::SyntaxError => exit::DATA_ERROR,
            RunStatus::RuntimeError => exit::SOFTWARE,
        }
    }
}

/// Forwards to the caller's reporter while remembering which kinds of error went past.
pub(crate) struct StatusTracker<'r> {
    inner: &'r mut dyn Reporter,
    had_error: bool,
    had_runtime_error: bool,
}

impl<'r> StatusTracker<'r> {
    pub(crate) fn new(inner: &'r mut dyn Reporter) -> Self {
        Self {
            inner,
            had_error: false,
            had_runtime_error: false,
        }
    }

    pub(crate) fn had_error(&self) -> bool {
        self.had_error
    }

    pub(crate) fn status(&self) -> RunStatus {
        if self.had_error {
            RunStatus::SyntaxError
        } else if self.had_runtime_error {
            RunStatus::RuntimeError
        } else {
            RunStatus::Success
        }
    }
}

impl Reporter for StatusTracker<'_> {
    fn syntax_error(&mut self, error: &SyntaxError) {
        self.had_error = true;
        self.inner.syntax_error(error);
    }

    fn runtime_error(&mut self, error: &RuntimeError) {
        self.had_runtime_error = true;
        self.inner.runtime_error(error);
    }
}

/// Scans and parses `source`, printing the tree when asked to.
pub(crate) fn parse_source(
    source: &str,
    options: RunOptions,
    reporter: &mut dyn Reporter,
) -> Vec<Stmt> {
    let tokens = Scanner::new(source).scan_tokens(reporter);
    let statements = Parser::new(tokens).parse(reporter);

    if options.print_ast {
        let printer = AstPrinter::new();
        for stmt in &statements {
            eprintln!("{}", printer.print_stmt(stmt));
        }
    }

    statements
}

/// Runs one unit of source through scan, parse and interpret. Nothing is
/// interpreted if scanning or parsing reported an error.
pub fn run<W: Write>(
    source: &str,
    interpreter: &mut Interpreter<W>,
    options: RunOptions,
    reporter: &mut dyn Reporter,
) -> RunStatus {
    let mut tracker = StatusTracker::new(reporter);

    let statements = parse_source(source, options, &mut tracker);
    if tracker.had_error() {
        tracing::debug!("syntax errors; skipping interpretation");
        return tracker.status();
    }

    interpreter.interpret(&statements, &mut tracker);
    tracker.status()
}
