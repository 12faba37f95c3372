use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;
use std::io;
use thiserror::Error;

use crate::scanner::Token;

/// Character offsets into the source, half open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }
}

/// Where a syntax error sits relative to the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorLocation {
    /// Scan errors have no token to point at.
    None,
    AtEnd,
    At(String),
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorLocation::None => Ok(()),
            ErrorLocation::AtEnd => write!(f, " at end"),
            ErrorLocation::At(lexeme) => write!(f, " at '{}'", lexeme),
        }
    }
}

/// A scan or parse error. Displays in the one-line `[line N Error... : msg]` shape.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[line {line} Error{location} : {message}]")]
pub struct SyntaxError {
    pub line: usize,
    pub location: ErrorLocation,
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn scan(line: usize, span: Span, message: impl Into<String>) -> Self {
        Self {
            line,
            location: ErrorLocation::None,
            message: message.into(),
            span,
        }
    }

    pub fn at_token(token: &Token, message: impl Into<String>) -> Self {
        let location = if token.is_eof() {
            ErrorLocation::AtEnd
        } else {
            ErrorLocation::At(token.lexeme.clone())
        };

        Self {
            line: token.line,
            location,
            message: message.into(),
            span: token.span.clone(),
        }
    }

    /// Location then message, without the line, for the ariadne headline.
    pub fn headline(&self) -> String {
        format!("Error{}: {}", self.location, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Undefined variable '{}'.", .name.lexeme)]
    UndefinedVariable { name: Token },
    #[error("Operand must be a number.")]
    OperandMustBeNumber { operator: Token },
    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers { operator: Token },
    #[error("Operands must be two numbers or two strings.")]
    OperandsMustBeNumbersOrStrings { operator: Token },
    #[error("Could not write output: {message}")]
    Output { token: Token, message: String },
}

impl RuntimeError {
    /// The token the error is blamed on.
    pub fn token(&self) -> &Token {
        match self {
            RuntimeError::UndefinedVariable { name } => name,
            RuntimeError::OperandMustBeNumber { operator } => operator,
            RuntimeError::OperandsMustBeNumbers { operator } => operator,
            RuntimeError::OperandsMustBeNumbersOrStrings { operator } => operator,
            RuntimeError::Output { token, .. } => token,
        }
    }

    pub fn line(&self) -> usize {
        self.token().line
    }

    /// The one-line-plus-location rendering used when ariadne is off.
    pub fn plain(&self) -> PlainRuntimeError<'_> {
        PlainRuntimeError(self)
    }

    fn help(&self) -> Option<&'static str> {
        match self {
            RuntimeError::UndefinedVariable { .. } => {
                Some("Declare the variable with 'var' before using or assigning it.")
            }
            RuntimeError::OperandsMustBeNumbersOrStrings { .. } => {
                Some("'+' adds two numbers or concatenates two strings; values are never converted.")
            }
            _ => None,
        }
    }
}

/// `{message}` then `[line N]` on its own line.
pub struct PlainRuntimeError<'a>(&'a RuntimeError);

impl fmt::Display for PlainRuntimeError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\n[line {}]", self.0, self.0.line())
    }
}

/// Sink for every error the pipeline produces.
pub trait Reporter {
    fn syntax_error(&mut self, error: &SyntaxError);
    fn runtime_error(&mut self, error: &RuntimeError);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorStyle {
    #[default]
    Plain,
    Rich,
}

/// Writes errors to stderr, either in the plain line format or as ariadne reports.
pub struct StderrReporter<'a> {
    source: &'a str,
    filename: Option<&'a str>,
    style: ErrorStyle,
}

impl<'a> StderrReporter<'a> {
    pub fn new(source: &'a str, filename: Option<&'a str>, style: ErrorStyle) -> Self {
        Self {
            source,
            filename,
            style,
        }
    }

    fn report_rich(
        &self,
        phase: &str,
        color: Color,
        span: &Span,
        message: &str,
        help: Option<&str>,
    ) -> io::Result<()> {
        let filename = self.filename.unwrap_or("<repl>");

        let mut report_builder = Report::build(ReportKind::Error, filename, span.start)
            .with_message(format!("{}: {}", phase.fg(color), message))
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(message)
                    .with_color(color),
            );

        if let Some(help_text) = help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        report_builder
            .finish()
            .eprint((filename, Source::from(self.source)))
    }
}

impl Reporter for StderrReporter<'_> {
    fn syntax_error(&mut self, error: &SyntaxError) {
        match self.style {
            ErrorStyle::Plain => eprintln!("{}", error),
            ErrorStyle::Rich => {
                let (phase, color) = match error.location {
                    ErrorLocation::None => ("Lexical Error", Color::Red),
                    _ => ("Parse Error", Color::Yellow),
                };
                let message = error.headline();
                if let Err(e) = self.report_rich(phase, color, &error.span, &message, None) {
                    tracing::warn!("failed to render diagnostic: {}", e);
                    eprintln!("{}", error);
                }
            }
        }
    }

    fn runtime_error(&mut self, error: &RuntimeError) {
        match self.style {
            ErrorStyle::Plain => eprintln!("{}", error.plain()),
            ErrorStyle::Rich => {
                let message = error.to_string();
                let span = &error.token().span;
                if let Err(e) =
                    self.report_rich("Runtime Error", Color::Magenta, span, &message, error.help())
                {
                    tracing::warn!("failed to render diagnostic: {}", e);
                    eprintln!("{}", error.plain());
                }
            }
        }
    }
}

/// Keeps every reported error in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub syntax_errors: Vec<SyntaxError>,
    pub runtime_errors: Vec<RuntimeError>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.syntax_errors.is_empty() || !self.runtime_errors.is_empty()
    }
}

impl Reporter for CollectingReporter {
    fn syntax_error(&mut self, error: &SyntaxError) {
        self.syntax_errors.push(error.clone());
    }

    fn runtime_error(&mut self, error: &RuntimeError) {
        self.runtime_errors.push(error.clone());
    }
}
