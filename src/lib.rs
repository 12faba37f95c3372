// plox: a tree-walking interpreter for a small Lox-style scripting language.
//
// Source text flows through the Scanner, the Parser and the Interpreter; the
// runner and repl modules wire those stages together for the command line.

// Public modules
pub mod ast;
pub mod ast_printer;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod scanner;
pub mod value;

// Re-export commonly used items
pub use ast::{Expr, Stmt};
pub use ast_printer::AstPrinter;
pub use environment::Environment;
pub use error::{
    CollectingReporter, ErrorStyle, Reporter, RuntimeError, Span, StderrReporter, SyntaxError,
};
pub use interpreter::Interpreter;
pub use parser::Parser;
pub use scanner::{Scanner, Token, TokenType};
pub use value::Value;

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::{run, RunOptions, RunStatus};
