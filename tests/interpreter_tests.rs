// End-to-end tests: source text in, printed output and reported errors out.

use plox::error::{CollectingReporter, RuntimeError};
use plox::repl::run_line;
use plox::runner::{exit, RunOptions, RunStatus};
use plox::{AstPrinter, Interpreter, Parser, Scanner, TokenType};
use pretty_assertions::assert_eq;

struct Outcome {
    output: String,
    reporter: CollectingReporter,
    status: RunStatus,
}

fn run_source(source: &str) -> Outcome {
    let mut interpreter = Interpreter::with_output(Vec::new());
    let mut reporter = CollectingReporter::new();
    let status = plox::run(source, &mut interpreter, RunOptions::default(), &mut reporter);

    Outcome {
        output: String::from_utf8(interpreter.into_output()).expect("utf-8 output"),
        reporter,
        status,
    }
}

fn output_of(source: &str) -> String {
    let outcome = run_source(source);
    assert!(
        !outcome.reporter.has_errors(),
        "unexpected errors: {:?} {:?}",
        outcome.reporter.syntax_errors,
        outcome.reporter.runtime_errors
    );
    outcome.output
}

fn print_expression(source: &str) -> String {
    let mut reporter = CollectingReporter::new();
    let tokens = Scanner::new(source).scan_tokens(&mut reporter);
    let expr = Parser::new(tokens)
        .parse_expression()
        .expect("expression should parse");
    AstPrinter::new().print(&expr)
}

#[test]
fn token_stream_ends_with_single_eof_on_last_line() {
    let source = "var a = 1;\nprint a;\n\n// done\n";
    let mut reporter = CollectingReporter::new();
    let tokens = Scanner::new(source).scan_tokens(&mut reporter);

    let eofs: Vec<_> = tokens
        .iter()
        .filter(|t| t.token_type == TokenType::Eof)
        .collect();
    assert_eq!(eofs.len(), 1);

    let last = tokens.last().expect("at least one token");
    assert_eq!(last.token_type, TokenType::Eof);
    assert_eq!(last.lexeme, "");
    assert_eq!(last.line, source.matches('\n').count() + 1);
}

#[test]
fn printer_reflects_precedence_and_associativity() {
    assert_eq!(print_expression("1 + 2"), "(+ 1 2)");
    assert_eq!(print_expression("-123 * (45.67)"), "(* (- 123) (group 45.67))");
    assert_eq!(print_expression("1 + 2 * 3 - 4"), "(- (+ 1 (* 2 3)) 4)");
    assert_eq!(print_expression("8 / 4 / 2"), "(/ (/ 8 4) 2)");
    assert_eq!(print_expression("!true == false"), "(== (! true) false)");
    assert_eq!(print_expression("a or b and c"), "(or a (and b c))");
    assert_eq!(print_expression("a = b = 1"), "(= a (= b 1))");
}

#[test]
fn variable_reads_are_stable() {
    assert_eq!(output_of("var a = 7; print a; print a;"), "7\n7\n");
}

#[test]
fn inner_declaration_shadows_outer() {
    assert_eq!(
        output_of("var a = 1; { var a = 2; print a; } print a;"),
        "2\n1\n"
    );
}

#[test]
fn assignment_reaches_enclosing_scope() {
    assert_eq!(output_of("var a = 1; { a = 2; } print a;"), "2\n");
}

#[test]
fn assignment_targets_nearest_binding() {
    let source = r#"
        var a = "global";
        {
            var a = "outer";
            {
                a = "assigned";
                print a;
            }
            print a;
        }
        print a;
    "#;
    assert_eq!(output_of(source), "assigned\nassigned\nglobal\n");
}

#[test]
fn undefined_variable_read_aborts_run() {
    let outcome = run_source("print 1; print missing; print 2;");

    assert_eq!(outcome.output, "1\n");
    assert_eq!(outcome.status, RunStatus::RuntimeError);
    assert_eq!(outcome.status.exit_code(), exit::SOFTWARE);
    assert_eq!(outcome.reporter.runtime_errors.len(), 1);
    assert!(matches!(
        outcome.reporter.runtime_errors[0],
        RuntimeError::UndefinedVariable { .. }
    ));
    assert_eq!(
        outcome.reporter.runtime_errors[0].to_string(),
        "Undefined variable 'missing'."
    );
}

#[test]
fn undefined_variable_assignment_does_not_create_global() {
    let outcome = run_source("missing = 1; print 2;");

    assert_eq!(outcome.output, "");
    assert!(matches!(
        outcome.reporter.runtime_errors.as_slice(),
        [RuntimeError::UndefinedVariable { .. }]
    ));
}

#[test]
fn syntax_error_prevents_interpretation() {
    let outcome = run_source("print 1;\nprint ;");

    assert_eq!(outcome.output, "");
    assert_eq!(outcome.status, RunStatus::SyntaxError);
    assert_eq!(outcome.status.exit_code(), exit::DATA_ERROR);
    assert!(outcome.reporter.runtime_errors.is_empty());
    assert_eq!(
        outcome.reporter.syntax_errors[0].to_string(),
        "[line 2 Error at ';' : Expect expression.]"
    );
}

#[test]
fn type_errors() {
    let outcome = run_source("\"1\" + 2;");
    assert_eq!(
        outcome.reporter.runtime_errors[0].to_string(),
        "Operands must be two numbers or two strings."
    );

    let outcome = run_source("true - 1;");
    assert!(matches!(
        outcome.reporter.runtime_errors[0],
        RuntimeError::OperandsMustBeNumbers { .. }
    ));
    assert_eq!(
        outcome.reporter.runtime_errors[0].to_string(),
        "Operands must be numbers."
    );

    let outcome = run_source("-\"x\";");
    assert_eq!(
        outcome.reporter.runtime_errors[0].to_string(),
        "Operand must be a number."
    );

    let outcome = run_source("1 < \"2\";");
    assert_eq!(outcome.status, RunStatus::RuntimeError);
}

#[test]
fn runtime_error_carries_operator_line() {
    let outcome = run_source("\n\nprint 1 +\n  nil;");
    assert_eq!(outcome.reporter.runtime_errors[0].line(), 3);
    assert_eq!(outcome.reporter.runtime_errors[0].token().lexeme, "+");
}

#[test]
fn numeric_display() {
    assert_eq!(output_of("print 6 / 2; print 7 / 2;"), "3\n3.5\n");
    assert_eq!(output_of("print 1 / 0;"), "inf\n");
    assert_eq!(output_of("print -0.5 * 4;"), "-2\n");
}

#[test]
fn if_else_scenario() {
    assert_eq!(
        output_of("if (10 > 5) print \"yes\"; else print \"no\";"),
        "yes\n"
    );
    assert_eq!(
        output_of("if (10 < 5) print \"yes\"; else print \"no\";"),
        "no\n"
    );
    assert_eq!(output_of("if (false) print \"never\";"), "");
}

#[test]
fn truthiness_in_conditions() {
    let source = r#"
        if (0) print "zero";
        if ("") print "empty";
        if (nil) print "nil"; else print "nil is falsy";
        if (!false) print "not false";
    "#;
    assert_eq!(output_of(source), "zero\nempty\nnil is falsy\nnot false\n");
}

#[test]
fn string_concatenation() {
    assert_eq!(output_of("print \"foo\" + \"bar\";"), "foobar\n");
}

#[test]
fn equality_never_coerces() {
    let source = r#"
        print nil == nil;
        print nil == false;
        print 1 == 1;
        print "a" != "a";
        print 1 == "1";
    "#;
    assert_eq!(output_of(source), "true\nfalse\ntrue\nfalse\nfalse\n");
}

#[test]
fn logical_operators_short_circuit() {
    let source = r#"
        var a = 1;
        false and (a = 2);
        true or (a = 3);
        print a;
        print nil or "fallback";
        print 1 and 2;
        print false and missing;
    "#;
    assert_eq!(output_of(source), "1\nfallback\n2\nfalse\n");
}

#[test]
fn var_defaults_to_nil_and_redefinition_overwrites() {
    assert_eq!(output_of("var a; print a;"), "nil\n");
    assert_eq!(output_of("var a = 1; var a = 2; print a;"), "2\n");
}

#[test]
fn scope_is_restored_after_runtime_error_in_block() {
    let mut interpreter = Interpreter::with_output(Vec::new());
    let mut reporter = CollectingReporter::new();

    let status = plox::run(
        "var a = 1; { var a = 2; missing; }",
        &mut interpreter,
        RunOptions::default(),
        &mut reporter,
    );
    assert_eq!(status, RunStatus::RuntimeError);

    let status = plox::run(
        "print a;",
        &mut interpreter,
        RunOptions::default(),
        &mut reporter,
    );
    assert_eq!(status, RunStatus::Success);
    assert_eq!(
        String::from_utf8(interpreter.into_output()).expect("utf-8 output"),
        "1\n"
    );
}

#[test]
fn prompt_lines_share_bindings_and_echo_expressions() {
    let mut interpreter = Interpreter::with_output(Vec::new());
    let mut reporter = CollectingReporter::new();
    let options = RunOptions::default();

    assert_eq!(
        run_line("var a = 3;", &mut interpreter, options, &mut reporter),
        RunStatus::Success
    );
    assert_eq!(
        run_line("a * 2;", &mut interpreter, options, &mut reporter),
        RunStatus::Success
    );
    assert_eq!(
        run_line("a = 5;", &mut interpreter, options, &mut reporter),
        RunStatus::Success
    );
    assert_eq!(
        run_line("print a", &mut interpreter, options, &mut reporter),
        RunStatus::SyntaxError
    );
    // A failed line does not poison the next one.
    assert_eq!(
        run_line("print a;", &mut interpreter, options, &mut reporter),
        RunStatus::Success
    );

    assert_eq!(
        String::from_utf8(interpreter.into_output()).expect("utf-8 output"),
        "6\n5\n"
    );
}
