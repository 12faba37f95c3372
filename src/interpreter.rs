use std::cell::RefCell;
use std::io::{self, Write};
use std::mem;
use std::rc::Rc;

use crate::ast::{BinaryOp, Expr, LogicalOp, Stmt, UnaryOp};
use crate::environment::Environment;
use crate::error::{Reporter, RuntimeError};
use crate::scanner::Token;
use crate::value::Value;

pub struct Interpreter<W: Write = io::Stdout> {
    environment: Rc<RefCell<Environment>>,
    out: W,
}

impl Interpreter<io::Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    /// Builds an interpreter whose `print` output goes to `out`.
    pub fn with_output(out: W) -> Self {
        Self {
            environment: Rc::new(RefCell::new(Environment::new())),
            out,
        }
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs `statements` in order. The first runtime error stops the run and
    /// goes to `reporter`.
    pub fn interpret(&mut self, statements: &[Stmt], reporter: &mut dyn Reporter) {
        tracing::debug!(statements = statements.len(), "interpret");
        for statement in statements {
            if let Err(error) = self.execute(statement) {
                tracing::debug!(line = error.line(), %error, "runtime error");
                reporter.runtime_error(&error);
                return;
            }
        }
    }

    pub fn execute(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Expression { expr } => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Print { keyword, expr } => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value).map_err(|e| RuntimeError::Output {
                    token: keyword.clone(),
                    message: e.to_string(),
                })
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(())
            }
            Stmt::Block { statements } => {
                let scope = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, scope)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Runs `statements` with `scope` as the current environment, restoring
    /// the previous one whether or not the body fails.
    fn execute_block(&mut self, statements: &[Stmt], scope: Environment) -> Result<(), RuntimeError> {
        let previous = mem::replace(&mut self.environment, Rc::new(RefCell::new(scope)));
        tracing::trace!("enter block");

        let result = statements.iter().try_for_each(|stmt| self.execute(stmt));

        self.environment = previous;
        tracing::trace!("exit block");
        result
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal { value } => Ok(value.clone()),
            Expr::Grouping { expr } => self.evaluate(expr),
            Expr::Variable { name } => self.environment.borrow().get(name),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.borrow_mut().assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Unary {
                operator,
                token,
                operand,
            } => {
                let operand = self.evaluate(operand)?;
                match operator {
                    UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
                    UnaryOp::Negate => match operand {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::OperandMustBeNumber {
                            operator: token.clone(),
                        }),
                    },
                }
            }
            Expr::Binary {
                left,
                operator,
                token,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                evaluate_binary_op(*operator, token, left, right)
            }
            Expr::Logical {
                left,
                operator,
                right,
                ..
            } => {
                let left = self.evaluate(left)?;

                match operator {
                    LogicalOp::Or if left.is_truthy() => Ok(left),
                    LogicalOp::And if !left.is_truthy() => Ok(left),
                    _ => self.evaluate(right),
                }
            }
        }
    }
}

fn evaluate_binary_op(
    operator: BinaryOp,
    token: &Token,
    left: Value,
    right: Value,
) -> Result<Value, RuntimeError> {
    match operator {
        BinaryOp::Equal => return Ok(Value::Bool(left == right)),
        BinaryOp::NotEqual => return Ok(Value::Bool(left != right)),
        BinaryOp::Add => {
            return match (left, right) {
                (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
                (Value::String(l), Value::String(r)) => Ok(Value::String(l + &r)),
                _ => Err(RuntimeError::OperandsMustBeNumbersOrStrings {
                    operator: token.clone(),
                }),
            };
        }
        _ => {}
    }

    let (l, r) = match (left, right) {
        (Value::Number(l), Value::Number(r)) => (l, r),
        _ => {
            return Err(RuntimeError::OperandsMustBeNumbers {
                operator: token.clone(),
            })
        }
    };

    let value = match operator {
        BinaryOp::Subtract => Value::Number(l - r),
        BinaryOp::Multiply => Value::Number(l * r),
        BinaryOp::Divide => Value::Number(l / r),
        BinaryOp::Greater => Value::Bool(l > r),
        BinaryOp::GreaterEqual => Value::Bool(l >= r),
        BinaryOp::Less => Value::Bool(l < r),
        BinaryOp::LessEqual => Value::Bool(l <= r),
        BinaryOp::Add | BinaryOp::Equal | BinaryOp::NotEqual => unreachable!("handled above"),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CollectingReporter, Span};
    use crate::scanner::TokenType;
    use pretty_assertions::assert_eq;

    fn number(n: f64) -> Expr {
        Expr::Literal {
            value: Value::Number(n),
        }
    }

    fn op_token(token_type: TokenType, lexeme: &str) -> Token {
        Token::new(token_type, lexeme, None, 1, Span::single(0))
    }

    #[test]
    fn literal_evaluation_is_stable() {
        let mut interpreter = Interpreter::with_output(Vec::new());
        let expr = number(42.0);
        assert_eq!(interpreter.evaluate(&expr), Ok(Value::Number(42.0)));
        assert_eq!(interpreter.evaluate(&expr), Ok(Value::Number(42.0)));
    }

    #[test]
    fn negate_requires_number() {
        let mut interpreter = Interpreter::with_output(Vec::new());
        let expr = Expr::Unary {
            operator: UnaryOp::Negate,
            token: op_token(TokenType::Minus, "-"),
            operand: Box::new(Expr::Literal {
                value: Value::Bool(true),
            }),
        };
        assert!(matches!(
            interpreter.evaluate(&expr),
            Err(RuntimeError::OperandMustBeNumber { .. })
        ));
    }

    #[test]
    fn block_restores_scope_after_error() {
        let mut interpreter = Interpreter::with_output(Vec::new());
        let missing = op_token(TokenType::Identifier, "missing");
        let inner = op_token(TokenType::Identifier, "inner");
        let program = vec![Stmt::Block {
            statements: vec![
                Stmt::Var {
                    name: inner.clone(),
                    initializer: Some(number(1.0)),
                },
                Stmt::Expression {
                    expr: Expr::Variable { name: missing },
                },
            ],
        }];

        let mut reporter = CollectingReporter::new();
        interpreter.interpret(&program, &mut reporter);
        assert_eq!(reporter.runtime_errors.len(), 1);

        // Back at global scope: the block's binding is gone.
        assert!(interpreter
            .evaluate(&Expr::Variable { name: inner })
            .is_err());
        assert!(interpreter.environment.borrow().enclosing().is_none());
    }

    #[test]
    fn print_writes_to_output() {
        let mut interpreter = Interpreter::with_output(Vec::new());
        interpreter
            .execute(&Stmt::Print {
                keyword: op_token(TokenType::Print, "print"),
                expr: number(2.5),
            })
            .unwrap();
        assert_eq!(String::from_utf8(interpreter.into_output()).unwrap(), "2.5\n");
    }
}
