use crate::ast::{Expr, Stmt};

/// Renders syntax trees as fully parenthesized prefix expressions, e.g.
/// `-123 * (45.67)` becomes `(* (- 123) (group 45.67))`.
///
/// Used for `--print-ast` diagnostics only.
#[derive(Debug, Default)]
pub struct AstPrinter;

impl AstPrinter {
    pub fn new() -> Self {
        Self
    }

    pub fn print(&self, expr: &Expr) -> String {
        match expr {
            Expr::Literal { value } => value.to_string(),
            Expr::Grouping { expr } => self.parenthesize("group", &[&**expr]),
            Expr::Unary { token, operand, .. } => self.parenthesize(&token.lexeme, &[&**operand]),
            Expr::Binary {
                left, token, right, ..
            }
            | Expr::Logical {
                left, token, right, ..
            } => self.parenthesize(&token.lexeme, &[&**left, &**right]),
            Expr::Variable { name } => name.lexeme.clone(),
            Expr::Assign { name, value } => format!("(= {} {})", name.lexeme, self.print(value)),
        }
    }

    pub fn print_stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression { expr } => self.parenthesize(";", &[expr]),
            Stmt::Print { expr, .. } => self.parenthesize("print", &[expr]),
            Stmt::Var { name, initializer } => match initializer {
                Some(expr) => format!("(var {} {})", name.lexeme, self.print(expr)),
                None => format!("(var {})", name.lexeme),
            },
            Stmt::Block { statements } => {
                let mut out = String::from("(block");
                for stmt in statements {
                    out.push(' ');
                    out.push_str(&self.print_stmt(stmt));
                }
                out.push(')');
                out
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut out = format!(
                    "(if {} {}",
                    self.print(condition),
                    self.print_stmt(then_branch)
                );
                if let Some(else_branch) = else_branch {
                    out.push(' ');
                    out.push_str(&self.print_stmt(else_branch));
                }
                out.push(')');
                out
            }
        }
    }

    fn parenthesize(&self, name: &str, exprs: &[&Expr]) -> String {
        let mut out = format!("({}", name);
        for expr in exprs {
            out.push(' ');
            out.push_str(&self.print(expr));
        }
        out.push(')');
        out
    }
}
