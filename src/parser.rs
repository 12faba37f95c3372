use crate::ast::{BinaryOp, Expr, LogicalOp, Stmt, UnaryOp};
use crate::error::{Reporter, Span, SyntaxError};
use crate::scanner::{Token, TokenType};
use crate::value::Value;

type ParseResult<T> = Result<T, SyntaxError>;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let (line, end) = tokens
                .last()
                .map(|t| (t.line, t.span.end))
                .unwrap_or((1, 0));
            tokens.push(Token::new(TokenType::Eof, "", None, line, Span::new(end, end)));
        }

        Self { tokens, current: 0 }
    }

    /// Parses every declaration up to EOF. Statements that fail to parse are
    /// reported and left out of the result.
    pub fn parse(&mut self, reporter: &mut dyn Reporter) -> Vec<Stmt> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration(reporter) {
                statements.push(stmt);
            }
        }

        tracing::debug!(statements = statements.len(), "parse complete");
        statements
    }

    /// Parses a single expression starting at the current token.
    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.expression()
    }

    fn declaration(&mut self, reporter: &mut dyn Reporter) -> Option<Stmt> {
        let result = if self.match_types(&[TokenType::Var]) {
            self.var_declaration()
        } else {
            self.statement(reporter)
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                tracing::trace!(line = error.line, "recovering from syntax error");
                reporter.syntax_error(&error);
                self.synchronize();
                None
            }
        }
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self
            .consume(TokenType::Identifier, "Expect variable name.")?
            .clone();

        let initializer = if self.match_types(&[TokenType::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::Semicolon,
            "Expect ';' after variable declaration.",
        )?;
        Ok(Stmt::Var { name, initializer })
    }

    fn statement(&mut self, reporter: &mut dyn Reporter) -> ParseResult<Stmt> {
        if self.match_types(&[TokenType::If]) {
            self.if_statement(reporter)
        } else if self.match_types(&[TokenType::Print]) {
            self.print_statement()
        } else if self.match_types(&[TokenType::LeftBrace]) {
            Ok(Stmt::Block {
                statements: self.block(reporter)?,
            })
        } else {
            self.expression_statement()
        }
    }

    fn block(&mut self, reporter: &mut dyn Reporter) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(TokenType::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration(reporter) {
                statements.push(stmt);
            }
        }

        self.consume(TokenType::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn if_statement(&mut self, reporter: &mut dyn Reporter) -> ParseResult<Stmt> {
        self.consume(TokenType::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenType::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement(reporter)?);
        let else_branch = if self.match_types(&[TokenType::Else]) {
            Some(Box::new(self.statement(reporter)?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let expr = self.expression()?;
        self.consume(TokenType::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print { keyword, expr })
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenType::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression { expr })
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.match_types(&[TokenType::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            if let Expr::Variable { name } = expr {
                return Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                });
            }

            return Err(SyntaxError::at_token(&equals, "Invalid assignment target."));
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while self.match_types(&[TokenType::Or]) {
            let token = self.previous().clone();
            let right = self.and()?;
            expr = logical(expr, token, right);
        }

        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while self.match_types(&[TokenType::And]) {
            let token = self.previous().clone();
            let right = self.equality()?;
            expr = logical(expr, token, right);
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;

        while self.match_types(&[TokenType::BangEqual, TokenType::EqualEqual]) {
            let token = self.previous().clone();
            let right = self.comparison()?;
            expr = binary(expr, token, right);
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;

        while self.match_types(&[
            TokenType::Greater,
            TokenType::GreaterEqual,
            TokenType::Less,
            TokenType::LessEqual,
        ]) {
            let token = self.previous().clone();
            let right = self.term()?;
            expr = binary(expr, token, right);
        }

        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;

        while self.match_types(&[TokenType::Minus, TokenType::Plus]) {
            let token = self.previous().clone();
            let right = self.factor()?;
            expr = binary(expr, token, right);
        }

        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while self.match_types(&[TokenType::Slash, TokenType::Star]) {
            let token = self.previous().clone();
            let right = self.unary()?;
            expr = binary(expr, token, right);
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.match_types(&[TokenType::Bang, TokenType::Minus]) {
            let token = self.previous().clone();
            let operator = match UnaryOp::from_token_type(token.token_type) {
                Some(operator) => operator,
                None => unreachable!("matched a non-unary token"),
            };
            let operand = self.unary()?;

            return Ok(Expr::Unary {
                operator,
                token,
                operand: Box::new(operand),
            });
        }

        self.primary()
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();

        let expr = match token.token_type {
            TokenType::False => Expr::Literal {
                value: Value::Bool(false),
            },
            TokenType::True => Expr::Literal {
                value: Value::Bool(true),
            },
            TokenType::Nil => Expr::Literal { value: Value::Nil },
            TokenType::Number | TokenType::String => Expr::Literal {
                value: token.literal.clone().unwrap_or(Value::Nil),
            },
            TokenType::Identifier => Expr::Variable { name: token },
            TokenType::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenType::RightParen, "Expect ')' after expression.")?;
                return Ok(Expr::Grouping {
                    expr: Box::new(expr),
                });
            }
            _ => return Err(SyntaxError::at_token(&token, "Expect expression.")),
        };

        self.advance();
        Ok(expr)
    }

    /// Discards tokens until something that looks like the start of the next statement.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().token_type == TokenType::Semicolon {
                return;
            }

            match self.peek().token_type {
                TokenType::Class
                | TokenType::Fun
                | TokenType::Var
                | TokenType::For
                | TokenType::If
                | TokenType::While
                | TokenType::Print
                | TokenType::Return => return,
                _ => {}
            }

            self.advance();
        }
    }

    fn match_types(&mut self, types: &[TokenType]) -> bool {
        for token_type in types {
            if self.check(*token_type) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, token_type: TokenType) -> bool {
        if self.is_at_end() {
            false
        } else {
            self.peek().token_type == token_type
        }
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> ParseResult<&Token> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            Err(SyntaxError::at_token(self.peek(), message))
        }
    }
}

fn binary(left: Expr, token: Token, right: Expr) -> Expr {
    let operator = match BinaryOp::from_token_type(token.token_type) {
        Some(operator) => operator,
        None => unreachable!("matched a non-binary token"),
    };

    Expr::Binary {
        left: Box::new(left),
        operator,
        token,
        right: Box::new(right),
    }
}

fn logical(left: Expr, token: Token, right: Expr) -> Expr {
    let operator = match LogicalOp::from_token_type(token.token_type) {
        Some(operator) => operator,
        None => unreachable!("matched a non-logical token"),
    };

    Expr::Logical {
        left: Box::new(left),
        operator,
        token,
        right: Box::new(right),
    }
}
