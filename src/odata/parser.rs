// Filter parser - converts $filter tokens to an expression tree

use super::lexer::Lexer;
use super::token::Token;
use crate::access::Value;
use crate::error::{QueryError, QueryResult};
use crate::expression::{BinaryOperator, Expression, Function, UnaryOperator};

/// Bound on expression tree depth; evaluation recurses once per level
pub const MAX_DEPTH: usize = 256;

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    /// Current nesting of the subtree being parsed
    depth: usize,
}

impl Parser {
    pub fn new(filter: &str) -> QueryResult<Self> {
        let tokens = Lexer::new(filter).tokenize()?;
        Ok(Parser {
            tokens,
            position: 0,
            depth: 0,
        })
    }

    /// Parse the whole input as one filter expression
    pub fn parse(&mut self) -> QueryResult<Expression> {
        if self.match_token(&Token::Eof) {
            return Err(QueryError::malformed("Empty filter expression"));
        }

        let expr = self.parse_expression()?;

        if !self.match_token(&Token::Eof) {
            return Err(QueryError::malformed(format!(
                "Unexpected token {:?} after end of expression",
                self.current_token()
            )));
        }

        Ok(expr)
    }

    fn parse_expression(&mut self) -> QueryResult<Expression> {
        self.parse_or()
    }

    /// Parse OR expression
    fn parse_or(&mut self) -> QueryResult<Expression> {
        let mut left = self.parse_and()?;
        let mut chained = 0;

        while self.match_token(&Token::Or) {
            self.advance();
            self.enter()?;
            chained += 1;
            let right = self.parse_and()?;
            left = Expression::or(left, right);
        }

        self.depth -= chained;
        Ok(left)
    }

    /// Parse AND expression
    fn parse_and(&mut self) -> QueryResult<Expression> {
        let mut left = self.parse_not()?;
        let mut chained = 0;

        while self.match_token(&Token::And) {
            self.advance();
            self.enter()?;
            chained += 1;
            let right = self.parse_not()?;
            left = Expression::and(left, right);
        }

        self.depth -= chained;
        Ok(left)
    }

    /// Parse NOT expression
    fn parse_not(&mut self) -> QueryResult<Expression> {
        if self.match_token(&Token::Not) {
            self.advance();
            self.enter()?;
            let operand = self.parse_not()?;
            self.leave();
            Ok(Expression::not_expr(operand))
        } else {
            self.parse_comparison()
        }
    }

    /// Parse comparison expression, left-associative
    fn parse_comparison(&mut self) -> QueryResult<Expression> {
        let mut left = self.parse_unary()?;
        let mut chained = 0;

        loop {
            let op = match self.current_token() {
                Token::Eq => BinaryOperator::Eq,
                Token::Ne => BinaryOperator::Ne,
                Token::Gt => BinaryOperator::Gt,
                Token::Ge => BinaryOperator::Ge,
                Token::Lt => BinaryOperator::Lt,
                Token::Le => BinaryOperator::Le,
                _ => break,
            };
            self.advance();
            self.enter()?;
            chained += 1;

            let right = self.parse_unary()?;
            left = Expression::binary_op(op, left, right);
        }

        self.depth -= chained;
        Ok(left)
    }

    /// Parse unary minus; a minus right before a number is part of the literal
    fn parse_unary(&mut self) -> QueryResult<Expression> {
        if !self.match_token(&Token::Minus) {
            return self.parse_primary();
        }
        self.advance();

        if let token @ (Token::Integer(_) | Token::Float(_)) = self.current_token() {
            self.advance();
            return number_literal(&token, true);
        }

        self.enter()?;
        let operand = self.parse_unary()?;
        self.leave();
        Ok(Expression::unary_op(UnaryOperator::Minus, operand))
    }

    /// Parse primary expression
    fn parse_primary(&mut self) -> QueryResult<Expression> {
        match self.current_token() {
            token @ (Token::Integer(_) | Token::Float(_)) => {
                self.advance();
                number_literal(&token, false)
            }
            Token::String(s) => {
                self.advance();
                Ok(Expression::literal(s))
            }
            Token::True => {
                self.advance();
                Ok(Expression::literal(true))
            }
            Token::False => {
                self.advance();
                Ok(Expression::literal(false))
            }
            Token::Null => {
                self.advance();
                Ok(Expression::Literal(Value::Null))
            }
            Token::Identifier(name) => {
                self.advance();
                if self.match_token(&Token::LeftParen) {
                    self.parse_function_call(&name)
                } else {
                    Ok(Expression::field(name))
                }
            }
            Token::LeftParen => {
                self.advance();
                self.enter()?;
                let expr = self.parse_expression()?;
                self.leave();
                self.expect_token(Token::RightParen)?;
                Ok(expr)
            }
            Token::Eof => Err(QueryError::malformed("Unexpected end of filter expression")),
            token => Err(QueryError::malformed(format!(
                "Unexpected token {:?}",
                token
            ))),
        }
    }

    /// Parse `name(arg, ...)`; the current token is the opening parenthesis
    fn parse_function_call(&mut self, name: &str) -> QueryResult<Expression> {
        let function = Function::from_name(name)
            .ok_or_else(|| QueryError::malformed(format!("Unknown function: {}", name)))?;

        self.expect_token(Token::LeftParen)?;
        self.enter()?;
        let args = self.parse_expression_list()?;
        self.leave();
        self.expect_token(Token::RightParen)?;

        if args.len() != function.arity() {
            return Err(QueryError::malformed(format!(
                "Function {} expects {} arguments, got {}",
                function,
                function.arity(),
                args.len()
            )));
        }

        Ok(Expression::call(function, args))
    }

    fn parse_expression_list(&mut self) -> QueryResult<Vec<Expression>> {
        let mut expressions = vec![];

        if self.match_token(&Token::RightParen) {
            return Ok(expressions);
        }

        loop {
            expressions.push(self.parse_expression()?);
            if !self.match_token(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(expressions)
    }

    // Helper methods

    /// Descend one level, failing once the tree would exceed `MAX_DEPTH`
    fn enter(&mut self) -> QueryResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(QueryError::malformed(format!(
                "Filter nested too deeply (limit {})",
                MAX_DEPTH
            )));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Get current token
    fn current_token(&self) -> Token {
        self.tokens
            .get(self.position)
            .cloned()
            .unwrap_or(Token::Eof)
    }

    /// Advance to next token
    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Check if current token matches
    fn match_token(&self, token: &Token) -> bool {
        self.current_token() == *token
    }

    /// Expect a specific token
    fn expect_token(&mut self, token: Token) -> QueryResult<()> {
        if self.current_token() == token {
            self.advance();
            Ok(())
        } else {
            Err(QueryError::malformed(format!(
                "Expected {:?}, found {:?}",
                token,
                self.current_token()
            )))
        }
    }
}

/// Build a numeric literal, applying a folded leading minus before range checks
fn number_literal(token: &Token, negative: bool) -> QueryResult<Expression> {
    let sign = if negative { "-" } else { "" };
    match token {
        Token::Integer(n) => format!("{}{}", sign, n)
            .parse::<i32>()
            .map(Expression::literal)
            .map_err(|_| QueryError::malformed(format!("Integer out of range: {}{}", sign, n))),
        Token::Float(n) => format!("{}{}", sign, n)
            .parse::<f64>()
            .map(Expression::literal)
            .map_err(|_| QueryError::malformed(format!("Invalid number: {}{}", sign, n))),
        other => Err(QueryError::malformed(format!(
            "Expected a number, found {:?}",
            other
        ))),
    }
}

/// Parse a raw `$filter` string into an expression tree
pub fn parse_filter(filter: &str) -> QueryResult<Expression> {
    Parser::new(filter)?.parse()
}
