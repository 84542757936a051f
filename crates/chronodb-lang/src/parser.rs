//! Recursive descent parser for the SQL dialect.

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::{Lexer, SpannedToken, Token};
use crate::span::{Span, Spanned};

/// Parse a single statement from source.
pub fn parse(source: &str) -> Result<Statement, ParseError> {
    let mut parser = Parser::new(source)?;
    let stmt = parser.parse_statement()?;
    parser.expect_end()?;
    Ok(stmt)
}

/// Parser for the ChronoDB SQL dialect.
pub struct Parser<'source> {
    lexer: Lexer<'source>,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Result<Self, ParseError> {
        Ok(Self {
            lexer: Lexer::new(source)?,
        })
    }

    /// Parse a complete statement.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Create => self.parse_create(),
            Token::Drop => self.parse_drop(),
            Token::Use => {
                let name = self.expect_ident()?;
                Ok(Statement::Use { name })
            }
            Token::Insert => self.parse_insert(),
            Token::Select => Ok(Statement::Select(self.parse_select(tok.span)?)),
            Token::Explain => {
                let select_tok = self.next_token()?;
                if select_tok.token != Token::Select {
                    return Err(ParseError::new(
                        format!("expected SELECT after EXPLAIN, found {:?}", select_tok.token),
                        select_tok.span,
                    ));
                }
                Ok(Statement::Explain(self.parse_select(tok.span)?))
            }
            other => Err(ParseError::new(
                format!("expected a statement, found {:?}", other),
                tok.span,
            )),
        }
    }

    /// Consume trailing semicolons and require end of input.
    fn expect_end(&mut self) -> Result<(), ParseError> {
        while let Some(tok) = self.lexer.peek() {
            if tok.token == Token::Semicolon {
                self.lexer.next();
            } else {
                let tok = tok.clone();
                return Err(ParseError::new(
                    format!("unexpected trailing input {:?}", tok.token),
                    tok.span,
                ));
            }
        }
        Ok(())
    }

    fn parse_create(&mut self) -> Result<Statement, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Database => {
                let if_not_exists = self.accept_if_not_exists()?;
                let name = self.expect_ident()?;
                let cache_model = if self.accept(Token::CacheModel) {
                    Some(self.expect_string()?)
                } else {
                    None
                };
                Ok(Statement::CreateDatabase {
                    name,
                    if_not_exists,
                    cache_model,
                })
            }
            Token::Stable => {
                let name = self.expect_ident()?;
                let columns = self.parse_column_specs()?;
                self.expect_token(Token::Tags)?;
                let tags = self.parse_column_specs()?;
                Ok(Statement::CreateStable {
                    name,
                    columns,
                    tags,
                })
            }
            Token::Table => {
                let name = self.expect_ident()?;
                let body = if self.accept(Token::Using) {
                    let stable = self.expect_ident()?;
                    self.expect_token(Token::Tags)?;
                    let tags = self.parse_literal_tuple()?;
                    CreateTableBody::Using { stable, tags }
                } else {
                    CreateTableBody::Columns(self.parse_column_specs()?)
                };
                Ok(Statement::CreateTable { name, body })
            }
            other => Err(ParseError::new(
                format!("expected DATABASE, STABLE or TABLE, found {:?}", other),
                tok.span,
            )),
        }
    }

    fn parse_drop(&mut self) -> Result<Statement, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Database => {
                let if_exists = self.accept_if_exists()?;
                let name = self.expect_ident()?;
                Ok(Statement::DropDatabase { name, if_exists })
            }
            Token::Stable => {
                let if_exists = self.accept_if_exists()?;
                let name = self.expect_ident()?;
                Ok(Statement::DropStable { name, if_exists })
            }
            Token::Table => {
                let if_exists = self.accept_if_exists()?;
                let name = self.expect_ident()?;
                Ok(Statement::DropTable { name, if_exists })
            }
            other => Err(ParseError::new(
                format!("expected DATABASE, STABLE or TABLE, found {:?}", other),
                tok.span,
            )),
        }
    }

    fn parse_insert(&mut self) -> Result<Statement, ParseError> {
        self.expect_token(Token::Into)?;
        let table = self.expect_ident()?;

        // Optional explicit column list
        let columns = if matches!(self.lexer.peek(), Some(t) if t.token == Token::LParen) {
            self.lexer.next();
            let mut cols = vec![self.expect_ident()?];
            while self.accept(Token::Comma) {
                cols.push(self.expect_ident()?);
            }
            self.expect_token(Token::RParen)?;
            Some(cols)
        } else {
            None
        };

        self.expect_token(Token::Values)?;
        let mut rows = vec![self.parse_literal_tuple()?];
        while self.accept(Token::Comma) {
            rows.push(self.parse_literal_tuple()?);
        }

        Ok(Statement::Insert {
            table,
            columns,
            rows,
        })
    }

    fn parse_select(&mut self, start: Span) -> Result<SelectStatement, ParseError> {
        let mut projections = vec![self.parse_select_expr()?];
        while self.accept(Token::Comma) {
            projections.push(self.parse_select_expr()?);
        }

        self.expect_token(Token::From)?;
        let table = self.expect_ident()?;
        let span = start.merge(table.span);

        Ok(SelectStatement {
            projections,
            table,
            span,
        })
    }

    fn parse_select_expr(&mut self) -> Result<Spanned<SelectExpr>, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Last => {
                let (target, end) = self.parse_column_target()?;
                Ok(Spanned::new(SelectExpr::Last(target), tok.span.merge(end)))
            }
            Token::LastRow => {
                let (target, end) = self.parse_column_target()?;
                Ok(Spanned::new(
                    SelectExpr::LastRow(target),
                    tok.span.merge(end),
                ))
            }
            Token::Count => {
                let (target, end) = self.parse_column_target()?;
                Ok(Spanned::new(SelectExpr::Count(target), tok.span.merge(end)))
            }
            Token::Ident(name) => Ok(Spanned::new(SelectExpr::Column(name), tok.span)),
            other => Err(ParseError::new(
                format!("expected a projection expression, found {:?}", other),
                tok.span,
            )),
        }
    }

    /// Parse a parenthesized aggregate argument: `(*)` or `(col)`.
    fn parse_column_target(&mut self) -> Result<(ColumnTarget, Span), ParseError> {
        self.expect_token(Token::LParen)?;
        let tok = self.next_token()?;
        let target = match tok.token {
            Token::Star => ColumnTarget::Star,
            Token::Ident(name) => ColumnTarget::Named(name),
            other => {
                return Err(ParseError::new(
                    format!("expected '*' or a column name, found {:?}", other),
                    tok.span,
                ));
            }
        };
        let close = self.expect_token(Token::RParen)?;
        Ok((target, close.span))
    }

    fn parse_column_specs(&mut self) -> Result<Vec<ColumnSpec>, ParseError> {
        self.expect_token(Token::LParen)?;
        let mut specs = vec![self.parse_column_spec()?];
        while self.accept(Token::Comma) {
            specs.push(self.parse_column_spec()?);
        }
        self.expect_token(Token::RParen)?;
        Ok(specs)
    }

    fn parse_column_spec(&mut self) -> Result<ColumnSpec, ParseError> {
        let name = self.expect_ident()?;
        let tok = self.next_token()?;
        let ty = match tok.token {
            Token::Timestamp => TypeName::Timestamp,
            Token::Int => TypeName::Int,
            Token::BigInt => TypeName::BigInt,
            Token::Float => TypeName::Float,
            Token::Double => TypeName::Double,
            Token::Bool => TypeName::Bool,
            Token::Binary => TypeName::Binary(self.parse_type_width()?),
            Token::NChar => TypeName::NChar(self.parse_type_width()?),
            other => {
                return Err(ParseError::new(
                    format!("expected a column type, found {:?}", other),
                    tok.span,
                ));
            }
        };
        Ok(ColumnSpec { name, ty })
    }

    /// Parse a `(n)` width suffix for binary/nchar types.
    fn parse_type_width(&mut self) -> Result<u32, ParseError> {
        self.expect_token(Token::LParen)?;
        let tok = self.next_token()?;
        let width = match tok.token {
            Token::IntLit(n) if n > 0 => n as u32,
            other => {
                return Err(ParseError::new(
                    format!("expected a positive width, found {:?}", other),
                    tok.span,
                ));
            }
        };
        self.expect_token(Token::RParen)?;
        Ok(width)
    }

    fn parse_literal_tuple(&mut self) -> Result<Vec<Spanned<Literal>>, ParseError> {
        self.expect_token(Token::LParen)?;
        let mut literals = vec![self.parse_literal()?];
        while self.accept(Token::Comma) {
            literals.push(self.parse_literal()?);
        }
        self.expect_token(Token::RParen)?;
        Ok(literals)
    }

    fn parse_literal(&mut self) -> Result<Spanned<Literal>, ParseError> {
        let tok = self.next_token()?;
        let literal = match tok.token {
            Token::Null => Literal::Null,
            Token::True => Literal::Bool(true),
            Token::False => Literal::Bool(false),
            Token::IntLit(n) => Literal::Int(n),
            Token::FloatLit(f) => Literal::Float(f),
            Token::String(s) => Literal::String(s),
            other => {
                return Err(ParseError::new(
                    format!("expected a literal value, found {:?}", other),
                    tok.span,
                ));
            }
        };
        Ok(Spanned::new(literal, tok.span))
    }

    // Token helpers

    fn next_token(&mut self) -> Result<SpannedToken, ParseError> {
        self.lexer
            .next()
            .ok_or_else(|| ParseError::new("unexpected end of input", self.lexer.eof_span()))
    }

    fn expect_token(&mut self, expected: Token) -> Result<SpannedToken, ParseError> {
        let tok = self.next_token()?;
        if tok.token == expected {
            Ok(tok)
        } else {
            Err(ParseError::new(
                format!("expected {:?}, found {:?}", expected, tok.token),
                tok.span,
            ))
        }
    }

    fn expect_ident(&mut self) -> Result<Spanned<String>, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Ident(name) => Ok(Spanned::new(name, tok.span)),
            other => Err(ParseError::new(
                format!("expected an identifier, found {:?}", other),
                tok.span,
            )),
        }
    }

    fn expect_string(&mut self) -> Result<Spanned<String>, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::String(s) => Ok(Spanned::new(s, tok.span)),
            other => Err(ParseError::new(
                format!("expected a string literal, found {:?}", other),
                tok.span,
            )),
        }
    }

    /// Consume the next token if it matches.
    fn accept(&mut self, expected: Token) -> bool {
        if matches!(self.lexer.peek(), Some(t) if t.token == expected) {
            self.lexer.next();
            true
        } else {
            false
        }
    }

    fn accept_if_not_exists(&mut self) -> Result<bool, ParseError> {
        if self.accept(Token::If) {
            self.expect_token(Token::Not)?;
            self.expect_token(Token::Exists)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn accept_if_exists(&mut self) -> Result<bool, ParseError> {
        if self.accept(Token::If) {
            self.expect_token(Token::Exists)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
