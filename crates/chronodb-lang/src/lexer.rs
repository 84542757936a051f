//! Lexer for the ChronoDB SQL dialect using logos.
//!
//! Keywords are matched case-insensitively; identifiers keep their source
//! spelling.

use crate::error::ParseError;
use crate::span::Span;
use logos::Logos;

/// Token types for the SQL dialect.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // Statement keywords
    #[regex(r"(?i)select", priority = 5)]
    Select,
    #[regex(r"(?i)from", priority = 5)]
    From,
    #[regex(r"(?i)create", priority = 5)]
    Create,
    #[regex(r"(?i)drop", priority = 5)]
    Drop,
    #[regex(r"(?i)database", priority = 5)]
    Database,
    #[regex(r"(?i)table", priority = 5)]
    Table,
    #[regex(r"(?i)stable", priority = 5)]
    Stable,
    #[regex(r"(?i)insert", priority = 5)]
    Insert,
    #[regex(r"(?i)into", priority = 5)]
    Into,
    #[regex(r"(?i)values", priority = 5)]
    Values,
    #[regex(r"(?i)using", priority = 5)]
    Using,
    #[regex(r"(?i)tags", priority = 5)]
    Tags,
    #[regex(r"(?i)cachemodel", priority = 5)]
    CacheModel,
    #[regex(r"(?i)explain", priority = 5)]
    Explain,
    #[regex(r"(?i)use", priority = 5)]
    Use,
    #[regex(r"(?i)if", priority = 5)]
    If,
    #[regex(r"(?i)not", priority = 5)]
    Not,
    #[regex(r"(?i)exists", priority = 5)]
    Exists,

    // Aggregate function keywords
    #[regex(r"(?i)count", priority = 5)]
    Count,
    #[regex(r"(?i)last_row", priority = 6)]
    LastRow,
    #[regex(r"(?i)last", priority = 5)]
    Last,

    // Column type keywords
    #[regex(r"(?i)timestamp", priority = 5)]
    Timestamp,
    #[regex(r"(?i)int", priority = 5)]
    Int,
    #[regex(r"(?i)bigint", priority = 6)]
    BigInt,
    #[regex(r"(?i)float", priority = 5)]
    Float,
    #[regex(r"(?i)double", priority = 5)]
    Double,
    #[regex(r"(?i)bool", priority = 5)]
    Bool,
    #[regex(r"(?i)binary", priority = 5)]
    Binary,
    #[regex(r"(?i)nchar", priority = 5)]
    NChar,

    // Literals
    #[regex(r"(?i)null", priority = 5)]
    Null,
    #[regex(r"(?i)true", priority = 5)]
    True,
    #[regex(r"(?i)false", priority = 5)]
    False,

    // Identifier
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string(), priority = 2)]
    Ident(String),

    // String literal (single-quoted, SQL style)
    #[regex(r"'([^'\\]|\\.)*'", |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len() - 1])
    })]
    String(String),

    // Integer literal
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok(), priority = 3)]
    IntLit(i64),

    // Float literal
    #[regex(r"-?[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok(), priority = 4)]
    FloatLit(f64),

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("*")]
    Star,
}

/// Unescape backslash escapes in a string literal.
fn unescape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('\'') => out.push('\''),
                Some('\\') => out.push('\\'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    /// The token.
    pub token: Token,
    /// The source span.
    pub span: Span,
}

/// Tokenize a source string.
///
/// Returns an error for any character sequence the lexer does not recognize.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ParseError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);
    while let Some(result) = lexer.next() {
        let span = Span::from(lexer.span());
        match result {
            Ok(token) => tokens.push(SpannedToken { token, span }),
            Err(()) => {
                return Err(ParseError::new(
                    format!("unrecognized token '{}'", lexer.slice()),
                    span,
                ));
            }
        }
    }
    Ok(tokens)
}

/// A peekable stream of tokens.
pub struct Lexer<'source> {
    tokens: Vec<SpannedToken>,
    pos: usize,
    source: &'source str,
}

impl<'source> Lexer<'source> {
    /// Tokenize the source into a stream.
    pub fn new(source: &'source str) -> Result<Self, ParseError> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
            source,
        })
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    /// Consume and return the next token.
    pub fn next(&mut self) -> Option<SpannedToken> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Span pointing at the end of the source, for unexpected-EOF errors.
    pub fn eof_span(&self) -> Span {
        Span::new(self.source.len(), self.source.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(kinds("SELECT"), vec![Token::Select]);
        assert_eq!(kinds("select"), vec![Token::Select]);
        assert_eq!(kinds("SeLeCt"), vec![Token::Select]);
    }

    #[test]
    fn test_last_vs_last_row() {
        assert_eq!(
            kinds("last(id), last_row(ts)"),
            vec![
                Token::Last,
                Token::LParen,
                Token::Ident("id".into()),
                Token::RParen,
                Token::Comma,
                Token::LastRow,
                Token::LParen,
                Token::Ident("ts".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            kinds("1699804800000 3.25 'both' null true"),
            vec![
                Token::IntLit(1699804800000),
                Token::FloatLit(3.25),
                Token::String("both".into()),
                Token::Null,
                Token::True,
            ]
        );
    }

    #[test]
    fn test_negative_int() {
        assert_eq!(kinds("-42"), vec![Token::IntLit(-42)]);
    }

    #[test]
    fn test_full_statement() {
        let tokens = kinds("create database d cachemodel 'last_row';");
        assert_eq!(
            tokens,
            vec![
                Token::Create,
                Token::Database,
                Token::Ident("d".into()),
                Token::CacheModel,
                Token::String("last_row".into()),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_unrecognized_token() {
        assert!(tokenize("select @").is_err());
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("use db1").unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 3));
        assert_eq!(tokens[1].span, Span::new(4, 7));
    }
}
