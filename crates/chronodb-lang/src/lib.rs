//! ChronoDB SQL dialect
//!
//! This crate provides a lexer and parser for the small SQL dialect that
//! ChronoDB understands: database/table DDL, inserts, and unfiltered
//! single-table aggregate selects.
//!
//! # Syntax
//!
//! ```text
//! CREATE DATABASE [IF NOT EXISTS] db [CACHEMODEL 'none|last_row|last_value|both']
//! DROP DATABASE [IF EXISTS] db
//! USE db
//! CREATE STABLE st (ts TIMESTAMP, id INT) TAGS (tid INT)
//! CREATE TABLE t USING st TAGS (1)
//! CREATE TABLE t (ts TIMESTAMP, id INT)
//! DROP STABLE st
//! DROP TABLE [IF EXISTS] t
//! INSERT INTO t [(ts, id)] VALUES (1699804800000, 0)[, (...)]
//! SELECT last_row(ts), last(*), count(*) FROM t
//! EXPLAIN SELECT last(id) FROM t
//! ```
//!
//! # Usage
//!
//! ```rust
//! use chronodb_lang::{parse, Statement};
//!
//! let stmt = parse("select last(id) from t").unwrap();
//! assert!(matches!(stmt, Statement::Select(_)));
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

// Re-export main types
pub use ast::{
    ColumnSpec, ColumnTarget, CreateTableBody, Literal, SelectExpr, SelectStatement, Statement,
    TypeName,
};
pub use error::ParseError;
pub use span::{Span, Spanned};

/// Parse a source string into a statement.
///
/// # Example
///
/// ```rust
/// use chronodb_lang::parse;
///
/// let stmt = parse("create database d cachemodel 'both'").unwrap();
/// ```
pub fn parse(source: &str) -> Result<Statement, ParseError> {
    parser::parse(source)
}

/// Tokenize a source string (for debugging/testing).
pub fn tokenize(source: &str) -> Result<Vec<lexer::SpannedToken>, ParseError> {
    lexer::tokenize(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select() {
        let stmt = parse("select last_row(ts), last(*) from test_t1;").unwrap();
        assert!(matches!(stmt, Statement::Select(_)));
    }

    #[test]
    fn test_parse_error_with_source_context() {
        let source = "select last() from t";
        let err = parse(source).unwrap_err();
        let formatted = err.format_with_source(source);
        assert!(formatted.contains("line 1"));
        assert!(formatted.contains("error"));
    }
}
