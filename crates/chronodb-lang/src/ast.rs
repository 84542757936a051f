//! Abstract Syntax Tree types for the SQL dialect.

use crate::span::{Span, Spanned};

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE DATABASE [IF NOT EXISTS] name [CACHEMODEL '...'].
    CreateDatabase {
        /// Database name.
        name: Spanned<String>,
        /// Skip if the database already exists.
        if_not_exists: bool,
        /// Cache model string from the CACHEMODEL clause.
        cache_model: Option<Spanned<String>>,
    },
    /// DROP DATABASE [IF EXISTS] name.
    DropDatabase {
        /// Database name.
        name: Spanned<String>,
        /// Ignore a missing database.
        if_exists: bool,
    },
    /// USE name.
    Use {
        /// Database name.
        name: Spanned<String>,
    },
    /// CREATE STABLE name (cols) TAGS (cols).
    CreateStable {
        /// Super-table name.
        name: Spanned<String>,
        /// Data columns; the first must be the timestamp.
        columns: Vec<ColumnSpec>,
        /// Tag columns.
        tags: Vec<ColumnSpec>,
    },
    /// DROP STABLE [IF EXISTS] name.
    DropStable {
        /// Super-table name.
        name: Spanned<String>,
        /// Ignore a missing stable.
        if_exists: bool,
    },
    /// CREATE TABLE name USING stable TAGS (...) or CREATE TABLE name (cols).
    CreateTable {
        /// Table name.
        name: Spanned<String>,
        /// Table body.
        body: CreateTableBody,
    },
    /// DROP TABLE [IF EXISTS] name.
    DropTable {
        /// Table name.
        name: Spanned<String>,
        /// Ignore a missing table.
        if_exists: bool,
    },
    /// INSERT INTO table [(cols)] VALUES (...), (...).
    Insert {
        /// Target table name.
        table: Spanned<String>,
        /// Explicit column list, if present.
        columns: Option<Vec<Spanned<String>>>,
        /// One literal tuple per row.
        rows: Vec<Vec<Spanned<Literal>>>,
    },
    /// SELECT ... FROM table.
    Select(SelectStatement),
    /// EXPLAIN SELECT ...
    Explain(SelectStatement),
}

/// Body of a CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateTableBody {
    /// Sub-table created from a super-table with tag values.
    Using {
        /// Super-table name.
        stable: Spanned<String>,
        /// Tag literal values, aligned to the stable's tag columns.
        tags: Vec<Spanned<Literal>>,
    },
    /// Standalone table with its own column list.
    Columns(Vec<ColumnSpec>),
}

/// A SELECT statement over a single table.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Projection list in source order.
    pub projections: Vec<Spanned<SelectExpr>>,
    /// Source table name.
    pub table: Spanned<String>,
    /// Full span of the statement.
    pub span: Span,
}

/// A single projection expression.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectExpr {
    /// last(col) or last(*).
    Last(ColumnTarget),
    /// last_row(col) or last_row(*).
    LastRow(ColumnTarget),
    /// count(col) or count(*).
    Count(ColumnTarget),
    /// A bare column reference.
    Column(String),
}

/// Argument of an aggregate function.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnTarget {
    /// `*` — all columns.
    Star,
    /// A named column.
    Named(String),
}

/// A column definition in DDL.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Column name.
    pub name: Spanned<String>,
    /// Declared type.
    pub ty: TypeName,
}

/// Column type names accepted by the DDL grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeName {
    /// Primary or auxiliary timestamp.
    Timestamp,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    BigInt,
    /// 32-bit float (stored as f64).
    Float,
    /// 64-bit float.
    Double,
    /// Boolean.
    Bool,
    /// Variable-length bytes with a declared width.
    Binary(u32),
    /// Variable-length unicode with a declared width.
    NChar(u32),
}

/// A literal value in INSERT or TAGS clauses.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// NULL.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    String(String),
}
