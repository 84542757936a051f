//! Table schema definitions.

use crate::error::Error;
use crate::value::Value;
use chronodb_lang::TypeName;

/// Engine-unique table identifier, allocated at table creation.
pub type TableId = u64;

/// Column types supported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Millisecond timestamp; column 0 is always this type.
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

impl From<TypeName> for ColumnType {
    fn from(ty: TypeName) -> Self {
        match ty {
            TypeName::Timestamp => ColumnType::Timestamp,
            TypeName::Int => ColumnType::Int,
            TypeName::BigInt => ColumnType::BigInt,
            TypeName::Float => ColumnType::Float,
            TypeName::Double => ColumnType::Double,
            TypeName::Bool => ColumnType::Bool,
            TypeName::Binary(w) => ColumnType::Binary(w),
            TypeName::NChar(w) => ColumnType::NChar(w),
        }
    }
}

impl ColumnType {
    /// Coerce a parsed literal to a value of this column type.
    ///
    /// Integer literals widen or narrow to the declared integer width and
    /// feed float and timestamp columns; anything else must match the
    /// column type exactly.
    pub fn coerce(&self, value: Value) -> Result<Value, Error> {
        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),
            (ColumnType::Timestamp, Value::Int64(n)) => Ok(Value::Timestamp(n)),
            (ColumnType::Timestamp, Value::Timestamp(n)) => Ok(Value::Timestamp(n)),
            (ColumnType::Int, Value::Int64(n)) => {
                let narrowed = i32::try_from(n).map_err(|_| {
                    Error::Semantic(format!("value {} out of range for INT column", n))
                })?;
                Ok(Value::Int32(narrowed))
            }
            (ColumnType::Int, v @ Value::Int32(_)) => Ok(v),
            (ColumnType::BigInt, v @ Value::Int64(_)) => Ok(v),
            (ColumnType::BigInt, Value::Int32(n)) => Ok(Value::Int64(n as i64)),
            (ColumnType::Float | ColumnType::Double, v @ Value::Float64(_)) => Ok(v),
            (ColumnType::Float | ColumnType::Double, Value::Int64(n)) => {
                Ok(Value::Float64(n as f64))
            }
            (ColumnType::Float | ColumnType::Double, Value::Int32(n)) => {
                Ok(Value::Float64(n as f64))
            }
            (ColumnType::Bool, v @ Value::Bool(_)) => Ok(v),
            (ColumnType::Binary(_) | ColumnType::NChar(_), v @ Value::String(_)) => Ok(v),
            (ty, v) => Err(Error::Semantic(format!(
                "value {:?} is not valid for a {:?} column",
                v, ty
            ))),
        }
    }
}

/// A column definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Column type.
    pub ty: ColumnType,
}

impl ColumnDef {
    /// Create a new column definition.
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// An ordered table schema. Column 0 is the primary timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Create a schema, validating the timestamp-first rule and name
    /// uniqueness.
    pub fn new(columns: Vec<ColumnDef>) -> Result<Self, Error> {
        if columns.is_empty() {
            return Err(Error::Semantic("a table needs at least one column".into()));
        }
        if columns[0].ty != ColumnType::Timestamp {
            return Err(Error::Semantic(
                "the first column must be a TIMESTAMP".into(),
            ));
        }
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(Error::Semantic(format!(
                    "duplicate column name '{}'",
                    col.name
                )));
            }
        }
        Ok(Self { columns })
    }

    /// All columns in order.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Look up a column index by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Name of the primary timestamp column.
    pub fn timestamp_column(&self) -> &str {
        &self.columns[0].name
    }
}

/// A super-table definition: shared schema plus tag columns.
#[derive(Debug, Clone, PartialEq)]
pub struct StableDef {
    /// Super-table name.
    pub name: String,
    /// Data column schema shared by all sub-tables.
    pub schema: TableSchema,
    /// Tag column definitions.
    pub tags: Vec<ColumnDef>,
}

/// A concrete (sub-)table definition.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    /// Engine-unique table id, used as the cache arena and row key index.
    pub id: TableId,
    /// Table name.
    pub name: String,
    /// Column schema.
    pub schema: TableSchema,
    /// Owning super-table, if created via USING.
    pub stable: Option<String>,
    /// Tag values, aligned to the stable's tag columns.
    pub tag_values: Vec<Value>,
}
