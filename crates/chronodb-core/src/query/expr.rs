//! Projection expressions, resolved against a table schema.

use chronodb_lang::{ColumnTarget, SelectExpr};

use crate::catalog::TableSchema;
use crate::error::Error;

/// A projection expression with column references resolved to indexes.
///
/// `last(*)` and `last_row(*)` are expanded at binding time, so a bound
/// projection list only ever refers to concrete columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionExpr {
    /// `last_row(col)` — the last row's value of a column (nulls included).
    LastRow(usize),
    /// `last(col)` — the last non-null value of a column.
    Last(usize),
    /// `count(*)` — total row count.
    CountStar,
    /// `count(col)` — non-null row count for a column.
    Count(usize),
    /// A bare column reference.
    Column(usize),
}

impl ProjectionExpr {
    /// Whether this is an aggregate expression.
    pub fn is_aggregate(&self) -> bool {
        !matches!(self, ProjectionExpr::Column(_))
    }
}

/// A bound projection with its output column label.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundProjection {
    /// The resolved expression.
    pub expr: ProjectionExpr,
    /// Output column label, e.g. `last_row(ts)`.
    pub label: String,
}

/// Resolve and expand a parsed projection list against a schema.
///
/// Unknown column names fail here, before any plan is built.
pub fn bind_projections(
    schema: &TableSchema,
    exprs: &[SelectExpr],
) -> Result<Vec<BoundProjection>, Error> {
    let mut bound = Vec::with_capacity(exprs.len());
    for expr in exprs {
        match expr {
            SelectExpr::Last(ColumnTarget::Star) => {
                for (index, col) in schema.columns().iter().enumerate() {
                    bound.push(BoundProjection {
                        expr: ProjectionExpr::Last(index),
                        label: format!("last({})", col.name),
                    });
                }
            }
            SelectExpr::LastRow(ColumnTarget::Star) => {
                for (index, col) in schema.columns().iter().enumerate() {
                    bound.push(BoundProjection {
                        expr: ProjectionExpr::LastRow(index),
                        label: format!("last_row({})", col.name),
                    });
                }
            }
            SelectExpr::Last(ColumnTarget::Named(name)) => {
                let index = resolve(schema, name)?;
                bound.push(BoundProjection {
                    expr: ProjectionExpr::Last(index),
                    label: format!("last({})", name),
                });
            }
            SelectExpr::LastRow(ColumnTarget::Named(name)) => {
                let index = resolve(schema, name)?;
                bound.push(BoundProjection {
                    expr: ProjectionExpr::LastRow(index),
                    label: format!("last_row({})", name),
                });
            }
            SelectExpr::Count(ColumnTarget::Star) => {
                bound.push(BoundProjection {
                    expr: ProjectionExpr::CountStar,
                    label: "count(*)".to_string(),
                });
            }
            SelectExpr::Count(ColumnTarget::Named(name)) => {
                let index = resolve(schema, name)?;
                bound.push(BoundProjection {
                    expr: ProjectionExpr::Count(index),
                    label: format!("count({})", name),
                });
            }
            SelectExpr::Column(name) => {
                let index = resolve(schema, name)?;
                bound.push(BoundProjection {
                    expr: ProjectionExpr::Column(index),
                    label: name.clone(),
                });
            }
        }
    }
    Ok(bound)
}

fn resolve(schema: &TableSchema, name: &str) -> Result<usize, Error> {
    schema
        .column_index(name)
        .ok_or_else(|| Error::Semantic(format!("unknown column '{}'", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDef, ColumnType};

    fn ts_id_schema() -> TableSchema {
        TableSchema::new(vec![
            ColumnDef::new("ts", ColumnType::Timestamp),
            ColumnDef::new("id", ColumnType::Int),
        ])
        .unwrap()
    }

    #[test]
    fn test_bind_named_columns() {
        let schema = ts_id_schema();
        let bound = bind_projections(
            &schema,
            &[
                SelectExpr::LastRow(ColumnTarget::Named("ts".into())),
                SelectExpr::Last(ColumnTarget::Named("id".into())),
            ],
        )
        .unwrap();

        assert_eq!(bound[0].expr, ProjectionExpr::LastRow(0));
        assert_eq!(bound[0].label, "last_row(ts)");
        assert_eq!(bound[1].expr, ProjectionExpr::Last(1));
        assert_eq!(bound[1].label, "last(id)");
    }

    #[test]
    fn test_last_star_expands_in_schema_order() {
        let schema = ts_id_schema();
        let bound = bind_projections(&schema, &[SelectExpr::Last(ColumnTarget::Star)]).unwrap();

        assert_eq!(bound.len(), 2);
        assert_eq!(bound[0].expr, ProjectionExpr::Last(0));
        assert_eq!(bound[0].label, "last(ts)");
        assert_eq!(bound[1].expr, ProjectionExpr::Last(1));
        assert_eq!(bound[1].label, "last(id)");
    }

    #[test]
    fn test_count_star() {
        let schema = ts_id_schema();
        let bound = bind_projections(&schema, &[SelectExpr::Count(ColumnTarget::Star)]).unwrap();
        assert_eq!(bound[0].expr, ProjectionExpr::CountStar);
        assert_eq!(bound[0].label, "count(*)");
    }

    #[test]
    fn test_unknown_column_fails() {
        let schema = ts_id_schema();
        let result = bind_projections(
            &schema,
            &[SelectExpr::Last(ColumnTarget::Named("missing".into()))],
        );
        assert!(matches!(result, Err(Error::Semantic(_))));
    }

    #[test]
    fn test_is_aggregate() {
        assert!(ProjectionExpr::Last(0).is_aggregate());
        assert!(ProjectionExpr::CountStar.is_aggregate());
        assert!(!ProjectionExpr::Column(0).is_aggregate());
    }
}
