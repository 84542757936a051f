//! Query execution over the cache and the row store.
//!
//! Each output value is computed from the source the rewriter assigned to
//! its expression. A cache-assigned expression reads the cache and falls
//! back to the store on a cold slot (after recovery the cache is empty but
//! the rows are not), so answers are identical in every cache model.

use tracing::debug;

use super::expr::{BoundProjection, ProjectionExpr};
use super::rewrite::{ExprSource, QueryClassification};
use crate::cache::LastCache;
use crate::catalog::TableDef;
use crate::error::Error;
use crate::storage::RowStore;
use crate::value::Value;

/// A materialized query result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    /// Output column labels, e.g. `last_row(ts)`.
    pub columns: Vec<String>,
    /// Result rows.
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// A result with labels but no rows.
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }
}

/// Executes a classified projection list against one table.
pub struct QueryExecutor<'a> {
    store: &'a RowStore,
    cache: &'a LastCache,
}

impl<'a> QueryExecutor<'a> {
    /// Create an executor over the given store and cache.
    pub fn new(store: &'a RowStore, cache: &'a LastCache) -> Self {
        Self { store, cache }
    }

    /// Execute the projection list and materialize the result.
    ///
    /// Aggregate queries yield one row, except that `last`/`last_row` over
    /// an empty table yields no rows (there is no last anything). A pure
    /// count over an empty table still yields its zero row.
    pub fn execute(
        &self,
        table: &TableDef,
        projections: &[BoundProjection],
        classification: &QueryClassification,
    ) -> Result<ResultSet, Error> {
        let columns: Vec<String> = projections.iter().map(|p| p.label.clone()).collect();

        if !classification.has_aggregates {
            return self.scan_select(table, projections, columns);
        }

        let table_is_empty = self.store.last_row(table.id)?.is_none();
        let has_last = projections.iter().any(|p| {
            matches!(
                p.expr,
                ProjectionExpr::Last(_) | ProjectionExpr::LastRow(_)
            )
        });
        if table_is_empty && has_last {
            return Ok(ResultSet::empty(columns));
        }

        let mut row = Vec::with_capacity(projections.len());
        for (projection, source) in projections.iter().zip(&classification.sources) {
            row.push(self.eval_aggregate(table, projection.expr, *source)?);
        }
        debug!(table = %table.name, exprs = row.len(), "executed aggregate query");
        Ok(ResultSet {
            columns,
            rows: vec![row],
        })
    }

    fn eval_aggregate(
        &self,
        table: &TableDef,
        expr: ProjectionExpr,
        source: ExprSource,
    ) -> Result<Value, Error> {
        match expr {
            ProjectionExpr::LastRow(col) => self.last_row_value(table, col, source),
            ProjectionExpr::Last(col) => match source {
                // last(ts) rides the row cache: the last row's timestamp is
                // its last non-null value.
                ExprSource::RowCache => self.last_row_value(table, col, source),
                ExprSource::ValueCache => {
                    if let Some(cached) = self.cache.last_value(table.id, col) {
                        return Ok(cached.value);
                    }
                    self.last_non_null_value(table, col)
                }
                ExprSource::Scan => self.last_non_null_value(table, col),
            },
            ProjectionExpr::CountStar => Ok(Value::Int64(self.store.row_count(table.id)? as i64)),
            ProjectionExpr::Count(col) => {
                Ok(Value::Int64(self.store.non_null_count(table.id, col)? as i64))
            }
            // The rewriter rejects bare columns among aggregates before
            // execution is reached.
            ProjectionExpr::Column(_) => Err(Error::Semantic(
                "cannot mix aggregate functions with plain columns without grouping".into(),
            )),
        }
    }

    fn last_row_value(
        &self,
        table: &TableDef,
        col: usize,
        source: ExprSource,
    ) -> Result<Value, Error> {
        if source == ExprSource::RowCache {
            if let Some(row) = self.cache.last_row(table.id) {
                return Ok(row.values.get(col).cloned().unwrap_or(Value::Null));
            }
        }
        match self.store.last_row(table.id)? {
            Some((_, values)) => Ok(values.get(col).cloned().unwrap_or(Value::Null)),
            None => Ok(Value::Null),
        }
    }

    /// Last non-null value of a column via reverse scan; an all-null column
    /// in a non-empty table answers NULL.
    fn last_non_null_value(&self, table: &TableDef, col: usize) -> Result<Value, Error> {
        Ok(self
            .store
            .last_non_null(table.id, col)?
            .map(|(value, _)| value)
            .unwrap_or(Value::Null))
    }

    /// Plain column select: full scan in timestamp order.
    fn scan_select(
        &self,
        table: &TableDef,
        projections: &[BoundProjection],
        columns: Vec<String>,
    ) -> Result<ResultSet, Error> {
        let mut rows = Vec::new();
        for (_, stored) in self.store.scan_rows(table.id)? {
            let row = projections
                .iter()
                .map(|p| match p.expr {
                    ProjectionExpr::Column(col) => {
                        stored.get(col).cloned().unwrap_or(Value::Null)
                    }
                    _ => Value::Null,
                })
                .collect();
            rows.push(row);
        }
        Ok(ResultSet { columns, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheModel;
    use crate::catalog::{ColumnDef, ColumnType, TableSchema};
    use crate::query::rewrite::AggregateRewriter;
    use crate::storage::StoreConfig;

    fn test_table() -> TableDef {
        TableDef {
            id: 1,
            name: "t1".into(),
            schema: TableSchema::new(vec![
                ColumnDef::new("ts", ColumnType::Timestamp),
                ColumnDef::new("id", ColumnType::Int),
            ])
            .unwrap(),
            stable: None,
            tag_values: Vec::new(),
        }
    }

    fn fixture(model: CacheModel) -> (RowStore, LastCache) {
        let store = RowStore::open(StoreConfig::temporary()).unwrap();
        let cache = LastCache::new();
        cache.register(1, 2);
        for i in 1..=3 {
            let row = vec![Value::Timestamp(i), Value::Int32(i as i32)];
            store.upsert(1, i, &row).unwrap();
            cache.apply(1, i, &row, model);
        }
        // Trailing row with a null payload
        let null_row = vec![Value::Timestamp(4), Value::Null];
        store.upsert(1, 4, &null_row).unwrap();
        cache.apply(1, 4, &null_row, model);
        (store, cache)
    }

    fn run(model: CacheModel, exprs: &[ProjectionExpr], labels: &[&str]) -> ResultSet {
        let (store, cache) = fixture(model);
        let projections: Vec<BoundProjection> = exprs
            .iter()
            .zip(labels)
            .map(|(&expr, &label)| BoundProjection {
                expr,
                label: label.to_string(),
            })
            .collect();
        let classification = AggregateRewriter::new(model).classify(&projections).unwrap();
        QueryExecutor::new(&store, &cache)
            .execute(&test_table(), &projections, &classification)
            .unwrap()
    }

    #[test]
    fn test_same_answers_in_every_model() {
        let exprs = [
            ProjectionExpr::LastRow(0),
            ProjectionExpr::LastRow(1),
            ProjectionExpr::Last(1),
            ProjectionExpr::CountStar,
        ];
        let labels = ["last_row(ts)", "last_row(id)", "last(id)", "count(*)"];
        let expected = vec![
            Value::Timestamp(4),
            Value::Null,
            Value::Int32(3),
            Value::Int64(4),
        ];
        for model in [
            CacheModel::None,
            CacheModel::LastRow,
            CacheModel::LastValue,
            CacheModel::Both,
        ] {
            let result = run(model, &exprs, &labels);
            assert_eq!(result.rows, vec![expected.clone()], "model {:?}", model);
        }
    }

    #[test]
    fn test_count_column_skips_nulls() {
        let result = run(
            CacheModel::Both,
            &[ProjectionExpr::CountStar, ProjectionExpr::Count(1)],
            &["count(*)", "count(id)"],
        );
        assert_eq!(result.rows, vec![vec![Value::Int64(4), Value::Int64(3)]]);
    }

    #[test]
    fn test_labels_carried_to_result() {
        let result = run(
            CacheModel::Both,
            &[ProjectionExpr::Last(0)],
            &["last(ts)"],
        );
        assert_eq!(result.columns, vec!["last(ts)"]);
        assert_eq!(result.rows, vec![vec![Value::Timestamp(4)]]);
    }

    #[test]
    fn test_empty_table_last_yields_no_rows() {
        let store = RowStore::open(StoreConfig::temporary()).unwrap();
        let cache = LastCache::new();
        cache.register(1, 2);
        let projections = vec![BoundProjection {
            expr: ProjectionExpr::Last(1),
            label: "last(id)".into(),
        }];
        let classification = AggregateRewriter::new(CacheModel::Both)
            .classify(&projections)
            .unwrap();
        let result = QueryExecutor::new(&store, &cache)
            .execute(&test_table(), &projections, &classification)
            .unwrap();
        assert_eq!(result.columns, vec!["last(id)"]);
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_empty_table_count_yields_zero_row() {
        let store = RowStore::open(StoreConfig::temporary()).unwrap();
        let cache = LastCache::new();
        cache.register(1, 2);
        let projections = vec![BoundProjection {
            expr: ProjectionExpr::CountStar,
            label: "count(*)".into(),
        }];
        let classification = AggregateRewriter::new(CacheModel::Both)
            .classify(&projections)
            .unwrap();
        let result = QueryExecutor::new(&store, &cache)
            .execute(&test_table(), &projections, &classification)
            .unwrap();
        assert_eq!(result.rows, vec![vec![Value::Int64(0)]]);
    }

    #[test]
    fn test_cold_cache_falls_back_to_store() {
        // Rows on disk, cache registered but never fed
        let store = RowStore::open(StoreConfig::temporary()).unwrap();
        let cache = LastCache::new();
        cache.register(1, 2);
        store
            .upsert(1, 7, &[Value::Timestamp(7), Value::Int32(70)])
            .unwrap();

        let projections = vec![
            BoundProjection {
                expr: ProjectionExpr::LastRow(1),
                label: "last_row(id)".into(),
            },
            BoundProjection {
                expr: ProjectionExpr::Last(1),
                label: "last(id)".into(),
            },
        ];
        let classification = AggregateRewriter::new(CacheModel::Both)
            .classify(&projections)
            .unwrap();
        let result = QueryExecutor::new(&store, &cache)
            .execute(&test_table(), &projections, &classification)
            .unwrap();
        assert_eq!(
            result.rows,
            vec![vec![Value::Int32(70), Value::Int32(70)]]
        );
    }

    #[test]
    fn test_plain_column_select_scans_all_rows() {
        let (store, cache) = fixture(CacheModel::Both);
        let projections = vec![
            BoundProjection {
                expr: ProjectionExpr::Column(0),
                label: "ts".into(),
            },
            BoundProjection {
                expr: ProjectionExpr::Column(1),
                label: "id".into(),
            },
        ];
        let classification = AggregateRewriter::new(CacheModel::Both)
            .classify(&projections)
            .unwrap();
        let result = QueryExecutor::new(&store, &cache)
            .execute(&test_table(), &projections, &classification)
            .unwrap();
        assert_eq!(result.rows.len(), 4);
        assert_eq!(result.rows[0], vec![Value::Timestamp(1), Value::Int32(1)]);
        assert_eq!(result.rows[3], vec![Value::Timestamp(4), Value::Null]);
    }
}
