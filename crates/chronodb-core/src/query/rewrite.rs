//! Aggregate rewriter: classifies projection expressions against the cache.
//!
//! Each bound expression is resolved to the source that can answer it under
//! the database's cache model, and the per-expression sources roll up into
//! an overall plan requirement. This stage is pure: no storage or cache
//! access, so every rule is unit-testable in isolation.

use tracing::debug;

use super::expr::{BoundProjection, ProjectionExpr};
use crate::cache::CacheModel;
use crate::error::Error;

/// Index of the primary timestamp column.
const TS_COLUMN: usize = 0;

/// Where a single expression's answer comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprSource {
    /// Served from the last-row cache.
    RowCache,
    /// Served from the per-column last-non-null cache.
    ValueCache,
    /// Requires visiting stored rows.
    Scan,
}

impl ExprSource {
    /// Whether the expression avoids the scan path.
    pub fn is_cached(&self) -> bool {
        !matches!(self, ExprSource::Scan)
    }
}

/// Overall plan requirement for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Every expression is cache-servable; no scan needed.
    CacheOnly,
    /// Some expressions are cache-servable, the rest need a scan.
    CacheAssistedScan,
    /// Nothing is cache-servable.
    ScanRequired,
}

/// Classification result for a whole projection list.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryClassification {
    /// Per-expression source, aligned with the bound projection list.
    pub sources: Vec<ExprSource>,
    /// Overall requirement.
    pub overall: Classification,
    /// Whether the projection list contains aggregates at all. A list of
    /// bare columns is a plain scan select, not an aggregate query.
    pub has_aggregates: bool,
}

/// Classifies aggregate projections against a database's cache model.
pub struct AggregateRewriter {
    model: CacheModel,
}

impl AggregateRewriter {
    /// Create a rewriter for the given cache model.
    pub fn new(model: CacheModel) -> Self {
        Self { model }
    }

    /// Classify a bound projection list.
    ///
    /// Fails with a semantic error when bare columns are mixed with
    /// aggregates (no grouping in this dialect), before any plan exists.
    pub fn classify(
        &self,
        projections: &[BoundProjection],
    ) -> Result<QueryClassification, Error> {
        let has_aggregates = projections.iter().any(|p| p.expr.is_aggregate());
        let has_bare_columns = projections.iter().any(|p| !p.expr.is_aggregate());
        if has_aggregates && has_bare_columns {
            return Err(Error::Semantic(
                "cannot mix aggregate functions with plain columns without grouping".into(),
            ));
        }

        let sources: Vec<ExprSource> = projections
            .iter()
            .map(|p| self.classify_expr(p.expr))
            .collect();

        let cached = sources.iter().filter(|s| s.is_cached()).count();
        let overall = if cached == sources.len() && !sources.is_empty() {
            Classification::CacheOnly
        } else if cached > 0 {
            Classification::CacheAssistedScan
        } else {
            Classification::ScanRequired
        };

        debug!(
            model = self.model.as_str(),
            ?overall,
            exprs = sources.len(),
            cached,
            "classified projection list"
        );

        Ok(QueryClassification {
            sources,
            overall,
            has_aggregates,
        })
    }

    fn classify_expr(&self, expr: ProjectionExpr) -> ExprSource {
        match expr {
            // last_row() answers come from the row cache and nowhere else:
            // the value cache cannot reproduce a null in the last row.
            ProjectionExpr::LastRow(_) => {
                if self.model.allows_row_cache() {
                    ExprSource::RowCache
                } else {
                    ExprSource::Scan
                }
            }
            // last(ts) degenerates to the last row's timestamp (ts is never
            // null), so either cache side can answer it.
            ProjectionExpr::Last(TS_COLUMN) => {
                if self.model.allows_row_cache() {
                    ExprSource::RowCache
                } else if self.model.allows_value_cache() {
                    ExprSource::ValueCache
                } else {
                    ExprSource::Scan
                }
            }
            // last(col) needs the last non-null value, which the row cache
            // does not track.
            ProjectionExpr::Last(_) => {
                if self.model.allows_value_cache() {
                    ExprSource::ValueCache
                } else {
                    ExprSource::Scan
                }
            }
            // count always visits every row.
            ProjectionExpr::CountStar | ProjectionExpr::Count(_) => ExprSource::Scan,
            ProjectionExpr::Column(_) => ExprSource::Scan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound(exprs: &[ProjectionExpr]) -> Vec<BoundProjection> {
        exprs
            .iter()
            .map(|&expr| BoundProjection {
                expr,
                label: format!("{:?}", expr),
            })
            .collect()
    }

    fn classify(model: CacheModel, exprs: &[ProjectionExpr]) -> QueryClassification {
        AggregateRewriter::new(model).classify(&bound(exprs)).unwrap()
    }

    #[test]
    fn test_none_model_everything_scans() {
        let result = classify(
            CacheModel::None,
            &[
                ProjectionExpr::LastRow(0),
                ProjectionExpr::Last(0),
                ProjectionExpr::Last(1),
            ],
        );
        assert!(result.sources.iter().all(|s| *s == ExprSource::Scan));
        assert_eq!(result.overall, Classification::ScanRequired);
    }

    #[test]
    fn test_both_model_pure_last_is_cache_only() {
        let result = classify(
            CacheModel::Both,
            &[
                ProjectionExpr::LastRow(0),
                ProjectionExpr::Last(0),
                ProjectionExpr::LastRow(1),
                ProjectionExpr::Last(1),
            ],
        );
        assert_eq!(result.overall, Classification::CacheOnly);
    }

    #[test]
    fn test_count_forces_scan_even_in_both_model() {
        let result = classify(
            CacheModel::Both,
            &[ProjectionExpr::Last(1), ProjectionExpr::CountStar],
        );
        assert_eq!(result.sources[0], ExprSource::ValueCache);
        assert_eq!(result.sources[1], ExprSource::Scan);
        assert_eq!(result.overall, Classification::CacheAssistedScan);
    }

    #[test]
    fn test_last_row_needs_row_cache() {
        // Value-only model cannot serve last_row, even for ts
        let result = classify(
            CacheModel::LastValue,
            &[ProjectionExpr::LastRow(0), ProjectionExpr::Last(1)],
        );
        assert_eq!(result.sources[0], ExprSource::Scan);
        assert_eq!(result.sources[1], ExprSource::ValueCache);
        assert_eq!(result.overall, Classification::CacheAssistedScan);
    }

    #[test]
    fn test_last_ts_served_by_either_cache() {
        let row_only = classify(CacheModel::LastRow, &[ProjectionExpr::Last(0)]);
        assert_eq!(row_only.sources[0], ExprSource::RowCache);
        assert_eq!(row_only.overall, Classification::CacheOnly);

        let value_only = classify(CacheModel::LastValue, &[ProjectionExpr::Last(0)]);
        assert_eq!(value_only.sources[0], ExprSource::ValueCache);
        assert_eq!(value_only.overall, Classification::CacheOnly);
    }

    #[test]
    fn test_last_value_not_served_by_row_cache() {
        // Row-cache-only model: last(col) still needs the scan because the
        // last row may hold a null there.
        let result = classify(CacheModel::LastRow, &[ProjectionExpr::Last(1)]);
        assert_eq!(result.sources[0], ExprSource::Scan);
        assert_eq!(result.overall, Classification::ScanRequired);
    }

    #[test]
    fn test_mixing_bare_column_with_aggregates_fails() {
        for model in [
            CacheModel::None,
            CacheModel::LastRow,
            CacheModel::LastValue,
            CacheModel::Both,
        ] {
            let result = AggregateRewriter::new(model).classify(&bound(&[
                ProjectionExpr::Last(1),
                ProjectionExpr::LastRow(0),
                ProjectionExpr::Column(0),
            ]));
            assert!(matches!(result, Err(Error::Semantic(_))));
        }
    }

    #[test]
    fn test_bare_columns_only_is_plain_scan() {
        let result = classify(
            CacheModel::Both,
            &[ProjectionExpr::Column(0), ProjectionExpr::Column(1)],
        );
        assert!(!result.has_aggregates);
        assert_eq!(result.overall, Classification::ScanRequired);
    }

    #[test]
    fn test_count_only_query() {
        let result = classify(CacheModel::Both, &[ProjectionExpr::CountStar]);
        assert!(result.has_aggregates);
        assert_eq!(result.overall, Classification::ScanRequired);
    }
}
