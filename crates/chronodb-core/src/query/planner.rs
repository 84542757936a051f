//! Physical plan selection from a query classification.

use super::rewrite::{Classification, QueryClassification};

/// A node in the physical plan tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanNode {
    /// Read from the last-value cache (both row and per-column reads).
    LastRowScan,
    /// Read stored rows.
    TableScan,
    /// Combine cache reads with scan results.
    Merge,
    /// Assemble the output row.
    Project,
}

impl PlanNode {
    /// Human-readable label used in explain output.
    pub fn label(&self) -> &'static str {
        match self {
            PlanNode::LastRowScan => "Last Row Scan",
            PlanNode::TableScan => "Table Scan",
            PlanNode::Merge => "Merge",
            PlanNode::Project => "Project",
        }
    }
}

/// A physical plan: the node set for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalPlan {
    /// Plan nodes, root first.
    pub nodes: Vec<PlanNode>,
}

impl PhysicalPlan {
    /// Whether the plan contains a node.
    pub fn has_node(&self, node: PlanNode) -> bool {
        self.nodes.contains(&node)
    }
}

/// Selects the physical plan shape for a classified query.
///
/// Deterministic and one-shot: the same classification always yields the
/// same node set.
pub struct PlanSelector;

impl PlanSelector {
    /// Build the plan for a classification.
    pub fn select(classification: &QueryClassification) -> PhysicalPlan {
        let nodes = match classification.overall {
            Classification::CacheOnly => {
                vec![PlanNode::Project, PlanNode::LastRowScan]
            }
            Classification::CacheAssistedScan => vec![
                PlanNode::Project,
                PlanNode::Merge,
                PlanNode::LastRowScan,
                PlanNode::TableScan,
            ],
            Classification::ScanRequired => {
                vec![PlanNode::Project, PlanNode::TableScan]
            }
        };
        PhysicalPlan { nodes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::rewrite::ExprSource;

    fn classification(overall: Classification, sources: Vec<ExprSource>) -> QueryClassification {
        QueryClassification {
            sources,
            overall,
            has_aggregates: true,
        }
    }

    #[test]
    fn test_cache_only_has_no_table_scan() {
        let plan = PlanSelector::select(&classification(
            Classification::CacheOnly,
            vec![ExprSource::RowCache, ExprSource::ValueCache],
        ));
        assert!(plan.has_node(PlanNode::LastRowScan));
        assert!(!plan.has_node(PlanNode::TableScan));
        assert!(!plan.has_node(PlanNode::Merge));
    }

    #[test]
    fn test_cache_assisted_scan_has_both_nodes() {
        let plan = PlanSelector::select(&classification(
            Classification::CacheAssistedScan,
            vec![ExprSource::ValueCache, ExprSource::Scan],
        ));
        assert!(plan.has_node(PlanNode::LastRowScan));
        assert!(plan.has_node(PlanNode::TableScan));
        assert!(plan.has_node(PlanNode::Merge));
    }

    #[test]
    fn test_scan_required_has_no_last_row_scan() {
        let plan = PlanSelector::select(&classification(
            Classification::ScanRequired,
            vec![ExprSource::Scan],
        ));
        assert!(!plan.has_node(PlanNode::LastRowScan));
        assert!(plan.has_node(PlanNode::TableScan));
    }

    #[test]
    fn test_plan_is_deterministic() {
        let input = classification(
            Classification::CacheAssistedScan,
            vec![ExprSource::RowCache, ExprSource::Scan],
        );
        assert_eq!(PlanSelector::select(&input), PlanSelector::select(&input));
    }
}
