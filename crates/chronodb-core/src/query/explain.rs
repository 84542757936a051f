//! Plan rendering for EXPLAIN output.
//!
//! Explain is planning without execution: the rendered lines come straight
//! from the selected plan, so re-running explain against an unchanged table
//! yields the same node set.

use super::planner::{PhysicalPlan, PlanNode};

/// Render a physical plan as one description line per node.
///
/// Scan nodes name the table they read; structural nodes are indented under
/// the projection root.
pub fn render_plan(plan: &PhysicalPlan, table: &str) -> Vec<String> {
    let has_merge = plan.has_node(PlanNode::Merge);
    plan.nodes
        .iter()
        .map(|node| {
            let depth = match node {
                PlanNode::Project => 0,
                PlanNode::Merge => 1,
                PlanNode::LastRowScan | PlanNode::TableScan => {
                    if has_merge {
                        2
                    } else {
                        1
                    }
                }
            };
            let indent = "   ".repeat(depth);
            match node {
                PlanNode::LastRowScan | PlanNode::TableScan => {
                    format!("{}-> {} on {}", indent, node.label(), table)
                }
                _ => format!("{}-> {}", indent, node.label()),
            }
        })
        .collect()
}
