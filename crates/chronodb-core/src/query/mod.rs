//! Query pipeline: projection binding, cache classification, plan
//! selection, explain rendering, and execution.
//!
//! The stages before the executor are pure functions of the projection list
//! and the cache model, so the planner never touches storage and explain is
//! planning without execution.

pub mod executor;
pub mod explain;
pub mod expr;
pub mod planner;
pub mod rewrite;

pub use executor::{QueryExecutor, ResultSet};
pub use explain::render_plan;
pub use expr::{bind_projections, BoundProjection, ProjectionExpr};
pub use planner::{PhysicalPlan, PlanNode, PlanSelector};
pub use rewrite::{AggregateRewriter, Classification, ExprSource, QueryClassification};
