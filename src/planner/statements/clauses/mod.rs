//! 子句规划器集合

pub mod clause_planner;
pub mod group_clause_planner;
pub mod match_clause_planner;
pub mod order_by_planner;
pub mod pagination_planner;
pub mod return_clause_planner;
pub mod unwind_planner;
pub mod where_clause_planner;
pub mod with_clause_planner;

pub use clause_planner::ClausePlanner;
pub use group_clause_planner::GroupClausePlanner;
pub use match_clause_planner::MatchClausePlanner;
pub use order_by_planner::OrderByClausePlanner;
pub use pagination_planner::PaginationPlanner;
pub use return_clause_planner::ReturnClausePlanner;
pub use unwind_planner::UnwindClausePlanner;
pub use where_clause_planner::WhereClausePlanner;
pub use with_clause_planner::WithClausePlanner;
