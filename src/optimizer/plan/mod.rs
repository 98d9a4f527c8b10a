pub mod context;
pub mod group;
pub mod node;

pub use context::OptContext;
pub use group::OptGroup;
pub use node::{
    GroupId, GroupNodeId, MatchNode, MatchedResult, OptGroupNode, OptRule, OptimizerError,
    Pattern, TransformResult,
};
