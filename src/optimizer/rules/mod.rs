//! 重写规则集合

pub mod collapse_project;
pub mod merge_limits;
pub mod push_limit_down_project;
pub mod top_n;

pub use collapse_project::CollapseProjectRule;
pub use merge_limits::MergeLimitsRule;
pub use push_limit_down_project::PushLimitDownProjectRule;
pub use top_n::TopNRule;
