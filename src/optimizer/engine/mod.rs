pub mod exploration;
pub mod optimizer;

pub use exploration::Explorer;
pub use optimizer::{Optimizer, RuleSet};
