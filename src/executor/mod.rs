pub mod apply;
pub mod planner;

pub use apply::*;
pub use planner::*;
