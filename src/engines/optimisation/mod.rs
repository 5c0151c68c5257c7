pub mod accessor;
pub mod grid_search;
pub mod parameter;

pub use accessor::{AccessorTable, AttributeAccess};
pub use grid_search::{CoordinateDescentOptimizer, GridSearchOutcome, Move, StopReason};
pub use parameter::{Domain, OptimizationParameter, ParamValue};
