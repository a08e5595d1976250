//! File and batch planning
//!
//! See [`planner::BatchPlanner`].

pub mod planner;

pub use planner::{BatchPlan, BatchPlanner, RecordCaps, SequenceGroup, SubBatch, DEFAULT_PAGE_SIZE};
