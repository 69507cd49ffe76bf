//! Orchestration module
//!
//! Composes roles into the two interaction patterns:
//! - Fan-out discussion: one input, every role answers concurrently
//! - Bounded retry cycle: produce, validate, fix until the tester is happy

mod aggregator;
mod coordinator;
mod service;
mod types;

pub use aggregator::FanOutAggregator;
pub use coordinator::{CycleEvent, CycleStage, CycleState, RetryCoordinator, SentinelMatcher};
pub use service::{AudioDiscussion, OrchestrationService};
pub use types::{
    AggregateResponse, CycleOutcome, CycleReport, ErrorDetail, InvocationResult, RetestReport,
};
