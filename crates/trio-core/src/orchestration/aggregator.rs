//! Fan-out aggregator
//!
//! Sends one input to a fixed, ordered set of roles concurrently and
//! collects every answer.

use super::types::{AggregateResponse, InvocationResult};
use crate::roles::{Responder, RoleContext};
use crate::{Result, TrioError};
use futures::future::join_all;
use std::collections::HashSet;

/// Dispatches input to every role and merges the results in declared order
pub struct FanOutAggregator {
    responders: Vec<Responder>,
    context: Option<RoleContext>,
}

impl FanOutAggregator {
    /// Build an aggregator; role names must be unique and the list non-empty
    pub fn new(responders: Vec<Responder>) -> Result<Self> {
        if responders.is_empty() {
            return Err(TrioError::invalid_input(
                "An aggregator needs at least one role",
            ));
        }

        let mut seen = HashSet::new();
        for responder in &responders {
            if !seen.insert(responder.name().to_string()) {
                return Err(TrioError::invalid_input(format!(
                    "Duplicate role name: {}",
                    responder.name()
                )));
            }
        }

        Ok(Self {
            responders,
            context: None,
        })
    }

    /// Context shared by every role (e.g. the personality being answered)
    pub fn with_context(mut self, context: RoleContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Fan `input` out to every role and wait for all of them.
    ///
    /// A failing role is recorded in its own result; the others are
    /// unaffected. Dropping the returned future cancels every in-flight call.
    pub async fn aggregate(&self, input: &str) -> Result<AggregateResponse> {
        if input.trim().is_empty() {
            return Err(TrioError::invalid_input("Discussion input must not be empty"));
        }

        let context = self.context.as_ref();
        let calls = self.responders.iter().map(|responder| async move {
            let result = responder.invoke(input, context).await;
            InvocationResult::from_result(responder.name(), result)
        });

        // join_all yields in input order regardless of completion order
        let responses = join_all(calls).await;

        let failed = responses.iter().filter(|r| !r.success).count();
        if failed > 0 {
            tracing::warn!(failed, total = responses.len(), "Aggregate has failed roles");
        }

        Ok(AggregateResponse { responses })
    }
}
