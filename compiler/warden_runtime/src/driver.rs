//! Pumps suspended steps to completion.

use std::cell::Cell;
use std::rc::Rc;

use crate::step::{Flow, Handler, Resume, Step};
use crate::value::Value;

/// Cooperative cancellation flag, checked at every resume point.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Rc<Cell<bool>>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Limits applied by a [`Driver`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DriverConfig {
    /// Maximum number of resumptions before giving up. `None` is unlimited.
    pub step_budget: Option<u64>,
}

/// Why a driver stopped before the computation finished.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    #[error("evaluation cancelled after {steps} steps")]
    Cancelled { steps: u64 },
    #[error("step budget exhausted after {steps} steps")]
    StepBudgetExhausted { steps: u64 },
}

/// Runs a [`Step`] by feeding its requests to a [`Handler`].
///
/// Nested suspensions resolve in strict stack order: whatever the handler
/// returns for a request is driven to its end before the step that issued
/// the request is resumed.
#[derive(Clone, Debug, Default)]
pub struct Driver {
    config: DriverConfig,
    cancellation: Option<CancellationToken>,
}

impl Driver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DriverConfig) -> Self {
        Driver {
            config,
            cancellation: None,
        }
    }

    #[must_use]
    pub fn step_budget(mut self, budget: u64) -> Self {
        self.config.step_budget = Some(budget);
        self
    }

    #[must_use]
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    #[tracing::instrument(level = "debug", skip_all, fields(budget = ?self.config.step_budget))]
    pub fn run<T: 'static>(
        &self,
        step: Step<T>,
        handler: &mut dyn Handler,
    ) -> Result<Flow<T>, DriverError> {
        let mut steps = 0;
        let mut current = step;
        loop {
            match current {
                Step::Ready(flow) => {
                    tracing::trace!(steps, "finished");
                    return Ok(flow);
                }
                Step::Suspended { request, resume } => {
                    self.tick(&mut steps)?;
                    let answer = self.resolve(handler.handle(request), handler, &mut steps)?;
                    current = resume(answer);
                }
            }
        }
    }

    /// Drive a handler-produced step to its end, keeping the continuations
    /// of its own nested requests on an explicit stack.
    fn resolve(
        &self,
        step: Step<Value>,
        handler: &mut dyn Handler,
        steps: &mut u64,
    ) -> Result<Flow<Value>, DriverError> {
        let mut pending: Vec<Resume<Value>> = Vec::new();
        let mut current = step;
        loop {
            match current {
                Step::Ready(flow) => match pending.pop() {
                    Some(resume) => current = resume(flow),
                    None => return Ok(flow),
                },
                Step::Suspended { request, resume } => {
                    self.tick(steps)?;
                    pending.push(resume);
                    current = handler.handle(request);
                }
            }
        }
    }

    fn tick(&self, steps: &mut u64) -> Result<(), DriverError> {
        if self
            .cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            tracing::debug!(steps = *steps, "evaluation cancelled");
            return Err(DriverError::Cancelled { steps: *steps });
        }
        if self.config.step_budget.is_some_and(|budget| *steps >= budget) {
            tracing::debug!(steps = *steps, "step budget exhausted");
            return Err(DriverError::StepBudgetExhausted { steps: *steps });
        }
        *steps += 1;
        Ok(())
    }
}
