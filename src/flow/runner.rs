use chrono::Utc;
use log::{info, warn};
use uuid::Uuid;

use super::types::{Flow, FlowReport, StepReport};
use crate::primitives::Dispatcher;

/// Runs flows step by step against one variable store.
///
/// A failed primitive never stops the run: its outputs stay unset and the following steps see
/// that, exactly as a host state machine would.
pub struct FlowRunner {
    dispatcher: Dispatcher,
}

impl FlowRunner {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn run(&self, flow: Flow) -> FlowReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut variables = flow.variables;
        let mut steps = Vec::with_capacity(flow.steps.len());

        info!("[{}] Running flow with {} steps", run_id, flow.steps.len());

        for (index, step) in flow.steps.iter().enumerate() {
            let step_started = Utc::now();
            let outcome =
                self.dispatcher
                    .invoke(step.primitive, &step.inputs, &step.outputs, &mut variables);
            if let Some(e) = outcome.error() {
                warn!("[{}] Step {} ({}) failed: {}", run_id, index, step.primitive, e);
            }
            steps.push(StepReport {
                index,
                primitive: step.primitive.name().to_string(),
                started_at: step_started,
                completed: outcome.is_completed(),
                error: outcome.error().map(|e| e.to_string()),
            });
        }

        let report = FlowReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            steps,
            variables,
        };
        info!(
            "[{}] Flow finished: {} steps, {} failed",
            run_id,
            report.steps.len(),
            report.failed_steps()
        );
        report
    }
}
