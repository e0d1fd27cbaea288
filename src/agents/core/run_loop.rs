//! Polling state machine driving a remote run to completion

use std::time::Duration;

use tracing::{debug, info, warn};

use super::dispatch::dispatch;
use crate::agents::error::{AgentError, AgentResult};
use crate::agents::llm::AssistantService;
use crate::domain::{Confirmer, Run, RunStatus, ToolDescriptor, ToolOutput};

/// Everything one run needs besides the service
pub struct RunContext<'a> {
    pub thread_id: &'a str,
    pub tools: &'a [ToolDescriptor],
    pub confirmer: &'a dyn Confirmer,
    pub use_commands: bool,
    pub confirm_commands: bool,
    pub poll_interval: Duration,
    pub max_iterations: u32,
}

/// Poll `run` until it completes.
///
/// Each status check follows a sleep. Waiting statuses consume one iteration;
/// a tool-call round resets the counter since the wait was on the local side.
pub async fn drive_run(
    service: &dyn AssistantService,
    ctx: &RunContext<'_>,
    run: Run,
) -> AgentResult<Run> {
    let run_id = run.id;
    let mut iterations: u32 = 0;

    loop {
        if iterations >= ctx.max_iterations {
            return Err(AgentError::Timeout {
                iterations: ctx.max_iterations,
            });
        }
        iterations += 1;

        tokio::time::sleep(ctx.poll_interval).await;
        let run = service.retrieve_run(ctx.thread_id, &run_id).await?;
        debug!(run_id = %run_id, status = %run.status, iteration = iterations, "Polled run");

        match run.status {
            RunStatus::Queued | RunStatus::InProgress => continue,
            RunStatus::Completed => {
                info!(run_id = %run_id, "Run completed");
                return Ok(run);
            }
            RunStatus::RequiresAction => {
                iterations = 0;
                let outputs = match handle_required_action(ctx, &run) {
                    Ok(outputs) => outputs,
                    Err(e) => {
                        cancel_quietly(service, ctx.thread_id, &run_id).await;
                        return Err(e);
                    }
                };
                service
                    .submit_tool_outputs(ctx.thread_id, &run_id, &outputs)
                    .await?;
            }
            RunStatus::Cancelling
            | RunStatus::Cancelled
            | RunStatus::Failed
            | RunStatus::Expired => {
                return Err(AgentError::RunFailed {
                    status: run.status.to_string(),
                });
            }
            RunStatus::Other(status) => return Err(AgentError::UnexpectedStatus(status)),
        }
    }
}

/// Run the requested batch locally and package the outputs
fn handle_required_action(ctx: &RunContext<'_>, run: &Run) -> AgentResult<Vec<ToolOutput>> {
    if !ctx.use_commands {
        return Err(AgentError::ToolsDisabled);
    }

    let calls = run.tool_calls();
    if calls.is_empty() {
        return Err(AgentError::UnsupportedResponse(
            "requires_action without tool calls".to_string(),
        ));
    }
    debug!(count = calls.len(), "Dispatching tool calls");

    let confirmer = ctx.confirm_commands.then_some(ctx.confirmer);
    let results = dispatch(ctx.tools, &calls, confirmer)?;
    Ok(results.iter().map(|r| r.to_output()).collect())
}

/// Cancel a run that will not receive tool outputs; failures are only logged
async fn cancel_quietly(service: &dyn AssistantService, thread_id: &str, run_id: &str) {
    if let Err(e) = service.cancel_run(thread_id, run_id).await {
        warn!(run_id, "Failed to cancel run: {}", e);
    }
}
