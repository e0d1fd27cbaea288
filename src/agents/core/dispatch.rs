//! Tool-call dispatch: resolve requested calls, confirm, run, collect results

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::agents::error::{AgentError, AgentResult};
use crate::domain::{Confirmer, PendingCall, ToolArgs, ToolCall, ToolCallKind, ToolDescriptor, ToolResult};

/// Longest title used when logging captured output
const TITLE_WIDTH: usize = 50;

/// Index tools by their full name
pub fn tool_table(tools: &[ToolDescriptor]) -> HashMap<&str, &ToolDescriptor> {
    tools.iter().map(|tool| (tool.name.as_str(), tool)).collect()
}

/// Resolve a requested function name against the tool table.
///
/// Exact match first. Otherwise a registered name ending in `.<name>` is
/// accepted: the remote model sometimes strips the leading part of a dotted
/// name that looks like a file path. More than one such candidate is an error.
pub fn resolve<'a>(
    table: &HashMap<&str, &'a ToolDescriptor>,
    name: &str,
) -> AgentResult<&'a ToolDescriptor> {
    if let Some(tool) = table.get(name) {
        return Ok(*tool);
    }

    let suffix = format!(".{}", name);
    let mut candidates: Vec<&'a ToolDescriptor> = table
        .values()
        .filter(|tool| tool.name.ends_with(&suffix))
        .copied()
        .collect();
    candidates.sort_by(|a, b| a.name.cmp(&b.name));

    match candidates.as_slice() {
        [] => Err(AgentError::UnresolvedFunction(name.to_string())),
        [tool] => {
            warn!(requested = name, resolved = %tool.name, "Resolved truncated function name by suffix");
            Ok(*tool)
        }
        _ => Err(AgentError::AmbiguousFunction {
            name: name.to_string(),
            candidates: candidates.iter().map(|t| t.name.clone()).collect(),
        }),
    }
}

/// Parse and resolve every call of a batch. Nothing runs if any call fails.
pub fn prepare_calls<'a>(
    tools: &'a [ToolDescriptor],
    calls: &[ToolCall],
) -> AgentResult<Vec<PendingCall<'a>>> {
    let table = tool_table(tools);

    calls
        .iter()
        .map(|call| -> AgentResult<PendingCall<'a>> {
            match &call.kind {
                ToolCallKind::Function { name, arguments } => {
                    let args = ToolArgs::parse(arguments).map_err(|e| AgentError::InvalidArguments {
                        name: name.clone(),
                        message: e.to_string(),
                    })?;
                    let tool = resolve(&table, name)?;
                    Ok(PendingCall {
                        call_id: call.call_id.clone(),
                        requested_name: name.clone(),
                        tool,
                        args,
                    })
                }
                ToolCallKind::Unsupported(kind) => Err(AgentError::UnsupportedToolCall(kind.clone())),
            }
        })
        .collect()
}

/// Run resolved calls one at a time, in order, each with its own output buffer
pub fn execute_calls(calls: &[PendingCall<'_>]) -> AgentResult<Vec<ToolResult>> {
    let mut results = Vec::with_capacity(calls.len());

    for call in calls {
        let mut buffer: Vec<u8> = Vec::new();
        let return_value = call
            .tool
            .invoke(&call.args, &mut buffer)
            .map_err(|e| AgentError::ToolExecution {
                name: call.tool.name.clone(),
                message: format!("{:#}", e),
            })?;

        let stdout = String::from_utf8_lossy(&buffer).trim_end().to_string();
        if !stdout.is_empty() {
            debug!(title = %shorten(&call.to_string(), TITLE_WIDTH), "{}", stdout);
        }

        results.push(ToolResult {
            call_id: call.call_id.clone(),
            function: call.tool.name.clone(),
            return_value,
            stdout,
        });
    }

    Ok(results)
}

/// Handle one batch of requested calls.
///
/// With a confirmer, the whole batch is shown first and a decline runs nothing.
pub fn dispatch(
    tools: &[ToolDescriptor],
    calls: &[ToolCall],
    confirmer: Option<&dyn Confirmer>,
) -> AgentResult<Vec<ToolResult>> {
    let pending = prepare_calls(tools, calls)?;

    if let Some(confirmer) = confirmer {
        match confirmer.confirm(&pending) {
            Ok(true) => {}
            Ok(false) => return Err(AgentError::UserAborted),
            Err(e) => {
                warn!("Confirmation failed: {:#}", e);
                return Err(AgentError::UserAborted);
            }
        }
    }

    execute_calls(&pending)
}

/// Truncate to at most `width` characters, marking the cut
fn shorten(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}
