//! Domain types shared by the introspector, the run loop and the remote client

use std::fmt;

mod remote;
mod tool;
mod tool_call;

pub use remote::*;
pub use tool::*;
pub use tool_call::*;

/// A requested tool call resolved against the local tool table, not yet run
#[derive(Debug, Clone)]
pub struct PendingCall<'a> {
    pub call_id: String,
    /// Name as sent by the remote assistant
    pub requested_name: String,
    pub tool: &'a ToolDescriptor,
    pub args: ToolArgs,
}

impl fmt::Display for PendingCall<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.tool.name, self.args)
    }
}

/// Port for asking the user to approve a batch of tool calls
pub trait Confirmer: Send + Sync {
    /// Return `Ok(true)` only on an explicit affirmative answer
    fn confirm(&self, calls: &[PendingCall<'_>]) -> anyhow::Result<bool>;
}

/// Approves every batch
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl Confirmer for AutoConfirm {
    fn confirm(&self, _calls: &[PendingCall<'_>]) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// Declines every batch
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysDecline;

impl Confirmer for AlwaysDecline {
    fn confirm(&self, _calls: &[PendingCall<'_>]) -> anyhow::Result<bool> {
        Ok(false)
    }
}
