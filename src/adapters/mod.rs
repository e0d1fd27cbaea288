pub mod ask_command;
pub mod confirm;
pub mod introspector;

pub use crate::domain::{AlwaysDecline, AutoConfirm};
pub use confirm::TerminalConfirmer;
