//! Recruitment sessions.
//!
//! - Deadline parsing (`10m`, `2h`, `21:30`)
//! - Command option resolution with configurable defaults
//! - The per-session state machine and its card rendering
//! - One runner task per open session
//!
//! Sessions are EPHEMERAL: in-memory only, lost on restart.

pub mod command;
pub mod deadline;
pub mod render;
pub mod runner;
pub mod session;

#[cfg(test)]
mod proptests;

pub use command::{parse_recruit_command, CommandError, RecruitDefaults, RecruitRequest};
pub use deadline::{parse_deadline, DeadlineError};
pub use render::{render_card, Card};
pub use runner::{deadline_after, spawn_session, SessionEvent, SessionHandle, SessionSummary};
pub use session::{CloseReason, RecruitmentSession, SessionError, SessionState, Transition};
