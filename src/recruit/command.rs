//! Recruitment command options.
//!
//! Syntax (text transports):
//! - /boshu [--limit <n>] [--deadline <10m|2h|21:30>]
//!
//! Platforms with typed options build [`RecruitArgs`] directly and only go
//! through [`RecruitDefaults::resolve`].

use super::deadline::{parse_deadline, DeadlineError};
use crate::chat::traits::RecruitArgs;
use chrono::{DateTime, TimeZone};
use std::time::Duration;

/// Command name as typed by users
pub const COMMAND_NAME: &str = "boshu";

pub const DEFAULT_LIMIT: u32 = 4;
pub const DEFAULT_DEADLINE: &str = "10m";

/// Command errors, reported privately to the requester
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("The limit must be at least 1 (got {0}).")]
    InvalidLimit(i64),

    #[error(transparent)]
    InvalidDeadline(#[from] DeadlineError),

    #[error("Usage: /boshu [--limit <n>] [--deadline <10m|2h|21:30>] ({0})")]
    Usage(String),
}

/// Validated recruitment request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecruitRequest {
    pub capacity: u32,
    /// Time from the invocation until the deadline
    pub ttl: Duration,
}

/// Values used for options the requester left out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecruitDefaults {
    pub limit: u32,
    pub deadline: String,
}

impl Default for RecruitDefaults {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            deadline: DEFAULT_DEADLINE.to_string(),
        }
    }
}

impl RecruitDefaults {
    /// Fill in defaults and validate the invocation options.
    pub fn resolve<Tz: TimeZone>(
        &self,
        args: &RecruitArgs,
        now: &DateTime<Tz>,
    ) -> Result<RecruitRequest, CommandError> {
        let capacity = match args.limit {
            None => self.limit,
            Some(n) => u32::try_from(n)
                .ok()
                .filter(|n| *n >= 1)
                .ok_or(CommandError::InvalidLimit(n))?,
        };

        let deadline = args.deadline.as_deref().unwrap_or(&self.deadline);
        let ttl = parse_deadline(deadline, now)?;

        Ok(RecruitRequest { capacity, ttl })
    }
}

/// Parse `/boshu` command text into options.
///
/// Returns `Ok(None)` when the text is not a recruitment command at all.
pub fn parse_recruit_command(text: &str) -> Result<Option<RecruitArgs>, CommandError> {
    let parts: Vec<&str> = text.split_whitespace().collect();

    match parts.first() {
        Some(cmd) if cmd.strip_prefix('/') == Some(COMMAND_NAME) => {}
        _ => return Ok(None),
    }

    let mut args = RecruitArgs::default();
    let mut rest = parts[1..].iter();

    while let Some(flag) = rest.next() {
        let value = rest
            .next()
            .ok_or_else(|| CommandError::Usage(format!("{} requires a value", flag)))?;

        match *flag {
            "--limit" => {
                let limit = value
                    .parse::<i64>()
                    .map_err(|_| CommandError::Usage(format!("invalid limit '{}'", value)))?;
                args.limit = Some(limit);
            }
            "--deadline" => args.deadline = Some(value.to_string()),
            other => return Err(CommandError::Usage(format!("unknown option '{}'", other))),
        }
    }

    Ok(Some(args))
}
