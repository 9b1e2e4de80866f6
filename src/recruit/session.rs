//! Recruitment session state machine
//!
//! A session is EPHEMERAL: it lives only as long as its runner task and is
//! never persisted. All roster mutation goes through the methods below, which
//! keep these invariants:
//! - no duplicate participants
//! - `participants.len() <= capacity`
//! - once closed, the roster is frozen

use crate::chat::traits::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Why a session closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// The last free slot was taken
    LimitReached,
    /// The owner canceled
    Canceled,
    /// The deadline passed
    DeadlineExpired,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CloseReason::LimitReached => "limit reached",
            CloseReason::Canceled => "canceled",
            CloseReason::DeadlineExpired => "deadline expired",
        };
        f.write_str(text)
    }
}

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// Accepting joins and leaves
    Open,
    /// Terminal
    Closed(CloseReason),
}

/// Effect of a successfully applied event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Still open; the card should be refreshed
    Updated,
    /// The session just closed; the terminal card should be rendered
    Closed(CloseReason),
}

/// Session errors (all recovered locally, surfaced only to the requester)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("{0} is not a participant")]
    NotAParticipant(UserId),

    #[error("{0} is not the owner of this recruitment")]
    NotOwner(UserId),

    #[error("Recruitment already closed ({0})")]
    Closed(CloseReason),
}

/// One bounded, time-limited roster
#[derive(Debug, Clone)]
pub struct RecruitmentSession {
    owner: UserId,
    capacity: u32,
    deadline_at: DateTime<Utc>,
    participants: Vec<UserId>,
    state: SessionState,
}

impl RecruitmentSession {
    /// Open a new session.
    ///
    /// `capacity` is clamped to at least 1; callers validate user input
    /// before reaching this point.
    pub fn new(owner: UserId, capacity: u32, deadline_at: DateTime<Utc>) -> Self {
        Self {
            owner,
            capacity: capacity.max(1),
            deadline_at,
            participants: Vec::new(),
            state: SessionState::Open,
        }
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn deadline_at(&self) -> DateTime<Utc> {
        self.deadline_at
    }

    /// Participants in join order
    pub fn participants(&self) -> &[UserId] {
        &self.participants
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Open => Ok(()),
            SessionState::Closed(reason) => Err(SessionError::Closed(reason)),
        }
    }

    fn close(&mut self, reason: CloseReason) -> Transition {
        self.state = SessionState::Closed(reason);
        Transition::Closed(reason)
    }

    /// Add `user` to the roster.
    ///
    /// Joining twice is a no-op that still asks for a refresh. The join that
    /// fills the last slot is accepted and closes the session.
    pub fn join(&mut self, user: UserId) -> Result<Transition, SessionError> {
        self.ensure_open()?;

        if self.participants.contains(&user) {
            return Ok(Transition::Updated);
        }

        self.participants.push(user);

        if self.participants.len() >= self.capacity as usize {
            return Ok(self.close(CloseReason::LimitReached));
        }

        Ok(Transition::Updated)
    }

    /// Remove `user` from the roster, keeping the order of everyone else.
    pub fn leave(&mut self, user: &UserId) -> Result<Transition, SessionError> {
        self.ensure_open()?;

        let pos = self
            .participants
            .iter()
            .position(|p| p == user)
            .ok_or_else(|| SessionError::NotAParticipant(user.clone()))?;

        self.participants.remove(pos);
        Ok(Transition::Updated)
    }

    /// Close the session on the owner's request.
    pub fn cancel(&mut self, requester: &UserId) -> Result<Transition, SessionError> {
        self.ensure_open()?;

        if *requester != self.owner {
            return Err(SessionError::NotOwner(requester.clone()));
        }

        Ok(self.close(CloseReason::Canceled))
    }

    /// Close the session because its deadline passed.
    pub fn expire(&mut self) -> Result<Transition, SessionError> {
        self.ensure_open()?;
        Ok(self.close(CloseReason::DeadlineExpired))
    }
}
