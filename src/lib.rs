//! Boshu - Timed Group Sign-up Bot
//!
//! Opens a recruitment card in a chat channel, collects participants through
//! join/leave buttons, and closes when the roster is full, the deadline
//! passes, or the owner cancels.
//!
//! Key principles:
//! - One state machine per recruitment, driven by one task
//! - Events for a recruitment are applied strictly in arrival order
//! - NO persistence (sessions are ephemeral)

pub mod chat;
pub mod recruit;
