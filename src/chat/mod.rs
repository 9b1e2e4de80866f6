//! Chat Platform Integration Module
//!
//! The platform itself (gateway, command registration, message delivery) is
//! an external collaborator behind [`ChatClient`]. This module holds that
//! seam, the bot event loop on top of it, and two implementations:
//! - [`MockChatClient`] for tests
//! - [`ConsoleClient`] for running the bot from a terminal

pub mod bot;
pub mod console;
pub mod mock;
pub mod traits;

pub use bot::{BotConfig, RecruitBot};
pub use console::{ConsoleClient, OutputFormat};
pub use mock::MockChatClient;
pub use traits::{ChatClient, ChatError, ChatResult};
