//! Chat Platform Trait Abstractions
//!
//! The bot never talks to a gateway directly. Everything it needs from the
//! host chat platform goes through [`ChatClient`], so tests can swap in
//! [`MockChatClient`](super::mock::MockChatClient) and local runs can use the
//! console transport.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::recruit::render::Card;

/// Chat platform user identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Channel the command was invoked in (cards and notices go back here)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a posted card message. Interaction events are scoped to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Button action identifiers attached to a recruitment card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Join,
    Leave,
    Cancel,
}

impl Action {
    /// Custom id carried by the button on the platform side
    pub fn custom_id(&self) -> &'static str {
        match self {
            Action::Join => "join",
            Action::Leave => "leave",
            Action::Cancel => "cancel",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.custom_id())
    }
}

impl FromStr for Action {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "join" => Ok(Action::Join),
            "leave" => Ok(Action::Leave),
            "cancel" => Ok(Action::Cancel),
            other => Err(ChatError::InvalidEvent(format!(
                "unknown action '{}'",
                other
            ))),
        }
    }
}

/// Options supplied with a recruitment command invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruitArgs {
    /// Maximum participants (platform integer option, unvalidated)
    pub limit: Option<i64>,
    /// Deadline text such as "10m" or "21:30"
    pub deadline: Option<String>,
}

/// Event delivered by the chat platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A user invoked the recruitment command
    Command {
        channel: ChannelId,
        user: UserId,
        args: RecruitArgs,
    },
    /// A user pressed a button on a recruitment card
    Interaction {
        message: MessageId,
        user: UserId,
        action: Action,
    },
}

/// Result type for chat platform operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Chat client errors
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Chat connection closed")]
    Disconnected,
}

/// Chat platform abstraction
///
/// Implementations must be cheap to clone: every session runner holds its
/// own copy.
#[async_trait]
pub trait ChatClient: Clone + Send + Sync + 'static {
    /// Post a new card in a channel, returning the id interactions will carry
    async fn post_card(&self, channel: &ChannelId, card: &Card) -> ChatResult<MessageId>;

    /// Replace the content and controls of a previously posted card
    async fn edit_card(&self, message: &MessageId, card: &Card) -> ChatResult<()>;

    /// Send a notice only `user` can see
    async fn send_ephemeral(&self, channel: &ChannelId, user: &UserId, text: &str)
        -> ChatResult<()>;

    /// Send a notice visible to the whole channel
    async fn send_notice(&self, channel: &ChannelId, text: &str) -> ChatResult<()>;

    /// Receive pending inbound events
    ///
    /// Returns `ChatError::Disconnected` once the platform connection is gone.
    async fn receive_events(&self) -> ChatResult<Vec<InboundEvent>>;
}
