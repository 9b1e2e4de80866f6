//! Mock Chat Client for Testing
//!
//! Records every outbound effect so tests can assert on what the platform
//! would have shown, and replays queued inbound events.

use super::traits::*;
use crate::recruit::render::Card;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Outbound effect observed by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Posted {
        channel: ChannelId,
        message: MessageId,
        card: Card,
    },
    Edited {
        message: MessageId,
        card: Card,
    },
    Ephemeral {
        channel: ChannelId,
        user: UserId,
        text: String,
    },
    Notice {
        channel: ChannelId,
        text: String,
    },
}

/// Mock chat client for testing
#[derive(Clone, Default)]
pub struct MockChatClient {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    effects: Vec<Effect>,
    incoming: VecDeque<InboundEvent>,
    next_message_id: u64,
    fail_deliveries: bool,
    disconnected: bool,
}

impl MockChatClient {
    /// Create new mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an inbound event for `receive_events`
    pub fn push_event(&self, event: InboundEvent) {
        self.state.lock().unwrap().incoming.push_back(event);
    }

    /// Report `Disconnected` once the queued events are drained
    pub fn disconnect(&self) {
        self.state.lock().unwrap().disconnected = true;
    }

    /// Make every outbound call fail with a delivery error
    pub fn set_fail_deliveries(&self, fail: bool) {
        self.state.lock().unwrap().fail_deliveries = fail;
    }

    /// All recorded effects, oldest first
    pub fn effects(&self) -> Vec<Effect> {
        self.state.lock().unwrap().effects.clone()
    }

    /// Cards posted so far, with the ids handed out for them
    pub fn posted_cards(&self) -> Vec<(MessageId, Card)> {
        self.effects()
            .into_iter()
            .filter_map(|effect| match effect {
                Effect::Posted { message, card, .. } => Some((message, card)),
                _ => None,
            })
            .collect()
    }

    /// Successive edits of one message
    pub fn edited_cards(&self, message: &MessageId) -> Vec<Card> {
        self.effects()
            .into_iter()
            .filter_map(|effect| match effect {
                Effect::Edited { message: m, card } if m == *message => Some(card),
                _ => None,
            })
            .collect()
    }

    /// Private notices sent to `user`
    pub fn ephemeral_texts(&self, user: &UserId) -> Vec<String> {
        self.effects()
            .into_iter()
            .filter_map(|effect| match effect {
                Effect::Ephemeral { user: u, text, .. } if u == *user => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Public notices, any channel
    pub fn notices(&self) -> Vec<String> {
        self.effects()
            .into_iter()
            .filter_map(|effect| match effect {
                Effect::Notice { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Clear all state
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        *state = MockState::default();
    }

    fn record(&self, effect: Effect) -> ChatResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_deliveries {
            return Err(ChatError::Delivery("mock delivery failure".to_string()));
        }
        state.effects.push(effect);
        Ok(())
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn post_card(&self, channel: &ChannelId, card: &Card) -> ChatResult<MessageId> {
        let message = {
            let mut state = self.state.lock().unwrap();
            state.next_message_id += 1;
            MessageId(format!("msg-{}", state.next_message_id))
        };

        self.record(Effect::Posted {
            channel: channel.clone(),
            message: message.clone(),
            card: card.clone(),
        })?;
        Ok(message)
    }

    async fn edit_card(&self, message: &MessageId, card: &Card) -> ChatResult<()> {
        self.record(Effect::Edited {
            message: message.clone(),
            card: card.clone(),
        })
    }

    async fn send_ephemeral(
        &self,
        channel: &ChannelId,
        user: &UserId,
        text: &str,
    ) -> ChatResult<()> {
        self.record(Effect::Ephemeral {
            channel: channel.clone(),
            user: user.clone(),
            text: text.to_string(),
        })
    }

    async fn send_notice(&self, channel: &ChannelId, text: &str) -> ChatResult<()> {
        self.record(Effect::Notice {
            channel: channel.clone(),
            text: text.to_string(),
        })
    }

    async fn receive_events(&self) -> ChatResult<Vec<InboundEvent>> {
        let mut state = self.state.lock().unwrap();
        if state.incoming.is_empty() && state.disconnected {
            return Err(ChatError::Disconnected);
        }
        Ok(state.incoming.drain(..).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recruit::render::render_card;
    use crate::recruit::session::RecruitmentSession;
    use chrono::Utc;

    fn card() -> Card {
        render_card(&RecruitmentSession::new(
            UserId("owner".to_string()),
            4,
            Utc::now(),
        ))
    }

    #[tokio::test]
    async fn test_post_hands_out_distinct_ids() {
        let client = MockChatClient::new();
        let channel = ChannelId("general".to_string());

        let first = client.post_card(&channel, &card()).await.unwrap();
        let second = client.post_card(&channel, &card()).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(client.posted_cards().len(), 2);
    }

    #[tokio::test]
    async fn test_edits_filtered_by_message() {
        let client = MockChatClient::new();
        let a = MessageId("a".to_string());
        let b = MessageId("b".to_string());

        client.edit_card(&a, &card()).await.unwrap();
        client.edit_card(&b, &card()).await.unwrap();
        client.edit_card(&a, &card()).await.unwrap();

        assert_eq!(client.edited_cards(&a).len(), 2);
        assert_eq!(client.edited_cards(&b).len(), 1);
    }

    #[tokio::test]
    async fn test_receive_drains_then_disconnects() {
        let client = MockChatClient::new();
        client.push_event(InboundEvent::Interaction {
            message: MessageId("m".to_string()),
            user: UserId("u".to_string()),
            action: Action::Join,
        });
        client.disconnect();

        assert_eq!(client.receive_events().await.unwrap().len(), 1);
        assert!(matches!(
            client.receive_events().await,
            Err(ChatError::Disconnected)
        ));
    }

    #[tokio::test]
    async fn test_failed_delivery_is_not_recorded() {
        let client = MockChatClient::new();
        client.set_fail_deliveries(true);

        let result = client
            .send_notice(&ChannelId("general".to_string()), "hello")
            .await;

        assert!(matches!(result, Err(ChatError::Delivery(_))));
        assert!(client.effects().is_empty());

        client.clear();
        client
            .send_notice(&ChannelId("general".to_string()), "hello")
            .await
            .unwrap();
        assert_eq!(client.notices(), vec!["hello".to_string()]);
    }
}
