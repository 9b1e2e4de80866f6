//! Recruitment Bot
//!
//! Main bot implementation that:
//! - Receives inbound chat events
//! - Opens a recruitment session per command invocation
//! - Routes button presses to the session owning the pressed card
//!
//! Sessions share nothing; the routing table only holds their inboxes.

use super::traits::*;
use crate::recruit::command::{CommandError, RecruitDefaults};
use crate::recruit::render::render_card;
use crate::recruit::runner::{deadline_after, spawn_session, SessionEvent, SessionHandle};
use crate::recruit::session::RecruitmentSession;
use chrono::{DateTime, Local, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How often the bot polls the chat client for new events
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Recruitment bot configuration
#[derive(Debug, Clone, Default)]
pub struct BotConfig {
    pub defaults: RecruitDefaults,
}

/// Recruitment bot
pub struct RecruitBot<C: ChatClient> {
    client: C,
    config: BotConfig,
    sessions: HashMap<MessageId, SessionHandle>,
}

impl<C: ChatClient> RecruitBot<C> {
    pub fn new(client: C, config: BotConfig) -> Self {
        Self {
            client,
            config,
            sessions: HashMap::new(),
        }
    }

    /// Number of sessions still routed to
    pub fn open_sessions(&self) -> usize {
        self.sessions.values().filter(|h| !h.is_finished()).count()
    }

    /// Run bot event loop
    ///
    /// Returns when the chat client reports the connection closed. Sessions
    /// still open at that point are dropped; nothing survives a restart.
    pub async fn run(&mut self) -> ChatResult<()> {
        let mut interval = tokio::time::interval(POLL_INTERVAL);

        loop {
            interval.tick().await;
            self.prune_finished();

            let events = match self.client.receive_events().await {
                Ok(events) => events,
                Err(ChatError::Disconnected) => {
                    info!("Chat connection closed, shutting down");
                    self.shutdown();
                    return Ok(());
                }
                Err(e) => {
                    warn!("Error receiving events, will retry: {}", e);
                    continue;
                }
            };

            for event in events {
                self.handle_event(event).await;
            }
        }
    }

    /// Handle one inbound event
    pub async fn handle_event(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::Command {
                channel,
                user,
                args,
            } => self.open_session(channel, user, args).await,
            InboundEvent::Interaction {
                message,
                user,
                action,
            } => self.route_interaction(message, SessionEvent { user, action }),
        }
    }

    async fn open_session(&mut self, channel: ChannelId, owner: UserId, args: RecruitArgs) {
        let request = match self.config.defaults.resolve(&args, &Local::now()) {
            Ok(request) => request,
            Err(err) => {
                debug!(user = %owner, "Rejected recruitment command: {}", err);
                self.reply_command_error(&channel, &owner, &err).await;
                return;
            }
        };

        let deadline = deadline_after(request.ttl);
        let deadline_at = chrono::Duration::from_std(request.ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let session = RecruitmentSession::new(owner.clone(), request.capacity, deadline_at);

        let message = match self.client.post_card(&channel, &render_card(&session)).await {
            Ok(message) => message,
            Err(e) => {
                warn!(user = %owner, "Failed to post recruitment card: {}", e);
                return;
            }
        };

        let handle = spawn_session(
            self.client.clone(),
            channel,
            message.clone(),
            session,
            deadline,
        );
        self.sessions.insert(message, handle);
    }

    fn route_interaction(&mut self, message: MessageId, event: SessionEvent) {
        let Some(handle) = self.sessions.get(&message) else {
            debug!(message = %message, user = %event.user, "Interaction for unknown session");
            return;
        };

        if let Err(event) = handle.deliver(event) {
            debug!(
                message = %message,
                user = %event.user,
                action = %event.action,
                "Interaction after session closed"
            );
            self.sessions.remove(&message);
        }
    }

    async fn reply_command_error(&self, channel: &ChannelId, user: &UserId, err: &CommandError) {
        let text = match err {
            CommandError::InvalidDeadline(_) => {
                "Invalid deadline format (e.g. 10m, 21:30).".to_string()
            }
            other => other.to_string(),
        };

        if let Err(e) = self.client.send_ephemeral(channel, user, &text).await {
            warn!(user = %user, "Failed to send command error: {}", e);
        }
    }

    fn prune_finished(&mut self) {
        self.sessions.retain(|_, handle| !handle.is_finished());
    }

    fn shutdown(&mut self) {
        let open = self.open_sessions();
        if open > 0 {
            info!(sessions = open, "Dropping open recruitments");
        }
        for (_, handle) in self.sessions.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::mock::MockChatClient;
    use crate::recruit::runner::CANCELED_NOTICE;

    fn user(name: &str) -> UserId {
        UserId(name.to_string())
    }

    fn channel() -> ChannelId {
        ChannelId("general".to_string())
    }

    fn command(owner: &str, limit: Option<i64>, deadline: Option<&str>) -> InboundEvent {
        InboundEvent::Command {
            channel: channel(),
            user: user(owner),
            args: RecruitArgs {
                limit,
                deadline: deadline.map(str::to_string),
            },
        }
    }

    fn press(message: &MessageId, who: &str, action: Action) -> InboundEvent {
        InboundEvent::Interaction {
            message: message.clone(),
            user: user(who),
            action,
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_posts_open_card() {
        let client = MockChatClient::new();
        let mut bot = RecruitBot::new(client.clone(), BotConfig::default());

        bot.handle_event(command("owner", None, None)).await;

        let posted = client.posted_cards();
        assert_eq!(posted.len(), 1);
        let (_, card) = &posted[0];
        assert_eq!(card.title, "📣 Recruiting!");
        assert!(card.description.contains("**Limit: 4**"));
        assert_eq!(card.controls.len(), 3);
        assert_eq!(bot.open_sessions(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_deadline_creates_no_session() {
        let client = MockChatClient::new();
        let mut bot = RecruitBot::new(client.clone(), BotConfig::default());

        bot.handle_event(command("owner", None, Some("later"))).await;

        assert!(client.posted_cards().is_empty());
        assert_eq!(
            client.ephemeral_texts(&user("owner")),
            vec!["Invalid deadline format (e.g. 10m, 21:30)."]
        );
        assert_eq!(bot.open_sessions(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_limit_creates_no_session() {
        let client = MockChatClient::new();
        let mut bot = RecruitBot::new(client.clone(), BotConfig::default());

        bot.handle_event(command("owner", Some(0), None)).await;

        assert!(client.posted_cards().is_empty());
        assert_eq!(client.ephemeral_texts(&user("owner")).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_routes_interactions_to_their_session() {
        let client = MockChatClient::new();
        let mut bot = RecruitBot::new(client.clone(), BotConfig::default());

        bot.handle_event(command("alice", Some(3), None)).await;
        bot.handle_event(command("bob", Some(3), None)).await;
        let posted = client.posted_cards();
        let (first, second) = (posted[0].0.clone(), posted[1].0.clone());

        bot.handle_event(press(&first, "carol", Action::Join)).await;
        bot.handle_event(press(&second, "dave", Action::Join)).await;
        settle().await;

        let first_edits = client.edited_cards(&first);
        let second_edits = client.edited_cards(&second);
        assert_eq!(first_edits.last().unwrap().participants.value, "<@carol>");
        assert_eq!(second_edits.last().unwrap().participants.value, "<@dave>");
    }

    #[tokio::test(start_paused = true)]
    async fn test_interactions_after_close_are_ignored() {
        let client = MockChatClient::new();
        let mut bot = RecruitBot::new(client.clone(), BotConfig::default());

        bot.handle_event(command("owner", Some(1), None)).await;
        let message = client.posted_cards()[0].0.clone();

        bot.handle_event(press(&message, "a", Action::Join)).await;
        settle().await;
        assert_eq!(bot.open_sessions(), 0);

        let before = client.effects().len();
        bot.handle_event(press(&message, "b", Action::Join)).await;
        settle().await;

        assert_eq!(client.effects().len(), before);
        assert!(bot.sessions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_message_is_ignored() {
        let client = MockChatClient::new();
        let mut bot = RecruitBot::new(client.clone(), BotConfig::default());

        bot.handle_event(press(&MessageId("nope".to_string()), "a", Action::Join))
            .await;

        assert!(client.effects().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_processes_queue_until_disconnect() {
        let client = MockChatClient::new();
        let mut bot = RecruitBot::new(client.clone(), BotConfig::default());

        client.push_event(command("owner", Some(2), Some("5m")));
        let run = tokio::spawn(async move {
            bot.run().await.unwrap();
            bot
        });

        tokio::time::sleep(Duration::from_millis(250)).await;
        let message = client.posted_cards()[0].0.clone();
        client.push_event(press(&message, "owner", Action::Cancel));
        client.disconnect();

        let bot = run.await.unwrap();
        assert_eq!(bot.open_sessions(), 0);
        assert_eq!(client.notices(), vec![CANCELED_NOTICE.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_post_creates_no_session() {
        let client = MockChatClient::new();
        client.set_fail_deliveries(true);
        let mut bot = RecruitBot::new(client.clone(), BotConfig::default());

        bot.handle_event(command("owner", None, None)).await;

        assert_eq!(bot.open_sessions(), 0);
    }
}
