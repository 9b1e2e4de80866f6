//! Session runner
//!
//! Each recruitment session is driven by its own tokio task. Events reach it
//! through an mpsc inbox and are applied one at a time; every handler,
//! including its chat effects, completes before the next event is read. The
//! deadline is a single `Sleep` owned by the task, so it is dropped together
//! with the task on any terminal transition and can fire at most once.

use super::render::render_card;
use super::session::{
    CloseReason, RecruitmentSession, SessionError, SessionState, Transition,
};
use crate::chat::traits::{Action, ChannelId, ChatClient, MessageId, UserId};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Public notice posted when the owner cancels
pub const CANCELED_NOTICE: &str = "Recruitment was canceled by its owner.";

const NOT_A_PARTICIPANT_REPLY: &str = "You have not joined this recruitment.";
const NOT_OWNER_REPLY: &str = "Only the owner can cancel this recruitment.";

/// Far enough out that the timer never fires in practice
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Button press routed to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub user: UserId,
    pub action: Action,
}

/// Final state of a finished session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub message: MessageId,
    pub state: SessionState,
    pub participants: Vec<UserId>,
}

/// Handle to a running session task
pub struct SessionHandle {
    message: MessageId,
    inbox: mpsc::UnboundedSender<SessionEvent>,
    task: JoinHandle<SessionSummary>,
}

impl SessionHandle {
    pub fn message(&self) -> &MessageId {
        &self.message
    }

    /// Queue an event for the session.
    ///
    /// Hands the event back if the session has already finished.
    pub fn deliver(&self, event: SessionEvent) -> Result<(), SessionEvent> {
        self.inbox.send(event).map_err(|e| e.0)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the session to close.
    ///
    /// Returns `None` if the task was aborted or panicked.
    pub async fn wait(self) -> Option<SessionSummary> {
        self.task.await.ok()
    }

    /// Drop the session without a terminal render.
    pub fn abort(&self) {
        self.task.abort();
    }
}

/// Timer instant `ttl` from now, saturating for durations tokio cannot hold.
pub fn deadline_after(ttl: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(ttl).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Start the task driving `session`.
///
/// `deadline` is taken before the open card is posted, so time spent posting
/// counts against the session. The open card must already be posted as
/// `message`.
pub fn spawn_session<C: ChatClient>(
    client: C,
    channel: ChannelId,
    message: MessageId,
    session: RecruitmentSession,
    deadline: Instant,
) -> SessionHandle {
    let (inbox, events) = mpsc::unbounded_channel();
    let runner = SessionRunner {
        client,
        channel,
        message: message.clone(),
        session,
    };
    let task = tokio::spawn(runner.run(events, deadline));

    SessionHandle {
        message,
        inbox,
        task,
    }
}

struct SessionRunner<C: ChatClient> {
    client: C,
    channel: ChannelId,
    message: MessageId,
    session: RecruitmentSession,
}

impl<C: ChatClient> SessionRunner<C> {
    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<SessionEvent>,
        deadline: Instant,
    ) -> SessionSummary {
        let ttl = deadline.saturating_duration_since(Instant::now());
        info!(
            message = %self.message,
            owner = %self.session.owner(),
            capacity = self.session.capacity(),
            ttl = %humantime::format_duration(ttl),
            "Recruitment opened"
        );

        let deadline = tokio::time::sleep_until(deadline);
        tokio::pin!(deadline);
        let mut inbox_open = true;

        while self.session.is_open() {
            tokio::select! {
                event = events.recv(), if inbox_open => match event {
                    Some(event) => self.handle_event(event).await,
                    // Nobody can reach this session any more; only the
                    // deadline can close it now.
                    None => inbox_open = false,
                },
                () = &mut deadline => {
                    let result = self.session.expire();
                    self.apply(None, result).await;
                }
            }
        }

        SessionSummary {
            message: self.message,
            state: self.session.state(),
            participants: self.session.participants().to_vec(),
        }
    }

    async fn handle_event(&mut self, event: SessionEvent) {
        debug!(
            message = %self.message,
            user = %event.user,
            action = %event.action,
            "Session event"
        );

        let result = match event.action {
            Action::Join => self.session.join(event.user.clone()),
            Action::Leave => self.session.leave(&event.user),
            Action::Cancel => self.session.cancel(&event.user),
        };

        self.apply(Some(&event.user), result).await;
    }

    async fn apply(
        &mut self,
        requester: Option<&UserId>,
        result: Result<Transition, SessionError>,
    ) {
        match result {
            Ok(Transition::Updated) => self.refresh().await,
            Ok(Transition::Closed(reason)) => self.close(reason).await,
            Err(err) => match requester {
                Some(user) => self.reply_privately(user, &err).await,
                None => debug!(message = %self.message, "Ignored: {}", err),
            },
        }
    }

    async fn refresh(&self) {
        let card = render_card(&self.session);
        if let Err(e) = self.client.edit_card(&self.message, &card).await {
            warn!(message = %self.message, "Failed to refresh card: {}", e);
        }
    }

    async fn close(&self, reason: CloseReason) {
        info!(
            message = %self.message,
            reason = %reason,
            participants = self.session.participants().len(),
            "Recruitment closed"
        );

        if reason == CloseReason::Canceled {
            if let Err(e) = self.client.send_notice(&self.channel, CANCELED_NOTICE).await {
                warn!(message = %self.message, "Failed to send cancel notice: {}", e);
            }
        }

        // Terminal render: the card without controls
        self.refresh().await;
    }

    async fn reply_privately(&self, user: &UserId, err: &SessionError) {
        debug!(message = %self.message, user = %user, "Rejected: {}", err);

        let text = match err {
            SessionError::NotAParticipant(_) => NOT_A_PARTICIPANT_REPLY,
            SessionError::NotOwner(_) => NOT_OWNER_REPLY,
            // The loop stops reading once closed; nothing to tell the user.
            SessionError::Closed(_) => return,
        };

        if let Err(e) = self.client.send_ephemeral(&self.channel, user, text).await {
            warn!(message = %self.message, user = %user, "Failed to send private reply: {}", e);
        }
    }
}
