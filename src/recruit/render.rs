//! Card rendering
//!
//! Builds the platform-neutral card handed to the chat collaborator. The
//! text uses the common chat markup (`**bold**`, `<@user>` mentions,
//! `<t:unix:R>` relative timestamps); transports that cannot render it show
//! it verbatim.

use super::session::{CloseReason, RecruitmentSession, SessionState};
use crate::chat::traits::Action;
use serde::Serialize;

/// Accent colour of every recruitment card
pub const CARD_COLOR: u32 = 0x00BF_FF;

/// Participant field value while the roster is empty
pub const EMPTY_ROSTER: &str = "No one yet";

const PARTICIPANTS_FIELD: &str = "Participants";

/// Named field of a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub value: String,
}

/// Interactive control shown under a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Control {
    pub action: Action,
    pub label: String,
    pub style: ButtonStyle,
}

/// Render request for one recruitment message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub participants: Field,
    /// Enabled controls; empty once the session is closed
    pub controls: Vec<Control>,
}

impl Card {
    pub fn is_terminal(&self) -> bool {
        self.controls.is_empty()
    }
}

/// Render the current state of a session.
pub fn render_card(session: &RecruitmentSession) -> Card {
    let controls = match session.state() {
        SessionState::Open => open_controls(),
        SessionState::Closed(_) => Vec::new(),
    };

    Card {
        title: title(session.state()).to_string(),
        description: format!(
            "Press a button below to join!\n**Limit: {}**\n**Deadline: <t:{}:R>**",
            session.capacity(),
            session.deadline_at().timestamp()
        ),
        color: CARD_COLOR,
        participants: Field {
            name: PARTICIPANTS_FIELD.to_string(),
            value: participant_list(session),
        },
        controls,
    }
}

fn title(state: SessionState) -> &'static str {
    match state {
        SessionState::Open => "📣 Recruiting!",
        SessionState::Closed(CloseReason::LimitReached) => "✅ Recruitment full",
        SessionState::Closed(CloseReason::DeadlineExpired) => "⏰ Recruitment closed",
        SessionState::Closed(CloseReason::Canceled) => "🛑 Recruitment canceled",
    }
}

fn participant_list(session: &RecruitmentSession) -> String {
    if session.participants().is_empty() {
        return EMPTY_ROSTER.to_string();
    }

    session
        .participants()
        .iter()
        .map(|id| format!("<@{}>", id))
        .collect::<Vec<_>>()
        .join("\n")
}

fn open_controls() -> Vec<Control> {
    vec![
        Control {
            action: Action::Join,
            label: "Join".to_string(),
            style: ButtonStyle::Primary,
        },
        Control {
            action: Action::Leave,
            label: "❎ Leave".to_string(),
            style: ButtonStyle::Secondary,
        },
        Control {
            action: Action::Cancel,
            label: "Cancel".to_string(),
            style: ButtonStyle::Danger,
        },
    ]
}
