//! Conversation status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle of a chat conversation.
///
/// - `Collecting`: slots are still being gathered
/// - `Ready`: enough is known to place the call; awaiting confirmation
/// - `Calling`: handed to the call lifecycle, no more turns
/// - `Completed`: the call reached a terminal state
/// - `Cancelled`: the user abandoned the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationStatus {
    #[default]
    Collecting,
    Ready,
    Calling,
    Completed,
    Cancelled,
}

impl ConversationStatus {
    /// Returns true if the user can still send chat turns.
    pub fn accepts_turns(&self) -> bool {
        matches!(self, Self::Collecting | Self::Ready)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collecting => "COLLECTING",
            Self::Ready => "READY",
            Self::Calling => "CALLING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::str::FromStr for ConversationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COLLECTING" => Ok(Self::Collecting),
            "READY" => Ok(Self::Ready),
            "CALLING" => Ok(Self::Calling),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(format!("unknown conversation status: {}", other)),
        }
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for ConversationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConversationStatus::*;
        matches!(
            (self, target),
            (Collecting, Ready)
                | (Collecting, Cancelled)
                | (Ready, Calling)
                | (Ready, Cancelled)
                // Call finished (either way) or origination failed
                | (Calling, Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationStatus::*;
        match self {
            Collecting => vec![Ready, Cancelled],
            Ready => vec![Calling, Cancelled],
            Calling => vec![Completed],
            Completed | Cancelled => vec![],
        }
    }
}
