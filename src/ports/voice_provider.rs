//! Voice provider port - outbound call origination and session polling.
//!
//! The provider is a black box: it accepts a destination number and a
//! script, returns a session handle, and can later be asked how that
//! session went.

use async_trait::async_trait;

use crate::domain::call::{CallScript, VoiceSessionReport};

#[async_trait]
pub trait VoiceProvider: Send + Sync {
    /// Dials `request.to_number` and starts the scripted voice session.
    ///
    /// # Errors
    ///
    /// Any error means no call was placed.
    async fn originate(&self, request: OutboundCallRequest) -> Result<OutboundCallSession, VoiceError>;

    /// Reports the current state of a session started by `originate`.
    async fn get_status(&self, session_handle: &str) -> Result<VoiceSessionReport, VoiceError>;
}

/// Everything the provider needs to place one call.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundCallRequest {
    /// Destination in E.164 form (`+821012345678`).
    pub to_number: String,
    pub script: CallScript,
}

/// A successfully originated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCallSession {
    pub session_handle: String,
}

impl OutboundCallSession {
    pub fn new(session_handle: impl Into<String>) -> Self {
        Self {
            session_handle: session_handle.into(),
        }
    }
}

/// Voice provider errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoiceError {
    #[error("voice provider is not configured")]
    NotConfigured,

    #[error("voice provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("voice session not found: {0}")]
    SessionNotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl VoiceError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}
