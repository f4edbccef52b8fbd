//! Call aggregate.

use crate::domain::collection::{phone, CollectedData, ScenarioType};
use crate::domain::foundation::{
    CallId, ConversationId, DomainError, ErrorCode, StateMachine, Timestamp, UserId,
};

use super::{CallOutcome, CallResult, CallStatus};

/// One outbound call attempt.
///
/// # Invariants
///
/// - status only moves forward along [`CallStatus`] transitions
/// - `result`, `summary` and `completed_at` are set together, exactly once,
///   when a terminal status is reached
/// - `details` is a copy taken at creation and never changes
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    id: CallId,
    user_id: UserId,
    conversation_id: Option<ConversationId>,
    details: CollectedData,
    status: CallStatus,
    result: Option<CallResult>,
    summary: Option<String>,
    /// Handle of the remote voice session, once dialing succeeded.
    session_handle: Option<String>,
    created_at: Timestamp,
    completed_at: Option<Timestamp>,
}

impl Call {
    /// Creates a pending call from the details collected in a conversation.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if no target phone number was collected
    /// - `InvalidFormat` if the number is not a dialable Korean number
    pub fn new(
        user_id: UserId,
        conversation_id: Option<ConversationId>,
        details: CollectedData,
    ) -> Result<Self, DomainError> {
        let phone_number = details
            .target_phone
            .as_deref()
            .ok_or_else(|| DomainError::new(ErrorCode::EmptyField, "Target phone number is required"))?;
        phone::validate_phone_number(phone_number)?;

        Ok(Self {
            id: CallId::new(),
            user_id,
            conversation_id,
            details,
            status: CallStatus::Pending,
            result: None,
            summary: None,
            session_handle: None,
            created_at: Timestamp::now(),
            completed_at: None,
        })
    }

    /// Reconstitutes a call from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: CallId,
        user_id: UserId,
        conversation_id: Option<ConversationId>,
        details: CollectedData,
        status: CallStatus,
        result: Option<CallResult>,
        summary: Option<String>,
        session_handle: Option<String>,
        created_at: Timestamp,
        completed_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            user_id,
            conversation_id,
            details,
            status,
            result,
            summary,
            session_handle,
            created_at,
            completed_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &CallId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn conversation_id(&self) -> Option<&ConversationId> {
        self.conversation_id.as_ref()
    }

    /// Frozen copy of the collected details.
    pub fn details(&self) -> &CollectedData {
        &self.details
    }

    pub fn request_type(&self) -> Option<ScenarioType> {
        self.details.scenario_type
    }

    pub fn target_name(&self) -> Option<&str> {
        self.details.target_name.as_deref()
    }

    pub fn target_phone(&self) -> &str {
        self.details.target_phone.as_deref().unwrap_or_default()
    }

    pub fn status(&self) -> CallStatus {
        self.status
    }

    pub fn result(&self) -> Option<CallResult> {
        self.result
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn session_handle(&self) -> Option<&str> {
        self.session_handle.as_deref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn completed_at(&self) -> Option<&Timestamp> {
        self.completed_at.as_ref()
    }

    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Accepts a start request.
    ///
    /// # Errors
    ///
    /// - `CallNotPending` unless the call is `Pending`; nothing changes
    pub fn begin_dialing(&mut self) -> Result<(), DomainError> {
        if self.status != CallStatus::Pending {
            return Err(DomainError::new(
                ErrorCode::CallNotPending,
                format!("Call is already in status: {}", self.status),
            ));
        }
        self.status = self.status.transition_to(CallStatus::Calling)?;
        Ok(())
    }

    /// Records a successful dial: the remote session is live.
    pub fn mark_connected(&mut self, session_handle: impl Into<String>) -> Result<(), DomainError> {
        self.status = self.status.transition_to(CallStatus::InProgress)?;
        self.session_handle = Some(session_handle.into());
        Ok(())
    }

    /// Writes the terminal outcome.
    ///
    /// Returns `Ok(false)` without touching anything when the call already
    /// finished, so a late second reconciliation is harmless.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` when the outcome is not reachable from the
    ///   current status (e.g. a success while still dialing)
    pub fn finish(&mut self, outcome: CallOutcome) -> Result<bool, DomainError> {
        if self.is_terminal() {
            return Ok(false);
        }
        let target = outcome.result.terminal_status();
        self.status = self.status.transition_to(target)?;
        self.result = Some(outcome.result);
        self.summary = Some(outcome.summary);
        self.completed_at = Some(Timestamp::now());
        Ok(true)
    }
}
