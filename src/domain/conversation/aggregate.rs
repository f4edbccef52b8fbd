//! Conversation aggregate.

use crate::domain::collection::{CollectedData, ScenarioSubType, ScenarioType};
use crate::domain::foundation::{
    ConversationId, DomainError, ErrorCode, StateMachine, Timestamp, UserId,
};

use super::place::{Place, MAX_PLACE_CANDIDATES};
use super::ConversationStatus;

/// One chat session in which call details are collected.
///
/// # Invariants
///
/// - `user_id` never changes
/// - status only moves along [`ConversationStatus`] transitions
/// - `Ready` is entered only when a turn judged the data complete
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    id: ConversationId,
    user_id: UserId,
    status: ConversationStatus,
    collected_data: CollectedData,
    /// Candidates from the most recent successful venue search, kept so a
    /// later "2번" can be resolved.
    search_results: Vec<Place>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Conversation {
    /// Starts a new conversation, optionally with a pre-selected scenario.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if a sub-type is given without its scenario, or
    ///   does not belong to it
    pub fn start(
        user_id: UserId,
        scenario_type: Option<ScenarioType>,
        scenario_sub_type: Option<ScenarioSubType>,
    ) -> Result<Self, DomainError> {
        if let Some(sub_type) = scenario_sub_type {
            match scenario_type {
                Some(scenario) if sub_type.belongs_to(scenario) => {}
                _ => {
                    return Err(DomainError::validation(
                        "scenario_sub_type",
                        format!("Sub-type {} does not match the selected scenario", sub_type),
                    ))
                }
            }
        }

        let now = Timestamp::now();
        Ok(Self {
            id: ConversationId::new(),
            user_id,
            status: ConversationStatus::Collecting,
            collected_data: CollectedData::with_scenario(scenario_type, scenario_sub_type),
            search_results: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitutes a conversation from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ConversationId,
        user_id: UserId,
        status: ConversationStatus,
        collected_data: CollectedData,
        search_results: Vec<Place>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            status,
            collected_data,
            search_results,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn status(&self) -> ConversationStatus {
        self.status
    }

    pub fn collected_data(&self) -> &CollectedData {
        &self.collected_data
    }

    pub fn search_results(&self) -> &[Place] {
        &self.search_results
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Fails unless the user can still chat in this conversation.
    pub fn ensure_accepts_turns(&self) -> Result<(), DomainError> {
        if self.status.accepts_turns() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::ConversationClosed,
                format!("Conversation is {} and no longer accepts messages", self.status),
            ))
        }
    }

    /// Stores the merged slots of a finished turn and, when `ready`,
    /// promotes the conversation to `Ready`.
    ///
    /// A `Ready` conversation stays `Ready`; merging never removes data.
    pub fn record_turn(&mut self, merged: CollectedData, ready: bool) -> Result<(), DomainError> {
        self.ensure_accepts_turns()?;
        self.collected_data = merged;
        if ready && self.status == ConversationStatus::Collecting {
            self.status = self.status.transition_to(ConversationStatus::Ready)?;
        }
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Keeps the top candidates of a search for later selection.
    pub fn remember_search_results(&mut self, mut places: Vec<Place>) {
        places.truncate(MAX_PLACE_CANDIDATES);
        self.search_results = places;
        self.updated_at = Timestamp::now();
    }

    /// Hands the conversation over to the call lifecycle.
    ///
    /// # Errors
    ///
    /// - `ConversationNotReady` unless the status is `Ready`
    pub fn begin_calling(&mut self) -> Result<(), DomainError> {
        if self.status != ConversationStatus::Ready {
            return Err(DomainError::new(
                ErrorCode::ConversationNotReady,
                format!("Conversation is {}, expected READY", self.status),
            ));
        }
        self.transition(ConversationStatus::Calling)
    }

    /// Marks the conversation finished after its call reached a terminal
    /// state.
    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.transition(ConversationStatus::Completed)
    }

    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.transition(ConversationStatus::Cancelled)
    }

    fn transition(&mut self, target: ConversationStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}
