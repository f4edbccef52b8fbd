//! StartCallHandler - dials a PENDING call.
//!
//! Accepting a start moves the call and its conversation to `CALLING`,
//! builds the voice script from the frozen details, and asks the voice
//! provider to originate. A failed origination fails the call right here;
//! a successful one marks it `IN_PROGRESS` and hands it to the reconciler
//! without waiting for the call to end.

use std::sync::Arc;

use crate::domain::call::{generate_call_script, Call, CallOutcome};
use crate::domain::collection::phone::to_e164;
use crate::domain::conversation::Conversation;
use crate::domain::foundation::{CallId, UserId};
use crate::ports::{CallRepository, ConversationRepository, OutboundCallRequest, VoiceProvider};

use super::{CallError, CallReconciler};
use crate::application::handlers::conversation::TurnLocks;

#[derive(Debug, Clone)]
pub struct StartCallCommand {
    pub user_id: UserId,
    pub call_id: CallId,
}

/// State of the call when the start request returns.
#[derive(Debug, Clone)]
pub struct StartCallResult {
    pub call: Call,
    /// `false` when the provider refused or could not be reached; the call
    /// is then already `FAILED`.
    pub originated: bool,
}

impl StartCallResult {
    pub fn session_handle(&self) -> Option<&str> {
        self.call.session_handle()
    }
}

pub struct StartCallHandler {
    calls: Arc<dyn CallRepository>,
    conversations: Arc<dyn ConversationRepository>,
    voice: Arc<dyn VoiceProvider>,
    reconciler: Arc<CallReconciler>,
    locks: TurnLocks,
}

impl StartCallHandler {
    pub fn new(
        calls: Arc<dyn CallRepository>,
        conversations: Arc<dyn ConversationRepository>,
        voice: Arc<dyn VoiceProvider>,
        reconciler: Arc<CallReconciler>,
        locks: TurnLocks,
    ) -> Self {
        Self {
            calls,
            conversations,
            voice,
            reconciler,
            locks,
        }
    }

    /// Starts the call.
    ///
    /// # Errors
    ///
    /// - `NotFound` if missing or not owned
    /// - `NotPending` if the call was already started; nothing changes and
    ///   nothing is dialed
    /// - `ConversationNotReady` if the conversation left `READY` (e.g. was
    ///   cancelled) after the call was created
    /// - `Repository` on persistence failure before dialing; the call stays
    ///   `PENDING` and the conversation `READY`
    pub async fn handle(&self, cmd: StartCallCommand) -> Result<StartCallResult, CallError> {
        let call = self.find_owned(&cmd).await?;

        // Starts and turns on the same conversation are serialized, so two
        // concurrent starts cannot both observe PENDING.
        let _guard = match call.conversation_id() {
            Some(id) => Some(self.locks.acquire(*id).await),
            None => None,
        };
        let mut call = self.find_owned(&cmd).await?;

        call.begin_dialing()?;

        let previous = match call.conversation_id() {
            Some(id) => self.conversations.find_by_id(id).await?,
            None => None,
        };
        let mut conversation = previous.clone();
        if let Some(conversation) = conversation.as_mut() {
            conversation.begin_calling()?;
        }

        // Conversation first: if it cannot move, the call is still PENDING
        // and a retry starts cleanly.
        if let Some(conversation) = &conversation {
            self.conversations.update(conversation).await?;
        }
        if let Err(e) = self.calls.update(&call).await {
            if let Some(previous) = &previous {
                self.restore_conversation(previous).await;
            }
            return Err(e.into());
        }

        let script = generate_call_script(call.details());
        let request = OutboundCallRequest {
            to_number: to_e164(call.target_phone()),
            script,
        };

        tracing::info!(call_id = %call.id(), to = %request.to_number, "Originating call");

        let session = match self.voice.originate(request).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(call_id = %call.id(), error = %e, "Call origination failed");
                return self.fail(call, e.to_string()).await;
            }
        };

        if let Err(e) = call.mark_connected(session.session_handle) {
            tracing::error!(call_id = %call.id(), error = %e, "Dialed call could not be marked connected");
            return self.fail(call, e.to_string()).await;
        }
        // The line is open, so the reconciler must run even if this write is
        // lost; its terminal write replaces the stale CALLING row.
        if let Err(e) = self.calls.update(&call).await {
            tracing::warn!(
                call_id = %call.id(),
                error = %e,
                "Could not record the session handle; reconciling anyway"
            );
        }

        tracing::info!(
            call_id = %call.id(),
            session = call.session_handle().unwrap_or_default(),
            simulated = self.reconciler.mode().is_simulated(),
            "Call in progress"
        );

        self.reconciler.spawn(call.clone());

        Ok(StartCallResult {
            call,
            originated: true,
        })
    }

    /// Finalizes the call as `FAILED` and reports it without a session.
    async fn fail(&self, call: Call, reason: String) -> Result<StartCallResult, CallError> {
        self.reconciler
            .finalize(call.clone(), CallOutcome::error(reason))
            .await?;
        let call = self.calls.find_by_id(call.id()).await?.unwrap_or(call);
        Ok(StartCallResult {
            call,
            originated: false,
        })
    }

    async fn restore_conversation(&self, previous: &Conversation) {
        if let Err(e) = self.conversations.update(previous).await {
            tracing::error!(
                conversation_id = %previous.id(),
                error = %e,
                "Conversation left in CALLING after the call write failed"
            );
        }
    }

    async fn find_owned(&self, cmd: &StartCallCommand) -> Result<Call, CallError> {
        self.calls
            .find_owned(&cmd.call_id, &cmd.user_id)
            .await?
            .ok_or(CallError::NotFound(cmd.call_id))
    }
}
