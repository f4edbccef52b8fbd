//! Detached outcome reconciliation for calls that reached `IN_PROGRESS`.
//!
//! Two strategies, picked at startup:
//! - `Simulated`: wait a fixed delay, then report a plausible success built
//!   from the frozen call details
//! - `Live`: poll the voice provider until it reports a terminal state;
//!   a polling error or the overall timeout fails the call
//!
//! Both end in [`CallReconciler::finalize`], the only place a call becomes
//! terminal.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::domain::call::{classify_report, mock_summary, Call, CallOutcome, CallResult};
use crate::domain::foundation::{ConversationId, DomainError};
use crate::ports::{CallRepository, ConversationRepository, VoiceProvider};

use super::CallError;

/// How call outcomes are observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    Simulated {
        delay: Duration,
    },
    Live {
        poll_interval: Duration,
        timeout: Duration,
    },
}

impl ReconcileMode {
    pub fn is_simulated(&self) -> bool {
        matches!(self, ReconcileMode::Simulated { .. })
    }
}

pub struct CallReconciler {
    calls: Arc<dyn CallRepository>,
    conversations: Arc<dyn ConversationRepository>,
    voice: Arc<dyn VoiceProvider>,
    mode: ReconcileMode,
}

impl CallReconciler {
    pub fn new(
        calls: Arc<dyn CallRepository>,
        conversations: Arc<dyn ConversationRepository>,
        voice: Arc<dyn VoiceProvider>,
        mode: ReconcileMode,
    ) -> Self {
        Self {
            calls,
            conversations,
            voice,
            mode,
        }
    }

    pub fn mode(&self) -> ReconcileMode {
        self.mode
    }

    /// Runs [`reconcile`](Self::reconcile) as a background task.
    pub fn spawn(self: &Arc<Self>, call: Call) -> JoinHandle<()> {
        let reconciler = Arc::clone(self);
        tokio::spawn(async move { reconciler.reconcile(call).await })
    }

    /// Observes the outcome of an in-progress call and writes it.
    pub async fn reconcile(&self, call: Call) {
        let call_id = *call.id();
        let outcome = self.observe(&call).await;

        match self.finalize(call, outcome).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!(call_id = %call_id, "Call was already finalized"),
            Err(e) => tracing::error!(call_id = %call_id, error = %e, "Failed to finalize call"),
        }
    }

    async fn observe(&self, call: &Call) -> CallOutcome {
        match self.mode {
            ReconcileMode::Simulated { delay } => {
                tokio::time::sleep(delay).await;
                CallOutcome::new(CallResult::Success, mock_summary(call.details()))
            }
            ReconcileMode::Live {
                poll_interval,
                timeout,
            } => {
                let Some(handle) = call.session_handle() else {
                    return CallOutcome::error("통화 세션 정보가 없습니다.");
                };
                match tokio::time::timeout(timeout, self.poll(handle, poll_interval)).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        tracing::warn!(
                            call_id = %call.id(),
                            timeout_secs = timeout.as_secs(),
                            "Call did not finish before the polling timeout"
                        );
                        CallOutcome::error("통화 결과 확인 시간이 초과되었습니다.")
                    }
                }
            }
        }
    }

    async fn poll(&self, handle: &str, interval: Duration) -> CallOutcome {
        loop {
            tokio::time::sleep(interval).await;
            match self.voice.get_status(handle).await {
                Ok(report) => {
                    if let Some(outcome) = classify_report(&report) {
                        return outcome;
                    }
                    tracing::debug!(session = handle, state = ?report.state, "Call still running");
                }
                Err(e) => {
                    tracing::warn!(session = handle, error = %e, "Polling the voice session failed");
                    return CallOutcome::error(format!("통화 상태 조회 실패: {}", e));
                }
            }
        }
    }

    /// The terminal write shared by origination failures and both
    /// reconciliation strategies.
    ///
    /// The call record is written first and is authoritative. The linked
    /// conversation is then moved to `COMPLETED` on a best-effort basis: a
    /// failure there is logged and does not undo the call.
    ///
    /// Returns `Ok(false)` when the call was already terminal; nothing is
    /// written in that case.
    pub async fn finalize(&self, mut call: Call, outcome: CallOutcome) -> Result<bool, CallError> {
        if !call.finish(outcome)? {
            return Ok(false);
        }
        if !self.calls.finalize(&call).await? {
            return Ok(false);
        }

        tracing::info!(
            call_id = %call.id(),
            status = %call.status(),
            result = ?call.result(),
            "Call finished"
        );

        if let Some(conversation_id) = call.conversation_id() {
            if let Err(e) = self.complete_conversation(conversation_id).await {
                tracing::warn!(
                    call_id = %call.id(),
                    conversation_id = %conversation_id,
                    error = %e,
                    "Call finished but the conversation could not be completed"
                );
            }
        }
        Ok(true)
    }

    async fn complete_conversation(&self, id: &ConversationId) -> Result<(), DomainError> {
        let Some(mut conversation) = self.conversations.find_by_id(id).await? else {
            return Ok(());
        };
        conversation.complete()?;
        self.conversations.update(&conversation).await
    }
}
