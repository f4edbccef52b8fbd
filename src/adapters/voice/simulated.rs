//! Simulated voice provider for environments without live telephony.
//!
//! `originate` succeeds with a `sim_` handle unless configured to fail.
//! `get_status` replays queued reports and otherwise reports a finished,
//! successful session. Every origination request is recorded.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::domain::call::{VoiceSessionReport, VoiceSessionState};
use crate::ports::{OutboundCallRequest, OutboundCallSession, VoiceError, VoiceProvider};

#[derive(Debug, Default)]
pub struct SimulatedVoiceProvider {
    originate_error: Option<VoiceError>,
    reports: Mutex<VecDeque<Result<VoiceSessionReport, VoiceError>>>,
    requests: Mutex<Vec<OutboundCallRequest>>,
    polls: Mutex<usize>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimulatedVoiceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every origination fails with `error`.
    pub fn failing(error: VoiceError) -> Self {
        Self {
            originate_error: Some(error),
            ..Self::default()
        }
    }

    /// Queues a report for the next `get_status` call.
    pub fn with_report(self, report: VoiceSessionReport) -> Self {
        lock(&self.reports).push_back(Ok(report));
        self
    }

    /// Queues a polling error for the next `get_status` call.
    pub fn with_poll_error(self, error: VoiceError) -> Self {
        lock(&self.reports).push_back(Err(error));
        self
    }

    /// Origination requests received so far.
    pub fn requests(&self) -> Vec<OutboundCallRequest> {
        lock(&self.requests).clone()
    }

    pub fn poll_count(&self) -> usize {
        *lock(&self.polls)
    }
}

#[async_trait]
impl VoiceProvider for SimulatedVoiceProvider {
    async fn originate(
        &self,
        request: OutboundCallRequest,
    ) -> Result<OutboundCallSession, VoiceError> {
        lock(&self.requests).push(request);

        match &self.originate_error {
            Some(error) => Err(error.clone()),
            None => Ok(OutboundCallSession::new(format!("sim_{}", Uuid::new_v4().simple()))),
        }
    }

    async fn get_status(&self, _session_handle: &str) -> Result<VoiceSessionReport, VoiceError> {
        *lock(&self.polls) += 1;

        lock(&self.reports).pop_front().unwrap_or_else(|| {
            Ok(VoiceSessionReport {
                verdict: Some("success".to_string()),
                ..VoiceSessionReport::new(VoiceSessionState::Done)
            })
        })
    }
}
