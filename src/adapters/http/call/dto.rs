//! HTTP DTOs for call endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::call::StartCallResult;
use crate::domain::call::{Call, CallResult, CallStatus};
use crate::domain::collection::{CollectedData, ScenarioType};
use crate::domain::foundation::Timestamp;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCallRequest {
    pub conversation_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub request_type: Option<ScenarioType>,
    pub target_name: Option<String>,
    pub target_phone: String,
    pub details: CollectedData,
    pub status: CallStatus,
    pub result: Option<CallResult>,
    pub summary: Option<String>,
    /// User-facing explanation for unsuccessful results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_hint: Option<String>,
    pub session_handle: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl From<&Call> for CallResponse {
    fn from(call: &Call) -> Self {
        let result = call.result();
        Self {
            id: call.id().to_string(),
            conversation_id: call.conversation_id().map(ToString::to_string),
            request_type: call.request_type(),
            target_name: call.target_name().map(str::to_string),
            target_phone: call.target_phone().to_string(),
            details: call.details().clone(),
            status: call.status(),
            result,
            summary: call.summary().map(str::to_string),
            failure_message: result.and_then(|r| r.failure_message()).map(str::to_string),
            failure_hint: result.and_then(|r| r.failure_hint()).map(str::to_string),
            session_handle: call.session_handle().map(str::to_string),
            created_at: call.created_at().to_rfc3339(),
            completed_at: call.completed_at().map(Timestamp::to_rfc3339),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CallListResponse {
    pub calls: Vec<CallResponse>,
}

impl From<Vec<Call>> for CallListResponse {
    fn from(calls: Vec<Call>) -> Self {
        Self {
            calls: calls.iter().map(Into::into).collect(),
        }
    }
}

/// Response to `POST /api/calls/:id/start`.
#[derive(Debug, Clone, Serialize)]
pub struct StartCallResponse {
    pub success: bool,
    pub call_id: String,
    pub status: CallStatus,
    pub session_handle: Option<String>,
}

impl From<&StartCallResult> for StartCallResponse {
    fn from(result: &StartCallResult) -> Self {
        Self {
            success: result.originated,
            call_id: result.call.id().to_string(),
            status: result.call.status(),
            session_handle: result.session_handle().map(str::to_string),
        }
    }
}
