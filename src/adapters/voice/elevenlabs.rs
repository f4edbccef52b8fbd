//! ElevenLabs conversational-AI adapter for outbound calls.
//!
//! - `originate` posts to `/v1/convai/twilio/outbound-call` with the agent,
//!   the caller-id phone number, the destination, the generated prompt as an
//!   agent override, and the script's dynamic variables
//! - `get_status` reads `/v1/convai/conversations/{id}` and maps status,
//!   `analysis.call_successful`, `analysis.transcript_summary` and
//!   `metadata.termination_reason` into a [`VoiceSessionReport`]

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::call::{VoiceSessionReport, VoiceSessionState};
use crate::ports::{OutboundCallRequest, OutboundCallSession, VoiceError, VoiceProvider};

/// Configuration for the ElevenLabs adapter.
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    api_key: Secret<String>,
    pub agent_id: String,
    pub phone_number_id: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ElevenLabsConfig {
    pub fn new(
        api_key: impl Into<String>,
        agent_id: impl Into<String>,
        phone_number_id: impl Into<String>,
    ) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            agent_id: agent_id.into(),
            phone_number_id: phone_number_id.into(),
            base_url: "https://api.elevenlabs.io".to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn is_configured(&self) -> bool {
        !self.api_key.expose_secret().is_empty()
            && !self.agent_id.is_empty()
            && !self.phone_number_id.is_empty()
    }
}

pub struct ElevenLabsVoiceProvider {
    config: ElevenLabsConfig,
    client: Client,
}

impl ElevenLabsVoiceProvider {
    pub fn new(config: ElevenLabsConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    fn outbound_body(&self, request: &OutboundCallRequest) -> OutboundCallBody {
        OutboundCallBody {
            agent_id: self.config.agent_id.clone(),
            agent_phone_number_id: self.config.phone_number_id.clone(),
            to_number: request.to_number.clone(),
            conversation_initiation_client_data: InitiationData {
                dynamic_variables: request.script.dynamic_variables.clone(),
                conversation_config_override: ConfigOverride {
                    agent: AgentOverride {
                        prompt: PromptOverride {
                            prompt: request.script.system_prompt.clone(),
                        },
                    },
                },
            },
        }
    }

    async fn check_status(response: Response) -> Result<Response, VoiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(VoiceError::rejected(status.as_u16(), body))
    }
}

#[async_trait]
impl VoiceProvider for ElevenLabsVoiceProvider {
    async fn originate(
        &self,
        request: OutboundCallRequest,
    ) -> Result<OutboundCallSession, VoiceError> {
        if !self.config.is_configured() {
            return Err(VoiceError::NotConfigured);
        }

        let response = self
            .client
            .post(format!("{}/v1/convai/twilio/outbound-call", self.config.base_url))
            .header("xi-api-key", self.config.api_key.expose_secret())
            .json(&self.outbound_body(&request))
            .send()
            .await
            .map_err(|e| VoiceError::Network(e.to_string()))?;

        let body: OutboundCallResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| VoiceError::Parse(e.to_string()))?;

        match body.conversation_id {
            Some(id) if body.success.unwrap_or(true) && !id.is_empty() => {
                Ok(OutboundCallSession::new(id))
            }
            _ => Err(VoiceError::rejected(
                200,
                body.message
                    .unwrap_or_else(|| "outbound call was not accepted".to_string()),
            )),
        }
    }

    async fn get_status(&self, session_handle: &str) -> Result<VoiceSessionReport, VoiceError> {
        if !self.config.is_configured() {
            return Err(VoiceError::NotConfigured);
        }

        let response = self
            .client
            .get(format!(
                "{}/v1/convai/conversations/{}",
                self.config.base_url, session_handle
            ))
            .header("xi-api-key", self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| VoiceError::Network(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Err(VoiceError::SessionNotFound(session_handle.to_string()));
        }

        let body: ConversationDetails = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| VoiceError::Parse(e.to_string()))?;

        Ok(body.into_report())
    }
}

// ----- ElevenLabs API Types -----

#[derive(Debug, Serialize)]
struct OutboundCallBody {
    agent_id: String,
    agent_phone_number_id: String,
    to_number: String,
    conversation_initiation_client_data: InitiationData,
}

#[derive(Debug, Serialize)]
struct InitiationData {
    dynamic_variables: BTreeMap<String, String>,
    conversation_config_override: ConfigOverride,
}

#[derive(Debug, Serialize)]
struct ConfigOverride {
    agent: AgentOverride,
}

#[derive(Debug, Serialize)]
struct AgentOverride {
    prompt: PromptOverride,
}

#[derive(Debug, Serialize)]
struct PromptOverride {
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct OutboundCallResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    conversation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConversationDetails {
    status: String,
    #[serde(default)]
    analysis: Option<Analysis>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

#[derive(Debug, Deserialize)]
struct Analysis {
    #[serde(default)]
    call_successful: Option<String>,
    #[serde(default)]
    transcript_summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    #[serde(default)]
    termination_reason: Option<String>,
}

impl ConversationDetails {
    fn into_report(self) -> VoiceSessionReport {
        let state = match self.status.as_str() {
            "initiated" => VoiceSessionState::Initiated,
            "in-progress" | "in_progress" => VoiceSessionState::InProgress,
            "processing" => VoiceSessionState::Processing,
            "done" => VoiceSessionState::Done,
            "failed" => VoiceSessionState::Failed,
            other => {
                tracing::warn!(status = other, "Unknown voice session status, treating as failed");
                VoiceSessionState::Failed
            }
        };
        let (verdict, summary) = match self.analysis {
            Some(a) => (a.call_successful, a.transcript_summary),
            None => (None, None),
        };

        VoiceSessionReport {
            state,
            verdict,
            termination_reason: self.metadata.and_then(|m| m.termination_reason),
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::CallScript;
    use serde_json::json;

    fn provider() -> ElevenLabsVoiceProvider {
        ElevenLabsVoiceProvider::new(ElevenLabsConfig::new("key", "agent_1", "phone_1"))
    }

    #[test]
    fn outbound_body_carries_prompt_and_variables() {
        let mut dynamic_variables = BTreeMap::new();
        dynamic_variables.insert("target_name".to_string(), "OO미용실".to_string());
        let request = OutboundCallRequest {
            to_number: "+821012345678".to_string(),
            script: CallScript {
                system_prompt: "당신은 예약 대행 AI입니다.".to_string(),
                dynamic_variables,
            },
        };

        let body = serde_json::to_value(provider().outbound_body(&request)).unwrap();

        assert_eq!(body["agent_id"], "agent_1");
        assert_eq!(body["agent_phone_number_id"], "phone_1");
        assert_eq!(body["to_number"], "+821012345678");
        let data = &body["conversation_initiation_client_data"];
        assert_eq!(data["dynamic_variables"]["target_name"], "OO미용실");
        assert_eq!(
            data["conversation_config_override"]["agent"]["prompt"]["prompt"],
            "당신은 예약 대행 AI입니다."
        );
    }

    #[test]
    fn done_conversation_maps_analysis() {
        let details: ConversationDetails = serde_json::from_value(json!({
            "status": "done",
            "analysis": {"call_successful": "success", "transcript_summary": "예약 완료"},
            "metadata": {"termination_reason": "Call ended by remote party"}
        }))
        .unwrap();

        let report = details.into_report();

        assert_eq!(report.state, VoiceSessionState::Done);
        assert_eq!(report.verdict.as_deref(), Some("success"));
        assert_eq!(report.summary.as_deref(), Some("예약 완료"));
        assert!(report.termination_reason.is_some());
    }

    #[test]
    fn running_conversation_has_no_analysis() {
        let details: ConversationDetails =
            serde_json::from_value(json!({"status": "in-progress"})).unwrap();

        let report = details.into_report();

        assert_eq!(report.state, VoiceSessionState::InProgress);
        assert!(report.verdict.is_none());
    }

    #[test]
    fn unknown_status_is_failed() {
        let details: ConversationDetails =
            serde_json::from_value(json!({"status": "exploded"})).unwrap();

        assert_eq!(details.into_report().state, VoiceSessionState::Failed);
    }

    #[tokio::test]
    async fn unconfigured_provider_refuses_to_dial() {
        let provider = ElevenLabsVoiceProvider::new(ElevenLabsConfig::new("", "", ""));
        let request = OutboundCallRequest {
            to_number: "+821012345678".to_string(),
            script: CallScript {
                system_prompt: String::new(),
                dynamic_variables: BTreeMap::new(),
            },
        };

        assert_eq!(provider.originate(request).await, Err(VoiceError::NotConfigured));
    }
}
