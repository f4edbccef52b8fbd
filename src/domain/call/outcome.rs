//! Turning what the voice provider reports into a call result.

use serde::{Deserialize, Serialize};

use crate::domain::collection::{CollectedData, ScenarioType};

use super::CallResult;

/// Final result and summary written to a call exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOutcome {
    pub result: CallResult,
    pub summary: String,
}

impl CallOutcome {
    pub fn new(result: CallResult, summary: impl Into<String>) -> Self {
        Self {
            result,
            summary: summary.into(),
        }
    }

    /// Technical failure with a diagnostic summary.
    pub fn error(summary: impl Into<String>) -> Self {
        Self::new(CallResult::Error, summary)
    }
}

/// Provider-neutral lifecycle of a remote voice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceSessionState {
    Initiated,
    InProgress,
    /// Call ended; the provider is still analysing it.
    Processing,
    Done,
    Failed,
}

impl VoiceSessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, VoiceSessionState::Done | VoiceSessionState::Failed)
    }
}

/// One poll of a voice session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceSessionReport {
    pub state: VoiceSessionState,
    /// Provider's own success verdict, e.g. `success`, `failure`, `unknown`.
    pub verdict: Option<String>,
    /// Why the call ended, e.g. `no-answer`, `busy`, `remote hangup`.
    pub termination_reason: Option<String>,
    pub summary: Option<String>,
}

impl VoiceSessionReport {
    pub fn new(state: VoiceSessionState) -> Self {
        Self {
            state,
            verdict: None,
            termination_reason: None,
            summary: None,
        }
    }
}

const NO_ANSWER_MARKERS: [&str; 6] = ["no-answer", "no_answer", "noanswer", "busy", "voicemail", "timeout"];
const REJECTED_MARKERS: [&str; 3] = ["reject", "declin", "hang"];

/// Maps a provider report to the local result.
///
/// Returns `None` while the session is still running. Anything the mapping
/// does not recognise becomes [`CallResult::Error`].
pub fn classify_report(report: &VoiceSessionReport) -> Option<CallOutcome> {
    if !report.state.is_terminal() {
        return None;
    }

    let verdict = report.verdict.as_deref().map(str::to_ascii_lowercase);
    let reason = report
        .termination_reason
        .as_deref()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let reason_has = |markers: &[&str]| markers.iter().any(|m| reason.contains(m));

    let result = match (report.state, verdict.as_deref()) {
        (VoiceSessionState::Failed, _) => CallResult::Error,
        (_, Some("success")) => CallResult::Success,
        _ if reason_has(&NO_ANSWER_MARKERS[..]) => CallResult::NoAnswer,
        (_, Some("failure")) => CallResult::Rejected,
        _ if reason_has(&REJECTED_MARKERS[..]) => CallResult::Rejected,
        _ => CallResult::Error,
    };

    let summary = report
        .summary
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| result.failure_message().map(str::to_string))
        .unwrap_or_else(|| "통화가 완료되었습니다.".to_string());

    Some(CallOutcome::new(result, summary))
}

/// Plausible success summary used when no live provider is configured.
pub fn mock_summary(data: &CollectedData) -> String {
    let target = data.target_name.as_deref().unwrap_or("상대방");
    let mut details = Vec::new();
    if let Some(datetime) = &data.primary_datetime {
        details.push(format!("일시: {}", datetime));
    }
    if let Some(service) = &data.service {
        details.push(format!("내용: {}", service));
    }
    if let Some(name) = &data.customer_name {
        details.push(format!("예약자: {}", name));
    }
    if let Some(size) = data.party_size {
        details.push(format!("인원: {}명", size));
    }

    let headline = match data.scenario_type {
        Some(ScenarioType::Inquiry) => format!("{}에 문의를 완료했어요.", target),
        Some(ScenarioType::AsRequest) => format!("{}에 AS 접수를 완료했어요.", target),
        Some(ScenarioType::Reservation) | None => format!("{} 예약이 확정되었어요.", target),
    };

    if details.is_empty() {
        headline
    } else {
        format!("{} ({})", headline, details.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn done(verdict: Option<&str>, reason: Option<&str>) -> VoiceSessionReport {
        VoiceSessionReport {
            state: VoiceSessionState::Done,
            verdict: verdict.map(str::to_string),
            termination_reason: reason.map(str::to_string),
            summary: None,
        }
    }

    #[test]
    fn running_sessions_have_no_outcome() {
        for state in [
            VoiceSessionState::Initiated,
            VoiceSessionState::InProgress,
            VoiceSessionState::Processing,
        ] {
            assert_eq!(classify_report(&VoiceSessionReport::new(state)), None);
        }
    }

    #[test]
    fn provider_failure_is_error() {
        let outcome = classify_report(&VoiceSessionReport::new(VoiceSessionState::Failed)).unwrap();
        assert_eq!(outcome.result, CallResult::Error);
        assert_eq!(outcome.summary, "통화 중 오류가 발생했습니다.");
    }

    #[test]
    fn verdicts_and_reasons_map_to_results() {
        let cases = [
            (Some("success"), None, CallResult::Success),
            (Some("SUCCESS"), Some("remote hangup"), CallResult::Success),
            (Some("unknown"), Some("no-answer"), CallResult::NoAnswer),
            (Some("failure"), Some("Busy signal"), CallResult::NoAnswer),
            (Some("failure"), None, CallResult::Rejected),
            (None, Some("Call declined by recipient"), CallResult::Rejected),
            (Some("unknown"), Some("something new"), CallResult::Error),
            (None, None, CallResult::Error),
        ];
        for (verdict, reason, expected) in cases {
            let outcome = classify_report(&done(verdict, reason)).unwrap();
            assert_eq!(outcome.result, expected, "{:?} / {:?}", verdict, reason);
        }
    }

    #[test]
    fn provider_summary_is_kept() {
        let mut report = done(Some("success"), None);
        report.summary = Some("  내일 3시 예약 완료  ".to_string());
        assert_eq!(classify_report(&report).unwrap().summary, "내일 3시 예약 완료");
    }

    #[test]
    fn success_without_summary_has_generic_text() {
        assert_eq!(
            classify_report(&done(Some("success"), None)).unwrap().summary,
            "통화가 완료되었습니다."
        );
    }

    #[test]
    fn mock_summary_mentions_collected_details() {
        let data = CollectedData {
            target_name: Some("OO미용실".to_string()),
            scenario_type: Some(ScenarioType::Reservation),
            primary_datetime: Some("내일 오후 3시".to_string()),
            service: Some("커트".to_string()),
            party_size: Some(2),
            ..CollectedData::default()
        };
        assert_eq!(
            mock_summary(&data),
            "OO미용실 예약이 확정되었어요. (일시: 내일 오후 3시, 내용: 커트, 인원: 2명)"
        );
    }

    #[test]
    fn mock_summary_for_inquiry_without_details() {
        let data = CollectedData {
            scenario_type: Some(ScenarioType::Inquiry),
            ..CollectedData::default()
        };
        assert_eq!(mock_summary(&data), "상대방에 문의를 완료했어요.");
    }
}
