//! Call status state machine and final result.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle of one outbound call attempt. Strictly forward-moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallStatus {
    /// Created, not yet dialed.
    #[default]
    Pending,
    /// Dial request in flight at the voice provider.
    Calling,
    /// Far end connected; the voice agent is talking.
    InProgress,
    Completed,
    Failed,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Pending => "PENDING",
            CallStatus::Calling => "CALLING",
            CallStatus::InProgress => "IN_PROGRESS",
            CallStatus::Completed => "COMPLETED",
            CallStatus::Failed => "FAILED",
        }
    }
}

impl std::str::FromStr for CallStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(CallStatus::Pending),
            "CALLING" => Ok(CallStatus::Calling),
            "IN_PROGRESS" => Ok(CallStatus::InProgress),
            "COMPLETED" => Ok(CallStatus::Completed),
            "FAILED" => Ok(CallStatus::Failed),
            other => Err(format!("unknown call status: {}", other)),
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for CallStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use CallStatus::*;
        matches!(
            (self, target),
            (Pending, Calling)
                | (Calling, InProgress)
                // Origination refused by the provider
                | (Calling, Failed)
                | (InProgress, Completed)
                | (InProgress, Failed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use CallStatus::*;
        match self {
            Pending => vec![Calling],
            Calling => vec![InProgress, Failed],
            InProgress => vec![Completed, Failed],
            Completed | Failed => vec![],
        }
    }
}

/// How the call ended, from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallResult {
    Success,
    NoAnswer,
    Rejected,
    Error,
}

impl CallResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallResult::Success => "SUCCESS",
            CallResult::NoAnswer => "NO_ANSWER",
            CallResult::Rejected => "REJECTED",
            CallResult::Error => "ERROR",
        }
    }

    /// Status a call with this result ends in. Only technical errors count
    /// as a failed call; an unanswered or declined call still completed.
    pub fn terminal_status(&self) -> CallStatus {
        match self {
            CallResult::Error => CallStatus::Failed,
            _ => CallStatus::Completed,
        }
    }

    /// Human-readable failure category, `None` for success.
    pub fn failure_message(&self) -> Option<&'static str> {
        match self {
            CallResult::Success => None,
            CallResult::NoAnswer => Some("상대방이 전화를 받지 않았습니다."),
            CallResult::Rejected => Some("요청이 거절되었습니다."),
            CallResult::Error => Some("통화 중 오류가 발생했습니다."),
        }
    }

    /// What the user might try next, `None` for success.
    pub fn failure_hint(&self) -> Option<&'static str> {
        match self {
            CallResult::Success => None,
            CallResult::NoAnswer => Some("잠시 후 다시 시도해보세요."),
            CallResult::Rejected => Some("다른 일정이나 조건으로 다시 시도해보세요."),
            CallResult::Error => Some("네트워크 상태를 확인하고 다시 시도해보세요."),
        }
    }
}

impl std::str::FromStr for CallResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(CallResult::Success),
            "NO_ANSWER" => Ok(CallResult::NoAnswer),
            "REJECTED" => Ok(CallResult::Rejected),
            "ERROR" => Ok(CallResult::Error),
            other => Err(format!("unknown call result: {}", other)),
        }
    }
}

impl fmt::Display for CallResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [CallStatus; 5] = [
        CallStatus::Pending,
        CallStatus::Calling,
        CallStatus::InProgress,
        CallStatus::Completed,
        CallStatus::Failed,
    ];

    fn rank(status: CallStatus) -> u8 {
        match status {
            CallStatus::Pending => 0,
            CallStatus::Calling => 1,
            CallStatus::InProgress => 2,
            CallStatus::Completed | CallStatus::Failed => 3,
        }
    }

    #[test]
    fn transitions_only_move_forward() {
        for from in ALL {
            for to in from.valid_transitions() {
                assert!(rank(to) > rank(from), "{:?} -> {:?}", from, to);
            }
        }
    }

    #[test]
    fn pending_cannot_skip_to_in_progress() {
        assert!(!CallStatus::Pending.can_transition_to(&CallStatus::InProgress));
        assert!(!CallStatus::Calling.can_transition_to(&CallStatus::Completed));
    }

    #[test]
    fn completed_and_failed_are_terminal() {
        assert!(CallStatus::Completed.is_terminal());
        assert!(CallStatus::Failed.is_terminal());
        assert!(!CallStatus::InProgress.is_terminal());
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for from in ALL {
            for to in ALL {
                assert_eq!(from.can_transition_to(&to), from.valid_transitions().contains(&to));
            }
        }
    }

    #[test]
    fn only_error_results_fail_the_call() {
        assert_eq!(CallResult::Error.terminal_status(), CallStatus::Failed);
        assert_eq!(CallResult::NoAnswer.terminal_status(), CallStatus::Completed);
        assert_eq!(CallResult::Success.terminal_status(), CallStatus::Completed);
    }

    #[test]
    fn failure_text_exists_for_every_non_success() {
        assert!(CallResult::Success.failure_message().is_none());
        for result in [CallResult::NoAnswer, CallResult::Rejected, CallResult::Error] {
            assert!(result.failure_message().is_some());
            assert!(result.failure_hint().is_some());
        }
    }

    #[test]
    fn serializes_in_screaming_case() {
        assert_eq!(
            serde_json::to_string(&CallStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!("NO_ANSWER".parse::<CallResult>(), Ok(CallResult::NoAnswer));
    }
}
