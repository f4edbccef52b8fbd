//! Splits a raw model reply into the text shown to the user and the
//! structured slot update embedded in it.
//!
//! The model is asked to end every reply with a fenced ```json block. It
//! does not always comply, so every failure mode degrades to "plain text,
//! nothing extracted" instead of an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::domain::collection::PartialCollectedData;

/// Shown when the reply consisted of nothing but the structured block.
pub const EMPTY_REPLY_ACKNOWLEDGEMENT: &str = "알겠습니다!";

static JSON_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("static regex"));

/// How the structured block fared, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    Structured,
    NoBlock,
    Malformed,
}

/// Result of parsing one assistant reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    /// User-facing text with the structured block removed.
    pub message: String,
    pub collected: PartialCollectedData,
    /// The model's own "all required slots present" flag.
    pub is_complete: bool,
    pub next_question: Option<String>,
    pub outcome: ParseOutcome,
}

impl ParsedResponse {
    fn plain(message: String, outcome: ParseOutcome) -> Self {
        Self {
            message,
            collected: PartialCollectedData::default(),
            is_complete: false,
            next_question: None,
            outcome,
        }
    }
}

/// Parses a raw reply. Never fails.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let Some(caps) = JSON_BLOCK.captures(raw) else {
        return ParsedResponse::plain(raw.trim().to_string(), ParseOutcome::NoBlock);
    };

    let body = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let stripped = JSON_BLOCK.replacen(raw, 1, "").trim().to_string();

    let parsed = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(obj)) => obj,
        _ => {
            let message = if stripped.is_empty() {
                raw.trim().to_string()
            } else {
                stripped
            };
            return ParsedResponse::plain(message, ParseOutcome::Malformed);
        }
    };

    let collected = parsed
        .get("collected")
        .map(PartialCollectedData::from_json)
        .unwrap_or_default();
    let is_complete = parsed
        .get("is_complete")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let next_question = parsed
        .get("next_question")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string);

    ParsedResponse {
        message: if stripped.is_empty() {
            EMPTY_REPLY_ACKNOWLEDGEMENT.to_string()
        } else {
            stripped
        },
        collected,
        is_complete,
        next_question,
        outcome: ParseOutcome::Structured,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collection::{CollectedData, ScenarioType, SlotUpdate};

    #[test]
    fn structured_block_is_extracted_and_removed() {
        let raw = "hello ```json {\"collected\": {\"target_name\":\"Joe's\"}, \"is_complete\": true} ``` ";

        let parsed = parse_response(raw);

        assert_eq!(parsed.message, "hello");
        assert!(!parsed.message.contains("```"));
        assert_eq!(parsed.collected.target_name, SlotUpdate::Value("Joe's".to_string()));
        assert!(parsed.is_complete);
        assert_eq!(parsed.outcome, ParseOutcome::Structured);
    }

    #[test]
    fn missing_block_degrades_to_plain_text() {
        let raw = "  전화번호를 알려주세요.  ";

        let parsed = parse_response(raw);

        assert_eq!(parsed.message, "전화번호를 알려주세요.");
        assert_eq!(parsed.collected.to_collected(), CollectedData::default());
        assert!(!parsed.is_complete);
        assert_eq!(parsed.outcome, ParseOutcome::NoBlock);
    }

    #[test]
    fn malformed_block_is_stripped_from_message() {
        let raw = "확인했어요!\n```json\n{\"collected\": {\"target_name\": \n```";

        let parsed = parse_response(raw);

        assert_eq!(parsed.message, "확인했어요!");
        assert!(parsed.collected.is_empty());
        assert!(!parsed.is_complete);
        assert_eq!(parsed.outcome, ParseOutcome::Malformed);
    }

    #[test]
    fn malformed_block_alone_keeps_raw_text() {
        let raw = "```json\nnot json\n```";
        assert_eq!(parse_response(raw).message, raw);
    }

    #[test]
    fn non_object_json_counts_as_malformed() {
        let parsed = parse_response("네 ```json [1, 2] ```");
        assert_eq!(parsed.outcome, ParseOutcome::Malformed);
        assert_eq!(parsed.message, "네");
    }

    #[test]
    fn block_only_reply_gets_acknowledgement() {
        let raw = "```json\n{\"collected\": {}, \"is_complete\": false}\n```";
        assert_eq!(parse_response(raw).message, EMPTY_REPLY_ACKNOWLEDGEMENT);
    }

    #[test]
    fn full_reply_from_collection_prompt() {
        let raw = r#"OO미용실 커트 예약이군요! 전화번호를 알려주시겠어요? 📞

```json
{
  "collected": {
    "target_name": "OO미용실",
    "target_phone": null,
    "scenario_type": "RESERVATION",
    "primary_datetime": "내일 오후 3시",
    "service": "커트",
    "fallback_datetimes": [],
    "party_size": null,
    "mood": "cheerful"
  },
  "is_complete": false,
  "next_question": "전화번호"
}
```"#;

        let parsed = parse_response(raw);
        let data = parsed.collected.to_collected();

        assert_eq!(parsed.message, "OO미용실 커트 예약이군요! 전화번호를 알려주시겠어요? 📞");
        assert_eq!(data.target_name.as_deref(), Some("OO미용실"));
        assert_eq!(data.scenario_type, Some(ScenarioType::Reservation));
        assert_eq!(data.primary_datetime.as_deref(), Some("내일 오후 3시"));
        assert_eq!(data.service.as_deref(), Some("커트"));
        assert_eq!(data.target_phone, None);
        assert_eq!(parsed.collected.target_phone, SlotUpdate::Null);
        assert_eq!(parsed.next_question.as_deref(), Some("전화번호"));
    }

    #[test]
    fn missing_completion_flag_defaults_to_false() {
        let parsed = parse_response("ok ```json {\"collected\": {\"service\": \"파마\"}} ```");
        assert!(!parsed.is_complete);
        assert_eq!(parsed.collected.service, SlotUpdate::Value("파마".to_string()));
    }
}
