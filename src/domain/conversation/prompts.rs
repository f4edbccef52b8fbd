//! Text the collection assistant is driven by.

use crate::domain::collection::CollectedData;

use super::place::{format_places_for_model, Place};

/// First assistant message of every conversation.
pub const GREETING_MESSAGE: &str = "안녕하세요! 어떤 전화를 대신 걸어드릴까요? 😊";

/// Returned in place of a reply when the model could not be reached.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "죄송합니다, 잠시 오류가 발생했어요. 다시 말씀해주세요.";

/// Description of the `search_place` tool offered to the model.
pub const SEARCH_TOOL_DESCRIPTION: &str =
    "전화할 장소의 이름이나 전화번호를 모를 때 지역 업체를 검색합니다. 예: \"강남역 미용실\"";

const COLLECTION_INSTRUCTION: &str = r#"당신은 WIGVO의 AI 비서입니다. 사용자를 대신해 전화를 걸어주는 서비스를 제공합니다.

## 역할
사용자와 친근하게 대화하며 전화에 필요한 정보를 모읍니다.

## 필수 정보
- target_name: 전화할 곳 이름 (예: "OO미용실")
- target_phone: 전화번호 (예: "010-1234-5678", "02-123-4567")
- scenario_type: RESERVATION(예약) | INQUIRY(문의) | AS_REQUEST(AS/수리 요청)
- primary_datetime: 원하는 날짜/시간 (예: "내일 오후 3시")

## 있으면 좋은 정보
- service: 서비스 종류 (예: "커트", "점심 코스")
- fallback_datetimes: 대안 시간 목록
- fallback_action: 원하는 시간이 안 될 때 ASK_AVAILABLE | NEXT_DAY | CANCEL
- customer_name: 예약자 이름
- party_size: 인원수 (숫자)
- special_request: 특별 요청사항

## 대화 규칙
1. 한 번에 1-2개만 물어봅니다
2. 해요체로 친근하게 말합니다
3. 모호한 답변은 다시 확인합니다
4. 필수 정보가 모이면 요약하고 "맞으시면 전화 걸어볼게요!"처럼 확인을 요청합니다
5. 장소 이름만 알고 전화번호를 모르면 search_place 도구로 찾아봅니다

## 출력 형식
매 응답 끝에 반드시 아래 JSON 블록을 붙이세요. 모르는 값은 null로 둡니다.

```json
{
  "collected": {
    "target_name": null,
    "target_phone": null,
    "scenario_type": null,
    "primary_datetime": null,
    "service": null,
    "fallback_datetimes": [],
    "fallback_action": null,
    "customer_name": null,
    "party_size": null,
    "special_request": null
  },
  "is_complete": false,
  "next_question": "다음에 물어볼 내용"
}
```

필수 정보 네 가지가 모두 모이면 is_complete를 true로 설정합니다."#;

/// Builds the system instruction for one turn.
///
/// The fixed instruction is followed by what is already known, the guidance
/// for the chosen sub-type, and any venue candidates found this turn.
pub fn build_system_instruction(collected: &CollectedData, candidates: &[Place]) -> String {
    let mut sections = vec![COLLECTION_INSTRUCTION.to_string()];

    if !collected.is_empty() {
        let known = serde_json::to_string_pretty(collected).unwrap_or_default();
        sections.push(format!(
            "## 지금까지 수집된 정보\n이미 확인된 값은 다시 묻지 말고 JSON에 그대로 유지하세요.\n{}",
            known
        ));
    }

    if let (Some(scenario), Some(sub_type)) = (collected.scenario_type, collected.scenario_sub_type) {
        if sub_type.belongs_to(scenario) {
            sections.push(format!(
                "## 용건 안내 ({} / {})\n{}",
                scenario.label(),
                sub_type,
                sub_type.guidance()
            ));
        }
    }

    if !candidates.is_empty() {
        sections.push(format!(
            "## 장소 검색 결과\n사용자에게 번호와 함께 보여주고 어느 곳인지 골라달라고 하세요. 선택되면 이름과 전화번호를 collected에 넣으세요.\n{}",
            format_places_for_model(candidates)
        ));
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collection::{ScenarioSubType, ScenarioType};
    use crate::domain::conversation::place::test_support::place;

    #[test]
    fn empty_state_uses_base_instruction_only() {
        let prompt = build_system_instruction(&CollectedData::default(), &[]);
        assert_eq!(prompt, COLLECTION_INSTRUCTION);
    }

    #[test]
    fn known_values_are_included() {
        let data = CollectedData {
            target_name: Some("OO미용실".to_string()),
            ..CollectedData::default()
        };
        let prompt = build_system_instruction(&data, &[]);
        assert!(prompt.contains("지금까지 수집된 정보"));
        assert!(prompt.contains("OO미용실"));
    }

    #[test]
    fn matching_sub_type_adds_guidance() {
        let data = CollectedData::with_scenario(
            Some(ScenarioType::Reservation),
            Some(ScenarioSubType::Restaurant),
        );
        let prompt = build_system_instruction(&data, &[]);
        assert!(prompt.contains(ScenarioSubType::Restaurant.guidance()));
    }

    #[test]
    fn mismatched_sub_type_is_ignored() {
        let data = CollectedData::with_scenario(
            Some(ScenarioType::Inquiry),
            Some(ScenarioSubType::Restaurant),
        );
        let prompt = build_system_instruction(&data, &[]);
        assert!(!prompt.contains(ScenarioSubType::Restaurant.guidance()));
    }

    #[test]
    fn candidates_are_listed() {
        let prompt = build_system_instruction(
            &CollectedData::default(),
            &[place("행복미용실", Some("02-111-2222"))],
        );
        assert!(prompt.contains("1. 행복미용실 | 02-111-2222"));
    }
}
