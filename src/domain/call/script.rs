//! Voice agent instructions built from the frozen call details.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::collection::{CollectedData, FallbackAction, ScenarioType};

/// Everything the voice provider needs to run the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallScript {
    pub system_prompt: String,
    /// Template variables for the provider; unset slots are omitted.
    pub dynamic_variables: BTreeMap<String, String>,
}

/// Builds the agent prompt and variables for a call.
pub fn generate_call_script(data: &CollectedData) -> CallScript {
    let sections = [
        identity_section(),
        objective_section(data),
        key_info_section(data),
        flow_section(data),
        fallback_section(data),
        ending_section(),
        rules_section(),
    ];

    CallScript {
        system_prompt: sections.join("\n\n"),
        dynamic_variables: dynamic_variables(data),
    }
}

fn dynamic_variables(data: &CollectedData) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    let mut put = |key: &str, value: Option<String>| {
        if let Some(v) = value {
            vars.insert(key.to_string(), v);
        }
    };
    put("target_name", data.target_name.clone());
    put("datetime", data.primary_datetime.clone());
    put("service", data.service.clone());
    put("customer_name", data.customer_name.clone());
    put("party_size", data.party_size.map(|n| n.to_string()));
    put("special_request", data.special_request.clone());
    put("scenario_type", data.scenario_type.map(|s| s.as_str().to_string()));
    vars
}

fn identity_section() -> String {
    "You are a friendly phone assistant calling on behalf of a customer who uses the WIGVO app.\n\
     You MUST speak Korean (한국어) in polite speech (해요체).\n\
     Be clear and efficient, keep sentences short, and sound like a person, not a script."
        .to_string()
}

fn objective_section(data: &CollectedData) -> String {
    let target = data.target_name.as_deref().unwrap_or("상대방");
    let objective = match data.scenario_type {
        Some(ScenarioType::Reservation) => {
            let mut parts = vec![format!("Make a reservation at {}", target)];
            if let Some(datetime) = &data.primary_datetime {
                parts.push(format!("for {}", datetime));
            }
            if let Some(service) = &data.service {
                parts.push(format!("({})", service));
            }
            format!("{}.", parts.join(" "))
        }
        Some(ScenarioType::Inquiry) => {
            let mut text = format!(
                "Ask {} about {}.",
                target,
                data.service.as_deref().unwrap_or("서비스")
            );
            if let Some(question) = &data.special_request {
                text.push_str(&format!("\nSpecific question: {}", question));
            }
            text
        }
        Some(ScenarioType::AsRequest) => {
            let mut text = format!(
                "Request after-sales service from {} for {}.",
                target,
                data.service.as_deref().unwrap_or("제품")
            );
            if let Some(issue) = &data.special_request {
                text.push_str(&format!("\nIssue: {}", issue));
            }
            text
        }
        None => format!(
            "Contact {} about {}.",
            target,
            data.service.as_deref().unwrap_or("용건")
        ),
    };
    format!("## Call Objective\n{}", objective)
}

fn key_info_section(data: &CollectedData) -> String {
    let mut lines = vec!["## Key Information".to_string()];
    let mut line = |label: &str, value: Option<String>| {
        if let Some(v) = value {
            lines.push(format!("- {}: {}", label, v));
        }
    };
    line("Target", data.target_name.clone());
    line("Service", data.service.clone());
    line("Preferred Time", data.primary_datetime.clone());
    line("Customer Name", data.customer_name.clone());
    line("Party Size", data.party_size.map(|n| format!("{}명", n)));
    line("Special Request", data.special_request.clone());
    if !data.fallback_datetimes.is_empty() {
        line("Alternative Times", Some(data.fallback_datetimes.join(", ")));
    }
    lines.join("\n")
}

fn flow_section(data: &CollectedData) -> String {
    let steps = match data.scenario_type {
        Some(ScenarioType::Inquiry) => inquiry_steps(data),
        Some(ScenarioType::AsRequest) => as_request_steps(data),
        Some(ScenarioType::Reservation) | None => reservation_steps(data),
    };
    let numbered: Vec<String> = steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect();
    format!("## Conversation Flow\n{}", numbered.join("\n"))
}

fn reservation_steps(data: &CollectedData) -> Vec<String> {
    let service = data.service.as_deref().unwrap_or("예약");
    let datetime = data.primary_datetime.as_deref().unwrap_or("요청한 시간");
    let customer = data.customer_name.as_deref().unwrap_or("고객");

    let mut steps = vec![
        format!("Greeting: \"안녕하세요, {} 예약 문의드려요.\"", service),
        format!("Request: \"{}에 {} 예약 가능할까요?\"", datetime, service),
    ];
    if let Some(size) = data.party_size {
        steps.push(format!("If asked about party size: \"{}명이에요.\"", size));
    }
    steps.push(format!("If asked for a name: \"예약자 이름은 {}이에요.\"", customer));
    if let Some(request) = &data.special_request {
        steps.push(format!("Mention the special request: \"{}\"", request));
    }
    steps.push("Repeat the confirmed reservation details before ending.".to_string());
    steps
}

fn inquiry_steps(data: &CollectedData) -> Vec<String> {
    let service = data.service.as_deref().unwrap_or("서비스");
    let mut steps = vec![format!(
        "Greeting: \"안녕하세요, {} 관련해서 여쭤볼 게 있어서 전화드렸어요.\"",
        service
    )];
    match &data.special_request {
        Some(question) => {
            steps.push(format!("Ask: \"{}\"", question));
            steps.push("Listen carefully and note the answer.".to_string());
        }
        None => steps.push("Ask about availability, pricing, or other relevant details.".to_string()),
    }
    steps.push("Thank them: \"알려주셔서 감사합니다.\"".to_string());
    steps
}

fn as_request_steps(data: &CollectedData) -> Vec<String> {
    let product = data.service.as_deref().unwrap_or("제품");
    let datetime = data.primary_datetime.as_deref().unwrap_or("가능한 시간");
    let mut steps = vec![format!("Greeting: \"안녕하세요, {} AS 접수하려고 전화드렸어요.\"", product)];
    steps.push(match &data.special_request {
        Some(issue) => format!("Describe the issue: \"{}\"", issue),
        None => format!("Describe the problem with the {}.", product),
    });
    steps.push(format!("Request a visit: \"{}에 방문 가능하실까요?\"", datetime));
    steps.push("Confirm the appointment and anything the customer must prepare.".to_string());
    steps
}

fn fallback_section(data: &CollectedData) -> String {
    let mut lines = vec!["## Fallback Handling".to_string()];
    const GIVE_UP: &str = "\"알겠습니다. 확인해서 다시 연락드릴게요.\"";

    if data.fallback_datetimes.is_empty() && data.fallback_action.is_none() {
        lines.push(format!(
            "If the requested time is unavailable, politely end the call: {}",
            GIVE_UP
        ));
        return lines.join("\n");
    }

    lines.push("If the requested time is unavailable:".to_string());
    let mut steps = Vec::new();
    if !data.fallback_datetimes.is_empty() {
        steps.push(format!(
            "Try these alternatives in order: {}",
            data.fallback_datetimes.join(", ")
        ));
    }
    match data.fallback_action {
        Some(FallbackAction::AskAvailable) => steps.push(
            "Ask \"그럼 언제가 가능하세요?\" and note the available times.".to_string(),
        ),
        Some(FallbackAction::NextDay) => {
            steps.push("Ask whether the next day works: \"그럼 다음 날은 가능할까요?\"".to_string())
        }
        Some(FallbackAction::Cancel) => steps.push(
            "If nothing works, do not book anything and thank them: \"알겠습니다. 감사합니다.\""
                .to_string(),
        ),
        None => {}
    }
    steps.push(format!("If none of this works, say {} and end the call.", GIVE_UP));

    for (i, step) in steps.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, step));
    }
    lines.join("\n")
}

fn ending_section() -> String {
    "## Ending the Call\n\
     - Success: \"감사합니다. 좋은 하루 되세요.\"\n\
     - Alternative accepted: \"네, 알겠습니다. 감사합니다.\"\n\
     - Nothing available: \"알겠습니다. 확인해서 다시 연락드릴게요.\""
        .to_string()
}

fn rules_section() -> String {
    "## Important Rules\n\
     - Always speak Korean in polite speech (해요체)\n\
     - Do not say you are an AI unless asked directly\n\
     - After two failed attempts to understand, ask: \"죄송한데, 다시 한 번 말씀해주시겠어요?\"\n\
     - Steer off-topic talk back to the purpose of the call\n\
     - Repeat important details back to confirm them\n\
     - If the other party is rude or hangs up, end politely"
        .to_string()
}
