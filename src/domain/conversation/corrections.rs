//! Deterministic fixes for slots the model forgot to fill.
//!
//! Each rule is a pure function with a narrow trigger. Rules run in a fixed
//! order; a slot filled by an earlier rule (or by the model itself) is never
//! touched again.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::collection::{phone, CollectedData, PartialCollectedData, SlotUpdate};

use super::place::Place;

/// Inputs every rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct CorrectionContext<'a> {
    pub user_message: &'a str,
    /// Latest search results shown to the user, in rank order.
    pub candidates: &'a [Place],
    /// Slots merged before this turn.
    pub existing: &'a CollectedData,
    /// The assistant message the user is replying to.
    pub previous_assistant_message: Option<&'a str>,
}

/// Slots a rule proposes to fill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotPatch {
    pub target_name: Option<String>,
    pub target_phone: Option<String>,
    pub customer_name: Option<String>,
}

impl SlotPatch {
    fn from_place(place: &Place) -> Self {
        Self {
            target_name: Some(place.name.clone()),
            target_phone: place.telephone.clone().filter(|t| !t.trim().is_empty()),
            customer_name: None,
        }
    }
}

/// A rule that fired, for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCorrection {
    pub rule: &'static str,
    pub field: &'static str,
}

type Rule = fn(&CorrectionContext<'_>, &PartialCollectedData) -> Option<SlotPatch>;

const RULES: [(&str, Rule); 5] = [
    ("ordinal_selection", select_by_ordinal),
    ("candidate_name_match", match_candidate_name),
    ("phone_in_message", phone_from_message),
    ("trailing_customer_name", customer_name_from_reply),
    ("single_candidate_default", default_to_single_candidate),
];

/// Runs every rule in order and fills still-missing slots in `parsed`.
pub fn apply_corrections(
    ctx: &CorrectionContext<'_>,
    parsed: &mut PartialCollectedData,
) -> Vec<AppliedCorrection> {
    let mut applied = Vec::new();
    for (rule_name, rule) in RULES {
        let Some(patch) = rule(ctx, parsed) else {
            continue;
        };
        if fill(&mut parsed.target_name, patch.target_name) {
            applied.push(AppliedCorrection { rule: rule_name, field: "target_name" });
        }
        if fill_if_unknown(&mut parsed.target_phone, &ctx.existing.target_phone, patch.target_phone) {
            applied.push(AppliedCorrection { rule: rule_name, field: "target_phone" });
        }
        if fill_if_unknown(
            &mut parsed.customer_name,
            &ctx.existing.customer_name,
            patch.customer_name,
        ) {
            applied.push(AppliedCorrection { rule: rule_name, field: "customer_name" });
        }
    }
    applied
}

fn fill(slot: &mut SlotUpdate<String>, value: Option<String>) -> bool {
    match (slot.is_value(), value) {
        (false, Some(v)) => {
            *slot = SlotUpdate::Value(v);
            true
        }
        _ => false,
    }
}

fn fill_if_unknown(
    slot: &mut SlotUpdate<String>,
    existing: &Option<String>,
    value: Option<String>,
) -> bool {
    existing.is_none() && fill(slot, value)
}

fn knows_phone(ctx: &CorrectionContext<'_>, parsed: &PartialCollectedData) -> bool {
    parsed.target_phone.is_value() || ctx.existing.target_phone.is_some()
}

/// A venue is already settled, either this turn or an earlier one. Venue
/// rules must not fire then: the phone of the settled venue is kept, so a
/// new name would pair with the wrong number.
fn knows_target(ctx: &CorrectionContext<'_>, parsed: &PartialCollectedData) -> bool {
    parsed.target_name.is_value() || ctx.existing.target_name.is_some()
}

// ───────────────────────────────────────────────────────────────
// Rules
// ───────────────────────────────────────────────────────────────

static NUMBERED_CHOICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s*번").expect("static regex"));

static BARE_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,2})\s*[.!요]?\s*$").expect("static regex"));

const KOREAN_ORDINALS: [(&str, usize); 10] = [
    ("첫 번째", 1),
    ("첫번째", 1),
    ("두 번째", 2),
    ("두번째", 2),
    ("세 번째", 3),
    ("세번째", 3),
    ("네 번째", 4),
    ("네번째", 4),
    ("다섯 번째", 5),
    ("다섯번째", 5),
];

const ENGLISH_ORDINALS: [(&str, usize); 10] = [
    ("one", 1),
    ("first", 1),
    ("two", 2),
    ("second", 2),
    ("three", 3),
    ("third", 3),
    ("four", 4),
    ("fourth", 4),
    ("five", 5),
    ("fifth", 5),
];

/// Position (1-based) the user picked from a numbered list, if any.
fn ordinal_choice(message: &str) -> Option<usize> {
    if let Some(n) = NUMBERED_CHOICE
        .captures(message)
        .or_else(|| BARE_DIGIT.captures(message))
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
    {
        return Some(n);
    }
    if let Some((_, n)) = KOREAN_ORDINALS.iter().find(|(word, _)| message.contains(word)) {
        return Some(*n);
    }
    let lowered = message.to_lowercase();
    lowered
        .split(|c: char| !c.is_ascii_alphabetic())
        .find_map(|word| ENGLISH_ORDINALS.iter().find(|(w, _)| *w == word).map(|(_, n)| *n))
}

/// "2번으로 해줘" after a list of candidates was shown.
fn select_by_ordinal(ctx: &CorrectionContext<'_>, parsed: &PartialCollectedData) -> Option<SlotPatch> {
    if knows_target(ctx, parsed) || ctx.candidates.is_empty() {
        return None;
    }
    let n = ordinal_choice(ctx.user_message)?;
    let place = ctx.candidates.get(n.checked_sub(1)?)?;
    Some(SlotPatch::from_place(place))
}

fn squash(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// The user typed (part of) a candidate's name.
fn match_candidate_name(
    ctx: &CorrectionContext<'_>,
    parsed: &PartialCollectedData,
) -> Option<SlotPatch> {
    if knows_target(ctx, parsed) {
        return None;
    }
    let message = squash(ctx.user_message);
    ctx.candidates
        .iter()
        .find(|p| {
            let name = squash(&p.name);
            name.chars().count() >= 2 && message.contains(&name)
        })
        .map(SlotPatch::from_place)
}

/// A phone number typed into the chat while none is known yet.
fn phone_from_message(ctx: &CorrectionContext<'_>, parsed: &PartialCollectedData) -> Option<SlotPatch> {
    if knows_phone(ctx, parsed) {
        return None;
    }
    phone::find_phone_number(ctx.user_message).map(|number| SlotPatch {
        target_phone: Some(number),
        ..SlotPatch::default()
    })
}

const NAME_SUFFIXES: [&str; 5] = ["입니다", "이에요", "예요", "이요", "요"];

const NOT_A_NAME: [&str; 20] = [
    "네", "예", "아니", "아니요", "맞아", "맞아요", "좋아", "좋아요", "그래", "괜찮아", "괜찮아요",
    "없어", "없어요", "내일", "오늘", "모레", "예약", "문의", "감사", "감사합니다",
];

const NAME_PROMPTS: [&str; 3] = ["이름", "성함", "예약자"];

/// Short reply like "김철수요" right after the assistant asked for a name.
fn customer_name_from_reply(
    ctx: &CorrectionContext<'_>,
    parsed: &PartialCollectedData,
) -> Option<SlotPatch> {
    if parsed.customer_name.is_value() || ctx.existing.customer_name.is_some() {
        return None;
    }
    let asked = ctx
        .previous_assistant_message
        .is_some_and(|m| NAME_PROMPTS.iter().any(|p| m.contains(p)));
    let message = ctx.user_message.trim();
    if !asked || message.chars().count() > 20 || message.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let last = message
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | '~' | '?'))
        .split_whitespace()
        .last()?;
    if NOT_A_NAME.contains(&last) {
        return None;
    }
    let candidate = NAME_SUFFIXES
        .iter()
        .find_map(|suffix| last.strip_suffix(suffix))
        .unwrap_or(last);

    let len = candidate.chars().count();
    let all_hangul = candidate.chars().all(|c| ('가'..='힣').contains(&c));
    if !(2..=4).contains(&len) || !all_hangul || NOT_A_NAME.contains(&candidate) {
        return None;
    }
    Some(SlotPatch {
        customer_name: Some(candidate.to_string()),
        ..SlotPatch::default()
    })
}

/// Exactly one venue was found and the number is already known.
fn default_to_single_candidate(
    ctx: &CorrectionContext<'_>,
    parsed: &PartialCollectedData,
) -> Option<SlotPatch> {
    if knows_target(ctx, parsed) {
        return None;
    }
    match ctx.candidates {
        [only] if knows_phone(ctx, parsed) => Some(SlotPatch {
            target_name: Some(only.name.clone()),
            ..SlotPatch::default()
        }),
        _ => None,
    }
}
