//! Partial slot updates decoded from model output.
//!
//! Each slot distinguishes "key absent" from "key present but null" so the
//! merge policy can tell "no information this turn" apart from a deliberate
//! clear.

use serde_json::{Map, Value};

use super::{CollectedData, FallbackAction, ScenarioSubType, ScenarioType};

/// Tri-state update for a single slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotUpdate<T> {
    /// Key was not present in the structured block.
    Absent,
    /// Key was present but null, empty, or undecodable.
    Null,
    /// Key carried a usable value.
    Value(T),
}

impl<T> Default for SlotUpdate<T> {
    fn default() -> Self {
        SlotUpdate::Absent
    }
}

impl<T> SlotUpdate<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            SlotUpdate::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, SlotUpdate::Value(_))
    }

    fn to_json(&self, encode: impl Fn(&T) -> Value) -> Option<Value> {
        match self {
            SlotUpdate::Absent => None,
            SlotUpdate::Null => Some(Value::Null),
            SlotUpdate::Value(v) => Some(encode(v)),
        }
    }
}

impl<T> From<Option<T>> for SlotUpdate<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => SlotUpdate::Value(v),
            None => SlotUpdate::Null,
        }
    }
}

/// Slots extracted from a single assistant reply.
///
/// `fallback_datetimes` has no tri-state: an empty list means "nothing
/// new" and never clears existing alternatives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialCollectedData {
    pub target_name: SlotUpdate<String>,
    pub target_phone: SlotUpdate<String>,
    pub scenario_type: SlotUpdate<ScenarioType>,
    pub scenario_sub_type: SlotUpdate<ScenarioSubType>,
    pub primary_datetime: SlotUpdate<String>,
    pub service: SlotUpdate<String>,
    pub fallback_datetimes: Vec<String>,
    pub fallback_action: SlotUpdate<FallbackAction>,
    pub customer_name: SlotUpdate<String>,
    pub party_size: SlotUpdate<u32>,
    pub special_request: SlotUpdate<String>,
}

impl PartialCollectedData {
    /// Decodes a `collected` object field by field.
    ///
    /// A field that fails to decode becomes `Null` on its own; it never
    /// poisons its neighbours. Unknown keys are ignored. Anything other
    /// than a JSON object yields an all-absent update.
    pub fn from_json(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        Self {
            target_name: decode_slot(obj, "target_name", decode_text),
            target_phone: decode_slot(obj, "target_phone", decode_text),
            scenario_type: decode_slot(obj, "scenario_type", |v| {
                decode_text(v).and_then(|s| ScenarioType::parse_lenient(&s))
            }),
            scenario_sub_type: decode_slot(obj, "scenario_sub_type", |v| {
                decode_text(v).and_then(|s| ScenarioSubType::parse_lenient(&s))
            }),
            primary_datetime: decode_slot(obj, "primary_datetime", decode_text),
            service: decode_slot(obj, "service", decode_text),
            fallback_datetimes: obj
                .get("fallback_datetimes")
                .map(decode_text_list)
                .unwrap_or_default(),
            fallback_action: decode_slot(obj, "fallback_action", |v| {
                decode_text(v).and_then(|s| FallbackAction::parse_lenient(&s))
            }),
            customer_name: decode_slot(obj, "customer_name", decode_text),
            party_size: decode_slot(obj, "party_size", decode_count),
            special_request: decode_slot(obj, "special_request", decode_text),
        }
    }

    /// True when no slot carries a value.
    pub fn is_empty(&self) -> bool {
        !(self.target_name.is_value()
            || self.target_phone.is_value()
            || self.scenario_type.is_value()
            || self.scenario_sub_type.is_value()
            || self.primary_datetime.is_value()
            || self.service.is_value()
            || !self.fallback_datetimes.is_empty()
            || self.fallback_action.is_value()
            || self.customer_name.is_value()
            || self.party_size.is_value()
            || self.special_request.is_value())
    }

    /// Values only, with absent and null slots both unset.
    pub fn to_collected(&self) -> CollectedData {
        CollectedData::default().merge(self, super::MergePolicy::PreserveExisting)
    }

    /// JSON view for audit metadata. Absent keys are omitted, nulls kept.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        let text = |s: &String| Value::String(s.clone());
        let mut put = |key: &str, v: Option<Value>| {
            if let Some(v) = v {
                map.insert(key.to_string(), v);
            }
        };
        put("target_name", self.target_name.to_json(text));
        put("target_phone", self.target_phone.to_json(text));
        put(
            "scenario_type",
            self.scenario_type.to_json(|s| Value::from(s.as_str())),
        );
        put(
            "scenario_sub_type",
            self.scenario_sub_type.to_json(|s| Value::from(s.as_str())),
        );
        put("primary_datetime", self.primary_datetime.to_json(text));
        put("service", self.service.to_json(text));
        put(
            "fallback_datetimes",
            Some(Value::from(self.fallback_datetimes.clone())),
        );
        put(
            "fallback_action",
            self.fallback_action.to_json(|a| Value::from(a.as_str())),
        );
        put("customer_name", self.customer_name.to_json(text));
        put("party_size", self.party_size.to_json(|n| Value::from(*n)));
        put("special_request", self.special_request.to_json(text));
        Value::Object(map)
    }
}

fn decode_slot<T>(
    obj: &Map<String, Value>,
    key: &str,
    decode: impl Fn(&Value) -> Option<T>,
) -> SlotUpdate<T> {
    match obj.get(key) {
        None => SlotUpdate::Absent,
        Some(value) => decode(value).into(),
    }
}

/// Trimmed non-empty string. Models sometimes echo the template and write
/// the word "null" instead of a JSON null.
fn decode_text(value: &Value) -> Option<String> {
    let s = value.as_str()?.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("null") || s.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(s.to_string())
    }
}

fn decode_text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(decode_text).collect(),
        Value::String(_) => decode_text(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

/// Non-negative head count. Accepts `4`, `4.0`, `"4"` and `"4명"`.
fn decode_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return u32::try_from(u).ok();
            }
            let f = n.as_f64()?;
            if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
                Some(f as u32)
            } else {
                None
            }
        }
        Value::String(s) => {
            let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        }
        _ => None,
    }
}
