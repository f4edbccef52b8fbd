//! The canonical slot-filling record and its merge rules.

use serde::{Deserialize, Serialize};

use super::{FallbackAction, PartialCollectedData, ScenarioSubType, ScenarioType, SlotUpdate};

/// Everything learned so far about the call the user wants placed.
///
/// Created empty when a conversation starts, merged on every assistant
/// turn, and copied (never shared) into a call when one is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectedData {
    pub target_name: Option<String>,
    pub target_phone: Option<String>,
    pub scenario_type: Option<ScenarioType>,
    pub scenario_sub_type: Option<ScenarioSubType>,
    pub primary_datetime: Option<String>,
    pub service: Option<String>,
    pub fallback_datetimes: Vec<String>,
    pub fallback_action: Option<FallbackAction>,
    pub customer_name: Option<String>,
    pub party_size: Option<u32>,
    pub special_request: Option<String>,
}

/// How explicit nulls in an incoming update are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Null means "no information this turn"; existing values survive.
    PreserveExisting,
    /// Null is a deliberate clear; only absent keys preserve.
    ExplicitNullClears,
}

impl MergePolicy {
    pub fn from_preserve_flag(preserve_existing: bool) -> Self {
        if preserve_existing {
            MergePolicy::PreserveExisting
        } else {
            MergePolicy::ExplicitNullClears
        }
    }
}

/// Names of the slots a call cannot be placed without.
pub const REQUIRED_FIELDS: [&str; 4] = [
    "target_name",
    "target_phone",
    "scenario_type",
    "primary_datetime",
];

impl CollectedData {
    /// Empty record pre-seeded with a scenario picked before the chat began.
    pub fn with_scenario(
        scenario_type: Option<ScenarioType>,
        scenario_sub_type: Option<ScenarioSubType>,
    ) -> Self {
        Self {
            scenario_type,
            scenario_sub_type,
            ..Self::default()
        }
    }

    /// Applies an incoming partial update and returns the merged record.
    ///
    /// Pure: `self` is untouched. Non-null incoming values always win.
    /// `fallback_datetimes` is replaced wholesale, and only by a non-empty
    /// list.
    pub fn merge(&self, incoming: &PartialCollectedData, policy: MergePolicy) -> CollectedData {
        CollectedData {
            target_name: merge_slot(&self.target_name, &incoming.target_name, policy),
            target_phone: merge_slot(&self.target_phone, &incoming.target_phone, policy),
            scenario_type: merge_slot(&self.scenario_type, &incoming.scenario_type, policy),
            scenario_sub_type: merge_slot(
                &self.scenario_sub_type,
                &incoming.scenario_sub_type,
                policy,
            ),
            primary_datetime: merge_slot(
                &self.primary_datetime,
                &incoming.primary_datetime,
                policy,
            ),
            service: merge_slot(&self.service, &incoming.service, policy),
            fallback_datetimes: if incoming.fallback_datetimes.is_empty() {
                self.fallback_datetimes.clone()
            } else {
                incoming.fallback_datetimes.clone()
            },
            fallback_action: merge_slot(&self.fallback_action, &incoming.fallback_action, policy),
            customer_name: merge_slot(&self.customer_name, &incoming.customer_name, policy),
            party_size: merge_slot(&self.party_size, &incoming.party_size, policy),
            special_request: merge_slot(&self.special_request, &incoming.special_request, policy),
        }
    }

    /// All four required slots are filled.
    pub fn has_required_fields(&self) -> bool {
        self.missing_required_fields().is_empty()
    }

    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let present = [
            self.target_name.is_some(),
            self.target_phone.is_some(),
            self.scenario_type.is_some(),
            self.primary_datetime.is_some(),
        ];
        REQUIRED_FIELDS
            .iter()
            .zip(present)
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Enough to attempt the call: a name and a phone, plus a datetime when
    /// the call is a reservation.
    pub fn is_minimally_actionable(&self) -> bool {
        let has_target = self.target_name.is_some() && self.target_phone.is_some();
        let needs_datetime = self.scenario_type == Some(ScenarioType::Reservation);
        has_target && (!needs_datetime || self.primary_datetime.is_some())
    }

    /// True when nothing has been collected yet.
    pub fn is_empty(&self) -> bool {
        *self == CollectedData::default()
    }
}

fn merge_slot<T: Clone>(
    existing: &Option<T>,
    incoming: &SlotUpdate<T>,
    policy: MergePolicy,
) -> Option<T> {
    match (incoming, policy) {
        (SlotUpdate::Value(value), _) => Some(value.clone()),
        (SlotUpdate::Null, MergePolicy::ExplicitNullClears) => None,
        _ => existing.clone(),
    }
}
