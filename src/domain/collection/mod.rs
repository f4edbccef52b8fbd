//! Slot-filling model: what the user wants the call to accomplish.

mod collected_data;
mod partial;
pub mod phone;
mod scenario;

pub use collected_data::{CollectedData, MergePolicy, REQUIRED_FIELDS};
pub use partial::{PartialCollectedData, SlotUpdate};
pub use scenario::{FallbackAction, ScenarioSubType, ScenarioType};
