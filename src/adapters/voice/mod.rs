//! Voice provider adapters.
//!
//! - `ElevenLabsVoiceProvider` - live outbound calls over the ElevenLabs API
//! - `SimulatedVoiceProvider` - no telephony; used in mock mode and tests

mod elevenlabs;
mod simulated;

pub use elevenlabs::{ElevenLabsConfig, ElevenLabsVoiceProvider};
pub use simulated::SimulatedVoiceProvider;
