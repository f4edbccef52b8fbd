//! Call domain module.
//!
//! A call is one outbound dial attempt placed from a frozen copy of the
//! collected details, plus everything needed to run and judge it.

mod aggregate;
pub mod outcome;
pub mod script;
mod status;

pub use aggregate::Call;
pub use outcome::{classify_report, mock_summary, CallOutcome, VoiceSessionReport, VoiceSessionState};
pub use script::{generate_call_script, CallScript};
pub use status::{CallResult, CallStatus};
