//! Call command and query handlers.
//!
//! A call is created from a READY conversation, started once, and then
//! reconciled to a terminal outcome in the background.

mod create_call;
mod errors;
mod get_call;
mod list_calls;
mod reconciler;
mod start_call;

pub use create_call::{CreateCallCommand, CreateCallHandler};
pub use errors::CallError;
pub use get_call::{GetCallHandler, GetCallQuery};
pub use list_calls::{ListCallsHandler, ListCallsQuery};
pub use reconciler::{CallReconciler, ReconcileMode};
pub use start_call::{StartCallCommand, StartCallHandler, StartCallResult};
