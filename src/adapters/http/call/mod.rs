//! Call HTTP adapter.

mod dto;
mod handlers;
mod routes;

pub use dto::{CallListResponse, CallResponse, CreateCallRequest, StartCallResponse};
pub use handlers::CallHandlers;
pub use routes::call_routes;
