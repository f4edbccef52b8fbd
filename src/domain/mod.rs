//! Domain layer: pure types and rules, no I/O.

pub mod call;
pub mod collection;
pub mod conversation;
pub mod foundation;
