//! WIGVO - calls a business on the user's behalf.
//!
//! A chat conversation fills in what the call needs (who, which number,
//! what for, when); a voice agent then places the call and its outcome is
//! reconciled back onto the conversation.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
