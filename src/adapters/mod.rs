//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - chat completion providers (OpenAI, mock)
//! - `auth` - bearer-token validation (JWT, mock)
//! - `http` - axum routes and middleware
//! - `memory` - in-memory repositories
//! - `postgres` - PostgreSQL repositories
//! - `search` - place search providers and caches
//! - `voice` - outbound call providers

pub mod ai;
pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod search;
pub mod voice;
