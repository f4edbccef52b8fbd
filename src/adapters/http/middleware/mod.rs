//! Request middleware. Only bearer authentication so far.

pub mod auth;

pub use auth::{auth_middleware, AuthRejection, AuthState, RequireAuth};
