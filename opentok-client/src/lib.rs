//! Client for the OpenTok (Vonage Video) REST API
//!
//! This crate covers what a server-side application needs to drive
//! cloud recording of a session:
//! - Create routed sessions
//! - Sign client tokens for a role within a session
//! - Start, list, find, stop and delete archives

pub mod client;
pub mod errors;
pub mod models;
pub mod token;

pub use client::OpenTokClient;
pub use errors::*;
pub use models::*;
