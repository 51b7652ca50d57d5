//! Shared domain types for the TJBot simulator.
//!
//! This crate contains the types used across the simulator: hardware tags,
//! per-service credentials, bot configuration, the event union published by
//! the interception layer, the error taxonomy, and the facilitator wire
//! protocol types.
//!
//! Zero infrastructure dependencies -- only serde, serde_json, thiserror,
//! secrecy.

pub mod config;
pub mod credentials;
pub mod error;
pub mod event;
pub mod hardware;
pub mod relay;
