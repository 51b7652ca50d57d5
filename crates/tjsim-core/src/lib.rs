//! Capability facade, event interception, and port definitions for the
//! TJBot simulator.
//!
//! This crate is the core of the simulator: the `TjBot` facade a user script
//! drives, the interception layer that rebroadcasts every operation as a
//! [`tjsim_types::event::BotEvent`], the token cache and microphone stream
//! lifecycle, and the ports (`Relay`, `Renderer`, `Camera`, `Speaker`) the
//! infrastructure layer implements. It depends only on `tjsim-types` --
//! never on any HTTP or I/O crate.

pub mod bot;
pub mod event;
pub mod hardware;
pub mod instrument;
pub mod relay;
pub mod script;
