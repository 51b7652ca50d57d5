//! User script execution.
//!
//! A script is an opaque async closure handed a [`ScriptContext`] with the
//! instrumented bot, the logger, and the event bus. The runner watches a
//! liveness flag: a script that has not reported itself started within a
//! short grace window is flagged, which is how silently-broken scripts
//! (e.g. ones that never reach the bot at all) surface to the user.

mod env;
mod runner;

pub use env::parse_env;
pub use runner::{Script, ScriptContext, ScriptOutcome, ScriptRunner};
