//! Event interception.
//!
//! Wraps the facade (and the discovery client) so that every operation a
//! script performs is also published on the [`EventBus`], without the
//! facade knowing the bus exists. Observability panels subscribe to the
//! bus; the wrapped object behaves identically to the bare one.
//!
//! Publication policy: synchronous operations publish only after success.
//! Asynchronous cloud operations publish on success and on a service-level
//! failure (with an `{"err": ...}` payload, mirroring the wire shape);
//! capability and transport failures publish nothing.

mod bot;
mod discovery;
mod log;

pub use bot::InstrumentedBot;
pub use discovery::{DiscoveryClient, InstrumentedDiscovery, RelayDiscovery};
pub use log::{ScriptLogger, TeeLogger, TracingLogger};

use serde_json::{json, Value};

use tjsim_types::error::BotError;

/// Event payload for a cloud operation's outcome, or `None` when the
/// failure was not service-level and no event should be published.
fn response_payload<T>(
    result: &Result<T, BotError>,
    on_success: impl FnOnce(&T) -> Value,
) -> Option<Value> {
    match result {
        Ok(value) => Some(on_success(value)),
        Err(err) => err.service_err().map(|msg| json!({ "err": msg })),
    }
}
