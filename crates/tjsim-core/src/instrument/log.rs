//! Script log interception.
//!
//! A script's log output goes through a [`ScriptLogger`]. [`TeeLogger`]
//! decorates any logger so each message is also published as a
//! `console.log` event, after the underlying logger has seen it.

use tjsim_types::event::BotEvent;

use crate::event::EventBus;

pub trait ScriptLogger: Send + Sync {
    fn log(&self, message: &str);
}

/// Forwards script log lines into the tracing pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl ScriptLogger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::info!(target: "script", "{message}");
    }
}

/// Decorates a logger with event publication.
pub struct TeeLogger<L: ScriptLogger> {
    inner: L,
    bus: EventBus,
}

impl<L: ScriptLogger> TeeLogger<L> {
    pub fn new(inner: L, bus: EventBus) -> Self {
        Self { inner, bus }
    }
}

impl<L: ScriptLogger> ScriptLogger for TeeLogger<L> {
    fn log(&self, message: &str) {
        // Inner sink first, then the event.
        self.inner.log(message);
        self.bus.publish(&BotEvent::Log {
            message: message.to_string(),
        });
    }
}
