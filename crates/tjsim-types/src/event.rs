//! The event union published by the interception layer.
//!
//! One variant per interception point. Events are immutable, published once
//! per operation invocation, and delivered synchronously to observers in
//! registration order. The `name()` strings are the stable subscription keys
//! panels and loggers register under.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An event emitted around one bot operation invocation.
///
/// `response` payloads carry the raw relay result: on a service-level
/// failure this is the `{"err": ...}` object, so failures stay observable
/// to panels and loggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BotEvent {
    Wave,
    RaiseArm,
    LowerArm,
    Shine {
        color: String,
    },
    /// One transcript chunk delivered by the microphone stream.
    Listen {
        text: String,
    },
    /// Published immediately before a speak request starts.
    BeforeSpeak {
        text: String,
    },
    /// Published after speech playback completes.
    Spoke {
        text: String,
    },
    AnalyzeTone {
        text: String,
        response: Value,
    },
    Translate {
        text: String,
        source_language: String,
        target_language: String,
        response: Value,
    },
    IdentifyLanguage {
        text: String,
        response: Value,
    },
    Converse {
        workspace_id: String,
        message: String,
        response: Value,
    },
    See {
        response: Value,
    },
    PhotoTaken {
        data_url: String,
    },
    /// One ambient logging call, tee'd onto the bus.
    Log {
        message: String,
    },
    DiscoveryQuery {
        params: Value,
        response: Value,
    },
}

impl BotEvent {
    /// The stable event name observers subscribe under.
    pub fn name(&self) -> &'static str {
        match self {
            BotEvent::Wave => "tjbot.wave",
            BotEvent::RaiseArm => "tjbot.raiseArm",
            BotEvent::LowerArm => "tjbot.lowerArm",
            BotEvent::Shine { .. } => "tjbot.shine",
            BotEvent::Listen { .. } => "tjbot.listen",
            BotEvent::BeforeSpeak { .. } => "tjbot.before_speak",
            BotEvent::Spoke { .. } => "tjbot.speak",
            BotEvent::AnalyzeTone { .. } => "tjbot.analyzeTone",
            BotEvent::Translate { .. } => "tjbot.translate",
            BotEvent::IdentifyLanguage { .. } => "tjbot.identifyLanguage",
            BotEvent::Converse { .. } => "tjbot.converse",
            BotEvent::See { .. } => "tjbot.see",
            BotEvent::PhotoTaken { .. } => "tjbot.takePhoto",
            BotEvent::Log { .. } => "console.log",
            BotEvent::DiscoveryQuery { .. } => "watson.discovery.query",
        }
    }
}
