use thiserror::Error;

use crate::credentials::Service;
use crate::hardware::Hardware;

/// A capability precondition was not met.
///
/// Raised synchronously by the facade before any I/O or hardware side
/// effect. The message text identifies the missing hardware tag or
/// credential block verbatim, so scripts can surface it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    #[error(
        "TJBot is not configured to {op}. Please check you included the \"{hardware}\" hardware in the TJBot constructor."
    )]
    MissingHardware { op: &'static str, hardware: Hardware },

    #[error(
        "TJBot is not configured to {op}. Please check that you included credentials for the Watson \"{service}\" service in the TJBot constructor."
    )]
    MissingCredentials { op: &'static str, service: Service },
}

/// A relay exchange failed.
///
/// `Service` is the dominant failure mode: the exchange succeeded at the
/// transport level but the decoded body carried an `err` field, whose value
/// is surfaced verbatim. `Transport` covers network failures; `Decode`
/// covers bodies that are not the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("{0}")]
    Service(String),

    #[error("malformed relay response: {0}")]
    Decode(String),
}

/// Umbrella error for facade operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BotError {
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("camera error: {0}")]
    Camera(String),

    #[error("listen stream error: {0}")]
    Stream(String),
}

impl BotError {
    /// The service-reported error message, if this is a service-level failure.
    pub fn service_err(&self) -> Option<&str> {
        match self {
            BotError::Relay(RelayError::Service(msg)) => Some(msg),
            _ => None,
        }
    }
}
