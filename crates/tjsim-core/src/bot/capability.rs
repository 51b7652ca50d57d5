//! Static capability requirements.
//!
//! Maps each facade operation to the hardware tags and credential blocks it
//! requires. The table is consulted, never mutated, and checks run in a
//! fixed order (hardware first, then credentials) so failure messages are
//! reproducible.

use tjsim_types::credentials::{Credentials, Service};
use tjsim_types::error::CapabilityError;
use tjsim_types::hardware::Hardware;

use std::collections::HashSet;

/// A named precondition gating one facade operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    AnalyzeTone,
    Converse,
    Listen,
    See,
    Shine,
    Speak,
    TakePhoto,
    Translate,
    Wave,
}

impl Capability {
    /// The verb used in failure messages ("TJBot is not configured to {op}").
    pub fn op(self) -> &'static str {
        match self {
            Capability::AnalyzeTone => "analyze tone",
            Capability::Converse => "converse",
            Capability::Listen => "listen",
            Capability::See => "see",
            Capability::Shine => "shine",
            Capability::Speak => "speak",
            Capability::TakePhoto => "take a photo",
            Capability::Translate => "translate",
            Capability::Wave => "wave",
        }
    }

    /// Required hardware tags and credential blocks, in check order.
    pub fn requirements(self) -> (&'static [Hardware], &'static [Service]) {
        match self {
            Capability::AnalyzeTone => (&[], &[Service::ToneAnalyzer]),
            Capability::Converse => (&[], &[Service::Conversation]),
            Capability::Listen => (&[Hardware::Microphone], &[Service::SpeechToText]),
            Capability::See => (&[Hardware::Camera], &[Service::VisualRecognition]),
            Capability::Shine => (&[Hardware::Led], &[]),
            Capability::Speak => (&[Hardware::Speaker], &[Service::TextToSpeech]),
            Capability::TakePhoto => (&[Hardware::Camera], &[]),
            Capability::Translate => (&[], &[Service::LanguageTranslator]),
            Capability::Wave => (&[Hardware::Servo], &[]),
        }
    }
}

/// Check every requirement for `capability` against the instance's declared
/// hardware and credentials.
///
/// Fails on the first unmet requirement with an error naming it. Runs
/// synchronously, before any network or hardware side effect.
pub fn assert_capability(
    capability: Capability,
    hardware: &HashSet<Hardware>,
    credentials: &Credentials,
) -> Result<(), CapabilityError> {
    let (required_hardware, required_services) = capability.requirements();

    for hw in required_hardware {
        if !hardware.contains(hw) {
            return Err(CapabilityError::MissingHardware {
                op: capability.op(),
                hardware: *hw,
            });
        }
    }

    for service in required_services {
        if !credentials.has(*service) {
            return Err(CapabilityError::MissingCredentials {
                op: capability.op(),
                service: *service,
            });
        }
    }

    Ok(())
}
