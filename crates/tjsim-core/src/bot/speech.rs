//! Speech token acquisition and voice selection.
//!
//! Tokens are fetched lazily from the relay on the first speech operation,
//! cached for the instance's life (no TTL, no refresh), and written back
//! into the credentials block so the record mirrors the cache. Concurrent
//! first calls coalesce onto one fetch.

use tjsim_types::credentials::{Service, Voice};
use tjsim_types::error::{BotError, CapabilityError};
use tjsim_types::relay::RelayCreds;

use super::{Capability, TjBot};
use crate::hardware::{Camera, Speaker};
use crate::relay::Relay;

/// Voice used when the configuration names none and the catalog has no
/// language/gender match.
pub const DEFAULT_VOICE: &str = "en-US_MichaelVoice";

/// Cached text-to-speech state: the ephemeral token and the voice catalog
/// that arrived with it.
#[derive(Debug, Clone)]
pub(super) struct TtsSession {
    pub token: String,
    pub voices: Vec<Voice>,
}

impl<R, C, S> TjBot<R, C, S>
where
    R: Relay,
    C: Camera,
    S: Speaker,
{
    /// The text-to-speech session, fetching it on first use.
    ///
    /// A failed fetch leaves the cell empty, so the next call retries.
    pub(super) async fn ensure_tts_session(&self) -> Result<&TtsSession, BotError> {
        self.tts_session
            .get_or_try_init(|| async {
                let creds = self
                    .with_credentials(|c| c.text_to_speech.as_ref().map(RelayCreds::from_speech))
                    .ok_or(CapabilityError::MissingCredentials {
                        op: Capability::Speak.op(),
                        service: Service::TextToSpeech,
                    })?;
                let response = self.relay.tts_token(creds).await?;
                let session = TtsSession {
                    token: response.tts,
                    voices: response.voices.voices,
                };
                self.with_credentials_mut(|c| {
                    if let Some(block) = c.text_to_speech.as_mut() {
                        block.token = Some(session.token.clone());
                        block.voices = session.voices.clone();
                    }
                });
                Ok::<_, BotError>(session)
            })
            .await
    }

    /// The speech-to-text token, fetching it on first use.
    pub(super) async fn ensure_stt_token(&self) -> Result<String, BotError> {
        let token = self
            .stt_token
            .get_or_try_init(|| async {
                let creds = self
                    .with_credentials(|c| c.speech_to_text.as_ref().map(RelayCreds::from_speech))
                    .ok_or(CapabilityError::MissingCredentials {
                        op: Capability::Listen.op(),
                        service: Service::SpeechToText,
                    })?;
                let response = self.relay.stt_token(creds).await?;
                self.with_credentials_mut(|c| {
                    if let Some(block) = c.speech_to_text.as_mut() {
                        block.token = Some(response.stt.clone());
                    }
                });
                Ok::<_, BotError>(response.stt)
            })
            .await?;
        Ok(token.clone())
    }
}

/// Pick the synthesis voice for one `speak` call.
///
/// Precedence: an explicitly configured voice wins; otherwise the first
/// catalog entry matching the configured language and gender; otherwise
/// [`DEFAULT_VOICE`].
pub(super) fn select_voice(
    configuration: &tjsim_types::config::BotConfiguration,
    voices: &[Voice],
) -> String {
    if let Some(voice) = &configuration.speak.voice {
        return voice.clone();
    }
    voices
        .iter()
        .find(|v| {
            v.language == configuration.speak.language && v.gender == configuration.robot.gender
        })
        .map(|v| v.name.clone())
        .unwrap_or_else(|| DEFAULT_VOICE.to_string())
}
