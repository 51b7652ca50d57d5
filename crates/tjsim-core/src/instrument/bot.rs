//! The instrumented bot: a second [`BotApi`] implementation that decorates
//! any inner bot with event publication.

use std::sync::Arc;

use serde_json::Value;

use tjsim_types::error::{BotError, CapabilityError};
use tjsim_types::event::BotEvent;

use super::response_payload;
use crate::bot::{BotApi, ConverseReply, TranscriptSink};
use crate::event::EventBus;

/// Decorates a bot so every operation also publishes a [`BotEvent`].
///
/// Transparent to the caller: arguments, results, and errors pass through
/// unchanged, and the inner bot never learns the bus exists.
pub struct InstrumentedBot<B: BotApi> {
    inner: B,
    bus: EventBus,
}

impl<B: BotApi> InstrumentedBot<B> {
    pub fn new(inner: B, bus: EventBus) -> Self {
        Self { inner, bus }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    fn publish_outcome<T>(
        &self,
        result: &Result<T, BotError>,
        event: impl FnOnce(Value) -> BotEvent,
        on_success: impl FnOnce(&T) -> Value,
    ) {
        if let Some(payload) = response_payload(result, on_success) {
            self.bus.publish(&event(payload));
        }
    }
}

impl<B: BotApi> BotApi for InstrumentedBot<B> {
    fn wave(&self) -> Result<(), CapabilityError> {
        self.inner.wave()?;
        self.bus.publish(&BotEvent::Wave);
        Ok(())
    }

    fn raise_arm(&self) -> Result<(), CapabilityError> {
        self.inner.raise_arm()?;
        self.bus.publish(&BotEvent::RaiseArm);
        Ok(())
    }

    fn lower_arm(&self) -> Result<(), CapabilityError> {
        self.inner.lower_arm()?;
        self.bus.publish(&BotEvent::LowerArm);
        Ok(())
    }

    fn shine(&self, color: &str) -> Result<(), CapabilityError> {
        self.inner.shine(color)?;
        // The event carries the caller's color, not the normalized one.
        self.bus.publish(&BotEvent::Shine {
            color: color.to_string(),
        });
        Ok(())
    }

    fn shine_colors(&self) -> Vec<&'static str> {
        self.inner.shine_colors()
    }

    async fn analyze_tone(&self, text: &str) -> Result<Value, BotError> {
        let result = self.inner.analyze_tone(text).await;
        self.publish_outcome(
            &result,
            |response| BotEvent::AnalyzeTone {
                text: text.to_string(),
                response,
            },
            Clone::clone,
        );
        result
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Value, BotError> {
        let result = self
            .inner
            .translate(text, source_language, target_language)
            .await;
        self.publish_outcome(
            &result,
            |response| BotEvent::Translate {
                text: text.to_string(),
                source_language: source_language.to_string(),
                target_language: target_language.to_string(),
                response,
            },
            Clone::clone,
        );
        result
    }

    async fn identify_language(&self, text: &str) -> Result<Value, BotError> {
        let result = self.inner.identify_language(text).await;
        self.publish_outcome(
            &result,
            |response| BotEvent::IdentifyLanguage {
                text: text.to_string(),
                response,
            },
            Clone::clone,
        );
        result
    }

    async fn converse(&self, workspace_id: &str, message: &str) -> Result<ConverseReply, BotError> {
        let result = self.inner.converse(workspace_id, message).await;
        self.publish_outcome(
            &result,
            |response| BotEvent::Converse {
                workspace_id: workspace_id.to_string(),
                message: message.to_string(),
                response,
            },
            |reply| reply.object.clone(),
        );
        result
    }

    async fn speak(&self, text: &str) -> Result<(), BotError> {
        // Published before delegation so observers can react (e.g. duck
        // other audio) ahead of playback, even if synthesis then fails.
        self.bus.publish(&BotEvent::BeforeSpeak {
            text: text.to_string(),
        });
        let result = self.inner.speak(text).await;
        if result.is_ok() {
            self.bus.publish(&BotEvent::Spoke {
                text: text.to_string(),
            });
        }
        result
    }

    async fn listen(&self, sink: TranscriptSink) -> Result<(), BotError> {
        let bus = self.bus.clone();
        let wrapped: TranscriptSink = Arc::new(move |item: Result<String, BotError>| {
            if let Ok(text) = &item {
                bus.publish(&BotEvent::Listen { text: text.clone() });
            }
            sink(item);
        });
        self.inner.listen(wrapped).await
    }

    fn stop_listening(&self) -> Result<(), CapabilityError> {
        self.inner.stop_listening()
    }

    async fn see(&self) -> Result<Value, BotError> {
        let result = self.inner.see().await;
        self.publish_outcome(&result, |response| BotEvent::See { response }, Clone::clone);
        result
    }

    async fn take_photo(&self) -> Result<String, BotError> {
        let result = self.inner.take_photo().await;
        if let Ok(data_url) = &result {
            self.bus.publish(&BotEvent::PhotoTaken {
                data_url: data_url.clone(),
            });
        }
        result
    }
}
