//! Object-safe wrapper around any [`BotApi`].
//!
//! [`BotApi`] uses RPITIT async methods and so cannot be a trait object
//! directly. `DynBot` mirrors it with boxed futures, a blanket impl bridges
//! every concrete bot onto it, and [`BoxBot`] re-implements `BotApi` on top
//! so the rest of the system can hold bots of different concrete types
//! (plain, instrumented) behind one value.

use futures_util::future::BoxFuture;
use serde_json::Value;

use tjsim_types::error::{BotError, CapabilityError};

use super::{BotApi, ConverseReply, TranscriptSink};

/// Object-safe mirror of [`BotApi`].
pub trait DynBot: Send + Sync {
    fn wave(&self) -> Result<(), CapabilityError>;
    fn raise_arm(&self) -> Result<(), CapabilityError>;
    fn lower_arm(&self) -> Result<(), CapabilityError>;
    fn shine(&self, color: &str) -> Result<(), CapabilityError>;
    fn shine_colors(&self) -> Vec<&'static str>;
    fn analyze_tone<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Value, BotError>>;
    fn translate<'a>(
        &'a self,
        text: &'a str,
        source_language: &'a str,
        target_language: &'a str,
    ) -> BoxFuture<'a, Result<Value, BotError>>;
    fn identify_language<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Value, BotError>>;
    fn converse<'a>(
        &'a self,
        workspace_id: &'a str,
        message: &'a str,
    ) -> BoxFuture<'a, Result<ConverseReply, BotError>>;
    fn speak<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<(), BotError>>;
    fn listen(&self, sink: TranscriptSink) -> BoxFuture<'_, Result<(), BotError>>;
    fn stop_listening(&self) -> Result<(), CapabilityError>;
    fn see(&self) -> BoxFuture<'_, Result<Value, BotError>>;
    fn take_photo(&self) -> BoxFuture<'_, Result<String, BotError>>;
}

impl<T: BotApi> DynBot for T {
    fn wave(&self) -> Result<(), CapabilityError> {
        BotApi::wave(self)
    }

    fn raise_arm(&self) -> Result<(), CapabilityError> {
        BotApi::raise_arm(self)
    }

    fn lower_arm(&self) -> Result<(), CapabilityError> {
        BotApi::lower_arm(self)
    }

    fn shine(&self, color: &str) -> Result<(), CapabilityError> {
        BotApi::shine(self, color)
    }

    fn shine_colors(&self) -> Vec<&'static str> {
        BotApi::shine_colors(self)
    }

    fn analyze_tone<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Value, BotError>> {
        Box::pin(BotApi::analyze_tone(self, text))
    }

    fn translate<'a>(
        &'a self,
        text: &'a str,
        source_language: &'a str,
        target_language: &'a str,
    ) -> BoxFuture<'a, Result<Value, BotError>> {
        Box::pin(BotApi::translate(self, text, source_language, target_language))
    }

    fn identify_language<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Value, BotError>> {
        Box::pin(BotApi::identify_language(self, text))
    }

    fn converse<'a>(
        &'a self,
        workspace_id: &'a str,
        message: &'a str,
    ) -> BoxFuture<'a, Result<ConverseReply, BotError>> {
        Box::pin(BotApi::converse(self, workspace_id, message))
    }

    fn speak<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<(), BotError>> {
        Box::pin(BotApi::speak(self, text))
    }

    fn listen(&self, sink: TranscriptSink) -> BoxFuture<'_, Result<(), BotError>> {
        Box::pin(BotApi::listen(self, sink))
    }

    fn stop_listening(&self) -> Result<(), CapabilityError> {
        BotApi::stop_listening(self)
    }

    fn see(&self) -> BoxFuture<'_, Result<Value, BotError>> {
        Box::pin(BotApi::see(self))
    }

    fn take_photo(&self) -> BoxFuture<'_, Result<String, BotError>> {
        Box::pin(BotApi::take_photo(self))
    }
}

/// A bot of erased concrete type.
pub struct BoxBot(Box<dyn DynBot>);

impl BoxBot {
    pub fn new(bot: impl BotApi + 'static) -> Self {
        Self(Box::new(bot))
    }
}

impl BotApi for BoxBot {
    fn wave(&self) -> Result<(), CapabilityError> {
        self.0.wave()
    }

    fn raise_arm(&self) -> Result<(), CapabilityError> {
        self.0.raise_arm()
    }

    fn lower_arm(&self) -> Result<(), CapabilityError> {
        self.0.lower_arm()
    }

    fn shine(&self, color: &str) -> Result<(), CapabilityError> {
        self.0.shine(color)
    }

    fn shine_colors(&self) -> Vec<&'static str> {
        self.0.shine_colors()
    }

    async fn analyze_tone(&self, text: &str) -> Result<Value, BotError> {
        self.0.analyze_tone(text).await
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Value, BotError> {
        self.0.translate(text, source_language, target_language).await
    }

    async fn identify_language(&self, text: &str) -> Result<Value, BotError> {
        self.0.identify_language(text).await
    }

    async fn converse(&self, workspace_id: &str, message: &str) -> Result<ConverseReply, BotError> {
        self.0.converse(workspace_id, message).await
    }

    async fn speak(&self, text: &str) -> Result<(), BotError> {
        self.0.speak(text).await
    }

    async fn listen(&self, sink: TranscriptSink) -> Result<(), BotError> {
        self.0.listen(sink).await
    }

    fn stop_listening(&self) -> Result<(), CapabilityError> {
        self.0.stop_listening()
    }

    async fn see(&self) -> Result<Value, BotError> {
        self.0.see().await
    }

    async fn take_photo(&self) -> Result<String, BotError> {
        self.0.take_photo().await
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::*;
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn boxed_bot_delegates_to_the_inner_bot() {
        let relay = Arc::new(MockRelay::default());
        let (bot, fixtures) = full_bot(Arc::clone(&relay));
        let boxed = BoxBot::new(bot);

        BotApi::shine(&boxed, "blue").unwrap();
        assert_eq!(fixtures.renderer.led(), Some("blue".to_string()));

        let response = BotApi::analyze_tone(&boxed, "hi").await.unwrap();
        assert_eq!(response["method"], "analyze_tone");
    }
}
