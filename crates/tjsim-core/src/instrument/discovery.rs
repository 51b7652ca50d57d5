//! Discovery query client and its instrumented decorator.
//!
//! Discovery is not part of the bot facade; scripts reach it through a
//! standalone client bound to the discovery credentials block.

use std::sync::Arc;

use serde_json::Value;

use tjsim_types::credentials::UserPassCredentials;
use tjsim_types::error::BotError;
use tjsim_types::event::BotEvent;
use tjsim_types::relay::{DiscoveryQueryRequest, RelayCreds};

use super::response_payload;
use crate::event::EventBus;
use crate::relay::Relay;

pub trait DiscoveryClient: Send + Sync {
    fn query(
        &self,
        params: Value,
    ) -> impl std::future::Future<Output = Result<Value, BotError>> + Send;
}

/// Discovery client backed by the relay.
pub struct RelayDiscovery<R: Relay> {
    relay: Arc<R>,
    creds: RelayCreds,
}

impl<R: Relay> RelayDiscovery<R> {
    pub fn new(relay: Arc<R>, credentials: &UserPassCredentials) -> Self {
        Self {
            relay,
            creds: RelayCreds::from_userpass(credentials),
        }
    }
}

impl<R: Relay> DiscoveryClient for RelayDiscovery<R> {
    async fn query(&self, params: Value) -> Result<Value, BotError> {
        let response = self
            .relay
            .discovery_query(DiscoveryQueryRequest {
                creds: self.creds.clone(),
                params,
            })
            .await?;
        Ok(response)
    }
}

/// Decorates a discovery client with event publication, under the same
/// policy as the instrumented bot.
pub struct InstrumentedDiscovery<D: DiscoveryClient> {
    inner: D,
    bus: EventBus,
}

impl<D: DiscoveryClient> InstrumentedDiscovery<D> {
    pub fn new(inner: D, bus: EventBus) -> Self {
        Self { inner, bus }
    }
}

impl<D: DiscoveryClient> DiscoveryClient for InstrumentedDiscovery<D> {
    async fn query(&self, params: Value) -> Result<Value, BotError> {
        let result = self.inner.query(params.clone()).await;
        if let Some(response) = response_payload(&result, Clone::clone) {
            self.bus.publish(&BotEvent::DiscoveryQuery { params, response });
        }
        result
    }
}
