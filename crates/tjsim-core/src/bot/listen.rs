//! Microphone capture stream lifecycle.
//!
//! At most one capture stream exists per bot instance. Starting a new one
//! cancels the previous one, and a monotonically increasing generation
//! number guards the sink: a chunk that arrives after its stream has been
//! superseded is dropped instead of being delivered out of order.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use tjsim_types::error::BotError;

use super::{TjBot, TranscriptSink};
use crate::hardware::{Camera, Speaker};
use crate::relay::Relay;

#[derive(Default)]
pub(super) struct ListenState {
    generation: u64,
    active: Option<ActiveStream>,
}

struct ActiveStream {
    generation: u64,
    cancel: CancellationToken,
}

impl ListenState {
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.generation == generation)
    }

    /// Drop the active entry, but only if it still belongs to `generation`.
    /// A reader task for a superseded stream must not clear its successor.
    fn clear_if_current(&mut self, generation: u64) {
        if self.is_current(generation) {
            self.active = None;
        }
    }
}

impl<R, C, S> TjBot<R, C, S>
where
    R: Relay,
    C: Camera,
    S: Speaker,
{
    pub(super) async fn start_listen_stream(
        &self,
        token: &str,
        sink: TranscriptSink,
    ) -> Result<(), BotError> {
        // Claim the slot before opening: the previous stream is cancelled
        // even if the new open ends up failing.
        let (generation, cancel) = {
            let mut state = self.listen_state.lock().expect("listen state poisoned");
            if let Some(previous) = state.active.take() {
                previous.cancel.cancel();
            }
            state.generation += 1;
            let cancel = CancellationToken::new();
            state.active = Some(ActiveStream {
                generation: state.generation,
                cancel: cancel.clone(),
            });
            (state.generation, cancel)
        };

        let mut stream = match self.relay.recognize(token).await {
            Ok(stream) => stream,
            Err(err) => {
                let mut state = self.listen_state.lock().expect("listen state poisoned");
                state.clear_if_current(generation);
                return Err(err.into());
            }
        };

        let listen_state = Arc::clone(&self.listen_state);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    item = stream.next() => match item {
                        Some(Ok(text)) => {
                            let current = listen_state
                                .lock()
                                .expect("listen state poisoned")
                                .is_current(generation);
                            if !current {
                                break;
                            }
                            sink(Ok(text));
                        }
                        Some(Err(err)) => {
                            listen_state
                                .lock()
                                .expect("listen state poisoned")
                                .clear_if_current(generation);
                            sink(Err(err.into()));
                            break;
                        }
                        None => {
                            listen_state
                                .lock()
                                .expect("listen state poisoned")
                                .clear_if_current(generation);
                            break;
                        }
                    },
                }
            }
            tracing::debug!(generation, "capture stream reader finished");
        });

        Ok(())
    }

    pub(super) fn stop_listen_stream(&self) {
        let mut state = self.listen_state.lock().expect("listen state poisoned");
        if let Some(active) = state.active.take() {
            active.cancel.cancel();
        }
    }
}
