//! The script runner and its liveness check.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tjsim_types::error::BotError;

use crate::bot::boxed::BoxBot;
use crate::event::EventBus;
use crate::instrument::ScriptLogger;

/// How long a script has to call [`ScriptContext::mark_started`] before it
/// is considered dead on arrival.
pub const START_GRACE: Duration = Duration::from_millis(500);

pub type ScriptFuture = Pin<Box<dyn Future<Output = Result<(), BotError>> + Send>>;

/// An opaque user script: consumed once, driven to completion on the
/// runtime.
pub type Script = Box<dyn FnOnce(ScriptContext) -> ScriptFuture + Send>;

/// Everything a script may touch.
///
/// The bot is already instrumented, so scripts cannot bypass event
/// publication; the logger is already tee'd for the same reason.
#[derive(Clone)]
pub struct ScriptContext {
    pub bot: Arc<BoxBot>,
    pub logger: Arc<dyn ScriptLogger>,
    pub bus: EventBus,
    started: Arc<AtomicBool>,
}

impl ScriptContext {
    /// Report liveness. A script's first statement should call this.
    pub fn mark_started(&self) {
        self.started.store(true, Ordering::SeqCst);
    }
}

/// Terminal state of one script execution.
#[derive(Debug)]
pub enum ScriptOutcome {
    Completed,
    Failed(BotError),
    Panicked(String),
    /// The grace window elapsed without a liveness report. The script task
    /// is left running detached; this is a diagnosis, not a kill.
    NeverStarted,
}

impl ScriptOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ScriptOutcome::Completed)
    }
}

/// Drives scripts to completion with a startup liveness check.
pub struct ScriptRunner {
    bus: EventBus,
    logger: Arc<dyn ScriptLogger>,
    grace: Duration,
}

impl ScriptRunner {
    pub fn new(bus: EventBus, logger: Arc<dyn ScriptLogger>) -> Self {
        Self {
            bus,
            logger,
            grace: START_GRACE,
        }
    }

    /// Override the grace window (tests use a short one).
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Run one script against one bot instance.
    ///
    /// Waits at most the grace window for the liveness flag; once the flag
    /// is up, waits for the script to finish however long it takes.
    pub async fn run(&self, script: Script, bot: Arc<BoxBot>) -> ScriptOutcome {
        let started = Arc::new(AtomicBool::new(false));
        let context = ScriptContext {
            bot,
            logger: Arc::clone(&self.logger),
            bus: self.bus.clone(),
            started: Arc::clone(&started),
        };

        let mut handle = tokio::spawn(script(context));

        let outcome = tokio::select! {
            result = &mut handle => Some(result),
            _ = tokio::time::sleep(self.grace) => None,
        };

        let result = match outcome {
            Some(result) => result,
            None if !started.load(Ordering::SeqCst) => {
                tracing::warn!(
                    grace_ms = self.grace.as_millis() as u64,
                    "script never reported itself started"
                );
                return ScriptOutcome::NeverStarted;
            }
            None => handle.await,
        };

        match result {
            Ok(Ok(())) => ScriptOutcome::Completed,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "script failed");
                ScriptOutcome::Failed(err)
            }
            Err(join_err) => {
                tracing::error!(error = %join_err, "script panicked");
                ScriptOutcome::Panicked(join_err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::testutil::*;
    use crate::bot::BotApi;
    use crate::instrument::{InstrumentedBot, TracingLogger};
    use tjsim_types::event::BotEvent;

    use std::sync::Mutex;

    fn runner(bus: &EventBus) -> ScriptRunner {
        ScriptRunner::new(bus.clone(), Arc::new(TracingLogger)).with_grace(Duration::from_millis(50))
    }

    fn instrumented(bus: &EventBus) -> Arc<BoxBot> {
        let relay = Arc::new(MockRelay::default());
        let (inner, _fixtures) = full_bot(relay);
        Arc::new(BoxBot::new(InstrumentedBot::new(inner, bus.clone())))
    }

    #[tokio::test]
    async fn completed_script_reports_completed() {
        let bus = EventBus::new();
        let bot = instrumented(&bus);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.on("tjbot.wave", move |event| {
            sink.lock().unwrap().push(event.clone());
        });

        let script: Script = Box::new(|ctx: ScriptContext| {
            Box::pin(async move {
                ctx.mark_started();
                ctx.bot.wave()?;
                Ok(())
            })
        });

        let outcome = runner(&bus).run(script, bot).await;
        assert!(outcome.is_completed());
        assert_eq!(*seen.lock().unwrap(), vec![BotEvent::Wave]);
    }

    #[tokio::test]
    async fn failing_script_reports_the_error() {
        let bus = EventBus::new();
        let relay = Arc::new(MockRelay::default());
        let bot = Arc::new(BoxBot::new(InstrumentedBot::new(
            bare_bot(relay),
            bus.clone(),
        )));

        let script: Script = Box::new(|ctx: ScriptContext| {
            Box::pin(async move {
                ctx.mark_started();
                ctx.bot.wave()?;
                Ok(())
            })
        });

        let outcome = runner(&bus).run(script, bot).await;
        assert!(matches!(outcome, ScriptOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn silent_script_is_flagged_after_the_grace_window() {
        let bus = EventBus::new();
        let bot = instrumented(&bus);

        // Never calls mark_started, never finishes.
        let script: Script = Box::new(|_ctx: ScriptContext| {
            Box::pin(async move {
                std::future::pending::<()>().await;
                Ok(())
            })
        });

        let outcome = runner(&bus).run(script, bot).await;
        assert!(matches!(outcome, ScriptOutcome::NeverStarted));
    }

    #[tokio::test]
    async fn started_script_may_outlive_the_grace_window() {
        let bus = EventBus::new();
        let bot = instrumented(&bus);

        let script: Script = Box::new(|ctx: ScriptContext| {
            Box::pin(async move {
                ctx.mark_started();
                tokio::time::sleep(Duration::from_millis(120)).await;
                Ok(())
            })
        });

        let outcome = runner(&bus).run(script, bot).await;
        assert!(outcome.is_completed());
    }

    #[tokio::test]
    async fn fast_script_beats_the_grace_window_without_marking() {
        let bus = EventBus::new();
        let bot = instrumented(&bus);

        // Completion itself is proof of life.
        let script: Script = Box::new(|_ctx: ScriptContext| Box::pin(async { Ok(()) }));

        let outcome = runner(&bus).run(script, bot).await;
        assert!(outcome.is_completed());
    }

    #[tokio::test]
    async fn panicking_script_is_contained() {
        let bus = EventBus::new();
        let bot = instrumented(&bus);

        let script: Script = Box::new(|ctx: ScriptContext| {
            Box::pin(async move {
                ctx.mark_started();
                panic!("script bug");
            })
        });

        let outcome = runner(&bus).run(script, bot).await;
        assert!(matches!(outcome, ScriptOutcome::Panicked(_)));
    }
}
