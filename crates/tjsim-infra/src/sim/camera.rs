//! Simulated camera with lazy, idempotent setup.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tokio::sync::OnceCell;

use tjsim_core::hardware::Camera;

/// Placeholder frame: a 1x1 transparent PNG.
const FRAME_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0b, 0x49, 0x44, 0x41, 0x54, 0x78, 0xda, 0x63, 0x64,
    0x60, 0x00, 0x00, 0x00, 0x06, 0x00, 0x02, 0x30, 0x81, 0xd0, 0x2f, 0x00, 0x00, 0x00, 0x00,
    0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// Simulated capture pipeline.
///
/// Setup runs once for the camera's life, however many operations request
/// it; the first caller pays the (simulated) warm-up cost and everyone else
/// awaits the same completion.
pub struct SimCamera {
    setup: OnceCell<()>,
    warmup: Duration,
    frames: AtomicU64,
}

impl SimCamera {
    pub fn new() -> Self {
        Self {
            setup: OnceCell::new(),
            warmup: Duration::from_millis(50),
            frames: AtomicU64::new(0),
        }
    }

    /// Skip the warm-up delay (tests).
    pub fn instant(mut self) -> Self {
        self.warmup = Duration::ZERO;
        self
    }

    /// Frames captured so far.
    pub fn frame_count(&self) -> u64 {
        self.frames.load(Ordering::SeqCst)
    }
}

impl Default for SimCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for SimCamera {
    async fn ensure_setup(&self) -> Result<(), String> {
        self.setup
            .get_or_init(|| async {
                tokio::time::sleep(self.warmup).await;
                tracing::debug!("camera pipeline ready");
            })
            .await;
        Ok(())
    }

    async fn capture(&self) -> Result<String, String> {
        if self.setup.get().is_none() {
            return Err("camera capture before setup".to_string());
        }
        self.frames.fetch_add(1, Ordering::SeqCst);
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(FRAME_PNG)))
    }
}
