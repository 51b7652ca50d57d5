//! Simulated speaker: playback completion modeled as elapsed time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tjsim_types::relay::AudioClip;

use tjsim_core::hardware::Speaker;

/// Bytes per second of playback for duration estimation (16-bit mono at
/// 22050 Hz, the synthesis default).
const BYTES_PER_SECOND: u64 = 44_100;

/// Plays clips by sleeping for their estimated duration, so `speak` resolves
/// "when playback ends" like a real audio element would.
pub struct SimSpeaker {
    playback: bool,
    clips_played: AtomicU64,
}

impl SimSpeaker {
    pub fn new() -> Self {
        Self {
            playback: true,
            clips_played: AtomicU64::new(0),
        }
    }

    /// Resolve immediately instead of simulating playback time (tests).
    pub fn instant(mut self) -> Self {
        self.playback = false;
        self
    }

    pub fn clips_played(&self) -> u64 {
        self.clips_played.load(Ordering::SeqCst)
    }

    fn duration_of(clip: &AudioClip) -> Duration {
        Duration::from_millis(clip.len() as u64 * 1000 / BYTES_PER_SECOND)
    }
}

impl Default for SimSpeaker {
    fn default() -> Self {
        Self::new()
    }
}

impl Speaker for SimSpeaker {
    async fn play(&self, clip: AudioClip) {
        if self.playback {
            tokio::time::sleep(Self::duration_of(&clip)).await;
        }
        self.clips_played.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(bytes = clip.len(), "playback finished");
    }
}
