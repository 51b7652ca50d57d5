//! Hardware collaborator ports.
//!
//! The facade's non-cloud side effects are pure UI mutation delegated
//! through these seams: arm position and LED color to a [`Renderer`],
//! frame capture to a [`Camera`], audio playback to a [`Speaker`].
//! Simulated implementations live in tjsim-infra.

use tjsim_types::hardware::ArmPosition;
use tjsim_types::relay::AudioClip;

/// Rendering collaborator for the simulated arm and LED.
///
/// Object-safe and synchronous: renderer state is also read by UI panels,
/// so implementations are shared behind `Arc<dyn Renderer>`.
pub trait Renderer: Send + Sync {
    fn set_arm(&self, position: ArmPosition);

    /// `color` arrives already normalized by the facade ("off" never
    /// reaches the renderer).
    fn set_led(&self, color: &str);
}

/// Camera collaborator.
pub trait Camera: Send + Sync {
    /// Prepare the capture pipeline. Idempotent: after the first success,
    /// completes immediately.
    fn ensure_setup(&self) -> impl std::future::Future<Output = Result<(), String>> + Send;

    /// Capture one frame as a base64 PNG data URL
    /// (`data:image/png;base64,...`).
    fn capture(&self) -> impl std::future::Future<Output = Result<String, String>> + Send;
}

/// Speaker collaborator. `play` resolves when playback completes.
pub trait Speaker: Send + Sync {
    fn play(&self, clip: AudioClip) -> impl std::future::Future<Output = ()> + Send;
}
