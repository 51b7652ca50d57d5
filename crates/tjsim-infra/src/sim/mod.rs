//! Simulated hardware: in-memory stand-ins for the arm/LED renderer, the
//! camera, and the speaker.

mod camera;
mod renderer;
mod speaker;

pub use camera::SimCamera;
pub use renderer::SimRenderer;
pub use speaker::SimSpeaker;
