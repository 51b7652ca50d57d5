//! In-memory renderer: the "UI" the facade mutates.

use std::sync::Mutex;

use tjsim_types::hardware::ArmPosition;

use tjsim_core::hardware::Renderer;

/// Current arm position and LED color, readable by panels and tests.
#[derive(Debug)]
pub struct SimRenderer {
    state: Mutex<RenderState>,
}

#[derive(Debug, Clone)]
struct RenderState {
    arm: ArmPosition,
    led: String,
}

impl SimRenderer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RenderState {
                arm: ArmPosition::Lowered,
                led: "grey".to_string(),
            }),
        }
    }

    pub fn arm(&self) -> ArmPosition {
        self.state.lock().expect("render state poisoned").arm
    }

    pub fn led(&self) -> String {
        self.state.lock().expect("render state poisoned").led.clone()
    }
}

impl Default for SimRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for SimRenderer {
    fn set_arm(&self, position: ArmPosition) {
        let mut state = self.state.lock().expect("render state poisoned");
        state.arm = position;
        tracing::debug!(?position, "arm moved");
    }

    fn set_led(&self, color: &str) {
        let mut state = self.state.lock().expect("render state poisoned");
        state.led = color.to_string();
        tracing::debug!(color, "led set");
    }
}
