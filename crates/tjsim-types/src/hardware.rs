use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// A hardware component the bot may be constructed with.
///
/// Operations are gated on these tags (e.g. `listen` requires
/// [`Hardware::Microphone`]). The string forms match the tags a script
/// passes to the bot constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hardware {
    Servo,
    Led,
    Microphone,
    Speaker,
    Camera,
}

impl Hardware {
    /// All hardware tags, in declaration order.
    pub const ALL: [Hardware; 5] = [
        Hardware::Servo,
        Hardware::Led,
        Hardware::Microphone,
        Hardware::Speaker,
        Hardware::Camera,
    ];
}

impl fmt::Display for Hardware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hardware::Servo => write!(f, "servo"),
            Hardware::Led => write!(f, "led"),
            Hardware::Microphone => write!(f, "microphone"),
            Hardware::Speaker => write!(f, "speaker"),
            Hardware::Camera => write!(f, "camera"),
        }
    }
}

impl FromStr for Hardware {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "servo" => Ok(Hardware::Servo),
            "led" => Ok(Hardware::Led),
            "microphone" => Ok(Hardware::Microphone),
            "speaker" => Ok(Hardware::Speaker),
            "camera" => Ok(Hardware::Camera),
            other => Err(format!("unknown hardware tag: '{other}'")),
        }
    }
}

/// Position of the simulated arm, mutated by the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmPosition {
    Raised,
    Lowered,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_through_from_str() {
        for hw in Hardware::ALL {
            let parsed: Hardware = hw.to_string().parse().unwrap();
            assert_eq!(parsed, hw);
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = "laser".parse::<Hardware>().unwrap_err();
        assert!(err.contains("laser"));
    }
}
