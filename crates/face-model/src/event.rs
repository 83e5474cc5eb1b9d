//! Messages carried from the detector context to the control context.
//!
//! The JSON form uses the same event names as the detector UI emits, so a
//! recorded message stream can be replayed verbatim.

use serde::{Deserialize, Serialize};

/// Directional vectors plus the caller-tuned speed and offset parameters.
///
/// Sent whole with every face-detection sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MotionFlags {
    pub right_speed: f64,
    pub down_speed: f64,
    pub left_speed: f64,
    pub up_speed: f64,
    pub x_offset: f64,
    pub y_offset: f64,

    #[serde(rename = "rightVector")]
    pub right_vector: f64,
    #[serde(rename = "downVector")]
    pub down_vector: f64,
    #[serde(rename = "upVector")]
    pub up_vector: f64,
    #[serde(rename = "leftVector")]
    pub left_vector: f64,
}

impl MotionFlags {
    /// Horizontal displacement in half-screen units (right is positive).
    pub fn normalized_x(&self) -> f64 {
        self.right_vector * self.right_speed - self.left_vector * self.left_speed
    }

    /// Vertical displacement in half-screen units (down is positive).
    pub fn normalized_y(&self) -> f64 {
        self.down_vector * self.down_speed - self.up_vector * self.up_speed
    }
}

/// Button/key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    Down,
    Up,
}

/// A message on the detector → control channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ChannelMessage {
    /// The detector model finished loading.
    #[serde(rename = "loaded")]
    Loaded,

    /// Close the audio gate.
    #[serde(rename = "mute")]
    Mute,

    /// Open the audio gate.
    #[serde(rename = "unmute")]
    Unmute,

    /// The webcam stream started delivering frames.
    #[serde(rename = "webcam_active")]
    WebcamActive,

    /// The detector side hit a device error.
    #[serde(rename = "error")]
    Error,

    /// Move the cursor back to the middle of the screen.
    #[serde(rename = "center")]
    Center,

    /// A mapped motion sample.
    #[serde(rename = "face-detection")]
    FaceDetection { flags: MotionFlags },

    /// Play a named sound cue.
    #[serde(rename = "Play")]
    Play(String),

    /// Mouth-pucker click press or release.
    #[serde(rename = "click")]
    Click(ButtonState),
}

impl ChannelMessage {
    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loaded => "loaded",
            Self::Mute => "mute",
            Self::Unmute => "unmute",
            Self::WebcamActive => "webcam_active",
            Self::Error => "error",
            Self::Center => "center",
            Self::FaceDetection { .. } => "face-detection",
            Self::Play(_) => "Play",
            Self::Click(_) => "click",
        }
    }

    /// User commands that may be injected into a frame recording.
    pub fn is_command(&self) -> bool {
        matches!(self, Self::Center | Self::Mute | Self::Unmute)
    }
}
