//! Blendshape frame sources.
//!
//! The face-landmark model is an external collaborator. A source hands the
//! detector loop one validated [`BlendshapeFrame`] per video frame:
//!
//! - **Replay:** Frames recorded as JSONL, optionally paced in real time,
//!   with user commands (`center`, `mute`, `unmute`) between them
//! - **Scripted:** In-memory frames, with optional failure injection

use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use gazemouse_common::error::{GazemouseError, GazemouseResult};
use gazemouse_face_model::blendshape::BlendshapeFrame;
use gazemouse_face_model::event::ChannelMessage;
use gazemouse_face_model::recording::{parse_recording, RecordedLine};
use tokio::time::Instant;

/// Zoom range reported by a video device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomCapability {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// A producer of detector frames.
#[async_trait::async_trait]
pub trait BlendshapeSource: Send {
    /// Wait for the next frame. `Ok(None)` when the source is exhausted.
    async fn next_frame(&mut self) -> GazemouseResult<Option<BlendshapeFrame>>;

    /// Source name for logging.
    fn name(&self) -> &str;

    /// User commands that arrived since the last call, oldest first.
    fn take_commands(&mut self) -> Vec<ChannelMessage> {
        Vec::new()
    }

    /// Zoom support of the underlying device.
    fn zoom_capability(&self) -> GazemouseResult<ZoomCapability> {
        Err(GazemouseError::unsupported(format!(
            "Zoom is not supported by {}",
            self.name()
        )))
    }
}

/// How a replay source releases frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    /// Release frames as soon as they are asked for.
    #[default]
    Unpaced,
    /// Release each frame at its recorded offset from the first frame.
    Realtime,
}

/// Replays frames from a JSONL recording of detector output.
#[derive(Debug)]
pub struct ReplaySource {
    name: String,
    lines: VecDeque<RecordedLine>,
    commands: Vec<ChannelMessage>,
    pacing: Pacing,
    anchor: Option<(Instant, f64)>,
}

impl ReplaySource {
    /// Open a recording file.
    pub fn open(path: &Path, pacing: Pacing) -> GazemouseResult<Self> {
        if !path.exists() {
            return Err(GazemouseError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            GazemouseError::device_acquisition(format!(
                "Failed to read frame recording {}: {e}",
                path.display()
            ))
        })?;

        let name = format!("replay:{}", path.display());
        Self::from_jsonl(name, &content, pacing)
    }

    /// Parse a recording held in memory.
    pub fn from_jsonl(
        name: impl Into<String>,
        content: &str,
        pacing: Pacing,
    ) -> GazemouseResult<Self> {
        let lines = parse_recording(content)
            .map_err(|e| GazemouseError::invalid_frame(e.to_string()))?;
        Ok(Self::from_lines(name, lines, pacing))
    }

    pub fn from_frames(
        name: impl Into<String>,
        frames: Vec<BlendshapeFrame>,
        pacing: Pacing,
    ) -> Self {
        Self::from_lines(name, frames.into_iter().map(RecordedLine::Frame), pacing)
    }

    pub fn from_lines(
        name: impl Into<String>,
        lines: impl IntoIterator<Item = RecordedLine>,
        pacing: Pacing,
    ) -> Self {
        Self {
            name: name.into(),
            lines: lines.into_iter().collect(),
            commands: Vec::new(),
            pacing,
            anchor: None,
        }
    }

    /// Frames not yet handed out.
    pub fn remaining(&self) -> usize {
        self.frames().count()
    }

    /// Recorded span between the first and last remaining frame.
    pub fn duration(&self) -> Duration {
        match (self.frames().next(), self.frames().next_back()) {
            (Some(first), Some(last)) => offset(first.timestamp_ms(), last.timestamp_ms()),
            _ => Duration::ZERO,
        }
    }

    fn frames(&self) -> impl DoubleEndedIterator<Item = &BlendshapeFrame> {
        self.lines.iter().filter_map(RecordedLine::frame)
    }
}

#[async_trait::async_trait]
impl BlendshapeSource for ReplaySource {
    async fn next_frame(&mut self) -> GazemouseResult<Option<BlendshapeFrame>> {
        let frame = loop {
            match self.lines.pop_front() {
                Some(RecordedLine::Frame(frame)) => break frame,
                Some(RecordedLine::Command(command)) => self.commands.push(command),
                None => return Ok(None),
            }
        };

        match self.pacing {
            Pacing::Realtime => {
                let (start, first_ms) = *self
                    .anchor
                    .get_or_insert((Instant::now(), frame.timestamp_ms()));
                tokio::time::sleep_until(start + offset(first_ms, frame.timestamp_ms())).await;
            }
            Pacing::Unpaced => tokio::task::yield_now().await,
        }

        Ok(Some(frame))
    }

    fn take_commands(&mut self) -> Vec<ChannelMessage> {
        std::mem::take(&mut self.commands)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn offset(from_ms: f64, to_ms: f64) -> Duration {
    let ms = to_ms - from_ms;
    if ms.is_finite() && ms > 0.0 {
        Duration::from_secs_f64(ms / 1000.0)
    } else {
        Duration::ZERO
    }
}

/// In-memory frames, handed out in order.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<BlendshapeFrame>,
    failure: Option<String>,
    zoom: Option<ZoomCapability>,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = BlendshapeFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            failure: None,
            zoom: None,
        }
    }

    /// Fail with a device-acquisition error once the frames run out.
    pub fn fail_with(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Report zoom support.
    pub fn with_zoom(mut self, zoom: ZoomCapability) -> Self {
        self.zoom = Some(zoom);
        self
    }
}

#[async_trait::async_trait]
impl BlendshapeSource for ScriptedSource {
    async fn next_frame(&mut self) -> GazemouseResult<Option<BlendshapeFrame>> {
        tokio::task::yield_now().await;
        match self.frames.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None => match self.failure.take() {
                Some(message) => Err(GazemouseError::device_acquisition(message)),
                None => Ok(None),
            },
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn zoom_capability(&self) -> GazemouseResult<ZoomCapability> {
        self.zoom
            .ok_or_else(|| GazemouseError::unsupported("Zoom is not supported by scripted"))
    }
}
