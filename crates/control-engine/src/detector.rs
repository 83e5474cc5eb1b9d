//! The detector loop: source → mapper → channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use gazemouse_common::error::{GazemouseError, GazemouseResult};
use gazemouse_face_model::event::{ButtonState, ChannelMessage};
use gazemouse_signal_core::gesture::{Edge, GestureKind, GestureTransition};
use gazemouse_signal_core::mapper::{MappedSample, SignalMapper};
use serde::Serialize;

use crate::channel::EventSender;
use crate::source::{BlendshapeSource, ZoomCapability};

/// Unsupported-operation errors in a row before the source is given up on.
pub const MAX_CONSECUTIVE_SKIPS: u32 = 16;

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DetectorStats {
    pub frames: u64,
    pub transitions: u64,
    pub messages: u64,
}

/// Pulls frames from a source, maps them, and posts the results.
pub struct DetectorLoop<S> {
    source: S,
    mapper: SignalMapper,
    sender: EventSender,
    stop_flag: Arc<AtomicBool>,
    zoom: Option<ZoomCapability>,
    stats: DetectorStats,
}

impl<S: BlendshapeSource> DetectorLoop<S> {
    pub fn new(source: S, mapper: SignalMapper, sender: EventSender) -> Self {
        Self {
            source,
            mapper,
            sender,
            stop_flag: Arc::new(AtomicBool::new(false)),
            zoom: None,
            stats: DetectorStats::default(),
        }
    }

    /// Run until the source is exhausted or the stop flag is set.
    ///
    /// User commands from the source are forwarded ahead of the frame they
    /// arrived with. A source failure is reported over the channel as
    /// `error` and then returned. Unsupported operations are logged and
    /// skipped, up to [`MAX_CONSECUTIVE_SKIPS`] in a row.
    pub async fn run(&mut self) -> GazemouseResult<DetectorStats> {
        tracing::info!(source = %self.source.name(), "Detector loop started");

        match self.source.zoom_capability() {
            Ok(zoom) => {
                tracing::info!(min = zoom.min, max = zoom.max, "Zoom available");
                self.zoom = Some(zoom);
            }
            Err(e) if !e.is_fatal_to_detector() => {
                tracing::warn!(error = %e, "Zoom disabled");
            }
            Err(e) => return Err(self.fail(e)),
        }

        self.emit(ChannelMessage::Loaded);

        let mut skips = 0;
        while !self.stop_flag.load(Ordering::Relaxed) {
            let next = self.source.next_frame().await;
            for command in self.source.take_commands() {
                tracing::debug!(event = command.name(), "Forwarding user command");
                self.emit(command);
            }

            match next {
                Ok(Some(frame)) => {
                    skips = 0;
                    if self.stats.frames == 0 {
                        self.emit(ChannelMessage::WebcamActive);
                    }
                    self.stats.frames += 1;
                    let sample = self.mapper.map(&frame);
                    self.dispatch(sample);
                }
                Ok(None) => {
                    tracing::debug!("Frame source exhausted");
                    break;
                }
                Err(e) if !e.is_fatal_to_detector() => {
                    skips += 1;
                    if skips >= MAX_CONSECUTIVE_SKIPS {
                        tracing::error!(skips, "Source keeps failing, giving up");
                        return Err(self.fail(e));
                    }
                    tracing::warn!(error = %e, "Skipping unsupported source operation");
                    tokio::task::yield_now().await;
                }
                Err(e) => return Err(self.fail(e)),
            }
        }

        tracing::info!(
            frames = self.stats.frames,
            transitions = self.stats.transitions,
            "Detector loop stopped"
        );
        Ok(self.stats)
    }

    fn dispatch(&mut self, sample: MappedSample) {
        self.emit(ChannelMessage::FaceDetection {
            flags: sample.flags,
        });

        for transition in &sample.transitions {
            self.stats.transitions += 1;
            if let Some(message) = transition_message(transition) {
                self.emit(message);
            }
        }
    }

    fn fail(&mut self, error: GazemouseError) -> GazemouseError {
        tracing::error!(source = %self.source.name(), error = %error, "Detector source failed");
        self.emit(ChannelMessage::Error);
        error
    }

    fn emit(&mut self, message: ChannelMessage) {
        self.sender.send(message);
        self.stats.messages += 1;
    }

    /// Set the stop flag.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn stats(&self) -> DetectorStats {
        self.stats
    }

    pub fn mapper(&self) -> &SignalMapper {
        &self.mapper
    }

    pub fn mapper_mut(&mut self) -> &mut SignalMapper {
        &mut self.mapper
    }

    /// Zoom range found at startup, if the source supports it.
    pub fn zoom(&self) -> Option<ZoomCapability> {
        self.zoom
    }
}

/// Channel message for a gesture transition.
///
/// Mouth pucker is a click: press on start, release on end. Every other
/// gesture plays its sound on start.
pub fn transition_message(transition: &GestureTransition) -> Option<ChannelMessage> {
    match (transition.kind, transition.edge) {
        (GestureKind::MouthPucker, Edge::Start) => Some(ChannelMessage::Click(ButtonState::Down)),
        (GestureKind::MouthPucker, Edge::End) => Some(ChannelMessage::Click(ButtonState::Up)),
        (kind, Edge::Start) => Some(ChannelMessage::Play(kind.sound_name().to_string())),
        (_, Edge::End) => None,
    }
}
