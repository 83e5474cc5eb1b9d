//! Control session management.
//!
//! The session is the single control context: it owns the position
//! integrator, the overlay handle and the audio gate, and multiplexes the
//! commit timer, the keep-on-top timer and the event channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gazemouse_common::clock::{CommitCadence, SessionClock};
use gazemouse_common::config::AppConfig;
use gazemouse_common::error::{GazemouseError, GazemouseResult};
use gazemouse_face_model::event::{ButtonState, ChannelMessage};
use gazemouse_face_model::geometry::{CursorPosition, ScreenGeometry, WindowSize};
use gazemouse_signal_core::integrator::PositionIntegrator;
use serde::Serialize;
use tokio::time::MissedTickBehavior;

use crate::channel::EventReceiver;
use crate::feedback::{AudioGate, Cue};
use crate::overlay::OverlayWindow;

/// Configuration for a control session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Display the overlay moves across.
    pub screen: ScreenGeometry,

    /// Overlay window size.
    pub window: WindowSize,

    /// How often to re-assert the overlay's always-on-top state.
    pub keep_on_top_interval: Duration,
}

impl SessionConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            screen: ScreenGeometry::new(
                config.display.width,
                config.display.height,
                config.display.refresh_hz,
            ),
            window: WindowSize::new(config.overlay.width, config.overlay.height),
            keep_on_top_interval: Duration::from_millis(config.overlay.keep_on_top_interval_ms),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

/// State of a control session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Session created but not started.
    Idle,
    /// Commit loop running.
    Running,
    /// Loop ended, final position committed.
    Stopped,
}

/// Counters reported when the session ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub messages: u64,
    pub samples: u64,
    pub recenters: u64,
    pub commits: u64,
    pub overlay_errors: u64,
    pub keep_on_top_calls: u64,
    pub cues_played: u64,
    pub cues_suppressed: u64,
    pub last_position: Option<CursorPosition>,
    pub elapsed_secs: f64,
}

/// The control side of the pointer: channel in, overlay position out.
pub struct ControlSession<O> {
    config: SessionConfig,
    state: SessionState,
    integrator: PositionIntegrator,
    overlay: O,
    audio: AudioGate,
    cadence: CommitCadence,
    clock: Option<SessionClock>,
    stop_flag: Arc<AtomicBool>,
    stats: SessionStats,
}

impl<O: OverlayWindow> ControlSession<O> {
    /// Create a session with the cursor centered.
    pub fn new(config: SessionConfig, overlay: O, audio: AudioGate) -> Self {
        Self {
            integrator: PositionIntegrator::new(config.screen, config.window),
            cadence: CommitCadence::from_refresh_hz(config.screen.refresh_hz),
            config,
            state: SessionState::Idle,
            overlay,
            audio,
            clock: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            stats: SessionStats::default(),
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Apply one channel message.
    pub fn handle(&mut self, message: ChannelMessage) {
        self.stats.messages += 1;
        tracing::trace!(event = message.name(), "Channel message");

        match message {
            ChannelMessage::Loaded => {
                self.audio.play(Cue::Loaded);
            }
            ChannelMessage::Mute => self.audio.mute(),
            ChannelMessage::Unmute => self.audio.unmute(),
            ChannelMessage::WebcamActive => {
                tracing::info!("Webcam active");
                self.audio.play(Cue::WebcamActive);
            }
            ChannelMessage::Error => {
                tracing::warn!("Detector reported an error");
                self.audio.play(Cue::Error);
            }
            ChannelMessage::Center => {
                self.audio.play(Cue::Center);
                self.integrator.recenter();
                self.stats.recenters += 1;
                tracing::debug!("Cursor recentered");
            }
            ChannelMessage::FaceDetection { flags } => {
                self.integrator.apply_displacement(&flags);
                self.stats.samples += 1;
            }
            ChannelMessage::Play(name) => {
                self.audio.play(Cue::Named(name));
            }
            ChannelMessage::Click(ButtonState::Down) => {
                self.audio.play(Cue::MouseDown);
            }
            ChannelMessage::Click(ButtonState::Up) => {
                self.audio.play(Cue::MouseUp);
            }
        }
    }

    /// Clamp the current position and write it to the overlay.
    ///
    /// Overlay failures are logged; the next commit retries.
    pub fn commit(&mut self) -> CursorPosition {
        let position = self.integrator.commit_tick();
        self.stats.commits += 1;
        self.stats.last_position = Some(position);

        if let Err(e) = self.overlay.set_position(position) {
            self.stats.overlay_errors += 1;
            tracing::warn!(
                overlay = self.overlay.name(),
                error = %e,
                "Failed to move overlay"
            );
        }
        position
    }

    /// Re-assert the overlay's always-on-top state.
    pub fn keep_on_top(&mut self) {
        self.stats.keep_on_top_calls += 1;
        if let Err(e) = self.overlay.keep_on_top() {
            tracing::warn!(
                overlay = self.overlay.name(),
                error = %e,
                "Failed to raise overlay"
            );
        }
    }

    /// Run the control loop until the stop flag is set or every sender
    /// is gone. Commits once more before returning.
    pub async fn run(&mut self, mut receiver: EventReceiver) -> GazemouseResult<SessionStats> {
        if self.state != SessionState::Idle {
            return Err(GazemouseError::session("Session already started"));
        }

        let clock = SessionClock::start();
        tracing::info!(
            epoch_wall = %clock.epoch_wall(),
            width = self.config.screen.width,
            height = self.config.screen.height,
            commit_interval_ms = self.cadence.interval().as_millis() as u64,
            overlay = self.overlay.name(),
            "Control session started"
        );
        self.clock = Some(clock);
        self.state = SessionState::Running;
        self.audio.play(Cue::Loading);

        let mut commit_timer = tokio::time::interval(self.cadence.interval());
        commit_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let raise_period = self.config.keep_on_top_interval.max(Duration::from_millis(1));
        let mut raise_timer = tokio::time::interval(raise_period);
        raise_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while !self.stop_flag.load(Ordering::Relaxed) {
            tokio::select! {
                _ = commit_timer.tick() => {
                    self.commit();
                }
                _ = raise_timer.tick() => {
                    self.keep_on_top();
                }
                message = receiver.recv() => match message {
                    Some(message) => self.handle(message),
                    None => {
                        tracing::info!("Event channel closed");
                        break;
                    }
                },
            }
        }

        let position = self.commit();
        self.state = SessionState::Stopped;

        let stats = self.stats();
        tracing::info!(
            x = position.x,
            y = position.y,
            samples = stats.samples,
            commits = stats.commits,
            duration_secs = stats.elapsed_secs,
            "Control session stopped"
        );
        Ok(stats)
    }

    /// Set the stop flag.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Counters so far.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            cues_played: self.audio.played(),
            cues_suppressed: self.audio.suppressed(),
            elapsed_secs: self.elapsed_secs(),
            ..self.stats.clone()
        }
    }

    /// Seconds since the loop started.
    pub fn elapsed_secs(&self) -> f64 {
        self.clock.as_ref().map(|c| c.elapsed_secs()).unwrap_or(0.0)
    }

    pub fn integrator(&self) -> &PositionIntegrator {
        &self.integrator
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn audio(&self) -> &AudioGate {
        &self.audio
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Take the overlay back out of a finished session.
    pub fn into_overlay(self) -> O {
        self.overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::event_channel;
    use crate::feedback::TracingFeedback;
    use crate::overlay::HeadlessOverlay;
    use gazemouse_common::config::AudioConfig;
    use gazemouse_face_model::event::MotionFlags;

    struct BrokenOverlay;

    impl OverlayWindow for BrokenOverlay {
        fn set_position(&mut self, _position: CursorPosition) -> GazemouseResult<()> {
            Err(GazemouseError::overlay("window destroyed"))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    fn session() -> (ControlSession<HeadlessOverlay>, TracingFeedback) {
        let sink = TracingFeedback::new();
        let audio = AudioGate::new(Box::new(sink.clone()), &AudioConfig::default());
        (
            ControlSession::new(SessionConfig::default(), HeadlessOverlay::new(), audio),
            sink,
        )
    }

    fn right(vector: f64) -> ChannelMessage {
        ChannelMessage::FaceDetection {
            flags: MotionFlags {
                right_speed: 1.0,
                left_speed: 1.0,
                up_speed: 1.0,
                down_speed: 1.0,
                right_vector: vector,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_commit_before_any_sample_is_centered() {
        let (mut session, _) = session();
        assert_eq!(session.commit(), CursorPosition::new(944, 524));
        assert_eq!(
            session.overlay().position(),
            Some(CursorPosition::new(944, 524))
        );
    }

    #[test]
    fn test_last_sample_wins() {
        let (mut session, _) = session();
        session.handle(right(0.2));
        session.handle(right(0.8));
        assert_eq!(session.commit(), CursorPosition::new(1728, 540));
        assert_eq!(session.stats().samples, 2);
    }

    #[test]
    fn test_center_recenters_and_plays_cue() {
        let (mut session, sink) = session();
        session.handle(right(0.8));
        session.handle(ChannelMessage::Center);
        assert_eq!(session.commit(), CursorPosition::new(944, 524));
        assert_eq!(sink.history(), vec!["Center"]);
        assert_eq!(session.stats().recenters, 1);
    }

    #[test]
    fn test_discrete_messages_map_to_cues() {
        let (mut session, sink) = session();
        session.handle(ChannelMessage::Loaded);
        session.handle(ChannelMessage::Play("BrowUp".into()));
        session.handle(ChannelMessage::Click(ButtonState::Down));
        session.handle(ChannelMessage::Click(ButtonState::Up));
        session.handle(ChannelMessage::Mute);
        session.handle(ChannelMessage::Error);
        session.handle(ChannelMessage::Unmute);
        session.handle(ChannelMessage::WebcamActive);

        assert_eq!(
            sink.history(),
            vec!["Loaded", "BrowUp", "MouseDown", "MouseUp", "WebcamActive"]
        );
        let stats = session.stats();
        assert_eq!(stats.messages, 8);
        assert_eq!(stats.cues_suppressed, 1);
    }

    #[test]
    fn test_overlay_failure_does_not_stop_commits() {
        let audio = AudioGate::new(Box::new(TracingFeedback::new()), &AudioConfig::default());
        let mut session = ControlSession::new(SessionConfig::default(), BrokenOverlay, audio);
        session.commit();
        session.commit();
        let stats = session.stats();
        assert_eq!(stats.commits, 2);
        assert_eq!(stats.overlay_errors, 2);
    }

    #[tokio::test]
    async fn test_run_ends_when_channel_closes() {
        let (mut session, sink) = session();
        let (sender, receiver) = event_channel();
        sender.send(right(0.5));
        drop(sender);

        let stats = session.run(receiver).await.unwrap();
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(stats.samples, 1);
        assert_eq!(stats.last_position, Some(CursorPosition::new(1440, 540)));
        assert_eq!(sink.history(), vec!["Loading"]);
    }

    #[tokio::test]
    async fn test_run_ends_on_stop_flag() {
        let (mut session, _) = session();
        let (_sender, receiver) = event_channel();
        let stop = session.stop_flag();

        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stop.store(true, Ordering::SeqCst);
        });

        let stats = session.run(receiver).await.unwrap();
        stopper.await.unwrap();
        assert!(stats.commits >= 2);
        assert!(stats.keep_on_top_calls >= 1);
        assert_eq!(session.overlay().raises(), stats.keep_on_top_calls);
        assert_eq!(stats.last_position, Some(CursorPosition::new(944, 524)));
    }

    #[tokio::test]
    async fn test_run_twice_is_rejected() {
        let (mut session, _) = session();
        let (sender, receiver) = event_channel();
        drop(sender);
        session.run(receiver).await.unwrap();

        let (_sender, receiver) = event_channel();
        let err = session.run(receiver).await.unwrap_err();
        assert!(matches!(err, GazemouseError::Session { .. }));
    }
}
