//! Audio feedback for gestures and lifecycle events.
//!
//! Playback is an external collaborator behind [`FeedbackSink`]. The
//! [`AudioGate`] applies mute and volume and swallows playback failures:
//! a missing sound never interrupts pointer control.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};

use gazemouse_common::config::AudioConfig;
use gazemouse_common::error::{GazemouseError, GazemouseResult};

/// A sound cue, resolved to `<sounds_dir>/<Name>.mp3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue {
    Loading,
    Loaded,
    Center,
    WebcamActive,
    Error,
    MouseDown,
    MouseUp,
    /// Any other cue requested by name, e.g. a gesture's sound.
    Named(String),
}

impl Cue {
    pub fn name(&self) -> &str {
        match self {
            Cue::Loading => "Loading",
            Cue::Loaded => "Loaded",
            Cue::Center => "Center",
            Cue::WebcamActive => "WebcamActive",
            Cue::Error => "Error",
            Cue::MouseDown => "MouseDown",
            Cue::MouseUp => "MouseUp",
            Cue::Named(name) => name,
        }
    }

    pub fn file_path(&self, sounds_dir: &Path) -> PathBuf {
        sounds_dir.join(format!("{}.mp3", self.name()))
    }
}

/// Something that can play a sound file.
pub trait FeedbackSink: Send {
    fn play(&mut self, cue: &Cue, file: &Path, volume: f32) -> GazemouseResult<()>;

    /// Sink name for logging.
    fn name(&self) -> &str;
}

/// Logs cues instead of playing them.
///
/// Clones share one history, so a caller can keep a handle after boxing
/// the sink into an [`AudioGate`].
#[derive(Debug, Clone, Default)]
pub struct TracingFeedback {
    history: Arc<Mutex<Vec<String>>>,
}

impl TracingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every cue played so far.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }
}

impl FeedbackSink for TracingFeedback {
    fn play(&mut self, cue: &Cue, file: &Path, volume: f32) -> GazemouseResult<()> {
        tracing::info!(cue = cue.name(), file = %file.display(), volume, "Feedback cue");
        if let Ok(mut history) = self.history.lock() {
            history.push(cue.name().to_string());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}

/// Plays cues by spawning `<program> <file>`.
///
/// The volume is passed to the player as `GAZEMOUSE_VOLUME`. Players run
/// detached; finished ones are reaped on the next call.
#[derive(Debug)]
pub struct CommandFeedback {
    program: String,
    children: Vec<Child>,
}

impl CommandFeedback {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            children: Vec::new(),
        }
    }

    fn reap(&mut self) {
        self.children
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }
}

impl FeedbackSink for CommandFeedback {
    fn play(&mut self, cue: &Cue, file: &Path, volume: f32) -> GazemouseResult<()> {
        self.reap();

        if !file.exists() {
            return Err(GazemouseError::FileNotFound {
                path: file.to_path_buf(),
            });
        }

        let child = Command::new(&self.program)
            .arg(file)
            .env("GAZEMOUSE_VOLUME", format!("{volume:.2}"))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                GazemouseError::audio(format!(
                    "Failed to start '{}' for cue {}: {e}",
                    self.program,
                    cue.name()
                ))
            })?;

        tracing::debug!(cue = cue.name(), pid = child.id(), "Player started");
        self.children.push(child);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Mute/volume gate in front of a feedback sink.
pub struct AudioGate {
    sink: Box<dyn FeedbackSink>,
    sounds_dir: PathBuf,
    volume: f32,
    muted: bool,
    played: u64,
    suppressed: u64,
    failed: u64,
}

impl AudioGate {
    pub fn new(sink: Box<dyn FeedbackSink>, config: &AudioConfig) -> Self {
        Self {
            sink,
            sounds_dir: config.sounds_dir.clone(),
            volume: config.volume.clamp(0.0, 1.0),
            muted: config.muted,
            played: 0,
            suppressed: 0,
            failed: 0,
        }
    }

    /// Play a cue unless muted. Returns whether the sink accepted it.
    pub fn play(&mut self, cue: Cue) -> bool {
        if self.muted {
            self.suppressed += 1;
            tracing::debug!(cue = cue.name(), "Cue suppressed while muted");
            return false;
        }

        let file = cue.file_path(&self.sounds_dir);
        match self.sink.play(&cue, &file, self.volume) {
            Ok(()) => {
                self.played += 1;
                true
            }
            Err(e) => {
                self.failed += 1;
                tracing::warn!(
                    cue = cue.name(),
                    sink = self.sink.name(),
                    error = %e,
                    "Audio playback failed"
                );
                false
            }
        }
    }

    pub fn mute(&mut self) {
        self.muted = true;
        tracing::info!("Audio muted");
    }

    pub fn unmute(&mut self) {
        self.muted = false;
        tracing::info!("Audio unmuted");
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            self.volume
        };
    }

    pub fn played(&self) -> u64 {
        self.played
    }

    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }
}

impl std::fmt::Debug for AudioGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioGate")
            .field("sink", &self.sink.name())
            .field("sounds_dir", &self.sounds_dir)
            .field("volume", &self.volume)
            .field("muted", &self.muted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    impl FeedbackSink for FailingSink {
        fn play(&mut self, _cue: &Cue, file: &Path, _volume: f32) -> GazemouseResult<()> {
            Err(GazemouseError::FileNotFound {
                path: file.to_path_buf(),
            })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_cue_file_path() {
        let dir = Path::new("sounds");
        assert_eq!(Cue::MouseDown.file_path(dir), dir.join("MouseDown.mp3"));
        assert_eq!(
            Cue::Named("BrowUp".into()).file_path(dir),
            dir.join("BrowUp.mp3")
        );
    }

    #[test]
    fn test_gate_records_cues() {
        let sink = TracingFeedback::new();
        let mut gate = AudioGate::new(Box::new(sink.clone()), &AudioConfig::default());

        assert!(gate.play(Cue::Loading));
        assert!(gate.play(Cue::Named("JawOpen".into())));
        assert_eq!(sink.history(), vec!["Loading", "JawOpen"]);
        assert_eq!(gate.played(), 2);
    }

    #[test]
    fn test_mute_suppresses_until_unmuted() {
        let sink = TracingFeedback::new();
        let mut gate = AudioGate::new(Box::new(sink.clone()), &AudioConfig::default());

        gate.mute();
        assert!(!gate.play(Cue::Center));
        gate.unmute();
        assert!(gate.play(Cue::Center));

        assert_eq!(sink.history(), vec!["Center"]);
        assert_eq!(gate.suppressed(), 1);
    }

    #[test]
    fn test_muted_config_starts_closed() {
        let config = AudioConfig {
            muted: true,
            ..Default::default()
        };
        let gate = AudioGate::new(Box::new(TracingFeedback::new()), &config);
        assert!(gate.is_muted());
    }

    #[test]
    fn test_playback_failure_is_swallowed() {
        let mut gate = AudioGate::new(Box::new(FailingSink), &AudioConfig::default());
        assert!(!gate.play(Cue::Error));
        assert_eq!(gate.failed(), 1);
    }

    #[test]
    fn test_command_feedback_missing_file() {
        let mut sink = CommandFeedback::new("true");
        let err = sink
            .play(&Cue::Loaded, Path::new("/nonexistent/Loaded.mp3"), 1.0)
            .unwrap_err();
        assert!(matches!(err, GazemouseError::FileNotFound { .. }));
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut gate = AudioGate::new(Box::new(TracingFeedback::new()), &AudioConfig::default());
        gate.set_volume(3.0);
        assert_eq!(gate.volume(), 1.0);
        gate.set_volume(f32::NAN);
        assert_eq!(gate.volume(), 1.0);
    }
}
