//! Replay a recording through the detector and control loops.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use anyhow::Context;
use gazemouse_common::config::AppConfig;
use gazemouse_control_engine::{
    event_channel, AudioGate, CommandFeedback, ControlSession, DetectorLoop, DetectorStats,
    FeedbackSink, HeadlessOverlay, Pacing, ReplaySource, SessionConfig, SessionStats,
    TracingFeedback,
};
use gazemouse_face_model::geometry::CursorPosition;
use gazemouse_signal_core::mapper::SignalMapper;
use serde::Serialize;

#[derive(Serialize)]
struct RunReport<'a> {
    detector: Option<DetectorStats>,
    session: &'a SessionStats,
    overlay_moves: &'a [CursorPosition],
    cues: Vec<String>,
}

pub async fn run(
    mut config: AppConfig,
    frames: PathBuf,
    realtime: bool,
    directional: bool,
    json: bool,
) -> anyhow::Result<()> {
    if directional {
        config.cues.directional = true;
    }

    let pacing = if realtime {
        Pacing::Realtime
    } else {
        Pacing::Unpaced
    };
    let source = ReplaySource::open(&frames, pacing)
        .with_context(|| format!("Failed to open recording {}", frames.display()))?;

    if !json {
        println!("Replaying: {}", frames.display());
        println!(
            "  Frames: {} ({:.2}s recorded)",
            source.remaining(),
            source.duration().as_secs_f64()
        );
        println!(
            "  Display: {}x{} @ {}Hz",
            config.display.width, config.display.height, config.display.refresh_hz
        );
        println!("  Pacing: {pacing:?}");
        println!("  Directional cues: {}", config.cues.directional);
        println!();
    }

    let (sender, receiver) = event_channel();
    let mut detector = DetectorLoop::new(source, SignalMapper::from_app_config(&config), sender);
    let detector_stop = detector.stop_flag();

    let cue_log = TracingFeedback::new();
    let sink: Box<dyn FeedbackSink> = match &config.audio.player_command {
        Some(program) => Box::new(CommandFeedback::new(program.clone())),
        None => Box::new(cue_log.clone()),
    };
    let audio = AudioGate::new(sink, &config.audio);
    let mut session = ControlSession::new(
        SessionConfig::from_app_config(&config),
        HeadlessOverlay::new(),
        audio,
    );
    let session_stop = session.stop_flag();

    let detector_task = tokio::spawn(async move { detector.run().await });
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping");
            detector_stop.store(true, Ordering::SeqCst);
            session_stop.store(true, Ordering::SeqCst);
        }
    });

    let stats = session.run(receiver).await?;
    interrupt.abort();
    let detector_result = detector_task.await.context("Detector task failed")?;

    let report = RunReport {
        detector: detector_result.as_ref().ok().copied(),
        session: &stats,
        overlay_moves: session.overlay().moves(),
        cues: cue_log.history(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    detector_result
        .map(|_| ())
        .context("Detector loop stopped with an error")
}

fn print_summary(report: &RunReport<'_>) {
    println!("Session summary:");
    if let Some(detector) = report.detector {
        println!("  Frames mapped: {}", detector.frames);
        println!("  Gesture transitions: {}", detector.transitions);
    }
    println!("  Samples applied: {}", report.session.samples);
    println!("  Recenters: {}", report.session.recenters);
    println!("  Commits: {}", report.session.commits);
    println!("  Overlay moves: {}", report.overlay_moves.len());
    if report.session.overlay_errors > 0 {
        println!("  Overlay errors: {}", report.session.overlay_errors);
    }
    match report.session.last_position {
        Some(position) => println!("  Final position: ({}, {})", position.x, position.y),
        None => println!("  Final position: none"),
    }
    println!("  Duration: {:.2}s", report.session.elapsed_secs);
    println!(
        "  Cues: {} played, {} suppressed",
        report.session.cues_played, report.session.cues_suppressed
    );
    if !report.cues.is_empty() {
        println!("    {}", report.cues.join(", "));
    }
}
