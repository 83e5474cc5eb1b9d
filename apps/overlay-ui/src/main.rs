use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use eframe::egui::{self, Color32};
use gazemouse_common::config::AppConfig;
use gazemouse_control_engine::{
    event_channel, AudioGate, CommandFeedback, ControlSession, DetectorLoop, FeedbackSink, Pacing,
    ReplaySource, SessionConfig, TracingFeedback,
};
use gazemouse_face_model::geometry::CursorPosition;
use gazemouse_signal_core::mapper::SignalMapper;

mod proxy;

use proxy::{mark_finished, take_update, EguiOverlay, SharedSlot};

/// Cursor proxy window for a replayed blendshape recording.
#[derive(Parser)]
#[command(name = "gazemouse-overlay", version)]
struct Args {
    /// Path to a JSONL frame recording
    frames: PathBuf,

    /// Replay as fast as possible instead of at recorded timestamps
    #[arg(long)]
    unpaced: bool,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (config, load_error) = match &args.config {
        Some(path) => (
            AppConfig::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None,
        ),
        None => AppConfig::load(),
    };
    gazemouse_common::logging::init_logging(&config.logging);
    if let Some(e) = load_error {
        tracing::warn!(
            "Ignoring config at {:?}, using defaults: {}",
            gazemouse_common::config::config_file_path(),
            e
        );
    }

    let pacing = if args.unpaced {
        Pacing::Unpaced
    } else {
        Pacing::Realtime
    };
    let source = ReplaySource::open(&args.frames, pacing)
        .with_context(|| format!("Failed to open recording {}", args.frames.display()))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;

    let session_config = SessionConfig::from_app_config(&config);
    let (start_x, start_y) = centered(&session_config);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Gazemouse")
            .with_always_on_top()
            .with_decorations(false)
            .with_transparent(true)
            .with_mouse_passthrough(true)
            .with_resizable(false)
            .with_taskbar(false)
            .with_position([start_x, start_y])
            .with_inner_size([
                session_config.window.width as f32,
                session_config.window.height as f32,
            ]),
        ..Default::default()
    };

    eframe::run_native(
        "Gazemouse",
        options,
        Box::new(move |cc| {
            let mut app = CursorProxyApp::new(runtime);
            app.start(cc.egui_ctx.clone(), config, session_config, source);
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow::anyhow!("overlay launch failed: {e}"))
}

fn centered(config: &SessionConfig) -> (f32, f32) {
    let x = config.screen.width.saturating_sub(config.window.width) / 2;
    let y = config.screen.height.saturating_sub(config.window.height) / 2;
    (x as f32, y as f32)
}

struct CursorProxyApp {
    runtime: tokio::runtime::Runtime,
    slot: SharedSlot,
    applied: Option<CursorPosition>,
    stop_flags: Vec<Arc<AtomicBool>>,
}

impl CursorProxyApp {
    fn new(runtime: tokio::runtime::Runtime) -> Self {
        Self {
            runtime,
            slot: SharedSlot::default(),
            applied: None,
            stop_flags: Vec::new(),
        }
    }

    /// Spawn the detector and control loops on the runtime.
    fn start(
        &mut self,
        ctx: egui::Context,
        config: AppConfig,
        session_config: SessionConfig,
        source: ReplaySource,
    ) {
        let (sender, receiver) = event_channel();
        let mut detector = DetectorLoop::new(source, SignalMapper::from_app_config(&config), sender);

        let sink: Box<dyn FeedbackSink> = match &config.audio.player_command {
            Some(program) => Box::new(CommandFeedback::new(program.clone())),
            None => Box::new(TracingFeedback::new()),
        };
        let audio = AudioGate::new(sink, &config.audio);
        let overlay = EguiOverlay::new(self.slot.clone(), Some(ctx.clone()));
        let mut session = ControlSession::new(session_config, overlay, audio);

        self.stop_flags = vec![detector.stop_flag(), session.stop_flag()];

        self.runtime.spawn(async move {
            if let Err(e) = detector.run().await {
                tracing::error!(error = %e, "Detector loop failed");
            }
        });

        let slot = self.slot.clone();
        self.runtime.spawn(async move {
            match session.run(receiver).await {
                Ok(stats) => tracing::info!(
                    samples = stats.samples,
                    commits = stats.commits,
                    "Replay finished"
                ),
                Err(e) => tracing::error!(error = %e, "Control session failed"),
            }
            mark_finished(&slot);
            ctx.request_repaint();
        });
    }

    fn stop(&self) {
        for flag in &self.stop_flags {
            flag.store(true, Ordering::SeqCst);
        }
    }
}

impl eframe::App for CursorProxyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            self.stop();
        }

        let update = take_update(&self.slot, self.applied);
        if let Some(position) = update.position {
            ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(egui::pos2(
                position.x as f32,
                position.y as f32,
            )));
            self.applied = Some(position);
        }
        if update.raise {
            ctx.send_viewport_cmd(egui::ViewportCommand::WindowLevel(
                egui::WindowLevel::AlwaysOnTop,
            ));
        }
        if update.finished {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let radius = rect.width().min(rect.height()) / 2.0 - 2.0;
                ui.painter().circle(
                    rect.center(),
                    radius.max(1.0),
                    Color32::from_rgba_unmultiplied(255, 80, 80, 160),
                    egui::Stroke::new(2.0, Color32::WHITE),
                );
            });
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0, 0.0, 0.0, 0.0]
    }
}

impl Drop for CursorProxyApp {
    fn drop(&mut self) {
        self.stop();
    }
}
