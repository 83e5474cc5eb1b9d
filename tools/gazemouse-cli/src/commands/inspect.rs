//! Show the mapper's view of each frame.

use std::path::PathBuf;

use gazemouse_common::config::AppConfig;
use gazemouse_face_model::event::ChannelMessage;
use gazemouse_face_model::geometry::{ScreenGeometry, WindowSize};
use gazemouse_face_model::recording::RecordedLine;
use gazemouse_signal_core::integrator::PositionIntegrator;
use gazemouse_signal_core::mapper::{DirectionalGates, SignalMapper};

pub fn run(
    mut config: AppConfig,
    path: PathBuf,
    limit: Option<usize>,
    directional: bool,
) -> anyhow::Result<()> {
    if directional {
        config.cues.directional = true;
    }

    let recording = super::load_recording(&path)?;
    let frame_count = recording.iter().filter_map(RecordedLine::frame).count();
    let mut mapper = SignalMapper::from_app_config(&config);
    let mut integrator = PositionIntegrator::new(
        ScreenGeometry::new(
            config.display.width,
            config.display.height,
            config.display.refresh_hz,
        ),
        WindowSize::new(config.overlay.width, config.overlay.height),
    );

    println!(
        "{:>5} {:>10}  {:>5} {:>5} {:>5} {:>5}  {:<5} {:>12}  events",
        "#", "t (ms)", "up", "down", "left", "right", "gates", "position"
    );

    let shown = limit.unwrap_or(frame_count).min(frame_count);
    let mut total_events = 0;
    let mut index = 0;
    for line in &recording {
        if index == shown {
            break;
        }
        let frame = match line {
            RecordedLine::Frame(frame) => frame,
            RecordedLine::Command(command) => {
                if matches!(command, ChannelMessage::Center) {
                    integrator.recenter();
                }
                println!("{:>5} {:>10}  {}", "-", "-", command.name());
                continue;
            }
        };
        let sample = mapper.map(frame);
        integrator.apply_displacement(&sample.flags);
        let position = integrator.commit_tick();

        let events: Vec<String> = sample
            .transitions
            .iter()
            .map(|t| format!("{:?}:{:?}", t.kind, t.edge))
            .collect();
        total_events += events.len();

        println!(
            "{:>5} {:>10.2}  {:>5.2} {:>5.2} {:>5.2} {:>5.2}  {:<5} {:>12}  {}",
            index,
            frame.timestamp_ms(),
            sample.flags.up_vector,
            sample.flags.down_vector,
            sample.flags.left_vector,
            sample.flags.right_vector,
            gate_marks(&sample.gates),
            format!("({}, {})", position.x, position.y),
            events.join(" ")
        );
        index += 1;
    }

    println!();
    println!(
        "{shown} of {frame_count} frame(s) shown, {total_events} gesture event(s)"
    );
    Ok(())
}

/// `U D L R` for each open gate, `.` otherwise.
fn gate_marks(gates: &DirectionalGates) -> String {
    [
        (gates.moving_up, 'U'),
        (gates.moving_down, 'D'),
        (gates.moving_left, 'L'),
        (gates.moving_right, 'R'),
    ]
    .iter()
    .map(|(open, mark)| if *open { *mark } else { '.' })
    .collect()
}
