use std::path::PathBuf;

use gazemouse_face_model::blendshape::{parse_frames, BlendshapeFrame};
use gazemouse_face_model::geometry::{CursorPosition, ScreenGeometry, WindowSize};
use gazemouse_signal_core::gesture::{Edge, GestureKind};
use gazemouse_signal_core::integrator::PositionIntegrator;
use gazemouse_signal_core::mapper::{MapperConfig, SignalMapper};

fn load_fixture_frames() -> Vec<BlendshapeFrame> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("gaze-session")
        .join("frames.jsonl");

    let content = std::fs::read_to_string(path).expect("fixture frames should be readable");
    parse_frames(&content).expect("fixture frames should parse")
}

fn hd_integrator() -> PositionIntegrator {
    PositionIntegrator::new(ScreenGeometry::new(1920, 1080, 60), WindowSize::CURSOR_PROXY)
}

#[test]
fn fixture_gesture_sequence_with_defaults() {
    let frames = load_fixture_frames();
    assert_eq!(frames.len(), 14);

    let mut mapper = SignalMapper::new(MapperConfig::default());
    let events: Vec<(usize, GestureKind, Edge)> = frames
        .iter()
        .enumerate()
        .flat_map(|(i, frame)| {
            mapper
                .map(frame)
                .transitions
                .into_iter()
                .map(move |t| (i, t.kind, t.edge))
        })
        .collect();

    assert_eq!(
        events,
        vec![
            (6, GestureKind::BrowUp, Edge::Start),
            (8, GestureKind::MouthPucker, Edge::Start),
            (10, GestureKind::MouthPucker, Edge::End),
            (11, GestureKind::JawOpen, Edge::Start),
        ]
    );
}

#[test]
fn fixture_gesture_sequence_with_directional_cues() {
    let frames = load_fixture_frames();
    let mut mapper = SignalMapper::new(MapperConfig {
        directional_cues: true,
        ..Default::default()
    });

    let events: Vec<(usize, GestureKind)> = frames
        .iter()
        .enumerate()
        .flat_map(|(i, frame)| {
            mapper
                .map(frame)
                .transitions
                .into_iter()
                .filter(|t| t.edge == Edge::Start)
                .map(move |t| (i, t.kind))
        })
        .collect();

    assert_eq!(
        events,
        vec![
            (2, GestureKind::Right),
            (5, GestureKind::Up),
            (6, GestureKind::BrowUp),
            (8, GestureKind::MouthPucker),
            (9, GestureKind::Left),
            (11, GestureKind::JawOpen),
            (11, GestureKind::Down),
        ]
    );
}

#[test]
fn fixture_lopsided_up_gaze_moves_but_does_not_gate() {
    let frames = load_fixture_frames();
    let mut mapper = SignalMapper::new(MapperConfig::default());
    let samples: Vec<_> = frames.iter().map(|f| mapper.map(f)).collect();

    assert!((samples[4].flags.up_vector - 0.5).abs() < 1e-9);
    assert!(!samples[4].gates.moving_up);
    assert!(samples[5].gates.moving_up);
}

#[test]
fn fixture_positions_per_frame() {
    let frames = load_fixture_frames();
    let mut mapper = SignalMapper::new(MapperConfig::default());
    let mut integrator = hd_integrator();

    let positions: Vec<CursorPosition> = frames
        .iter()
        .map(|frame| {
            integrator.apply_displacement(&mapper.map(frame).flags);
            integrator.commit_tick()
        })
        .collect();

    assert_eq!(positions[0], CursorPosition::new(960, 540));
    assert_eq!(positions[3], CursorPosition::new(1680, 540));
    assert_eq!(positions[5], CursorPosition::new(960, 135));
    assert_eq!(positions[12], CursorPosition::new(960, 810));
    assert_eq!(positions[13], CursorPosition::new(960, 540));
}

#[test]
fn commit_cadence_is_independent_of_frame_rate() {
    let frames = load_fixture_frames();
    let mut mapper = SignalMapper::new(MapperConfig::default());
    let mut integrator = hd_integrator();

    // Expected committed position after each frame, computed frame by frame.
    let mut reference_mapper = SignalMapper::new(MapperConfig::default());
    let mut reference = hd_integrator();
    let expected: Vec<CursorPosition> = frames
        .iter()
        .map(|frame| {
            reference.apply_displacement(&reference_mapper.map(frame).flags);
            reference.commit_tick()
        })
        .collect();

    let tick_ms = 16.0;
    let end_ms = frames.last().unwrap().timestamp_ms() + 50.0;
    let mut next_frame = 0;
    let mut ticks = 0;
    let mut now = 0.0;

    while now <= end_ms {
        while next_frame < frames.len() && frames[next_frame].timestamp_ms() <= now {
            integrator.apply_displacement(&mapper.map(&frames[next_frame]).flags);
            next_frame += 1;
        }

        let committed = integrator.commit_tick();
        if next_frame == 0 {
            assert_eq!(committed, CursorPosition::new(944, 524));
        } else {
            assert_eq!(committed, expected[next_frame - 1], "tick at {now}ms");
        }

        ticks += 1;
        now += tick_ms;
    }

    assert_eq!(next_frame, frames.len());
    assert!(ticks > frames.len());
}
