//! Check configuration, commit cadence and audio setup.

use gazemouse_common::clock::{CommitCadence, SessionClock};
use gazemouse_common::config::AppConfig;
use gazemouse_control_engine::Cue;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Gazemouse System Check");
    println!("{}", "=".repeat(50));

    let mut all_ok = true;

    match config.validate() {
        Ok(()) => println!("[OK] Configuration is valid"),
        Err(e) => {
            all_ok = false;
            println!("[FAIL] Configuration: {e}");
        }
    }

    println!(
        "[OK] Display: {}x{} @ {}Hz, overlay {}x{}",
        config.display.width,
        config.display.height,
        config.display.refresh_hz,
        config.overlay.width,
        config.overlay.height
    );

    let mut cadence = CommitCadence::from_refresh_hz(config.display.refresh_hz);
    let commits_per_second = (0..1000u64)
        .filter(|ms| cadence.should_tick(SessionClock::ms_to_ns(*ms as f64)))
        .count();
    println!(
        "[OK] Commit cadence: every {} ms ({commits_per_second} commits/s)",
        cadence.interval().as_millis()
    );

    let t = &config.thresholds;
    println!(
        "     Thresholds: up {} down {} left {} right {} brow {} jaw {} mouth {}",
        t.up, t.down, t.left, t.right, t.brow, t.jaw, t.mouth
    );

    println!();
    let sounds_dir = &config.audio.sounds_dir;
    let cues = [
        Cue::Loading,
        Cue::Loaded,
        Cue::WebcamActive,
        Cue::Center,
        Cue::Error,
        Cue::MouseDown,
        Cue::MouseUp,
        Cue::Named("BrowUp".to_string()),
        Cue::Named("JawOpen".to_string()),
    ];
    let missing: Vec<&str> = cues
        .iter()
        .filter(|cue| !cue.file_path(sounds_dir).exists())
        .map(|cue| cue.name())
        .collect();

    if missing.is_empty() {
        println!("[OK] Sounds: all cues present in {}", sounds_dir.display());
    } else {
        println!(
            "[WARN] Sounds: {} of {} cue(s) missing in {}: {}",
            missing.len(),
            cues.len(),
            sounds_dir.display(),
            missing.join(", ")
        );
    }

    match &config.audio.player_command {
        Some(program) => println!("[OK] Player command: {program}"),
        None => println!("[WARN] Player command: not set, cues will only be logged"),
    }
    if config.audio.muted {
        println!("[WARN] Audio starts muted");
    }

    println!();
    if all_ok {
        println!("Configuration is usable. Gazemouse is ready.");
    } else {
        println!("Some checks failed. See above for fixes.");
    }

    Ok(())
}
