//! Validate a blendshape recording.

use std::path::PathBuf;

use gazemouse_face_model::recording::RecordedLine;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating recording at: {}", path.display());

    let recording = super::load_recording(&path)?;
    let frames: Vec<_> = recording.iter().filter_map(RecordedLine::frame).collect();
    println!("  Frames: {}", frames.len());
    let commands = recording.len() - frames.len();
    if commands > 0 {
        println!("  Commands: {commands}");
    }

    let (Some(first), Some(last)) = (frames.first(), frames.last()) else {
        println!("\nRecording is empty.");
        return Ok(());
    };

    let span_ms = last.timestamp_ms() - first.timestamp_ms();
    println!("  Span: {:.1} ms", span_ms);
    if frames.len() > 1 && span_ms > 0.0 {
        println!(
            "  Average rate: {:.1} fps",
            (frames.len() - 1) as f64 * 1000.0 / span_ms
        );
    }

    let mut issues = Vec::new();
    for (index, pair) in frames.windows(2).enumerate() {
        if pair[1].timestamp_ms() < pair[0].timestamp_ms() {
            issues.push(format!(
                "frame {} goes back in time ({:.2} ms after {:.2} ms)",
                index + 1,
                pair[1].timestamp_ms(),
                pair[0].timestamp_ms()
            ));
        }
    }

    if issues.is_empty() {
        println!("  Timestamps: monotonic");
        println!("\nRecording is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!(
            "\n{} issue(s) found. Real-time replay will not wait on these frames.",
            issues.len()
        );
    }

    Ok(())
}
