pub mod check;
pub mod config;
pub mod inspect;
pub mod run;
pub mod validate;

use std::path::Path;

use anyhow::Context;
use gazemouse_face_model::recording::{parse_recording, RecordedLine};

/// Read and parse a JSONL recording of frames and user commands.
pub(crate) fn load_recording(path: &Path) -> anyhow::Result<Vec<RecordedLine>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_recording(&content).map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))
}
