//! JSONL recordings of detector output.
//!
//! Each line is either a blendshape frame or a user command such as
//! `{"event":"center"}`. Commands apply at their position in the stream,
//! before the frame that follows them.

use serde_json::Value;

use crate::blendshape::BlendshapeFrame;
use crate::event::ChannelMessage;

/// One entry of a recording.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedLine {
    Frame(BlendshapeFrame),
    Command(ChannelMessage),
}

impl RecordedLine {
    pub fn frame(&self) -> Option<&BlendshapeFrame> {
        match self {
            Self::Frame(frame) => Some(frame),
            Self::Command(_) => None,
        }
    }
}

/// A recording line that could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum RecordingError {
    #[error("line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: '{event}' is not a user command (expected center, mute or unmute)")]
    NotACommand { line: usize, event: &'static str },
}

impl RecordingError {
    pub fn line(&self) -> usize {
        match self {
            Self::Json { line, .. } | Self::NotACommand { line, .. } => *line,
        }
    }
}

/// Parse a recording. Blank lines and `#` comments are skipped.
pub fn parse_recording(jsonl: &str) -> Result<Vec<RecordedLine>, RecordingError> {
    jsonl
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| parse_line(number, line))
        .collect()
}

fn parse_line(line: usize, text: &str) -> Result<RecordedLine, RecordingError> {
    let json = |source| RecordingError::Json { line, source };
    let value: Value = serde_json::from_str(text).map_err(json)?;

    if value.get("event").is_none() {
        return serde_json::from_value(value)
            .map(RecordedLine::Frame)
            .map_err(json);
    }

    let message: ChannelMessage = serde_json::from_value(value).map_err(json)?;
    if !message.is_command() {
        return Err(RecordingError::NotACommand {
            line,
            event: message.name(),
        });
    }
    Ok(RecordedLine::Command(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blendshape::serialize_frames;

    #[test]
    fn test_commands_interleave_with_frames() {
        let frames = serialize_frames(&[
            BlendshapeFrame::neutral(0.0),
            BlendshapeFrame::neutral(33.0),
        ])
        .unwrap();
        let mut lines = frames.lines();
        let content = format!(
            "# session\n{}\n{{\"event\":\"mute\"}}\n\n{{\"event\":\"center\"}}\n{}\n",
            lines.next().unwrap(),
            lines.next().unwrap()
        );

        let parsed = parse_recording(&content).unwrap();
        assert_eq!(parsed.len(), 4);
        assert_eq!(parsed[0].frame().map(|f| f.timestamp_ms()), Some(0.0));
        assert_eq!(parsed[1], RecordedLine::Command(ChannelMessage::Mute));
        assert_eq!(parsed[2], RecordedLine::Command(ChannelMessage::Center));
        assert_eq!(parsed[3].frame().map(|f| f.timestamp_ms()), Some(33.0));
    }

    #[test]
    fn test_detector_events_are_rejected() {
        let err = parse_recording("{\"event\":\"unmute\"}\n{\"event\":\"loaded\"}\n").unwrap_err();
        assert!(matches!(
            err,
            RecordingError::NotACommand {
                line: 2,
                event: "loaded"
            }
        ));
    }

    #[test]
    fn test_bad_line_is_numbered() {
        let err = parse_recording("\n{\"t\": 1, \"categories\": []}\n").unwrap_err();
        assert_eq!(err.line(), 2);
        assert!(err.to_string().starts_with("line 2:"));
    }
}
