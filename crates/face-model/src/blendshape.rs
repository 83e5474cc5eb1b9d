//! Blendshape frames produced by the face-landmark detector.
//!
//! The detector emits 52 `(categoryName, score)` pairs per video frame.
//! They are validated once here, at the collaborator boundary, and stored
//! as a named record so downstream code never indexes into a raw list.

use serde::{Deserialize, Serialize};

/// Number of blendshape categories emitted per frame.
pub const BLENDSHAPE_COUNT: usize = 52;

macro_rules! blendshape_categories {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// A named facial-expression category, in detector output order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum BlendshapeCategory {
            $($variant),+
        }

        impl BlendshapeCategory {
            /// All categories in detector output order.
            pub const ALL: [BlendshapeCategory; BLENDSHAPE_COUNT] = [
                $(BlendshapeCategory::$variant),+
            ];

            /// Category name as emitted by the detector.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(BlendshapeCategory::$variant => $name),+
                }
            }

            /// Look up a category by detector name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(BlendshapeCategory::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

blendshape_categories! {
    Neutral => "_neutral",
    BrowDownLeft => "browDownLeft",
    BrowDownRight => "browDownRight",
    BrowInnerUp => "browInnerUp",
    BrowOuterUpLeft => "browOuterUpLeft",
    BrowOuterUpRight => "browOuterUpRight",
    CheekPuff => "cheekPuff",
    CheekSquintLeft => "cheekSquintLeft",
    CheekSquintRight => "cheekSquintRight",
    EyeBlinkLeft => "eyeBlinkLeft",
    EyeBlinkRight => "eyeBlinkRight",
    EyeLookDownLeft => "eyeLookDownLeft",
    EyeLookDownRight => "eyeLookDownRight",
    EyeLookInLeft => "eyeLookInLeft",
    EyeLookInRight => "eyeLookInRight",
    EyeLookOutLeft => "eyeLookOutLeft",
    EyeLookOutRight => "eyeLookOutRight",
    EyeLookUpLeft => "eyeLookUpLeft",
    EyeLookUpRight => "eyeLookUpRight",
    EyeSquintLeft => "eyeSquintLeft",
    EyeSquintRight => "eyeSquintRight",
    EyeWideLeft => "eyeWideLeft",
    EyeWideRight => "eyeWideRight",
    JawForward => "jawForward",
    JawLeft => "jawLeft",
    JawOpen => "jawOpen",
    JawRight => "jawRight",
    MouthClose => "mouthClose",
    MouthDimpleLeft => "mouthDimpleLeft",
    MouthDimpleRight => "mouthDimpleRight",
    MouthFrownLeft => "mouthFrownLeft",
    MouthFrownRight => "mouthFrownRight",
    MouthFunnel => "mouthFunnel",
    MouthLeft => "mouthLeft",
    MouthLowerDownLeft => "mouthLowerDownLeft",
    MouthLowerDownRight => "mouthLowerDownRight",
    MouthPressLeft => "mouthPressLeft",
    MouthPressRight => "mouthPressRight",
    MouthPucker => "mouthPucker",
    MouthRight => "mouthRight",
    MouthRollLower => "mouthRollLower",
    MouthRollUpper => "mouthRollUpper",
    MouthShrugLower => "mouthShrugLower",
    MouthShrugUpper => "mouthShrugUpper",
    MouthSmileLeft => "mouthSmileLeft",
    MouthSmileRight => "mouthSmileRight",
    MouthStretchLeft => "mouthStretchLeft",
    MouthStretchRight => "mouthStretchRight",
    MouthUpperUpLeft => "mouthUpperUpLeft",
    MouthUpperUpRight => "mouthUpperUpRight",
    NoseSneerLeft => "noseSneerLeft",
    NoseSneerRight => "noseSneerRight",
}

impl BlendshapeCategory {
    /// Position in the detector's output list.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for BlendshapeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while validating detector output.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("unknown blendshape category '{0}'")]
    UnknownCategory(String),

    #[error("blendshape category '{0}' appears more than once")]
    DuplicateCategory(BlendshapeCategory),

    #[error("blendshape category '{0}' is missing")]
    MissingCategory(BlendshapeCategory),

    #[error("blendshape category '{category}' has non-finite score {score}")]
    NonFiniteScore {
        category: BlendshapeCategory,
        score: f32,
    },
}

/// One detection cycle's worth of blendshape scores.
///
/// Every category is present and every score lies in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFrame", into = "RawFrame")]
pub struct BlendshapeFrame {
    /// Detector timestamp in milliseconds.
    timestamp_ms: f64,
    scores: [f32; BLENDSHAPE_COUNT],
}

impl BlendshapeFrame {
    /// A frame with every score at zero.
    pub fn neutral(timestamp_ms: f64) -> Self {
        Self {
            timestamp_ms,
            scores: [0.0; BLENDSHAPE_COUNT],
        }
    }

    /// Build a frame from detector `(name, score)` pairs.
    ///
    /// Pairs may arrive in any order, but every one of the 52 categories
    /// must appear exactly once. Finite scores are clamped into `[0, 1]`.
    pub fn from_categories<'a, I>(timestamp_ms: f64, categories: I) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let mut scores = [0.0f32; BLENDSHAPE_COUNT];
        let mut seen = [false; BLENDSHAPE_COUNT];

        for (name, score) in categories {
            let category = BlendshapeCategory::from_name(name)
                .ok_or_else(|| FrameError::UnknownCategory(name.to_string()))?;
            if seen[category.index()] {
                return Err(FrameError::DuplicateCategory(category));
            }
            if !score.is_finite() {
                return Err(FrameError::NonFiniteScore { category, score });
            }
            seen[category.index()] = true;
            scores[category.index()] = score.clamp(0.0, 1.0);
        }

        if let Some(missing) = BlendshapeCategory::ALL
            .iter()
            .find(|category| !seen[category.index()])
        {
            return Err(FrameError::MissingCategory(*missing));
        }

        Ok(Self {
            timestamp_ms,
            scores,
        })
    }

    /// Return a copy with one score replaced (clamped into `[0, 1]`).
    pub fn with_score(mut self, category: BlendshapeCategory, score: f32) -> Self {
        self.scores[category.index()] = if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    /// Score of a single category.
    pub fn score(&self, category: BlendshapeCategory) -> f32 {
        self.scores[category.index()]
    }

    /// Detector timestamp in milliseconds.
    pub fn timestamp_ms(&self) -> f64 {
        self.timestamp_ms
    }

    /// Iterate `(category, score)` in detector order.
    pub fn iter(&self) -> impl Iterator<Item = (BlendshapeCategory, f32)> + '_ {
        BlendshapeCategory::ALL
            .iter()
            .map(move |category| (*category, self.scores[category.index()]))
    }
}

/// Wire form of a frame, matching the detector's output shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawFrame {
    #[serde(rename = "t", default)]
    timestamp_ms: f64,
    categories: Vec<RawCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawCategory {
    #[serde(rename = "categoryName")]
    category_name: String,
    score: f32,
}

impl TryFrom<RawFrame> for BlendshapeFrame {
    type Error = FrameError;

    fn try_from(raw: RawFrame) -> Result<Self, Self::Error> {
        BlendshapeFrame::from_categories(
            raw.timestamp_ms,
            raw.categories
                .iter()
                .map(|c| (c.category_name.as_str(), c.score)),
        )
    }
}

impl From<BlendshapeFrame> for RawFrame {
    fn from(frame: BlendshapeFrame) -> Self {
        Self {
            timestamp_ms: frame.timestamp_ms,
            categories: frame
                .iter()
                .map(|(category, score)| RawCategory {
                    category_name: category.as_str().to_string(),
                    score,
                })
                .collect(),
        }
    }
}

/// Parse frames from JSONL content (one frame per line).
///
/// Blank lines and `#` comments are skipped. Errors carry the 1-based
/// line number.
pub fn parse_frames(jsonl: &str) -> Result<Vec<BlendshapeFrame>, (usize, serde_json::Error)> {
    jsonl
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| serde_json::from_str(line).map_err(|e| (number, e)))
        .collect()
}

/// Serialize frames to JSONL format.
pub fn serialize_frames(frames: &[BlendshapeFrame]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for frame in frames {
        output.push_str(&serde_json::to_string(frame)?);
        output.push('\n');
    }
    Ok(output)
}
