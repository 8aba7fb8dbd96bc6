//! Instruction sources: raw uploaded text and built-in presets.
//!
//! Raw text is split into one step per line, with leading list numbering
//! (`1.`, `2)`, `-`, `*`) stripped and blank lines dropped. Presets are
//! stored in the same numbered-list form and go through the same splitter.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::GuideError;

/// Leading list markers stripped from each line.
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\d+\s*[.)]\s*|[-*]\s+)").expect("valid list marker pattern"));

/// Where a step sequence comes from.
#[derive(Debug, Clone)]
pub enum InstructionSource {
    /// Raw uploaded instruction text, one step per line.
    RawText(String),
    /// A named entry from the built-in preset catalog.
    Preset(String),
}

/// The 10-step crane, the canonical demo sequence.
const BASIC_CRANE: &str = "
    1. Start with a square piece of paper, colored side down.
    2. Fold the paper in half diagonally to form a triangle.
    3. Fold the triangle in half to form a smaller triangle.
    4. Open the paper up to the first triangle.
    5. Fold the corners of the triangle to the center point.
    6. Turn the paper over.
    7. Fold the corners to the center again.
    8. Fold the bottom edges to the center line.
    9. Fold the paper in half backward along the center line.
    10. Pull the wings up and press the body down to form a crane.
";

const PAPER_BOAT: &str = "
    1. Start with a rectangular piece of paper, long edge toward you.
    2. Fold the paper in half top to bottom.
    3. Fold the top corners down to the center line.
    4. Fold the bottom flap up over the corners, then repeat on the back.
    5. Open the bottom and flatten into a square.
    6. Fold the bottom corner of the front layer up to the top, then the back.
    7. Open the bottom and flatten into a square again.
    8. Pull the top corners apart gently to raise the hull.
    9. Flatten the base so the boat stands on its own.
";

const PRESETS: &[(&str, &str)] = &[("basic_crane", BASIC_CRANE), ("paper_boat", PAPER_BOAT)];

/// Look up a preset's instruction text by key.
pub fn preset(key: &str) -> Option<&'static str> {
    PRESETS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, text)| *text)
}

/// Names of all built-in presets.
pub fn preset_names() -> Vec<&'static str> {
    PRESETS.iter().map(|(name, _)| *name).collect()
}

/// Split raw instruction text into steps.
///
/// One step per non-blank line, with leading list markers removed.
pub fn split_steps(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| LIST_MARKER.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Resolve a source into the ordered step texts.
///
/// An unknown preset key and text with no usable lines both report
/// `EmptyInput`; the distinction is logged, not typed.
pub fn resolve(source: &InstructionSource) -> Result<Vec<String>, GuideError> {
    let steps = match source {
        InstructionSource::RawText(text) => split_steps(text),
        InstructionSource::Preset(key) => match preset(key) {
            Some(text) => split_steps(text),
            None => {
                tracing::warn!(preset = %key, "unknown preset requested");
                return Err(GuideError::EmptyInput);
            }
        },
    };

    if steps.is_empty() {
        return Err(GuideError::EmptyInput);
    }
    Ok(steps)
}
