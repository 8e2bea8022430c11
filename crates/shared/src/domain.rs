use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque per-submission identifier namespacing server-side output artifacts.
///
/// Always 32 alphanumeric characters with the first character in `A..=Y`.
/// Minted fresh on every input selection; there is no registry of issued
/// ids, uniqueness is statistical only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical representation of a selected input image: a data URL built from
/// a local file, or a remote URL string passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource(pub String);

impl ImageSource {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSlot {
    Content,
    Style,
}

/// Submission mode tag carried on the wire. Each mode fixes the shape of the
/// outbound payload and the number of output display slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitMode {
    Batch,
    Single,
    Slow,
}

impl SubmitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitMode::Batch => "batch",
            SubmitMode::Single => "single",
            SubmitMode::Slow => "slow",
        }
    }

    /// Number of (display, link) output pairs rewritten on completion.
    pub fn output_count(&self) -> usize {
        match self {
            SubmitMode::Batch => 55,
            SubmitMode::Single | SubmitMode::Slow => 1,
        }
    }

    /// Slow mode is the style-transfer variant and needs a second image.
    pub fn requires_style(&self) -> bool {
        matches!(self, SubmitMode::Slow)
    }

    /// Single mode sends per-style slider weights and a master weight.
    pub fn carries_style_weights(&self) -> bool {
        matches!(self, SubmitMode::Single)
    }

    /// Batch and single mode fire a submission as soon as a content image
    /// is selected; slow mode waits for an explicit submit.
    pub fn auto_submit_on_content(&self) -> bool {
        matches!(self, SubmitMode::Batch | SubmitMode::Single)
    }
}

impl fmt::Display for SubmitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One output display slot: the rendered image target and its companion
/// hyperlink target. Both carry the same cache-busted artifact URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputBinding {
    pub image_url: String,
    pub link_url: String,
}
