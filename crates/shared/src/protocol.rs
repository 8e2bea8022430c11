use serde::{Deserialize, Serialize};

use crate::domain::{SessionId, SubmitMode};

/// Default location the backend writes rendered artifacts to, relative to
/// the server root. The uploaded inputs land next to it under
/// `static/images/line/<id>.png` and `static/images/ref/<id>.png`.
pub const DEFAULT_OUTPUT_BASE: &str = "/static/images/out";

/// Path of the processing endpoint on the backend.
pub const SUBMIT_PATH: &str = "/post";

/// One fully assembled colorization job, ready to be encoded as a multipart
/// form. Field presence follows the mode: `style` only in slow mode,
/// `style_weights`/`style_master_weight` only in single mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPayload {
    pub line: String,
    pub style: Option<String>,
    pub blur: u32,
    pub id: SessionId,
    pub mode: SubmitMode,
    pub style_weights: Option<Vec<f64>>,
    pub style_master_weight: Option<f64>,
}

impl JobPayload {
    /// Ordered multipart (name, value) pairs exactly as the backend parses
    /// them. Style weights are comma-joined into a single field.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("line", self.line.clone())];
        if let Some(style) = &self.style {
            fields.push(("style", style.clone()));
        }
        fields.push(("blur", self.blur.to_string()));
        fields.push(("id", self.id.0.clone()));
        fields.push(("mode", self.mode.as_str().to_string()));
        if let Some(weights) = &self.style_weights {
            let joined = weights
                .iter()
                .map(|w| w.to_string())
                .collect::<Vec<_>>()
                .join(",");
            fields.push(("style_weights", joined));
        }
        if let Some(master) = self.style_master_weight {
            fields.push(("style_master_weight", master.to_string()));
        }
        fields
    }
}

/// Location convention for rendered artifacts, index 0-based. The trailing
/// query string defeats browser caching between submissions.
pub fn output_artifact_url(
    base: &str,
    id: &SessionId,
    index: usize,
    cache_bust: i64,
) -> String {
    format!("{}/{}_{}.jpg?{}", base.trim_end_matches('/'), id, index, cache_bust)
}
