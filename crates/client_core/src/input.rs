use base64::{engine::general_purpose::STANDARD, Engine as _};

/// A file handed over by the picker widget: MIME type plus raw content.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Builds the canonical data-URL representation of an uploaded image.
///
/// Returns `None` for any file whose MIME type does not begin with `image`.
/// Such files are dropped without feedback, mirroring a picker whose
/// selection callback simply never fires.
pub fn data_url_for(upload: &FileUpload) -> Option<String> {
    if !upload.mime_type.starts_with("image") {
        return None;
    }
    Some(format!(
        "data:{};base64,{}",
        upload.mime_type,
        STANDARD.encode(&upload.bytes)
    ))
}

/// Best-effort MIME type from a file extension, for callers loading from
/// disk rather than through a browser picker.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
