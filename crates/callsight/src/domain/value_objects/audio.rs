//! AudioPayload - Raw uploaded audio with its media type

/// Generic media type sent by clients that don't know better
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Raw audio bytes plus declared media type
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AudioPayload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Resolve the media type of an upload.
///
/// Generic `application/octet-stream` uploads are mapped by file extension
/// when the extension is a known audio format.
pub fn normalize_mime_type(content_type: Option<&str>, file_name: &str) -> String {
    let declared = content_type
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(OCTET_STREAM);

    if declared != OCTET_STREAM {
        return declared.to_string();
    }

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        _ => OCTET_STREAM,
    }
    .to_string()
}
