//! Local preview generation: staged file payloads and their data-URI previews.
//!
//! Nothing here touches the network. A preview that cannot be produced is
//! simply absent; it never blocks staging or submission.

use std::{fmt, path::Path};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::SessionError;

const FALLBACK_FILE_NAME: &str = "image";
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// The user's selected image payload. Replaced wholesale on re-selection.
#[derive(Clone, PartialEq, Eq)]
pub struct StagedFile {
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl StagedFile {
    /// MIME type is guessed from the file name; the bytes are not sniffed.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = mime_guess::from_path(&name)
            .first_raw()
            .unwrap_or(FALLBACK_MIME_TYPE)
            .to_string();
        Self {
            name,
            mime_type,
            bytes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn into_parts(self) -> (String, String, Vec<u8>) {
        (self.name, self.mime_type, self.bytes)
    }
}

impl fmt::Debug for StagedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Reads `path` into a [`StagedFile`].
pub async fn load_staged_file(path: &Path) -> Result<StagedFile, SessionError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| SessionError::UnreadableFile {
            path: path.to_path_buf(),
            source,
        })?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(FALLBACK_FILE_NAME)
        .to_string();
    debug!(file = %name, bytes = bytes.len(), "read staged file");
    Ok(StagedFile::from_bytes(name, bytes))
}

/// Renderable `data:<mime>;base64,<payload>` form of a staged file.
#[derive(Clone, PartialEq, Eq)]
pub struct Preview {
    data_uri: String,
}

impl Preview {
    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    pub fn mime_type(&self) -> &str {
        self.data_uri
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .map(|(mime, _)| mime)
            .unwrap_or(FALLBACK_MIME_TYPE)
    }

    pub fn decode_payload(&self) -> Option<Vec<u8>> {
        let (_, payload) = self.data_uri.split_once(";base64,")?;
        STANDARD.decode(payload).ok()
    }
}

impl fmt::Debug for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preview")
            .field("mime_type", &self.mime_type())
            .field("len", &self.data_uri.len())
            .finish()
    }
}

/// An empty file still yields a (payload-less) data URI.
pub fn generate_preview(file: &StagedFile) -> Preview {
    let data_uri = format!(
        "data:{};base64,{}",
        file.mime_type,
        STANDARD.encode(&file.bytes)
    );
    Preview { data_uri }
}

/// One-shot asynchronous preview: the receiver resolves exactly once.
pub fn spawn_preview(file: StagedFile) -> oneshot::Receiver<Option<Preview>> {
    let (tx, rx) = oneshot::channel();
    tokio::task::spawn_blocking(move || {
        let _ = tx.send(Some(generate_preview(&file)));
    });
    rx
}

/// Awaits a spawned preview, folding a dropped sender into "no preview".
pub async fn await_preview(rx: oneshot::Receiver<Option<Preview>>) -> Option<Preview> {
    match rx.await {
        Ok(preview) => preview,
        Err(_) => {
            warn!("preview task ended without a result");
            None
        }
    }
}

pub fn human_readable_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes < KB {
        return format!("{bytes} B");
    }
    if bytes < MB {
        return format_scaled_unit(bytes, KB, "KB");
    }
    if bytes < GB {
        return format_scaled_unit(bytes, MB, "MB");
    }
    format_scaled_unit(bytes, GB, "GB")
}

fn format_scaled_unit(bytes: u64, unit_size: u64, unit_label: &str) -> String {
    let value = bytes as f64 / unit_size as f64;
    let value_text = format!("{value:.1}");
    let compact_value = value_text.strip_suffix(".0").unwrap_or(&value_text);
    format!("{compact_value} {unit_label}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_mime_type_from_name() {
        assert_eq!(StagedFile::from_bytes("xray.jpg", vec![1]).mime_type(), "image/jpeg");
        assert_eq!(StagedFile::from_bytes("scan.PNG", vec![1]).mime_type(), "image/png");
        let unknown = StagedFile::from_bytes("scan", vec![1]);
        assert_eq!(unknown.mime_type(), "application/octet-stream");
        assert!(!unknown.is_image());
    }

    #[test]
    fn preview_is_a_base64_data_uri() {
        let file = StagedFile::from_bytes("xray.png", b"\x89PNG-bytes".to_vec());
        let preview = generate_preview(&file);

        assert!(preview.data_uri().starts_with("data:image/png;base64,"));
        assert_eq!(preview.mime_type(), "image/png");
        assert_eq!(preview.decode_payload().as_deref(), Some(file.bytes()));
    }

    #[test]
    fn empty_file_still_gets_a_preview() {
        let file = StagedFile::from_bytes("empty.jpg", Vec::new());
        let preview = generate_preview(&file);
        assert_eq!(preview.data_uri(), "data:image/jpeg;base64,");
        assert_eq!(preview.decode_payload(), Some(Vec::new()));
    }

    #[test]
    fn debug_output_omits_payload() {
        let file = StagedFile::from_bytes("xray.jpg", vec![0xAB; 64]);
        let rendered = format!("{file:?}");
        assert!(rendered.contains("xray.jpg"));
        assert!(rendered.contains("size: 64"));
        assert!(!rendered.contains("171"));
    }

    #[test]
    fn formats_sizes_readably() {
        assert_eq!(human_readable_bytes(0), "0 B");
        assert_eq!(human_readable_bytes(1023), "1023 B");
        assert_eq!(human_readable_bytes(1536), "1.5 KB");
        assert_eq!(human_readable_bytes(10 * 1024 * 1024), "10 MB");
    }

    #[tokio::test]
    async fn spawned_preview_resolves_once() {
        let file = StagedFile::from_bytes("xray.jpg", vec![1, 2, 3]);
        let preview = await_preview(spawn_preview(file.clone())).await;
        assert_eq!(preview, Some(generate_preview(&file)));
    }

    #[tokio::test]
    async fn loads_file_name_and_bytes_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("chest.jpeg");
        tokio::fs::write(&path, b"jpeg-bytes").await.expect("write");

        let file = load_staged_file(&path).await.expect("load");
        assert_eq!(file.name(), "chest.jpeg");
        assert_eq!(file.size(), 10);
        assert_eq!(file.mime_type(), "image/jpeg");
    }

    #[tokio::test]
    async fn unreadable_path_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_staged_file(&dir.path().join("missing.png"))
            .await
            .expect_err("missing");
        assert!(matches!(err, SessionError::UnreadableFile { .. }));
    }
}
