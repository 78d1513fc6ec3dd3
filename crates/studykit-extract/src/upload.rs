//! File upload intake
//!
//! Uploads are streamed into a temporary file while they arrive. The file
//! belongs to [`SpooledUpload`] and is removed when it is dropped, whichever
//! way the request ends.

use crate::{error::Result, ExtractError};
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub const PDF_NOT_SUPPORTED: &str =
    "PDF processing not yet implemented. Please copy and paste the text content.";
pub const UNSUPPORTED_TYPE: &str = "Only PDF and TXT files are supported";

/// What an upload turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Text,
    Pdf,
    Other,
}

impl UploadKind {
    /// Classify by MIME type, falling back to the file extension when the
    /// client sent a generic type
    pub fn classify(mime: &str, filename: Option<&str>) -> Self {
        let mime = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let extension = filename
            .and_then(|f| Path::new(f).extension())
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match (mime.as_str(), extension.as_deref()) {
            ("application/pdf", _) | (_, Some("pdf")) => UploadKind::Pdf,
            (m, _) if m.starts_with("text/") => UploadKind::Text,
            ("" | "application/octet-stream", Some("txt" | "md")) => UploadKind::Text,
            _ => UploadKind::Other,
        }
    }
}

/// An upload being written to a temporary file
pub struct SpooledUpload {
    file: NamedTempFile,
    writer: tokio::fs::File,
    written: usize,
    max_bytes: usize,
}

impl SpooledUpload {
    /// Create an empty spool that refuses more than `max_bytes`
    pub fn new(max_bytes: usize) -> Result<Self> {
        let file = tempfile::Builder::new()
            .prefix("studykit-upload-")
            .tempfile()?;
        let writer = tokio::fs::File::from_std(file.as_file().try_clone()?);
        Ok(Self {
            file,
            writer,
            written: 0,
            max_bytes,
        })
    }

    /// Append a chunk
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let size = self.written + chunk.len();
        if size > self.max_bytes {
            return Err(ExtractError::ContentTooLarge {
                size,
                max: self.max_bytes,
            });
        }
        self.writer.write_all(chunk).await?;
        self.written = size;
        Ok(())
    }

    /// Location of the spool file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Read the upload back as text. Consumes the spool; the file is gone
    /// once this returns, on success or failure.
    pub async fn into_text(mut self, mime: &str, filename: Option<&str>) -> Result<String> {
        let kind = UploadKind::classify(mime, filename);
        debug!(mime, ?filename, ?kind, bytes = self.written, "Reading upload");

        match kind {
            UploadKind::Text => {}
            UploadKind::Pdf => return Err(ExtractError::UnsupportedUpload(PDF_NOT_SUPPORTED.into())),
            UploadKind::Other => return Err(ExtractError::UnsupportedUpload(UNSUPPORTED_TYPE.into())),
        }

        self.writer.flush().await?;
        let bytes = tokio::fs::read(self.file.path()).await?;
        String::from_utf8(bytes).map_err(|_| {
            ExtractError::UnsupportedUpload("The uploaded file is not valid UTF-8 text".into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(UploadKind::classify("text/plain", None), UploadKind::Text);
        assert_eq!(
            UploadKind::classify("text/markdown; charset=utf-8", Some("notes.md")),
            UploadKind::Text
        );
        assert_eq!(UploadKind::classify("application/pdf", Some("a.txt")), UploadKind::Pdf);
        assert_eq!(
            UploadKind::classify("application/octet-stream", Some("paper.PDF")),
            UploadKind::Pdf
        );
        assert_eq!(
            UploadKind::classify("application/octet-stream", Some("notes.txt")),
            UploadKind::Text
        );
        assert_eq!(UploadKind::classify("image/png", Some("a.png")), UploadKind::Other);
    }

    #[tokio::test]
    async fn test_text_roundtrip_removes_file() {
        let mut upload = SpooledUpload::new(1024).unwrap();
        upload.write_chunk(b"Cells are the ").await.unwrap();
        upload.write_chunk(b"basic unit of life.").await.unwrap();
        let path = upload.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(upload.len(), 33);

        let text = upload.into_text("text/plain", Some("cells.txt")).await.unwrap();
        assert_eq!(text, "Cells are the basic unit of life.");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_pdf_rejected_and_removed() {
        let mut upload = SpooledUpload::new(1024).unwrap();
        upload.write_chunk(b"%PDF-1.4").await.unwrap();
        let path = upload.path().to_path_buf();

        let err = upload.into_text("application/pdf", Some("paper.pdf")).await.unwrap_err();
        assert_eq!(err.to_string(), PDF_NOT_SUPPORTED);
        assert!(!path.exists());
    }

    #[test]
    fn test_unsupported_type() {
        let err = tokio_test::block_on(async {
            let upload = SpooledUpload::new(1024).unwrap();
            upload.into_text("image/png", None).await
        })
        .unwrap_err();
        assert_eq!(err.to_string(), UNSUPPORTED_TYPE);
    }

    #[tokio::test]
    async fn test_size_limit() {
        let mut upload = SpooledUpload::new(4).unwrap();
        upload.write_chunk(b"abc").await.unwrap();
        let err = upload.write_chunk(b"de").await.unwrap_err();
        assert!(matches!(err, ExtractError::ContentTooLarge { size: 5, max: 4 }));

        let path = upload.path().to_path_buf();
        drop(upload);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_invalid_utf8() {
        let mut upload = SpooledUpload::new(16).unwrap();
        upload.write_chunk(&[0xff, 0xfe, 0x00]).await.unwrap();
        let err = upload.into_text("text/plain", None).await.unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedUpload(_)));
    }
}
