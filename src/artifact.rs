//! Uploaded artifacts
//!
//! An artifact is one submitted payload: a whole PDF or a single page image.
//! It is written to the upload directory for the lifetime of its request and
//! removed when the [`StoredArtifact`] guard drops, whatever the outcome.

use std::io::Write;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use mime_guess::mime;
use tempfile::NamedTempFile;

/// How an artifact is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Classified, then text-extracted directly
    Pdf,
    /// Sent straight to the OCR engine
    Image,
}

impl ArtifactKind {
    /// Derive the kind from a media type; anything that is not an image is
    /// treated as a PDF
    pub fn from_media_type(media_type: &str) -> Self {
        match media_type.parse::<mime::Mime>() {
            Ok(parsed) if parsed.type_() == mime::IMAGE => Self::Image,
            _ => Self::Pdf,
        }
    }
}

/// Metadata of an uploaded artifact
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub media_type: String,
    pub kind: ArtifactKind,
}

impl Artifact {
    /// Build artifact metadata from a multipart part
    ///
    /// The declared content type wins; parts without one fall back to a
    /// guess from the file name.
    pub fn new(file_name: &str, content_type: Option<&str>) -> Self {
        let media_type = content_type
            .map(str::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(file_name)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });
        let kind = ArtifactKind::from_media_type(&media_type);

        Self {
            file_name: file_name.to_string(),
            media_type,
            kind,
        }
    }
}

/// Filesystem-backed store for in-flight artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Open the store, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an artifact to the store
    ///
    /// The returned guard owns the file; dropping it deletes the file.
    pub async fn persist(&self, artifact: Artifact, data: Bytes) -> std::io::Result<StoredArtifact> {
        let dir = self.dir.clone();
        let suffix = Path::new(&artifact.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let file = tokio::task::spawn_blocking(move || {
            let mut file = tempfile::Builder::new()
                .prefix("upload-")
                .suffix(&suffix)
                .tempfile_in(&dir)?;
            file.write_all(&data)?;
            file.flush()?;
            Ok::<_, std::io::Error>(file)
        })
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;

        tracing::debug!(
            path = %file.path().display(),
            file_name = %artifact.file_name,
            media_type = %artifact.media_type,
            "Stored artifact"
        );

        Ok(StoredArtifact {
            artifact,
            file: Some(file),
        })
    }
}

/// Scoped ownership of a stored artifact
pub struct StoredArtifact {
    artifact: Artifact,
    file: Option<NamedTempFile>,
}

impl StoredArtifact {
    pub fn kind(&self) -> ArtifactKind {
        self.artifact.kind
    }

    pub fn file_name(&self) -> &str {
        &self.artifact.file_name
    }

    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(|f| f.path())
    }

    /// Read the stored bytes back
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match self.path() {
            Some(path) => tokio::fs::read(path).await,
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "artifact already released",
            )),
        }
    }
}

impl Drop for StoredArtifact {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let path = file.path().to_path_buf();
            match file.close() {
                Ok(()) => tracing::debug!(path = %path.display(), "Released artifact"),
                Err(e) => tracing::error!(path = %path.display(), "Error deleting artifact: {}", e),
            }
        }
    }
}
