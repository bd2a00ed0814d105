use axum::extract::Multipart;
use bytes::Bytes;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::recommend::{ImageUpload, RecommendError, RecommendResult};

pub const IMAGE_FIELD: &str = "image";

/// An upload written to a temp file. The file is removed on drop.
pub struct SpooledUpload {
    file: NamedTempFile,
    filename: String,
}

/// Find the `image` part of a multipart form and read it.
pub async fn read_image_field(multipart: &mut Multipart) -> RecommendResult<(String, Bytes)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RecommendError::Malformed(format!("Error parsing multipart form: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| RecommendError::Malformed(format!("Error parsing multipart form: {}", e)))?;

        info!(filename = %filename, size = data.len(), "Received file");
        return Ok((filename, data));
    }

    Err(RecommendError::Malformed("No image file was uploaded".to_string()))
}

fn extension_of(filename: &str) -> String {
    match Path::new(filename).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!(".{}", ext),
        _ => ".png".to_string(),
    }
}

impl SpooledUpload {
    /// Write `data` to a fresh temp file. The blocking file work runs on
    /// the blocking pool.
    pub async fn create(filename: String, data: Bytes) -> RecommendResult<Self> {
        let suffix = extension_of(&filename);
        let file = tokio::task::spawn_blocking(move || -> RecommendResult<NamedTempFile> {
            let mut file = tempfile::Builder::new()
                .prefix("upload-")
                .suffix(&suffix)
                .tempfile()
                .map_err(RecommendError::io("Error creating temporary file"))?;

            file.write_all(&data)
                .map_err(RecommendError::io("Error copying file"))?;
            file.as_file()
                .sync_all()
                .map_err(RecommendError::io("Error writing file to disk"))?;

            debug!(path = ?file.path(), size = data.len(), "Saved upload");
            Ok(file)
        })
        .await
        .map_err(|e| RecommendError::Io {
            context: "Error writing file to disk",
            source: io::Error::other(e),
        })??;

        Ok(Self { file, filename })
    }

    /// Read the spooled bytes back. The temp file goes away with `self`.
    pub async fn into_upload(self) -> RecommendResult<ImageUpload> {
        let data = tokio::fs::read(self.file.path())
            .await
            .map_err(RecommendError::io("Error reading image file"))?;

        Ok(ImageUpload {
            filename: self.filename,
            data: Bytes::from(data),
        })
    }
}
