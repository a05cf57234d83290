use crate::MediaError;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

/// Directory where request bodies are spooled before they reach the media host
#[derive(Debug, Clone)]
pub struct UploadStaging {
    dir: PathBuf,
}

impl UploadStaging {
    pub async fn new(dir: PathBuf) -> Result<Self, MediaError> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Open a fresh staging file, keeping the extension of `original_name`
    pub fn begin(&self, original_name: Option<&str>) -> Result<StagingFile, MediaError> {
        let suffix = original_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        let named = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(&self.dir)?;
        let (file, path) = named.into_parts();

        Ok(StagingFile {
            file: tokio::fs::File::from_std(file),
            path,
            written: 0,
        })
    }
}

/// A staging file being written
pub struct StagingFile {
    file: tokio::fs::File,
    path: TempPath,
    written: u64,
}

impl StagingFile {
    pub async fn write(&mut self, chunk: &[u8]) -> Result<(), MediaError> {
        self.file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flush and close; empty uploads are rejected
    pub async fn finish(mut self) -> Result<StagedUpload, MediaError> {
        self.file.flush().await?;
        if self.written == 0 {
            return Err(MediaError::Rejected("uploaded file is empty".to_string()));
        }
        Ok(StagedUpload {
            path: self.path,
            size: self.written,
        })
    }
}

/// A fully written staging file; removed from disk when dropped
#[derive(Debug)]
pub struct StagedUpload {
    path: TempPath,
    size: u64,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}
