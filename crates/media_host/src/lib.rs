//! Media hosting collaborator.
//!
//! Request handlers stage uploaded files on local disk ([`UploadStaging`]) and
//! hand the staged path to a [`MediaHost`], which stores the file and answers
//! with a public locator. Staged files are deleted when dropped.

mod local;
mod staging;

pub use local::LocalMediaHost;
pub use staging::{StagedUpload, StagingFile, UploadStaging};

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Upload source not found: {0}")]
    MissingSource(PathBuf),

    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("Media storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// What an uploaded file is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Thumbnail,
}

impl MediaKind {
    /// Sub-directory (and URL segment) holding media of this kind
    pub fn dir_name(self) -> &'static str {
        match self {
            MediaKind::Video => "videos",
            MediaKind::Thumbnail => "thumbnails",
        }
    }
}

/// Locator of a hosted file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostedMedia {
    pub url: String,
    /// Playback length in seconds, when the host can tell
    pub duration: Option<f64>,
}

/// Stores media files and returns public locators for them
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, local_path: &Path, kind: MediaKind) -> Result<HostedMedia, MediaError>;
}
