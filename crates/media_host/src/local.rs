use crate::{HostedMedia, MediaError, MediaHost, MediaKind};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Media host that keeps files under a local directory served at
/// `{public_base_url}/media/...`
pub struct LocalMediaHost {
    root: PathBuf,
    public_base_url: String,
}

impl LocalMediaHost {
    /// Create the host, making sure every kind directory exists
    pub async fn new(root: PathBuf, public_base_url: impl Into<String>) -> Result<Self, MediaError> {
        for kind in [MediaKind::Video, MediaKind::Thumbnail] {
            tokio::fs::create_dir_all(root.join(kind.dir_name())).await?;
        }
        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Keep a short alphanumeric extension from the source file, if any
fn hosted_file_name(source: &Path) -> String {
    let extension = source
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase);

    let stem = Uuid::new_v4().simple().to_string();
    match extension {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

#[async_trait]
impl MediaHost for LocalMediaHost {
    async fn upload(&self, local_path: &Path, kind: MediaKind) -> Result<HostedMedia, MediaError> {
        let metadata = tokio::fs::metadata(local_path)
            .await
            .map_err(|_| MediaError::MissingSource(local_path.to_path_buf()))?;
        if !metadata.is_file() {
            return Err(MediaError::MissingSource(local_path.to_path_buf()));
        }
        if metadata.len() == 0 {
            return Err(MediaError::Rejected("file is empty".to_string()));
        }

        let name = hosted_file_name(local_path);
        let destination = self.root.join(kind.dir_name()).join(&name);
        tokio::fs::copy(local_path, &destination).await?;

        let url = format!("{}/media/{}/{}", self.public_base_url, kind.dir_name(), name);
        info!(url = %url, size = metadata.len(), "Media stored");

        Ok(HostedMedia {
            url,
            duration: None,
        })
    }
}
