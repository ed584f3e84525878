use anyhow::{Result, bail};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// On-disk storage for micropost pictures.
///
/// Files are content-addressed: `{sha256}.{ext}`, so identical uploads share
/// one file and a name can be trusted to contain no path separators.
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Picture storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Write an image and return its stored file name.
    pub async fn store_picture(&self, content_type: &str, data: &[u8]) -> Result<String> {
        let Some(ext) = extension_for(content_type) else {
            bail!("Unsupported picture type {}", content_type);
        };

        let mut hasher = Sha256::new();
        hasher.update(data);
        let name = format!("{}.{}", hex::encode(hasher.finalize()), ext);

        let path = self.file_path(&name);
        if fs::try_exists(&path).await? {
            return Ok(name);
        }
        fs::write(&path, data).await?;
        info!("Stored picture {} ({} bytes)", name, data.len());
        Ok(name)
    }

    /// Remove a stored picture. Missing files are not an error.
    pub async fn delete(&self, name: &str) -> Result<()> {
        if name.contains('/') || name.contains('\\') || name.starts_with('.') {
            warn!("Refusing to delete suspicious picture name {:?}", name);
            return Ok(());
        }
        match fs::remove_file(self.file_path(name)).await {
            Ok(()) => {
                info!("Deleted picture {}", name);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}
