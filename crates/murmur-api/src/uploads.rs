use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Public path prefix attachments are served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// On-disk storage for message attachments.
///
/// Each upload is one flat file at `{dir}/{epoch-ms}-{sanitized name}`. The
/// chat store never sees the bytes, only the resulting URL.
pub struct Uploads {
    dir: PathBuf,
}

/// Where an upload ended up.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub file_name: String,
    pub url: String,
    pub size: u64,
}

impl Uploads {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Upload directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `data` under a fresh name derived from `original_name`.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<StoredFile> {
        let base = sanitize_file_name(original_name);
        let now = chrono::Utc::now().timestamp_millis();

        let mut attempt = 0u32;
        let (file_name, mut file) = loop {
            let file_name = if attempt == 0 {
                format!("{}-{}", now, base)
            } else {
                format!("{}-{}-{}", now, attempt, base)
            };
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.dir.join(&file_name))
                .await
            {
                Ok(file) => break (file_name, file),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && attempt < 16 => {
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };

        file.write_all(data).await?;
        file.flush().await?;

        info!("Stored upload {} ({} bytes)", file_name, data.len());
        Ok(StoredFile {
            url: format!("{}/{}", PUBLIC_PREFIX, file_name),
            file_name,
            size: data.len() as u64,
        })
    }

    /// Read a stored file. `Ok(None)` if it does not exist.
    pub async fn read(&self, file_name: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.dir.join(file_name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Upload {} not found", file_name);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Replace everything outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Whether `name` could have come out of [`Uploads::save`]: sanitized
/// characters only and no leading dot, so it cannot escape the directory.
pub fn is_stored_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
}

/// Download content type by file extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "txt" => "text/plain",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}
