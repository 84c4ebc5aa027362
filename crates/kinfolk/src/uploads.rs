//! Photo upload storage.
//!
//! Uploaded files are written to a single directory under a
//! `<unix-seconds>_<name>` file name and referenced from person records by
//! their public path, `uploads/<file-name>`. A name that is already taken gets
//! a `_<n>` suffix before its extension; existing files are never replaced.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// URL prefix photos are served under, without slashes.
pub const PUBLIC_PREFIX: &str = "uploads";

/// How many suffixed names to try before giving up on a save.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Directory-backed store for uploaded photos.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create a store writing into `dir`. The directory is created lazily.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory files are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save an uploaded file and return the public path to store with the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file cannot
    /// be written.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| Error::DirectoryCreate {
                path: self.dir.clone(),
                source,
            })?;

        let stamp = Utc::now().timestamp();
        let name = sanitize_file_name(original_name);

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = candidate_name(stamp, &name, attempt);
            let path = self.dir.join(&file_name);

            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(Error::Upload { path, source }),
            };

            if let Err(source) = write_all(&mut file, bytes).await {
                drop(file);
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    warn!("Failed to remove partial upload {}: {}", path.display(), e);
                }
                return Err(Error::Upload { path, source });
            }

            debug!("Saved upload of {} bytes to {}", bytes.len(), path.display());
            return Ok(format!("{PUBLIC_PREFIX}/{file_name}"));
        }

        Err(Error::Upload {
            path: self.dir.join(candidate_name(stamp, &name, 0)),
            source: ErrorKind::AlreadyExists.into(),
        })
    }

    /// Delete a previously saved file. Failures are logged, not returned.
    pub async fn remove(&self, public_path: &str) {
        let Some(path) = self.resolve(public_path) else {
            warn!("Refusing to remove unrecognised upload path {:?}", public_path);
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!("Removed orphaned upload {}", path.display()),
            Err(e) => warn!("Failed to remove upload {}: {}", path.display(), e),
        }
    }

    /// Map a public path back to the file on disk.
    #[must_use]
    pub fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let name = public_path
            .strip_prefix(PUBLIC_PREFIX)?
            .strip_prefix('/')?;
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }
        Some(self.dir.join(name))
    }
}

async fn write_all(file: &mut tokio::fs::File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await
}

/// File name for the `attempt`-th try at saving `name`.
///
/// `1700000000_me.png`, then `1700000000_me_1.png`, `1700000000_me_2.png`, ...
fn candidate_name(stamp: i64, name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return format!("{stamp}_{name}");
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stamp}_{stem}_{attempt}.{ext}"),
        _ => format!("{stamp}_{name}_{attempt}"),
    }
}

/// Reduce a client-supplied file name to a safe single path component.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars =
        UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]").expect("static regex is valid"));

    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = unsafe_chars.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "photo".to_string()
    } else {
        cleaned.to_string()
    }
}
