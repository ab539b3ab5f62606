//! Filesystem `UploadStager` confined to the uploads directory with `cap-std`.
//!
//! Each upload is stored under a fresh UUID v4 name plus the original
//! extension (lowercased, alphanumeric only). Client file names never reach
//! the filesystem, and the capability handle keeps writes inside the
//! directory.

use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ImagePath;
use crate::domain::ports::{ImageUpload, UploadStager, UploadStagerError};

const MAX_EXTENSION_LEN: usize = 10;

/// Writes uploads into one directory.
#[derive(Clone)]
pub struct CapStdUploadStager {
    dir: Arc<Dir>,
}

impl CapStdUploadStager {
    /// Open `path`, creating it if needed.
    pub fn open(path: &Path) -> Result<Self, UploadStagerError> {
        Dir::create_ambient_dir_all(path, ambient_authority())
            .map_err(|err| UploadStagerError::io(format!("{}: {err}", path.display())))?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())
            .map_err(|err| UploadStagerError::io(format!("{}: {err}", path.display())))?;
        Ok(Self::from_dir(dir))
    }

    pub fn from_dir(dir: Dir) -> Self {
        Self { dir: Arc::new(dir) }
    }
}

fn sanitised_extension(original_name: &str) -> Option<String> {
    let extension = Path::new(original_name).extension()?.to_str()?;
    let valid = !extension.is_empty()
        && extension.len() <= MAX_EXTENSION_LEN
        && extension.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| extension.to_ascii_lowercase())
}

fn staged_file_name(original_name: &str) -> String {
    let stem = Uuid::new_v4();
    match sanitised_extension(original_name) {
        Some(extension) => format!("{stem}.{extension}"),
        None => stem.to_string(),
    }
}

fn write_new(dir: &Dir, name: &str, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(name, &options)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[async_trait]
impl UploadStager for CapStdUploadStager {
    async fn stage(&self, upload: &ImageUpload) -> Result<ImagePath, UploadStagerError> {
        let name = staged_file_name(&upload.original_name);
        let path = ImagePath::for_file_name(&name)
            .map_err(|err| UploadStagerError::io(err.to_string()))?;

        let dir = Arc::clone(&self.dir);
        let bytes = upload.bytes.clone();
        let file_name = name.clone();
        tokio::task::spawn_blocking(move || write_new(&dir, &file_name, &bytes))
            .await
            .map_err(|err| UploadStagerError::io(err.to_string()))?
            .map_err(|err| UploadStagerError::io(format!("{name}: {err}")))?;

        debug!(path = %path.as_str(), bytes = upload.bytes.len(), "upload staged");
        Ok(path)
    }
}
