//! Image input validation: the checks the upload surface applies before an
//! analysis request is allowed to start.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// File types the analysis pipeline accepts.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp"];

/// Upload size cap in megabytes.
pub const MAX_FILE_SIZE_MB: u64 = 10;

/// A validated image path, safe to hand to the engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    path: PathBuf,
}

impl ImageInput {
    /// Validate an image file: it must exist, carry an allowed extension, and
    /// stay under the size cap.
    pub fn open(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("cannot read image file {}", path.display()))?;
        if !metadata.is_file() {
            bail!("{} is not a regular file", path.display());
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            bail!(
                "unsupported image type `{extension}` (allowed: {})",
                ALLOWED_EXTENSIONS.join(", ")
            );
        }

        let size_mb = metadata.len() / (1024 * 1024);
        if size_mb > MAX_FILE_SIZE_MB {
            bail!(
                "image is {size_mb} MB, above the {MAX_FILE_SIZE_MB} MB limit"
            );
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("narrator_img_{unique}_{name}"));
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn accepts_a_small_jpg() {
        let path = temp_file("photo.jpg", b"\xff\xd8\xff");
        let input = ImageInput::open(&path).unwrap();
        assert_eq!(input.path(), path.as_path());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn rejects_unknown_extension() {
        let path = temp_file("notes.txt", b"hello");
        let err = ImageInput::open(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported image type"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn rejects_missing_file() {
        let missing = Path::new("/nonexistent/photo.png");
        assert!(ImageInput::open(missing).is_err());
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let path = temp_file("PHOTO.JPG", b"\xff\xd8\xff");
        assert!(ImageInput::open(&path).is_ok());
        let _ = fs::remove_file(&path);
    }
}
