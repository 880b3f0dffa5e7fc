use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::ClientError;

/// File name used when saving an artifact without an explicit name.
pub const DEFAULT_ARTIFACT_FILE_NAME: &str = "test_user_code.py";

/// Writes `artifact` as plain text.
///
/// If `target` is an existing directory the file is created inside it as
/// [`DEFAULT_ARTIFACT_FILE_NAME`]. Missing parent directories are created.
/// Returns the path written.
pub fn save_artifact(artifact: &str, target: &Path) -> Result<PathBuf, ClientError> {
    let path = if target.is_dir() {
        target.join(DEFAULT_ARTIFACT_FILE_NAME)
    } else {
        target.to_path_buf()
    };
    let to_error = |e: std::io::Error| ClientError::Artifact {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(to_error)?;
    }
    std::fs::write(&path, artifact).map_err(to_error)?;
    info!(path = %path.display(), bytes = artifact.len(), "artifact saved");
    Ok(path)
}
