pub mod report;
pub mod sessions;
pub mod store;
pub mod transcript_service;

pub use report::*;
pub use sessions::*;
pub use store::*;
pub use transcript_service::*;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Replace `path` with `contents` in one step: write a sibling temp file, then
/// rename it over the target. Parent directories are created on demand.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let temp_path = temp_path_for(path);
    tokio::fs::write(&temp_path, contents)
        .await
        .with_context(|| format!("Failed to write temp file: {:?}", temp_path))?;

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e).with_context(|| format!("Failed to replace file: {:?}", path));
    }

    Ok(())
}

/// Read a file, mapping "not found" to `None`
pub async fn read_optional(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read file: {:?}", path)),
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}
