use crate::shared::error::RestoreGraphError;
use crate::shared::Result;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Maximum size for project, solution and config files (100 MB)
/// Guards against loading arbitrarily large inputs into memory
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validates that a path exists and is a regular file (not a directory or symlink)
///
/// # Security
/// This combines existence check, symlink check, and file type check in one operation.
///
/// # Arguments
/// * `path` - The path to validate
/// * `file_description` - Description of the file (e.g., "project file", "NuGet.Config")
///
/// # Errors
/// Returns an error if:
/// - The path doesn't exist
/// - The path is a symbolic link
/// - The path is not a regular file
pub fn validate_regular_file(path: &Path, file_description: &str) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read {} metadata for {}: {}",
            file_description,
            path.display(),
            e
        )
    })?;

    if metadata.is_symlink() {
        anyhow::bail!(
            "Security: {} is a symbolic link. For security reasons, symbolic links are not allowed.",
            path.display()
        );
    }

    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }

    validate_file_size(metadata.len(), path, MAX_FILE_SIZE)
}

/// Validates file size is within acceptable limits
///
/// # Arguments
/// * `file_size` - The size of the file in bytes
/// * `path` - The path to the file (for error messages)
/// * `max_size` - Maximum allowed size in bytes
///
/// # Errors
/// Returns an error if the file size exceeds the maximum
pub fn validate_file_size(file_size: u64, path: &Path, max_size: u64) -> Result<()> {
    if file_size > max_size {
        anyhow::bail!(
            "Security: {} is too large ({} bytes). Maximum allowed size is {} bytes.",
            path.display(),
            file_size,
            max_size
        );
    }
    Ok(())
}

/// Reads a text file after validating it.
///
/// # Errors
/// Returns an error if validation fails or the file is not valid UTF-8.
pub fn read_validated(path: &Path, file_description: &str) -> Result<String> {
    validate_regular_file(path, file_description)?;
    fs::read_to_string(path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read {} {}: {}",
            file_description,
            path.display(),
            e
        )
    })
}

fn write_error(path: &Path, details: impl Into<String>) -> anyhow::Error {
    RestoreGraphError::FileWriteError {
        path: path.to_path_buf(),
        details: details.into(),
    }
    .into()
}

/// Rejects output paths that are symlinks or directories
pub fn validate_output_path(path: &Path) -> Result<()> {
    if let Ok(metadata) = fs::symlink_metadata(path) {
        if metadata.is_symlink() {
            return Err(write_error(
                path,
                "Security: Output path is a symbolic link. For security reasons, writing to symbolic links is not allowed.",
            ));
        }
        if metadata.is_dir() {
            return Err(write_error(path, "Output path is a directory"));
        }
    }
    Ok(())
}

/// Writes `content` to `path` through a temporary file in the same directory
///
/// Missing parent directories are created. The temporary file is renamed
/// into place, so readers never see a partially written file.
///
/// # Errors
/// Returns [`RestoreGraphError::FileWriteError`] if the path is rejected or
/// any step of the write fails.
pub fn write_atomically(path: &Path, content: &str) -> Result<()> {
    validate_output_path(path)?;

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .map_err(|e| write_error(path, format!("Failed to create {}: {}", parent.display(), e)))?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| write_error(path, e.to_string()))?;
    temp.write_all(content.as_bytes())
        .map_err(|e| write_error(path, e.to_string()))?;
    temp.persist(path)
        .map_err(|e| write_error(path, e.error.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_validate_regular_file_success() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("App.csproj");
        fs::write(&file_path, "<Project />").unwrap();

        assert!(validate_regular_file(&file_path, "project file").is_ok());
    }

    #[test]
    fn test_validate_regular_file_is_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = validate_regular_file(temp_dir.path(), "project file");
        assert!(result.unwrap_err().to_string().contains("not a regular file"));
    }

    #[test]
    fn test_validate_regular_file_missing() {
        let result = validate_regular_file(Path::new("/nonexistent/App.csproj"), "project file");
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_regular_file_rejects_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("real.csproj");
        let link = temp_dir.path().join("link.csproj");
        fs::write(&target, "<Project />").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let result = validate_regular_file(&link, "project file");
        assert!(result.unwrap_err().to_string().contains("symbolic link"));
    }

    #[test]
    fn test_validate_file_size_exceeds_limit() {
        let path = PathBuf::from("/test/App.csproj");
        let result = validate_file_size(MAX_FILE_SIZE + 1, &path, MAX_FILE_SIZE);
        assert!(result.unwrap_err().to_string().contains("too large"));
    }

    #[test]
    fn test_read_validated() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("NuGet.Config");
        fs::write(&file_path, "<configuration />").unwrap();

        assert_eq!(
            read_validated(&file_path, "NuGet.Config").unwrap(),
            "<configuration />"
        );
    }

    #[test]
    fn test_write_atomically_replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("graph.dg.json");
        fs::write(&output_path, "stale").unwrap();

        write_atomically(&output_path, "fresh").unwrap();

        assert_eq!(fs::read_to_string(&output_path).unwrap(), "fresh");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomically_rejects_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = write_atomically(temp_dir.path(), "content");
        assert!(result.unwrap_err().to_string().contains("Failed to write to file"));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomically_rejects_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("target.json");
        fs::write(&target, "original").unwrap();
        let link = temp_dir.path().join("link.json");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let result = write_atomically(&link, "content");

        assert!(result.unwrap_err().to_string().contains("symbolic link"));
        assert_eq!(fs::read_to_string(&target).unwrap(), "original");
    }
}
