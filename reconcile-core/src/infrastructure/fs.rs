// reconcile-core/src/infrastructure/fs.rs

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::infrastructure::error::InfrastructureError;

/// Write content to a file atomically using a temporary file.
///
/// The temporary file lives next to the target (parents are created) and is
/// renamed over it, so readers see either the old or the new content.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Pretty JSON, written atomically. Returns the number of bytes written.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<u64, InfrastructureError> {
    let mut content = serde_json::to_vec_pretty(value)?;
    content.push(b'\n');
    atomic_write(path, &content)?;
    Ok(content.len() as u64)
}

/// `None` when the file does not exist; parse errors are reported.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, InfrastructureError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_creates_missing_parents() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("rules/nested/rules.json");

        atomic_write(&file_path, "{}")?;

        assert_eq!(fs::read_to_string(file_path)?, "{}");
        Ok(())
    }

    #[test]
    fn test_atomic_write_overwrites_existing() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("test.txt");

        atomic_write(&file_path, "Initial")?;
        atomic_write(&file_path, "Updated")?;

        assert_eq!(fs::read_to_string(file_path)?, "Updated");
        Ok(())
    }

    #[test]
    fn test_json_helpers() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("value.json");

        assert_eq!(read_json::<Vec<u32>>(&path)?, None);

        let written = write_json(&path, &vec![1u32, 2, 3])?;
        assert_eq!(written, fs::metadata(&path)?.len());
        assert_eq!(read_json::<Vec<u32>>(&path)?, Some(vec![1, 2, 3]));

        fs::write(&path, "not json")?;
        assert!(read_json::<Vec<u32>>(&path).is_err());
        Ok(())
    }
}
