use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Write `data` to `path` through a `.tmp` sibling and a rename, so readers
/// never observe a half-written dataset file.
pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    std::fs::rename(&tmp_path, path)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            sync_dir(parent)?;
        }
    }

    Ok(())
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::InvalidPath(format!("{} has no file name", path.display())))?;
    let tmp_name = format!("{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

#[cfg(unix)]
fn sync_dir(path: &Path) -> io::Result<()> {
    let dir = OpenOptions::new().read(true).open(path)?;
    dir.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_file_and_leaves_no_temp_sibling() {
        let dir = std::env::temp_dir().join(format!("popsynth_atomic_{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("houses_data.txt");
        write_bytes_atomic(&path, b"1 0.5 100\n").expect("atomic write");

        assert_eq!(std::fs::read_to_string(&path).expect("read back"), "1 0.5 100\n");
        assert!(!path.with_file_name("houses_data.txt.tmp").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_paths_without_file_name() {
        let err = write_bytes_atomic(Path::new("/"), b"x").expect_err("root has no file name");
        assert!(matches!(err, Error::InvalidPath(_)));
    }
}
