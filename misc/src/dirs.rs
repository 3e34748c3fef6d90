use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};

/// Creates the directory (and its parents) if it does not exist yet.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => anyhow::bail!("path {} exists and is not a directory", path.display()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(path)
                .with_context(|| format!("create directory: {}", path.display()))?;
            Ok(())
        }
        Err(err) => Err(err).with_context(|| format!("stat path: {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_dir_exists() {
        let dir = std::env::temp_dir().join("pawmart_test_dirs").join("nested");
        let _ = fs::remove_dir_all(&dir);

        ensure_dir_exists(&dir).unwrap();
        assert!(dir.is_dir());

        // Idempotent
        ensure_dir_exists(&dir).unwrap();

        fs::remove_dir_all(dir.parent().unwrap()).unwrap();
    }
}
