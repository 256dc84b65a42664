//! Module search path for the embedded interpreter
//!
//! The interpreter only sees the local site-packages directory if it is on
//! `PYTHONPATH`. Packages shipped as `.egg` archives next to it have to be
//! listed explicitly as well.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Environment variable the interpreter reads its extra search path from
pub const SEARCH_PATH_VAR: &str = "PYTHONPATH";

const ARCHIVE_EXTENSION: &str = "egg";

/// Site directory first, then every `*.egg` entry directly inside it (sorted)
pub fn search_path_entries(site_packages: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = vec![site_packages.to_path_buf()];

    if !site_packages.is_dir() {
        return Ok(entries);
    }

    for entry in WalkDir::new(site_packages)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry
            .with_context(|| format!("Failed to list {}", site_packages.display()))?;
        let path = entry.path();

        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        let is_archive = path
            .extension()
            .map(|ext| ext == ARCHIVE_EXTENSION)
            .unwrap_or(false);

        if is_archive && !hidden {
            entries.push(path.to_path_buf());
        }
    }

    Ok(entries)
}

/// Replaces `PYTHONPATH` with the site directory and its archives.
/// Returns the value that was written.
pub fn export_search_path(site_packages: &Path) -> Result<OsString> {
    let entries = search_path_entries(site_packages)?;
    let value = std::env::join_paths(&entries)
        .context("Site-packages path contains a path separator")?;

    std::env::set_var(SEARCH_PATH_VAR, &value);
    log::debug!("{}={}", SEARCH_PATH_VAR, value.to_string_lossy());

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_site_dir_is_single_entry() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let site = temp_dir.path().join("site-packages");

        assert_eq!(search_path_entries(&site)?, vec![site.clone()]);
        Ok(())
    }

    #[test]
    fn test_archives_are_appended_in_order() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let site = temp_dir.path().to_path_buf();

        fs::create_dir(site.join("future-0.18.egg"))?;
        fs::write(site.join("client-1.9.egg"), "zip")?;
        fs::create_dir(site.join("numpy"))?;
        fs::write(site.join("README.txt"), "")?;
        fs::write(site.join(".hidden.egg"), "")?;

        let entries = search_path_entries(&site)?;
        assert_eq!(
            entries,
            vec![
                site.clone(),
                site.join("client-1.9.egg"),
                site.join("future-0.18.egg"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_export_returns_joined_value() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let site = temp_dir.path().to_path_buf();
        fs::write(site.join("pkg.egg"), "")?;

        let value = export_search_path(&site)?;
        let split: Vec<PathBuf> = std::env::split_paths(&value).collect();
        assert_eq!(split, vec![site.clone(), site.join("pkg.egg")]);
        Ok(())
    }
}
