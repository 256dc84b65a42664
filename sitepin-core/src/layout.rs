use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Host OS family, which decides the site-packages layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    /// macOS and Linux
    Posix,
}

impl Platform {
    /// The OS family this binary was built for
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }
}

/// Major/minor version of the embedded interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
}

impl PythonVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl Default for PythonVersion {
    fn default() -> Self {
        Self::new(3, 6)
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Resolves the root to an absolute path.
///
/// Existing paths are canonicalized (symlinks resolved). Paths that don't
/// exist yet are made absolute against the current directory and cleaned of
/// `.` and `..` components.
pub fn normalize_root(root: &Path) -> Result<PathBuf> {
    if let Ok(canonical) = fs::canonicalize(root) {
        return Ok(strip_verbatim(canonical));
    }

    let absolute = if root.is_absolute() {
        root.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to read current directory")?
            .join(root)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

// canonicalize() on Windows returns \\?\C:\... which pip does not accept
#[cfg(windows)]
fn strip_verbatim(path: PathBuf) -> PathBuf {
    let raw = path.to_string_lossy();
    match raw.strip_prefix(r"\\?\") {
        Some(rest) if !rest.starts_with("UNC") => PathBuf::from(rest),
        _ => path,
    }
}

#[cfg(not(windows))]
fn strip_verbatim(path: PathBuf) -> PathBuf {
    path
}

/// Directory under the root that plays the role of the interpreter's prefix
pub fn install_prefix(root: &Path, prefix_dir: &str) -> PathBuf {
    root.join(prefix_dir)
}

/// Local site-packages directory for the given prefix
pub fn site_packages_dir(prefix: &Path, platform: Platform, version: PythonVersion) -> PathBuf {
    stdlib_dir(prefix, platform, version).join("site-packages")
}

/// Location of the standard library `os` module inside the prefix.
/// The interpreter search starts here unless configured otherwise.
pub fn stdlib_marker(prefix: &Path, platform: Platform, version: PythonVersion) -> PathBuf {
    stdlib_dir(prefix, platform, version).join("os.py")
}

fn stdlib_dir(prefix: &Path, platform: Platform, version: PythonVersion) -> PathBuf {
    match platform {
        Platform::Windows => prefix.join("Lib"),
        Platform::Posix => prefix.join("lib").join(format!("python{}", version)),
    }
}

/// Creates the directory and any missing parents. No-op if it already exists.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
        log::debug!("Created directory {}", path.display());
    }
    Ok(())
}
