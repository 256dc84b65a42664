//! Locates the interpreter binary that belongs to the embedded runtime
//!
//! The embedded runtime is not started through its own executable, so the
//! binary has to be found on disk. Depending on how the runtime was built it
//! sits next to the standard library, in a parent directory, or in a `bin/`
//! directory further up. We walk upward from a known standard-library file and
//! take the first executable candidate.

use crate::layout::PythonVersion;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

/// Interpreter used to run pip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpreter {
    /// Set explicitly in the configuration
    Configured(PathBuf),
    /// Found by walking up from the standard library
    Located(PathBuf),
    /// Bare command name, resolved through `PATH` at spawn time
    Fallback(String),
}

impl Interpreter {
    /// `python<major>`, used when nothing was found on disk
    pub fn fallback(version: PythonVersion) -> Self {
        Interpreter::Fallback(format!("python{}", version.major))
    }

    /// Program argument for `std::process::Command`
    pub fn program(&self) -> &OsStr {
        match self {
            Interpreter::Configured(path) | Interpreter::Located(path) => path.as_os_str(),
            Interpreter::Fallback(name) => OsStr::new(name),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Interpreter::Fallback(_))
    }
}

impl fmt::Display for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program().to_string_lossy())
    }
}

/// File names tried in every directory, in priority order
pub fn candidate_names(version: PythonVersion) -> Vec<PathBuf> {
    let bare = [
        "python".to_string(),
        format!("python{}", version.major),
        format!("python{}.{}", version.major, version.minor),
    ];

    let mut names: Vec<String> = bare.to_vec();
    names.extend(bare.iter().map(|name| format!("{}.exe", name)));

    let mut candidates: Vec<PathBuf> = names.iter().map(PathBuf::from).collect();
    candidates.extend(names.iter().map(|name| Path::new("bin").join(name)));
    candidates
}

/// True if `path` is a regular file the current user may execute
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    if !path.is_file() {
        return false;
    }

    match CString::new(path.as_os_str().as_bytes()) {
        Ok(c_path) => unsafe { libc::access(c_path.as_ptr(), libc::X_OK) == 0 },
        Err(_) => false,
    }
}

/// True if `path` is a regular file the current user may execute
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Walks `start` and all of its ancestors, returning the located interpreter
/// or the bare-name fallback.
pub fn locate_interpreter(start: &Path, version: PythonVersion) -> Interpreter {
    let candidates = candidate_names(version);
    let dirs = start.ancestors().filter(|dir| !dir.as_os_str().is_empty());

    match search(dirs, &candidates) {
        Some(path) => {
            log::info!("Found interpreter: {}", path.display());
            Interpreter::Located(path)
        }
        None => {
            let fallback = Interpreter::fallback(version);
            match which::which(fallback.program()) {
                Ok(resolved) => log::warn!(
                    "No interpreter found above {}, falling back to {} ({})",
                    start.display(),
                    fallback,
                    resolved.display()
                ),
                Err(_) => log::warn!(
                    "No interpreter found above {} and {} is not on PATH",
                    start.display(),
                    fallback
                ),
            }
            fallback
        }
    }
}

fn search<'a>(
    dirs: impl IntoIterator<Item = &'a Path>,
    candidates: &[PathBuf],
) -> Option<PathBuf> {
    for dir in dirs {
        for name in candidates {
            let path = dir.join(name);
            if is_executable(&path) {
                return Some(path);
            }
        }
    }
    None
}
