use crate::layout::PythonVersion;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Package name and the exact version it is pinned to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedPackage {
    pub name: String,
    pub version: String,
}

impl PinnedPackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// pip requirement string, `name==version`
    pub fn requirement(&self) -> String {
        format!("{}=={}", self.name, self.version)
    }
}

impl Default for PinnedPackage {
    fn default() -> Self {
        // 1.0.3 fails to install from a wheel on Windows
        Self::new("pandas", "1.0.1")
    }
}

impl fmt::Display for PinnedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.requirement())
    }
}

/// Configuration for an install/uninstall run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Package installed by `install` and removed by `uninstall`
    pub package: PinnedPackage,
    /// Major version of the embedded interpreter
    pub python_major: u32,
    /// Minor version of the embedded interpreter
    pub python_minor: u32,
    /// Directory under the root that acts as the interpreter prefix
    pub prefix_dir: String,
    /// Use this interpreter instead of searching for one
    pub interpreter: Option<PathBuf>,
    /// File to start the interpreter search from
    /// (defaults to the standard library `os.py` inside the prefix)
    pub stdlib_file: Option<PathBuf>,
    /// Where install logs are written (defaults to the temp dir)
    pub log_dir: Option<PathBuf>,
    /// Number of install logs kept in `log_dir`
    pub keep_logs: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            package: PinnedPackage::default(),
            python_major: 3,
            python_minor: 6,
            prefix_dir: "inst".to_string(),
            interpreter: None,
            stdlib_file: None,
            log_dir: None,
            keep_logs: 10,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SiteConfig = serde_json::from_str(&data)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn python_version(&self) -> PythonVersion {
        PythonVersion::new(self.python_major, self.python_minor)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
