use crate::config::PinnedPackage;
use crate::install_log::InstallLogger;
use crate::interpreter::Interpreter;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use walkdir::WalkDir;

/// What a run does to the target directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Install,
    Uninstall,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Install => "install",
            Action::Uninstall => "uninstall",
        }
    }
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(command: &str) -> Result<Self> {
        match command {
            "install" => Ok(Action::Install),
            "uninstall" => Ok(Action::Uninstall),
            other => bail!("command not supported: {}", other),
        }
    }
}

/// Installs each package into `target` with `<interpreter> -m pip`.
///
/// Stops at the first package whose pip run exits non-zero.
pub fn pip_install(
    interpreter: &Interpreter,
    packages: &[PinnedPackage],
    target: &Path,
    logger: &InstallLogger,
) -> Result<()> {
    for package in packages {
        let requirement = package.requirement();
        log::info!("Installing {} into {}", requirement, target.display());
        logger.info(&format!(
            "{} -m pip install {} --upgrade --quiet --target {}",
            interpreter,
            requirement,
            target.display()
        ));

        let output = Command::new(interpreter.program())
            .args(["-m", "pip", "install", requirement.as_str(), "--upgrade", "--quiet", "--target"])
            .arg(target)
            .output()
            .with_context(|| format!("Failed to run {}", interpreter))?;

        logger.log_stdout(&String::from_utf8_lossy(&output.stdout));
        logger.log_stderr(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            let message = match output.status.code() {
                Some(code) => format!("pip returned {} when installing {}", code, requirement),
                None => format!("pip was terminated by a signal when installing {}", requirement),
            };
            logger.error(&message);
            bail!(message);
        }

        log::info!("{} installed successfully", requirement);
    }

    Ok(())
}

/// Removes every directory directly inside `base_dir` whose name starts with
/// `prefix`. Files and non-matching entries are left alone; nothing below the
/// first level is inspected. Returns the removed directories.
pub fn remove_dirs(prefix: &str, base_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    if !base_dir.is_dir() {
        return Ok(removed);
    }

    for entry in WalkDir::new(base_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to list {}", base_dir.display()))?;

        // Byte comparison so names that aren't valid UTF-8 still match
        let matches = entry
            .file_name()
            .as_encoded_bytes()
            .starts_with(prefix.as_bytes());
        if !matches || !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
        log::info!("Removed {}", path.display());
        removed.push(path.to_path_buf());
    }

    Ok(removed)
}
