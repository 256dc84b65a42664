use anyhow::Result;
use std::path::{Path, PathBuf};

// Internal modules (private)
mod config;
mod install_log;
mod installer;
mod interpreter;
mod layout;
mod search_path;

// Re-export public types
pub use config::{PinnedPackage, SiteConfig};
pub use install_log::InstallLogger;
pub use installer::{pip_install, remove_dirs, Action};
pub use interpreter::{candidate_names, is_executable, locate_interpreter, Interpreter};
pub use layout::{
    ensure_dir, install_prefix, normalize_root, site_packages_dir, stdlib_marker, Platform,
    PythonVersion,
};
pub use search_path::{export_search_path, search_path_entries, SEARCH_PATH_VAR};

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Action that was performed
    pub action: Action,
    /// Site-packages directory the action was applied to
    pub target_dir: PathBuf,
    /// Interpreter pip ran under (installs only)
    pub interpreter: Option<Interpreter>,
    /// Directories deleted (uninstalls only)
    pub removed: Vec<PathBuf>,
}

/// Installs or uninstalls the configured package under `root`.
///
/// `command` must be `install` or `uninstall`; anything else fails before the
/// filesystem is touched. The target is the interpreter's site-packages
/// directory inside `<root>/<prefix_dir>`.
pub fn run(command: &str, root: &Path, config: &SiteConfig) -> Result<RunOutcome> {
    run_on(command, root, config, Platform::host())
}

fn run_on(command: &str, root: &Path, config: &SiteConfig, platform: Platform) -> Result<RunOutcome> {
    let action: Action = command.parse()?;

    let root = normalize_root(root)?;
    let prefix = install_prefix(&root, &config.prefix_dir);
    let version = config.python_version();
    let target_dir = site_packages_dir(&prefix, platform, version);

    export_search_path(&target_dir)?;
    ensure_dir(&target_dir)?;

    let mut outcome = RunOutcome {
        action,
        target_dir,
        interpreter: None,
        removed: Vec::new(),
    };

    match action {
        Action::Install => {
            let interpreter = match &config.interpreter {
                Some(path) => Interpreter::Configured(path.clone()),
                None => {
                    let start = config
                        .stdlib_file
                        .clone()
                        .unwrap_or_else(|| stdlib_marker(&prefix, platform, version));
                    locate_interpreter(&start, version)
                }
            };

            let log_dir = config.log_dir();
            let logger = InstallLogger::open_or_disabled(&log_dir);
            let result = pip_install(
                &interpreter,
                std::slice::from_ref(&config.package),
                &outcome.target_dir,
                &logger,
            );
            logger.finalize();
            drop(logger);

            if let Err(e) = InstallLogger::cleanup_old_logs(&log_dir, config.keep_logs) {
                log::debug!("Failed to clean up old install logs: {:#}", e);
            }

            result?;
            outcome.interpreter = Some(interpreter);
        }
        Action::Uninstall => {
            log::info!("Uninstalling {}...", config.package.name);
            outcome.removed = remove_dirs(&config.package.name, &outcome.target_dir)?;
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(temp_dir: &TempDir) -> SiteConfig {
        SiteConfig {
            log_dir: Some(temp_dir.path().join("logs")),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_unsupported_command_has_no_side_effects() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("pkg");

        let err = run("reinstall", &root, &config_in(&temp_dir)).unwrap_err();
        assert_eq!(err.to_string(), "command not supported: reinstall");
        assert!(!root.exists());
        Ok(())
    }

    #[test]
    fn test_uninstall_removes_package_dirs() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("pkg");
        fs::create_dir_all(&root)?;
        let config = config_in(&temp_dir);
        let site = site_packages_dir(
            &normalize_root(&root)?.join("inst"),
            Platform::host(),
            config.python_version(),
        );
        fs::create_dir_all(site.join("pandas"))?;
        fs::create_dir_all(site.join("pandas-1.0.1.dist-info"))?;
        fs::create_dir_all(site.join("numpy"))?;

        let outcome = run("uninstall", &root, &config)?;

        assert_eq!(outcome.action, Action::Uninstall);
        assert_eq!(outcome.target_dir, site);
        assert_eq!(outcome.removed.len(), 2);
        assert!(outcome.interpreter.is_none());
        assert!(site.join("numpy").is_dir());
        assert!(!site.join("pandas").exists());
        Ok(())
    }

    #[test]
    fn test_uninstall_creates_target_dir() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("fresh");

        let outcome = run_on("uninstall", &root, &config_in(&temp_dir), Platform::Windows)?;

        assert!(outcome.target_dir.ends_with(Path::new("inst").join("Lib").join("site-packages")));
        assert!(outcome.target_dir.is_dir());
        assert!(outcome.removed.is_empty());
        Ok(())
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn write_interpreter(path: &Path, exit_code: i32) -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, format!("#!/bin/sh\necho \"pip $*\"\nexit {}\n", exit_code))?;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        }

        #[test]
        fn test_install_uses_located_interpreter() -> Result<()> {
            let temp_dir = TempDir::new()?;
            let root = temp_dir.path().join("pkg");
            fs::create_dir_all(&root)?;
            let prefix = normalize_root(&root)?.join("inst");
            let python = prefix.join("bin").join("python3");
            write_interpreter(&python, 0)?;

            let outcome = run("install", &root, &config_in(&temp_dir))?;

            assert_eq!(outcome.action, Action::Install);
            assert_eq!(outcome.interpreter, Some(Interpreter::Located(python)));
            assert!(outcome.target_dir.is_dir());

            let logs: Vec<_> = fs::read_dir(temp_dir.path().join("logs"))?.collect();
            assert_eq!(logs.len(), 1);
            Ok(())
        }

        #[test]
        fn test_install_failure_is_reported() -> Result<()> {
            let temp_dir = TempDir::new()?;
            let python = temp_dir.path().join("tools").join("python");
            write_interpreter(&python, 2)?;

            let config = SiteConfig {
                interpreter: Some(python),
                ..config_in(&temp_dir)
            };
            let err = run("install", &temp_dir.path().join("pkg"), &config).unwrap_err();
            assert_eq!(err.to_string(), "pip returned 2 when installing pandas==1.0.1");
            Ok(())
        }
    }
}
