//! Install log for pip runs
//!
//! pip's own output is captured and written to a timestamped log file so a
//! failed install inside a test run can be diagnosed afterwards. Console
//! output goes through the `log` facade.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const LOG_PREFIX: &str = "sitepin-install-";
const LOG_SUFFIX: &str = ".log";

/// Installation logger that writes to a file next to the console log
pub struct InstallLogger {
    log_file: Mutex<Option<File>>,
    log_path: Option<PathBuf>,
}

impl InstallLogger {
    /// Create a new logger with a timestamped log file in `dir`
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        let log_path = Self::create_log_path(dir);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to create log file at {}", log_path.display()))?;

        let logger = Self {
            log_file: Mutex::new(Some(file)),
            log_path: Some(log_path.clone()),
        };

        logger.info("=== sitepin install log ===");
        logger.info(&format!("Version: {}", env!("CARGO_PKG_VERSION")));
        logger.info(&format!(
            "Started: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        logger.info("");

        Ok(logger)
    }

    /// Logger that drops everything; used when the log file can't be opened
    pub fn disabled() -> Self {
        Self {
            log_file: Mutex::new(None),
            log_path: None,
        }
    }

    /// Opens a log in `dir`, or a disabled logger if that fails
    pub fn open_or_disabled(dir: &Path) -> Self {
        match Self::new(dir) {
            Ok(logger) => logger,
            Err(e) => {
                log::warn!("Install log disabled: {:#}", e);
                Self::disabled()
            }
        }
    }

    fn create_log_path(dir: &Path) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        dir.join(format!("{}{}{}", LOG_PREFIX, timestamp, LOG_SUFFIX))
    }

    /// Path of the log file, if one is open
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    pub fn info(&self, message: &str) {
        self.write_entry("INFO", message);
    }

    pub fn error(&self, message: &str) {
        self.write_entry("ERROR", message);
    }

    /// Log command output (stdout)
    pub fn log_stdout(&self, output: &str) {
        self.write_output("stdout", output);
    }

    /// Log command output (stderr)
    pub fn log_stderr(&self, output: &str) {
        self.write_output("stderr", output);
    }

    fn write_entry(&self, level: &str, message: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        self.write_line(&format!("[{}] [{}] {}", timestamp, level, message));
    }

    // Subprocess output is indented under the command entry, one line each
    fn write_output(&self, stream: &str, output: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        for line in output.lines() {
            self.write_line(&format!("[{}]   {}: {}", timestamp, stream, line));
        }
    }

    fn write_line(&self, line: &str) {
        let Ok(mut guard) = self.log_file.lock() else {
            return;
        };
        if let Some(file) = guard.as_mut() {
            // File is unbuffered; a failed write only loses this line
            let _ = writeln!(file, "{}", line);
        }
    }

    /// Keep only the newest `keep_count` install logs in `dir`
    pub fn cleanup_old_logs(dir: &Path, keep_count: usize) -> Result<()> {
        let mut log_files: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read log directory {}", dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(LOG_PREFIX) && n.ends_with(LOG_SUFFIX))
                    .unwrap_or(false)
            })
            .collect();

        // File names embed the creation timestamp, so name order is age order
        log_files.sort();

        if log_files.len() > keep_count {
            let to_remove = log_files.len() - keep_count;
            for path in log_files.iter().take(to_remove) {
                let _ = std::fs::remove_file(path);
            }
        }

        Ok(())
    }

    /// Write the footer and report where the log went
    pub fn finalize(&self) {
        self.info("");
        self.info(&format!(
            "Finished: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        if let Some(path) = &self.log_path {
            log::info!("Install log saved to {}", path.display());
        }
    }
}
