use clap::Parser;
use std::path::PathBuf;

/// Installs a pinned package into an embedded interpreter's site-packages
#[derive(Parser, Debug)]
#[command(name = "sitepin")]
#[command(author = "4n6h4x0r")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Install or uninstall a pinned package for an embedded interpreter", long_about = None)]
pub struct Args {
    /// Command to run: install or uninstall
    #[arg(value_name = "COMMAND")]
    pub command: String,

    /// Root of the embedding package; packages go under ROOT/inst
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// JSON configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Interpreter to run pip with (skips the search)
    #[arg(long = "interpreter", value_name = "PATH")]
    pub interpreter: Option<PathBuf>,

    /// Standard library file to start the interpreter search from
    #[arg(long = "stdlib-file", value_name = "PATH")]
    pub stdlib_file: Option<PathBuf>,

    /// Package to install or remove
    #[arg(short = 'p', long = "package")]
    pub package: Option<String>,

    /// Version the package is pinned to
    #[arg(long = "pin")]
    pub pin: Option<String>,

    /// Directory for install logs (defaults to the temp dir)
    #[arg(long = "log-dir", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Parses command-line arguments
pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let args = Args::try_parse_from(["sitepin", "install", "/tmp/pkg"]).unwrap();
        assert_eq!(args.command, "install");
        assert_eq!(args.root, PathBuf::from("/tmp/pkg"));
        assert!(args.config.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "sitepin",
            "uninstall",
            "pkg",
            "--package",
            "numpy",
            "--pin",
            "1.19.5",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.package.as_deref(), Some("numpy"));
        assert_eq!(args.pin.as_deref(), Some("1.19.5"));
        assert!(args.verbose);
    }

    #[test]
    fn test_root_is_required() {
        assert!(Args::try_parse_from(["sitepin", "install"]).is_err());
    }
}
