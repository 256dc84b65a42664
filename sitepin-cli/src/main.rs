use anyhow::Result;
use sitepin_core::{Action, SiteConfig};

mod cli;

fn main() {
    let args = cli::parse_args();

    // Initialize logger with appropriate level based on verbose flag
    if std::env::var("RUST_LOG").is_err() {
        if args.verbose {
            std::env::set_var("RUST_LOG", "debug");
        } else {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &cli::Args) -> Result<()> {
    let config = build_config(args)?;

    let outcome = sitepin_core::run(&args.command, &args.root, &config)?;

    match outcome.action {
        Action::Install => {
            if let Some(interpreter) = &outcome.interpreter {
                if interpreter.is_fallback() {
                    log::warn!(
                        "Installed with {} from PATH, not the embedded interpreter",
                        interpreter
                    );
                } else {
                    log::debug!("Used interpreter {}", interpreter);
                }
            }
            log::info!(
                "{} {} into {}",
                outcome.action.name(),
                config.package,
                outcome.target_dir.display()
            );
        }
        Action::Uninstall => {
            log::info!(
                "{}: removed {} directories from {}",
                outcome.action.name(),
                outcome.removed.len(),
                outcome.target_dir.display()
            );
        }
    }

    Ok(())
}

/// Config file (if any) with command-line overrides applied
fn build_config(args: &cli::Args) -> Result<SiteConfig> {
    let mut config = match &args.config {
        Some(path) => SiteConfig::load(path)?,
        None => SiteConfig::default(),
    };

    if let Some(name) = &args.package {
        config.package.name = name.clone();
    }
    if let Some(version) = &args.pin {
        config.package.version = version.clone();
    }
    if args.interpreter.is_some() {
        config.interpreter = args.interpreter.clone();
    }
    if args.stdlib_file.is_some() {
        config.stdlib_file = args.stdlib_file.clone();
    }
    if args.log_dir.is_some() {
        config.log_dir = args.log_dir.clone();
    }

    Ok(config)
}
