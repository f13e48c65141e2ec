//! xrbind - Declarative OpenXR Input Bindings
//!
//! Builds action sets and bindings from a JSON description, then prints every
//! boolean action's state each tick while the session is focused.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;
use std::time::Duration;
use xrbind::{Application, Settings};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging; warnings are shown unless RUST_LOG says otherwise
    logger(env_logger::DEFAULT_FILTER_ENV).init();

    // Parse command-line arguments
    let matches = Command::new("xrbind")
        .version(xrbind::VERSION)
        .about("Declarative OpenXR action bindings with a session-driven input loop")
        .long_about(
            "xrbind creates OpenXR action sets, actions and suggested bindings from a JSON \
             description, then reports every boolean action's state once the session is focused.",
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Path to the action configuration (default: actions.json)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("interval-ms")
                .long("interval-ms")
                .help("Delay between loop ticks in milliseconds (default: 500)")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("app-name")
                .long("app-name")
                .help("Application name reported to the runtime"),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Validate the configuration offline and exit")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let mut settings = base_settings()?;
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        settings.config_path = path.clone();
    }
    if let Some(&ms) = matches.get_one::<u64>("interval-ms") {
        settings.tick_interval = Duration::from_millis(ms);
    }
    if let Some(name) = matches.get_one::<String>("app-name") {
        settings.application_name = name.clone();
    }

    let app = Application::new(settings.clone()).with_context(|| {
        format!(
            "Failed to load configuration {}",
            settings.config_path.display()
        )
    })?;

    if matches.get_flag("check") {
        let summary = app.check().context("Configuration check failed")?;
        println!("{}: {}", settings.config_path.display(), summary);
        return Ok(());
    }

    app.run().await?;

    Ok(())
}

/// Default filter when the environment sets none, so begin-session retries and
/// skipped action types reach the terminal
const DEFAULT_LOG_FILTER: &str = "warn";

fn logger(filter_env: &str) -> env_logger::Builder {
    let env = env_logger::Env::default().filter_or(filter_env, DEFAULT_LOG_FILTER);
    env_logger::Builder::from_env(env)
}

#[cfg(feature = "config")]
fn base_settings() -> Result<Settings> {
    Settings::load_user().context("Failed to read user settings")
}

#[cfg(not(feature = "config"))]
fn base_settings() -> Result<Settings> {
    Ok(Settings::default())
}
