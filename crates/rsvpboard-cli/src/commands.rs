//! Subcommand handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, info};

use rsvpboard_core::retry::FailureLog;
use rsvpboard_core::{
    export_to_path, Config, Dashboard, ExportOptions, FilterCriteria, LoadState, SourceLoader,
    SourceLocation,
};

use crate::cli::{Cli, Command};
use crate::render;

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let Cli {
        source, command, ..
    } = cli;
    let source = source.as_deref();

    match command {
        Command::Summary { filters, json } => {
            let dashboard = load_dashboard(source, &config, filters.criteria(&config)).await?;
            let stats = dashboard.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                let header = status_line(&dashboard);
                print!("{}", render::summary(&stats, &dashboard.filtered(), header.as_deref()));
            }
        }

        Command::List { filters, contacts } => {
            let dashboard = load_dashboard(source, &config, filters.criteria(&config)).await?;
            print!(
                "{}",
                render::guest_table(&dashboard.filtered(), dashboard.events(), contacts)
            );
        }

        Command::Export {
            filters,
            out,
            contacts,
        } => {
            let dashboard = load_dashboard(source, &config, filters.criteria(&config)).await?;
            let options = ExportOptions {
                include_contacts: contacts,
            };
            let written = export_to_path(&out, dashboard.filtered(), dashboard.events(), options)
                .with_context(|| format!("Failed to export to {}", out.display()))?;
            println!("Exported {} guest(s) to {}", written, out.display());
        }

        Command::Failures { dir } => {
            let dir = match dir {
                Some(dir) => dir,
                None => default_log_dir(source, &config),
            };
            match FailureLog::latest_in(&dir)? {
                Some(path) => {
                    let log = FailureLog::load(&path)?;
                    println!("{}", path.display());
                    print!("{}", render::failure_log(&log));
                }
                None => println!("No failure logs in {}", dir.display()),
            }
        }

        Command::Config { init } => {
            let path = Config::config_path()?;
            if init {
                if path.exists() {
                    println!("Config already exists at {}", path.display());
                } else {
                    Config::default().save()?;
                    println!("Wrote default config to {}", path.display());
                }
            } else {
                println!("# {}", path.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

/// Load the configured source into a fresh dashboard. Ctrl-C aborts the
/// read.
async fn load_dashboard(
    source: Option<&str>,
    config: &Config,
    criteria: FilterCriteria,
) -> Result<Dashboard> {
    let events = Arc::new(config.event_set().context("Invalid event configuration")?);
    let raw = config.effective_source(source).ok_or_else(|| {
        anyhow!("No guest source configured: pass --source, set RSVPBOARD_SOURCE, or run `rsvpboard config --init` and edit the file")
    })?;

    let location = SourceLocation::parse(&raw);
    debug!(?location, "Resolved source");
    let loader = SourceLoader::with_timeout(
        location,
        Arc::clone(&events),
        Duration::from_secs(config.request_timeout_secs),
    )?;

    let mut dashboard = Dashboard::new(events);
    dashboard.start_refresh(loader);

    let interrupted = tokio::select! {
        _ = dashboard.wait_refresh() => false,
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        dashboard.cancel_refresh();
        bail!("Interrupted while loading {}", raw);
    }

    if let LoadState::Failed(message) = dashboard.state() {
        bail!("{}", message);
    }

    info!(guests = dashboard.records().len(), "Dashboard ready");
    dashboard.set_criteria(criteria);
    Ok(dashboard)
}

/// "Source: <origin> (loaded just now)"
fn status_line(dashboard: &Dashboard) -> Option<String> {
    let origin = dashboard.origin()?;
    match dashboard.age_display() {
        Some(age) => Some(format!("Source: {} (loaded {})", origin, age)),
        None => Some(format!("Source: {}", origin)),
    }
}

/// Failure logs sit next to the scraper's snapshots, so a directory source
/// is the natural place to look.
fn default_log_dir(source: Option<&str>, config: &Config) -> PathBuf {
    match config.effective_source(source).map(|s| SourceLocation::parse(&s)) {
        Some(SourceLocation::Directory(dir)) => dir,
        Some(SourceLocation::File(file)) => file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".")),
        _ => PathBuf::from("."),
    }
}
