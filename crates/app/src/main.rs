use std::io::{Read, Write};

use engine::{Engine, Snapshot, snapshot_issues};

use crate::config::AppConfig;
use crate::error::Result;
use crate::report::Report;

mod config;
mod error;
mod report;

fn main() -> Result<()> {
    let settings = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "splitledger={level},engine={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let engine = Engine::builder()
        .currency(settings.currency()?)
        .default_category(&settings.default_category)
        .build()?;
    let period = settings.period()?;
    let snapshot = read_snapshot(&settings)?;

    if settings.strict {
        engine.validate(&snapshot)?;
    } else {
        for (expense, err) in snapshot_issues(&snapshot, engine.currency()) {
            tracing::warn!(expense = %expense.id, "{err}");
        }
    }

    let report = Report::build(&engine, &snapshot, period)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", report.to_json(settings.pretty)?)?;

    Ok(())
}

fn read_snapshot(settings: &AppConfig) -> Result<Snapshot> {
    let raw = match settings.snapshot.as_deref() {
        None | Some("-") => {
            tracing::debug!("reading snapshot from stdin");
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        Some(path) => {
            tracing::debug!(path, "reading snapshot");
            std::fs::read_to_string(path)?
        }
    };
    Ok(Snapshot::from_json(&raw)?)
}
