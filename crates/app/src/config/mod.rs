use clap::Parser;
use engine::{Currency, Period};
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/splitledger.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Snapshot file; `-` or unset reads stdin.
    pub snapshot: Option<String>,
    pub currency: String,
    pub default_category: String,
    pub period: String,
    pub strict: bool,
    pub pretty: bool,
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            snapshot: None,
            currency: Currency::default().code().to_string(),
            default_category: engine::UNCATEGORIZED.to_string(),
            period: "all".to_string(),
            strict: false,
            pretty: false,
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn currency(&self) -> Result<Currency> {
        Ok(Currency::try_from(self.currency.as_str())?)
    }

    pub fn period(&self) -> Result<Period> {
        Ok(self.period.parse()?)
    }
}

#[derive(Debug, Parser)]
#[command(name = "splitledger")]
#[command(about = "Settle a shared-expense snapshot and print the report as JSON")]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Snapshot JSON file (`-` for stdin).
    #[arg(long, short)]
    snapshot: Option<String>,
    /// Override ledger currency (e.g. EUR, PHP).
    #[arg(long)]
    currency: Option<String>,
    /// Override the label used for expenses without a category.
    #[arg(long)]
    default_category: Option<String>,
    /// Reporting window: `all`, `YYYY` or `YYYY-MM`.
    #[arg(long)]
    period: Option<String>,
    /// Refuse snapshots containing records the engine would skip.
    #[arg(long)]
    strict: bool,
    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,
    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    level: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    load_from(Args::parse())
}

pub fn load_from(args: Args) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("SPLITLEDGER"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(snapshot) = args.snapshot {
        settings.snapshot = Some(snapshot);
    }
    if let Some(currency) = args.currency {
        settings.currency = currency;
    }
    if let Some(default_category) = args.default_category {
        settings.default_category = default_category;
    }
    if let Some(period) = args.period {
        settings.period = period;
    }
    if let Some(level) = args.level {
        settings.level = level;
    }
    settings.strict |= args.strict;
    settings.pretty |= args.pretty;

    Ok(settings)
}
