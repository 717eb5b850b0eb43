use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use raincheck_core::{
    ChartKind, Config, Dashboard, UpdateOutcome, config::MAX_REFRESH_SECS, session::ERROR_LABEL,
};
use std::time::Duration;
use tokio::time::{Instant, interval_at};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "raincheck", version, about = "Rain dashboard for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the default place, window size and refresh interval.
    Configure,

    /// Show the dashboard for a place.
    Show {
        /// Place name; defaults to the configured place.
        place: Option<String>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Show the dashboard for a pair of coordinates.
    Here {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,

        #[arg(allow_negative_numbers = true)]
        longitude: f64,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Keep the dashboard on screen, refreshing it periodically.
    Watch {
        /// Place name; defaults to the configured place.
        place: Option<String>,

        /// Seconds between refreshes; defaults to the configured interval.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=MAX_REFRESH_SECS))]
        interval: Option<u64>,

        #[command(flatten)]
        render: RenderArgs,
    },
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Which series to chart.
    #[arg(long, value_enum, default_value_t = ChartArg::Rain)]
    pub chart: ChartArg,

    /// Print the snapshot as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Seed for the simulated provider comparison.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartArg {
    Rain,
    Temp,
    Wind,
}

impl From<ChartArg> for ChartKind {
    fn from(value: ChartArg) -> Self {
        match value {
            ChartArg::Rain => ChartKind::Rain,
            ChartArg::Temp => ChartKind::Temp,
            ChartArg::Wind => ChartKind::Wind,
        }
    }
}

impl RenderArgs {
    fn dashboard(&self, config: &Config) -> anyhow::Result<Dashboard> {
        let dashboard = Dashboard::from_config(config)?;
        Ok(match self.seed {
            Some(seed) => dashboard.with_seed(seed),
            None => dashboard,
        })
    }

    fn print(&self, outcome: UpdateOutcome) -> anyhow::Result<()> {
        match outcome {
            UpdateOutcome::Updated(snapshot) if self.json => render::print_json(&snapshot),
            UpdateOutcome::Updated(snapshot) => {
                print!("{}", render::dashboard(&snapshot, self.chart.into()));
                Ok(())
            }
            UpdateOutcome::Skipped => bail!("Place name must not be empty"),
            UpdateOutcome::Superseded => Ok(()),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config),
            Command::Show { place, render } => {
                let query = place.unwrap_or_else(|| config.default_place().to_string());
                let dashboard = render.dashboard(&config)?;
                let outcome = dashboard
                    .update_by_name(&query, Utc::now())
                    .await
                    .with_context(|| format!("Failed to load weather for '{query}'"))?;
                render.print(outcome)
            }
            Command::Here { latitude, longitude, render } => {
                let dashboard = render.dashboard(&config)?;
                let outcome = dashboard
                    .update_by_coordinates(latitude, longitude, Utc::now())
                    .await
                    .with_context(|| format!("Failed to load weather for {latitude}, {longitude}"))?;
                render.print(outcome)
            }
            Command::Watch { place, interval, render } => {
                let period = interval
                    .map(Duration::from_secs)
                    .unwrap_or_else(|| config.refresh_interval());
                let query = place.unwrap_or_else(|| config.default_place().to_string());
                watch(render.dashboard(&config)?, &query, period, &render).await
            }
        }
    }
}

/// Render once, then refresh every `period` until Ctrl-C. A failed cycle is
/// reported and the loop carries on.
async fn watch(
    dashboard: Dashboard,
    query: &str,
    period: Duration,
    render: &RenderArgs,
) -> anyhow::Result<()> {
    report(render, dashboard.update_by_name(query, Utc::now()).await)?;

    let start = Instant::now()
        .checked_add(period)
        .context("Refresh interval is too large")?;
    let mut ticker = interval_at(start, period);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tracing::info!("auto-refreshing");
                report(render, dashboard.refresh(Utc::now()).await)?;
            }
            _ = tokio::signal::ctrl_c() => {
                return Ok(());
            }
        }
    }
}

fn report(render: &RenderArgs, result: raincheck_core::Result<UpdateOutcome>) -> anyhow::Result<()> {
    match result {
        Ok(outcome) => render.print(outcome),
        Err(e) => {
            println!("{ERROR_LABEL}");
            eprintln!("{e}");
            Ok(())
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let place = inquire::Text::new("Default place:")
        .with_default(config.default_place())
        .prompt()?;
    config.set_default_place(&place)?;

    config.window_radius = Some(
        inquire::CustomType::<usize>::new("Hours shown on each side of now:")
            .with_default(config.window_radius())
            .prompt()?,
    );

    config.refresh_interval_secs = Some(
        inquire::CustomType::<u64>::new("Seconds between refreshes in watch mode:")
            .with_default(config.refresh_interval().as_secs())
            .prompt()?,
    );

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
