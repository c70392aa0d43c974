use std::io::BufReader;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pressureplot::{line_channel, run_plotter, spawn_reader, ChartController, Ingestor, PlotterConfig, SampleTable};

const USAGE: &str = "\
Plot tab-separated sensor readings from stdin.

Each line is `<unix timestamp>\\t<value>\\t<value>...`.

Plot offline data:
    cat data_pressure.csv | pressureplot

Plot parts of data:
    tail -n 20000 data_pressure.csv | pressureplot --crosshair

Plot realtime over ssh:
    ssh pi@host tail -f folder/data_pressure.csv 2>&1 | pressureplot

Plot realtime over ssh, start at beginning:
    ssh pi@host tail -n+1 -f folder/data_pressure.csv 2>&1 | pressureplot";

#[derive(Parser, Debug)]
#[command(name = "pressureplot")]
#[command(about = "Live plot of tab-separated sensor readings from stdin", long_about = USAGE)]
struct Args {
    /// Add a crosshair and coordinate readout to the plot
    #[arg(short, long)]
    crosshair: bool,

    /// Print debugging data
    #[arg(short, long)]
    verbose: bool,

    /// Wait for the first row before opening the window
    #[arg(short, long)]
    wait: bool,

    /// Give up waiting for the first row after this many seconds
    #[arg(long, value_name = "SECONDS", requires = "wait")]
    wait_timeout: Option<f64>,

    /// Keep only the newest N samples per column
    #[arg(long, value_name = "N")]
    retain: Option<usize>,

    /// Refresh period in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 500)]
    period_ms: u64,
}

impl Args {
    fn config(&self) -> Result<PlotterConfig> {
        let wait_timeout = self
            .wait_timeout
            .map(Duration::try_from_secs_f64)
            .transpose()
            .context("invalid --wait-timeout")?;
        Ok(PlotterConfig {
            crosshair: self.crosshair,
            wait_for_data: self.wait,
            wait_timeout,
            retention: self.retain,
            refresh_period: Duration::from_millis(self.period_ms.max(1)),
            ..PlotterConfig::default()
        })
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to install logger")
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;
    let cfg = args.config()?;

    let (sink, source) = line_channel();
    spawn_reader(BufReader::new(std::io::stdin()), sink);

    let table = match cfg.retention {
        Some(n) => SampleTable::with_retention(n),
        None => SampleTable::new(),
    };
    let ingestor = Ingestor::with_table(Box::new(source), table);
    let controller =
        ChartController::initialize(ingestor, &cfg).context("no data to plot")?;

    tracing::debug!("opening window");
    run_plotter(controller, &cfg)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("failed to open plot window")
}
