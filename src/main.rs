//! frontmonth: build a front-month continuous series from a directory of
//! daily DBN files.
//!
//! ```text
//! frontmonth --data-dir data/zc
//! frontmonth --data-dir data/cl --root CL --months monthly --expiration-day 20 --jobs 4
//! ```

use clap::Parser;
use frontmonth::contract_mgmt::{DeliveryCycle, ScheduleParams, YearDigits};
use frontmonth::market_data::DbnFileReader;
use frontmonth::series::FeatureColumn;
use frontmonth::{Result, SeriesBuilder, SeriesConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "frontmonth")]
#[command(about = "Stitch daily futures files into a front-month continuous series")]
#[command(version)]
struct Cli {
    /// Directory holding the daily .dbn / .dbn.zst files
    #[arg(short, long)]
    data_dir: PathBuf,

    /// Parquet file to write
    #[arg(short, long, default_value = frontmonth::config::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Contract root symbol
    #[arg(long, default_value = "ZC")]
    root: String,

    /// Delivery months as CODE=MONTH pairs, or one of corn, quarterly, monthly
    #[arg(long, default_value = "corn")]
    months: String,

    /// Nominal expiration day of month
    #[arg(long, default_value_t = 14)]
    expiration_day: u8,

    /// Year digits in generated symbols (1 or 2)
    #[arg(long, default_value_t = 1)]
    year_digits: u8,

    /// Comma-separated feature columns; all when omitted
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Extraction worker threads
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,
}

impl Cli {
    fn into_config(self) -> Result<SeriesConfig> {
        let cycle = match self.months.as_str() {
            "corn" => DeliveryCycle::corn(),
            "quarterly" => DeliveryCycle::quarterly(),
            "monthly" => DeliveryCycle::monthly(),
            other => other.parse()?,
        };

        let mut config = SeriesConfig::new(self.data_dir);
        config.output_path = self.output;
        config.schedule = ScheduleParams {
            root: self.root,
            cycle,
            expiration_day: self.expiration_day,
            year_digits: YearDigits::from_count(self.year_digits)?,
        };
        if !self.columns.is_empty() {
            config.columns = self
                .columns
                .iter()
                .map(|c| c.parse::<FeatureColumn>())
                .collect::<Result<_>>()?;
        }
        config.workers = self.jobs;
        config.validate()?;
        Ok(config)
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.into_config()?;
    let reader = DbnFileReader::for_directory(&config.data_dir);
    SeriesBuilder::new(&config, &reader).run()?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
