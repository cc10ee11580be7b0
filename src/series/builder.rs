//! End-to-end series build: discover files, generate the schedule, extract
//! each day and persist the concatenation.

use crate::config::SeriesConfig;
use crate::contract_mgmt::selector::{build_schedule, ContractSymbol, Schedule};
use crate::core::{FrontMonthError, RecordSource, Result};
use crate::series::columns::FeatureColumn;
use crate::series::extractor::{
    format_trade_date, trade_date_from_path, DayExtract, DayExtractor, FileOutcome, SkipReason,
};
use crate::series::writer::ParquetSeriesWriter;
use crossbeam_channel::{bounded, unbounded};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use time::Date;
use tracing::{debug, info, warn};

/// List the `.dbn` / `.dbn.zst` files directly inside `dir`, sorted by name
pub fn discover_input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(FrontMonthError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_dbn = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| n.ends_with(".dbn") || n.ends_with(".dbn.zst"));
        if is_dbn {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(FrontMonthError::NoFilesFound(dir.to_path_buf()));
    }
    files.sort();
    Ok(files)
}

/// Smallest and largest year among the dated file names
pub fn input_year_range(files: &[PathBuf]) -> Option<(i32, i32)> {
    files
        .iter()
        .filter_map(|f| trade_date_from_path(f))
        .fold(None, |acc, d| match acc {
            None => Some((d.year(), d.year())),
            Some((lo, hi)) => Some((lo.min(d.year()), hi.max(d.year()))),
        })
}

/// Extracted days in trade-date order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContinuousSeries {
    columns: Vec<FeatureColumn>,
    days: Vec<DayExtract>,
}

impl ContinuousSeries {
    /// Order `days` by trade date and compute the output columns: every
    /// configured column that at least one day provides.
    pub fn new(mut days: Vec<DayExtract>, configured: &[FeatureColumn]) -> Self {
        days.sort_by_key(|d| d.date);
        let columns = configured
            .iter()
            .copied()
            .filter(|c| days.iter().any(|d| d.has_column(*c)))
            .collect();
        Self { columns, days }
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn days(&self) -> &[DayExtract] {
        &self.days
    }

    /// Total rows across all days
    pub fn len(&self) -> usize {
        self.days.iter().map(DayExtract::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first_date(&self) -> Option<Date> {
        self.days.first().map(|d| d.date)
    }

    pub fn last_date(&self) -> Option<Date> {
        self.days.last().map(|d| d.date)
    }

    /// Distinct contracts in the order they first appear
    pub fn contracts(&self) -> Vec<ContractSymbol> {
        let mut out: Vec<ContractSymbol> = Vec::new();
        for day in &self.days {
            if !out.contains(&day.symbol) {
                out.push(day.symbol.clone());
            }
        }
        out
    }
}

/// What a successful run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub files_found: usize,
    pub days_extracted: usize,
    pub skipped: Vec<(PathBuf, SkipReason)>,
    pub rows: usize,
    pub first_date: Option<Date>,
    pub last_date: Option<Date>,
    pub contracts: Vec<ContractSymbol>,
    pub output_path: PathBuf,
}

impl RunSummary {
    /// Skip counts keyed by [`SkipReason::kind`]
    pub fn skipped_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for (_, reason) in &self.skipped {
            *counts.entry(reason.kind()).or_insert(0) += 1;
        }
        counts
    }
}

/// Drives a build over a data directory using `source` for decoding
pub struct SeriesBuilder<'a, S: RecordSource + ?Sized> {
    config: &'a SeriesConfig,
    source: &'a S,
}

impl<'a, S: RecordSource + ?Sized> SeriesBuilder<'a, S> {
    pub fn new(config: &'a SeriesConfig, source: &'a S) -> Self {
        Self { config, source }
    }

    /// Build the series and write it to the configured output path
    pub fn run(&self) -> Result<RunSummary> {
        self.config.validate()?;

        let files = discover_input_files(&self.config.data_dir)?;
        info!("found {} dbn files in {}", files.len(), self.config.data_dir.display());

        let schedule = match input_year_range(&files) {
            Some((first, last)) => {
                let schedule = build_schedule(first, last + 1, &self.config.schedule)?;
                info!(
                    contracts = schedule.len(),
                    "generated expiration schedule for {}-{}",
                    first,
                    last + 1
                );
                schedule
            }
            None => Schedule::default(),
        };

        let outcomes = self.extract(&files, &schedule);

        // First file (by name) to yield a date wins; later files for the
        // same date would repeat its trades
        let mut kept: HashMap<Date, PathBuf> = HashMap::new();
        let mut days = Vec::new();
        let mut skipped = Vec::new();
        for (path, outcome) in files.iter().zip(outcomes) {
            let outcome = match outcome {
                FileOutcome::Extracted(day) => match kept.get(&day.date) {
                    Some(first) => {
                        warn!(
                            "{} repeats trade date {} already taken from {}",
                            path.display(),
                            format_trade_date(day.date),
                            first.display()
                        );
                        FileOutcome::Skipped(SkipReason::DuplicateDate {
                            date: day.date,
                            kept: first.clone(),
                        })
                    }
                    None => {
                        kept.insert(day.date, path.clone());
                        FileOutcome::Extracted(day)
                    }
                },
                skip => skip,
            };
            match outcome {
                FileOutcome::Extracted(day) => days.push(day),
                FileOutcome::Skipped(reason) => {
                    debug!(file = %path.display(), "skipped: {}", reason);
                    skipped.push((path.clone(), reason));
                }
            }
        }

        let series = ContinuousSeries::new(days, &self.config.columns);
        if series.is_empty() {
            return Err(FrontMonthError::NoDataExtracted { files: files.len() });
        }

        ParquetSeriesWriter::new().write(&series, &self.config.output_path)?;

        let summary = RunSummary {
            files_found: files.len(),
            days_extracted: series.days().len(),
            skipped,
            rows: series.len(),
            first_date: series.first_date(),
            last_date: series.last_date(),
            contracts: series.contracts(),
            output_path: self.config.output_path.clone(),
        };
        log_summary(&summary);
        Ok(summary)
    }

    /// Process `files` against `schedule`, returning one outcome per file in
    /// the same order as `files`
    pub fn extract(&self, files: &[PathBuf], schedule: &Schedule) -> Vec<FileOutcome> {
        let extractor = DayExtractor::new(schedule, self.source, &self.config.columns);
        let workers = self.config.workers.min(files.len()).max(1);

        if workers == 1 {
            return files.iter().map(|f| extractor.process_file(f)).collect();
        }

        let (job_tx, job_rx) = bounded::<(usize, &Path)>(workers * 2);
        let (done_tx, done_rx) = unbounded::<(usize, FileOutcome)>();

        thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let done_tx = done_tx.clone();
                let extractor = &extractor;
                scope.spawn(move || {
                    for (idx, path) in job_rx.iter() {
                        if done_tx.send((idx, extractor.process_file(path))).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(done_tx);

            for (idx, path) in files.iter().enumerate() {
                if job_tx.send((idx, path.as_path())).is_err() {
                    break;
                }
            }
            drop(job_tx);
        });

        let mut indexed: Vec<(usize, FileOutcome)> = done_rx.iter().collect();
        indexed.sort_by_key(|(idx, _)| *idx);
        indexed.into_iter().map(|(_, outcome)| outcome).collect()
    }
}

fn log_summary(summary: &RunSummary) {
    info!(
        "saved {} trades to {}",
        summary.rows,
        summary.output_path.display()
    );
    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        info!("date range: {} to {}", format_trade_date(first), format_trade_date(last));
    }
    let contracts: Vec<&str> = summary.contracts.iter().map(ContractSymbol::as_str).collect();
    info!("contracts: {}", contracts.join(", "));
    info!(
        "{} of {} files extracted",
        summary.days_extracted, summary.files_found
    );
    for (kind, count) in summary.skipped_by_kind() {
        info!("skipped {} files: {}", count, kind);
    }
}
