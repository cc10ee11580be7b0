//! Per-file front-month extraction.
//!
//! Every failure below [`DayExtractor::process_file`] is turned into a
//! [`SkipReason`]; nothing here aborts the batch.

use crate::contract_mgmt::selector::{ContractSymbol, Schedule};
use crate::core::RecordSource;
use crate::market_data::events::TradeRecord;
use crate::series::columns::FeatureColumn;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::macros::format_description;
use time::Date;
use tracing::{debug, error, info, warn};

/// Why a file contributed no rows
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("file name has no YYYYMMDD date")]
    MalformedName,

    #[error("no front month found for {date} - outside schedule range")]
    OutsideSchedule { date: Date },

    #[error("decode failed: {message}")]
    DecodeFailed { message: String },

    #[error("no {symbol} trades found on {date}")]
    NoMatchingTrades { date: Date, symbol: ContractSymbol },

    #[error("{date} already extracted from {}", kept.display())]
    DuplicateDate { date: Date, kept: PathBuf },
}

impl SkipReason {
    /// Short label used to group skips in the run summary
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::MalformedName => "malformed name",
            SkipReason::OutsideSchedule { .. } => "outside schedule",
            SkipReason::DecodeFailed { .. } => "decode failed",
            SkipReason::NoMatchingTrades { .. } => "no matching trades",
            SkipReason::DuplicateDate { .. } => "duplicate date",
        }
    }
}

/// Front-month executions pulled from one file
#[derive(Debug, Clone, PartialEq)]
pub struct DayExtract {
    pub file: PathBuf,
    pub date: Date,
    pub symbol: ContractSymbol,
    /// Configured columns this file's schema provides
    pub columns: Vec<FeatureColumn>,
    pub rows: Vec<TradeRecord>,
}

impl DayExtract {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: FeatureColumn) -> bool {
        self.columns.contains(&column)
    }
}

/// Result of processing one file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Extracted(DayExtract),
    Skipped(SkipReason),
}

/// Parse the trade date embedded in a file name such as
/// `glbx-mdp3-20240314.mbo.dbn`: the first `-`, `.` or `_` delimited token
/// that is exactly eight digits and a valid `YYYYMMDD` date.
pub fn trade_date_from_path(path: &Path) -> Option<Date> {
    let name = path.file_name()?.to_str()?;
    let format = format_description!("[year][month][day]");
    name.split(['-', '.', '_'])
        .filter(|token| token.len() == 8 && token.bytes().all(|b| b.is_ascii_digit()))
        .find_map(|token| Date::parse(token, &format).ok())
}

/// Format a trade date as the `YYYYMMDD` tag written to the series
pub fn format_trade_date(date: Date) -> String {
    // Formatting into a String only fails on I/O, which a String never reports
    date.format(format_description!("[year][month][day]"))
        .unwrap_or_default()
}

/// Resolves, decodes and filters one file at a time against a fixed schedule
pub struct DayExtractor<'a, S: RecordSource + ?Sized> {
    schedule: &'a Schedule,
    source: &'a S,
    columns: &'a [FeatureColumn],
}

impl<'a, S: RecordSource + ?Sized> DayExtractor<'a, S> {
    pub fn new(schedule: &'a Schedule, source: &'a S, columns: &'a [FeatureColumn]) -> Self {
        Self {
            schedule,
            source,
            columns,
        }
    }

    /// Extract the front-month executions from `path`
    pub fn process_file(&self, path: &Path) -> FileOutcome {
        let Some(date) = trade_date_from_path(path) else {
            error!(file = %path.display(), "failed to process: file name has no YYYYMMDD date");
            return FileOutcome::Skipped(SkipReason::MalformedName);
        };
        let tag = format_trade_date(date);

        let Some(front) = self.schedule.resolve_front_month(date) else {
            warn!("no front month found for {} - outside schedule range", tag);
            return FileOutcome::Skipped(SkipReason::OutsideSchedule { date });
        };

        let mut rows = Vec::new();
        let decoded = self.source.read_records(path, &mut |rec: &TradeRecord| {
            if rec.is_execution_of(front.as_str()) {
                rows.push(rec.clone());
            }
        });
        let summary = match decoded {
            Ok(summary) => summary,
            Err(e) => {
                error!(file = %path.display(), "failed to process: {}", e);
                return FileOutcome::Skipped(SkipReason::DecodeFailed {
                    message: e.to_string(),
                });
            }
        };

        if rows.is_empty() {
            debug!(records = summary.records, "{}: no {} trades found", tag, front);
            return FileOutcome::Skipped(SkipReason::NoMatchingTrades {
                date,
                symbol: front.clone(),
            });
        }

        let columns: Vec<FeatureColumn> = self
            .columns
            .iter()
            .copied()
            .filter(|c| c.is_available(summary.depth))
            .collect();

        info!("{}: extracted {} {} trades", tag, rows.len(), front);
        FileOutcome::Extracted(DayExtract {
            file: path.to_path_buf(),
            date,
            symbol: front.clone(),
            columns,
            rows,
        })
    }
}
