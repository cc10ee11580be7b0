use crate::contract_mgmt::selector::ScheduleParams;
use crate::core::{FrontMonthError, Result, BOOK_LEVELS};
use crate::series::columns::{FeatureColumn, FEATURE_COLUMNS};
use std::collections::HashSet;
use std::path::PathBuf;

/// Output file used when none is given
pub const DEFAULT_OUTPUT: &str = "corn_front_month_trades.parquet";

/// Settings for one series build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesConfig {
    pub data_dir: PathBuf,
    pub output_path: PathBuf,
    pub schedule: ScheduleParams,
    pub columns: Vec<FeatureColumn>,
    /// Extraction threads; 1 processes files strictly in order
    pub workers: usize,
}

impl SeriesConfig {
    /// Corn defaults for the given data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            schedule: ScheduleParams::default(),
            columns: FEATURE_COLUMNS.to_vec(),
            workers: 1,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.schedule.validate()?;

        if self.columns.is_empty() {
            return Err(FrontMonthError::InvalidConfiguration(
                "at least one feature column is required".into(),
            ));
        }
        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.level().is_some_and(|l| l >= BOOK_LEVELS) {
                return Err(FrontMonthError::InvalidConfiguration(format!(
                    "feature column {} is past the last book level {:02}",
                    column,
                    BOOK_LEVELS - 1
                )));
            }
            if !seen.insert(column) {
                return Err(FrontMonthError::InvalidConfiguration(format!(
                    "feature column {} listed twice",
                    column
                )));
            }
        }

        if self.workers == 0 {
            return Err(FrontMonthError::InvalidConfiguration(
                "worker count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
