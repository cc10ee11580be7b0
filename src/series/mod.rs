pub mod builder;
pub mod columns;
pub mod extractor;
pub mod writer;

pub use builder::{discover_input_files, ContinuousSeries, RunSummary, SeriesBuilder};
pub use columns::{FeatureColumn, DATE_COLUMN, FEATURE_COLUMNS};
pub use extractor::{DayExtract, DayExtractor, FileOutcome, SkipReason};
pub use writer::ParquetSeriesWriter;
