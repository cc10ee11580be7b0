use crate::core::{BookLevel, Result};
use crate::market_data::events::TradeRecord;
use crate::series::builder::ContinuousSeries;
use crate::series::columns::{FeatureColumn, DATE_COLUMN};
use crate::series::extractor::{format_trade_date, DayExtract};
use arrow::array::{
    new_null_array, ArrayRef, Float64Array, StringArray, TimestampNanosecondArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Persists a continuous series as a single Parquet file
#[derive(Debug, Clone)]
pub struct ParquetSeriesWriter {
    props: WriterProperties,
}

impl Default for ParquetSeriesWriter {
    fn default() -> Self {
        Self {
            props: WriterProperties::builder()
                .set_compression(Compression::SNAPPY)
                .build(),
        }
    }
}

impl ParquetSeriesWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output schema: the series' feature columns followed by `date`
    pub fn schema(columns: &[FeatureColumn]) -> SchemaRef {
        let mut fields: Vec<Field> = columns
            .iter()
            .map(|c| Field::new(c.name(), c.data_type(), true))
            .collect();
        fields.push(Field::new(DATE_COLUMN, DataType::Utf8, false));
        Arc::new(Schema::new(fields))
    }

    /// Write to a temporary file beside `path`, then rename over it. A failed
    /// write leaves any existing file at `path` untouched.
    pub fn write(&self, series: &ContinuousSeries, path: &Path) -> Result<()> {
        let schema = Self::schema(series.columns());
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = ArrowWriter::try_new(tmp.as_file_mut(), schema.clone(), Some(self.props.clone()))?;
            for day in series.days() {
                writer.write(&day_batch(day, series.columns(), schema.clone())?)?;
            }
            writer.close()?;
        }
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

fn day_batch(day: &DayExtract, columns: &[FeatureColumn], schema: SchemaRef) -> Result<RecordBatch> {
    let mut arrays: Vec<ArrayRef> = columns.iter().map(|&c| column_array(day, c)).collect();

    let tag = format_trade_date(day.date);
    arrays.push(Arc::new(StringArray::from_iter_values(
        std::iter::repeat(tag.as_str()).take(day.len()),
    )));

    Ok(RecordBatch::try_new(schema, arrays)?)
}

fn column_array(day: &DayExtract, column: FeatureColumn) -> ArrayRef {
    if !day.has_column(column) {
        return new_null_array(&column.data_type(), day.len());
    }

    let rows = &day.rows;
    match column {
        FeatureColumn::TsEvent => Arc::new(
            rows.iter()
                .map(|r| i64::try_from(r.ts_event).ok())
                .collect::<TimestampNanosecondArray>()
                .with_timezone("UTC"),
        ),
        FeatureColumn::Price => Arc::new(rows.iter().map(|r| r.price.to_f64()).collect::<Float64Array>()),
        FeatureColumn::Size => Arc::new(UInt32Array::from_iter_values(rows.iter().map(|r| r.size.0))),
        FeatureColumn::Side => Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.side.as_str()))),
        FeatureColumn::BidPx(l) => Arc::new(
            rows.iter()
                .map(|r| level(r, l).and_then(|b| b.bid_px.to_f64()))
                .collect::<Float64Array>(),
        ),
        FeatureColumn::AskPx(l) => Arc::new(
            rows.iter()
                .map(|r| level(r, l).and_then(|b| b.ask_px.to_f64()))
                .collect::<Float64Array>(),
        ),
        FeatureColumn::BidSz(l) => Arc::new(
            rows.iter()
                .map(|r| level(r, l).map(|b| b.bid_sz.0))
                .collect::<UInt32Array>(),
        ),
        FeatureColumn::AskSz(l) => Arc::new(
            rows.iter()
                .map(|r| level(r, l).map(|b| b.ask_sz.0))
                .collect::<UInt32Array>(),
        ),
        FeatureColumn::Symbol => Arc::new(rows.iter().map(|r| r.symbol.as_deref()).collect::<StringArray>()),
    }
}

/// Book level `l` of a row; levels the row cannot carry are null
fn level(rec: &TradeRecord, l: u8) -> Option<&BookLevel> {
    rec.levels.get(usize::from(l))
}
