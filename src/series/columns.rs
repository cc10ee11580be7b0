use crate::core::{FrontMonthError, BOOK_LEVELS};
use arrow::datatypes::{DataType, TimeUnit};
use std::fmt;
use std::str::FromStr;

/// Name of the trade-date tag appended to every output row
pub const DATE_COLUMN: &str = "date";

/// A column that can be carried from a decoded trade into the series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    TsEvent,
    Price,
    Size,
    Side,
    BidPx(u8),
    AskPx(u8),
    BidSz(u8),
    AskSz(u8),
    Symbol,
}

/// Every feature column, in output order
pub const FEATURE_COLUMNS: [FeatureColumn; 17] = [
    FeatureColumn::TsEvent,
    FeatureColumn::Price,
    FeatureColumn::Size,
    FeatureColumn::Side,
    FeatureColumn::BidPx(0),
    FeatureColumn::AskPx(0),
    FeatureColumn::BidSz(0),
    FeatureColumn::AskSz(0),
    FeatureColumn::BidPx(1),
    FeatureColumn::AskPx(1),
    FeatureColumn::BidSz(1),
    FeatureColumn::AskSz(1),
    FeatureColumn::BidPx(2),
    FeatureColumn::AskPx(2),
    FeatureColumn::BidSz(2),
    FeatureColumn::AskSz(2),
    FeatureColumn::Symbol,
];

impl FeatureColumn {
    pub fn name(&self) -> String {
        match self {
            FeatureColumn::TsEvent => "ts_event".to_string(),
            FeatureColumn::Price => "price".to_string(),
            FeatureColumn::Size => "size".to_string(),
            FeatureColumn::Side => "side".to_string(),
            FeatureColumn::BidPx(l) => format!("bid_px_{:02}", l),
            FeatureColumn::AskPx(l) => format!("ask_px_{:02}", l),
            FeatureColumn::BidSz(l) => format!("bid_sz_{:02}", l),
            FeatureColumn::AskSz(l) => format!("ask_sz_{:02}", l),
            FeatureColumn::Symbol => "symbol".to_string(),
        }
    }

    /// Book level the column reads, if any
    pub fn level(&self) -> Option<usize> {
        match *self {
            FeatureColumn::BidPx(l)
            | FeatureColumn::AskPx(l)
            | FeatureColumn::BidSz(l)
            | FeatureColumn::AskSz(l) => Some(l as usize),
            _ => None,
        }
    }

    /// Whether a file whose schema carries `depth` book levels has this column.
    /// Levels past `BOOK_LEVELS` are never carried, whatever the depth.
    pub fn is_available(&self, depth: usize) -> bool {
        self.level().map_or(true, |l| l < depth.min(BOOK_LEVELS))
    }

    pub fn data_type(&self) -> DataType {
        match self {
            FeatureColumn::TsEvent => DataType::Timestamp(TimeUnit::Nanosecond, Some("UTC".into())),
            FeatureColumn::Price | FeatureColumn::BidPx(_) | FeatureColumn::AskPx(_) => DataType::Float64,
            FeatureColumn::Size | FeatureColumn::BidSz(_) | FeatureColumn::AskSz(_) => DataType::UInt32,
            FeatureColumn::Side | FeatureColumn::Symbol => DataType::Utf8,
        }
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for FeatureColumn {
    type Err = FrontMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        FEATURE_COLUMNS
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| {
                FrontMonthError::InvalidConfiguration(format!(
                    "unknown feature column {:?}; book columns go up to level {:02}",
                    s,
                    BOOK_LEVELS - 1
                ))
            })
    }
}
