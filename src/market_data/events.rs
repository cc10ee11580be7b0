//! Decoded row types

use crate::core::types::{Action, BookLevel, InstrumentId, Price, Quantity, Side, BOOK_LEVELS};
use std::sync::Arc;

/// One decoded row: an execution or a book update, with book context
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub ts_event: u64,
    pub instrument_id: InstrumentId,
    /// Raw contract symbol, `None` when symbology has no mapping
    pub symbol: Option<Arc<str>>,
    pub action: Action,
    pub side: Side,
    pub price: Price,
    pub size: Quantity,
    /// Levels beyond the file's `DecodeSummary::depth` are `BookLevel::EMPTY`
    pub levels: [BookLevel; BOOK_LEVELS],
}

impl Default for TradeRecord {
    fn default() -> Self {
        Self {
            ts_event: 0,
            instrument_id: 0,
            symbol: None,
            action: Action::None,
            side: Side::None,
            price: Price::UNDEF,
            size: Quantity(0),
            levels: [BookLevel::EMPTY; BOOK_LEVELS],
        }
    }
}

impl TradeRecord {
    pub fn is_execution_of(&self, symbol: &str) -> bool {
        self.action.is_execution() && self.symbol.as_deref() == Some(symbol)
    }
}

/// What a decoder learned about a file while streaming it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeSummary {
    /// Book levels the file's schema carries (0 for MBO and trades)
    pub depth: usize,
    pub records: u64,
}
