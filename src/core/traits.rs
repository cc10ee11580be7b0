use crate::core::error::DecodeError;
use crate::market_data::events::{DecodeSummary, TradeRecord};
use std::path::Path;

/// Decodes one daily market data file into typed rows.
///
/// Rows are streamed to `sink` in file order so callers can filter without
/// holding the whole day in memory. Implementations must be shareable across
/// extraction workers.
pub trait RecordSource: Sync {
    fn read_records(
        &self,
        path: &Path,
        sink: &mut dyn FnMut(&TradeRecord),
    ) -> Result<DecodeSummary, DecodeError>;
}
