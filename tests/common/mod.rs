//! Shared fixtures for the integration tests

#![allow(dead_code)]

use databento::dbn::{
    encode::{DbnEncoder, EncodeRecord},
    enums::{rtype, Action as DbnAction, SType, Side as DbnSide},
    record::{MboMsg, RecordHeader},
    FlagSet, MappingInterval, MetadataBuilder, Schema, SymbolMapping,
};
use frontmonth::core::{Action, BookLevel, DecodeError, Price, Quantity, RecordSource, Side};
use frontmonth::market_data::{DecodeSummary, TradeRecord};
use std::collections::HashMap;
use std::ffi::c_char;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use time::OffsetDateTime;

/// In-memory decoder keyed by file name. Files it does not know fail to decode.
#[derive(Default)]
pub struct FakeSource {
    files: HashMap<String, (usize, Vec<TradeRecord>)>,
}

impl FakeSource {
    pub fn with(mut self, name: &str, depth: usize, rows: Vec<TradeRecord>) -> Self {
        self.files.insert(name.to_string(), (depth, rows));
        self
    }

    /// Create an empty placeholder for every known file so discovery sees them
    pub fn touch_all(&self, dir: &Path) {
        for name in self.files.keys() {
            fs::write(dir.join(name), b"").unwrap();
        }
    }
}

impl RecordSource for FakeSource {
    fn read_records(
        &self,
        path: &Path,
        sink: &mut dyn FnMut(&TradeRecord),
    ) -> Result<DecodeSummary, DecodeError> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let (depth, rows) = self.files.get(name).ok_or_else(|| {
            DecodeError::UnsupportedSchema(format!("no fixture for {}", name))
        })?;
        for row in rows {
            sink(row);
        }
        Ok(DecodeSummary {
            depth: *depth,
            records: rows.len() as u64,
        })
    }
}

/// Execution of `symbol` at `px` (whole price units) `secs` into the day
pub fn trade(day_start_ns: u64, secs: u64, symbol: &str, px: i64, size: u32) -> TradeRecord {
    TradeRecord {
        ts_event: day_start_ns + secs * 1_000_000_000,
        instrument_id: 1,
        symbol: Some(Arc::from(symbol)),
        action: Action::Trade,
        side: Side::Bid,
        price: Price::from(px),
        size: Quantity(size),
        levels: [
            BookLevel {
                bid_px: Price::from(px),
                ask_px: Price::from(px + 1),
                bid_sz: Quantity(10),
                ask_sz: Quantity(11),
            },
            BookLevel::EMPTY,
            BookLevel::EMPTY,
        ],
    }
}

/// Resting order event that must never reach the output
pub fn add(day_start_ns: u64, symbol: &str, px: i64) -> TradeRecord {
    TradeRecord {
        action: Action::Add,
        ..trade(day_start_ns, 0, symbol, px, 1)
    }
}

pub const MAR_13_2024: u64 = 1_710_288_000_000_000_000;
pub const MAR_14_2024: u64 = 1_710_374_400_000_000_000;
pub const MAR_15_2024: u64 = 1_710_460_800_000_000_000;
pub const SEP_13_2024: u64 = 1_726_185_600_000_000_000;

/// MBO execution or book event for a DBN fixture file
pub fn mbo_msg(ts_event: u64, instrument_id: u32, action: DbnAction, px: i64, sz: u32) -> MboMsg {
    MboMsg {
        hd: RecordHeader::new::<MboMsg>(rtype::MBO, 1, instrument_id, ts_event),
        order_id: 1,
        price: px,
        size: sz,
        flags: FlagSet::empty(),
        channel_id: 0,
        action: Into::<u8>::into(action) as c_char,
        side: Into::<u8>::into(DbnSide::Ask) as c_char,
        ts_recv: ts_event,
        ts_in_delta: 0,
        sequence: 0,
    }
}

/// Write an MBO DBN file whose metadata maps each `(raw_symbol, instrument_id)`
/// for the day starting at `day_start_ns`
pub fn write_mbo_file(
    path: &Path,
    day_start_ns: u64,
    symbols: &[(&str, u32)],
    records: &[MboMsg],
) {
    let start = OffsetDateTime::from_unix_timestamp_nanos(i128::from(day_start_ns))
        .unwrap()
        .date();
    let mappings = symbols
        .iter()
        .map(|(raw, id)| SymbolMapping {
            raw_symbol: raw.to_string(),
            intervals: vec![MappingInterval {
                start_date: start,
                end_date: start.next_day().unwrap(),
                symbol: id.to_string(),
            }],
        })
        .collect();
    let metadata = MetadataBuilder::new()
        .dataset("GLBX.MDP3")
        .schema(Some(Schema::Mbo))
        .start(day_start_ns)
        .stype_in(Some(SType::RawSymbol))
        .stype_out(SType::InstrumentId)
        .mappings(mappings)
        .build();

    let file = fs::File::create(path).unwrap();
    let zstd = path.extension().is_some_and(|ext| ext == "zst");
    if zstd {
        let mut encoder = DbnEncoder::with_zstd(file, &metadata).unwrap();
        for rec in records {
            encoder.encode_record(rec).unwrap();
        }
        encoder.flush().unwrap();
    } else {
        let mut encoder = DbnEncoder::new(file, &metadata).unwrap();
        for rec in records {
            encoder.encode_record(rec).unwrap();
        }
        encoder.flush().unwrap();
    }
}
