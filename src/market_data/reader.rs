use crate::contract_mgmt::symbology::SymbologyManager;
use crate::core::{DecodeError, InstrumentId, RecordSource};
use crate::market_data::events::{DecodeSummary, TradeRecord};
use crate::market_data::normalizer;
use databento::dbn::{
    decode::{DbnDecoder, DbnMetadata, DecodeRecord},
    record::HasRType,
    Schema,
};
use memmap2::Mmap;
use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufReader},
    path::Path,
    sync::Arc,
};
use time::{Date, OffsetDateTime};
use tracing::{debug, warn};

const NANOS_PER_DAY: u64 = 86_400 * 1_000_000_000;

/// Name of the symbology sidecar written next to batch downloads
pub const SYMBOLOGY_FILE: &str = "symbology.json";

/// Reads `.dbn` and `.dbn.zst` files through a memory map
#[derive(Debug, Default)]
pub struct DbnFileReader {
    /// Used when a file's own metadata has no mapping for an instrument
    fallback: Option<SymbologyManager>,
}

impl DbnFileReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbology(fallback: SymbologyManager) -> Self {
        Self {
            fallback: Some(fallback),
        }
    }

    /// Reader for a data directory, picking up its `symbology.json` if present
    pub fn for_directory(dir: &Path) -> Self {
        let path = dir.join(SYMBOLOGY_FILE);
        if !path.is_file() {
            return Self::new();
        }

        match SymbologyManager::from_json_file(&path) {
            Ok(manager) => {
                debug!(
                    instruments = manager.len(),
                    "loaded fallback symbology from {}",
                    path.display()
                );
                Self::with_symbology(manager)
            }
            Err(e) => {
                warn!("ignoring unreadable {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    fn decode_stream<R: io::Read>(
        &self,
        mut decoder: DbnDecoder<R>,
        sink: &mut dyn FnMut(&TradeRecord),
    ) -> Result<DecodeSummary, DecodeError> {
        let metadata = decoder.metadata().clone();
        let schema = metadata.schema.ok_or(DecodeError::MissingSchema)?;
        let symbology = SymbologyManager::from_metadata(&metadata);
        let mut symbols = SymbolCache::new(&symbology, self.fallback.as_ref());

        match schema {
            Schema::Mbo => drain(&mut decoder, 0, normalizer::mbo_to_record, &mut symbols, sink),
            Schema::Mbp1 | Schema::Tbbo => {
                drain(&mut decoder, 1, normalizer::mbp1_to_record, &mut symbols, sink)
            }
            Schema::Mbp10 => drain(&mut decoder, 3, normalizer::mbp10_to_record, &mut symbols, sink),
            Schema::Trades => drain(&mut decoder, 0, normalizer::trade_to_record, &mut symbols, sink),
            other => Err(DecodeError::UnsupportedSchema(other.as_str().to_string())),
        }
    }
}

impl RecordSource for DbnFileReader {
    fn read_records(
        &self,
        path: &Path,
        sink: &mut dyn FnMut(&TradeRecord),
    ) -> Result<DecodeSummary, DecodeError> {
        let file = File::open(path)?;
        // SAFETY: input files are not modified while a run reads them
        let mmap = unsafe { Mmap::map(&file)? };
        let reader = BufReader::new(io::Cursor::new(&mmap[..]));

        if is_zstd(path) {
            self.decode_stream(DbnDecoder::with_zstd_buffer(reader)?, sink)
        } else {
            self.decode_stream(DbnDecoder::new(reader)?, sink)
        }
    }
}

fn drain<R, T>(
    decoder: &mut DbnDecoder<R>,
    depth: usize,
    convert: fn(&T) -> TradeRecord,
    symbols: &mut SymbolCache<'_>,
    sink: &mut dyn FnMut(&TradeRecord),
) -> Result<DecodeSummary, DecodeError>
where
    R: io::Read,
    T: HasRType + 'static,
{
    let mut records = 0u64;
    while let Some(msg) = decoder.decode_record::<T>()? {
        let mut rec = convert(msg);
        rec.symbol = symbols.lookup(rec.instrument_id, rec.ts_event);
        sink(&rec);
        records += 1;
    }
    Ok(DecodeSummary { depth, records })
}

fn is_zstd(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "zst")
}

/// Per-file memo of (instrument, UTC day) -> symbol
struct SymbolCache<'a> {
    primary: &'a SymbologyManager,
    fallback: Option<&'a SymbologyManager>,
    cache: HashMap<(InstrumentId, u64), Option<Arc<str>>>,
}

impl<'a> SymbolCache<'a> {
    fn new(primary: &'a SymbologyManager, fallback: Option<&'a SymbologyManager>) -> Self {
        Self {
            primary,
            fallback,
            cache: HashMap::new(),
        }
    }

    fn lookup(&mut self, instrument_id: InstrumentId, ts_event: u64) -> Option<Arc<str>> {
        let Self {
            primary,
            fallback,
            cache,
        } = self;
        let day = ts_event / NANOS_PER_DAY;

        cache
            .entry((instrument_id, day))
            .or_insert_with(|| {
                let date = unix_day_to_date(day);
                primary
                    .get_symbol(instrument_id, date)
                    .or_else(|| fallback.and_then(|f| f.get_symbol(instrument_id, date)))
                    .map(Arc::from)
            })
            .clone()
    }
}

fn unix_day_to_date(day: u64) -> Date {
    i64::try_from(day)
        .ok()
        .and_then(|d| d.checked_mul(86_400))
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .map_or(Date::MIN, |t| t.date())
}
