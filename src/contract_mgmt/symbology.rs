use crate::core::{DecodeError, InstrumentId};
use databento::dbn::{Metadata, SymbolMapping};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use time::macros::format_description;
use time::Date;

/// Maps instrument IDs back to raw contract symbols such as `ZCH4`
#[derive(Debug, Clone, Default)]
pub struct SymbologyManager {
    /// (start_date, end_date exclusive, symbol) per instrument
    intervals: HashMap<InstrumentId, Vec<(Date, Date, String)>>,
}

/// Databento batch `symbology.json` sidecar
#[derive(Debug, Deserialize)]
struct SymbologyFile {
    result: HashMap<String, Vec<SymbologyInterval>>,
}

#[derive(Debug, Deserialize)]
struct SymbologyInterval {
    d0: Option<String>,
    d1: Option<String>,
    s: String,
}

impl SymbologyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the mappings embedded in a DBN file's metadata
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let mut manager = Self::new();
        for mapping in &metadata.mappings {
            manager.add_mapping(mapping);
        }
        manager
    }

    /// Load a `symbology.json` file written next to batch downloads
    pub fn from_json_file(path: &Path) -> Result<Self, DecodeError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, DecodeError> {
        let file: SymbologyFile = serde_json::from_str(content)?;
        let format = format_description!("[year]-[month]-[day]");
        let parse = |d: &Option<String>, default: Date| {
            d.as_deref()
                .and_then(|s| Date::parse(s, &format).ok())
                .unwrap_or(default)
        };

        let mut manager = Self::new();
        for (symbol, intervals) in &file.result {
            for interval in intervals {
                if let Ok(inst_id) = interval.s.parse::<InstrumentId>() {
                    manager.insert(
                        inst_id,
                        parse(&interval.d0, Date::MIN),
                        parse(&interval.d1, Date::MAX),
                        symbol,
                    );
                }
            }
        }
        Ok(manager)
    }

    /// Add a single symbol mapping. Either side of the mapping may hold the
    /// instrument ID depending on the request's input symbology.
    pub fn add_mapping(&mut self, mapping: &SymbolMapping) {
        for interval in &mapping.intervals {
            if let Ok(inst_id) = interval.symbol.parse::<InstrumentId>() {
                self.insert(inst_id, interval.start_date, interval.end_date, &mapping.raw_symbol);
            } else if let Ok(inst_id) = mapping.raw_symbol.parse::<InstrumentId>() {
                if !interval.symbol.is_empty() {
                    self.insert(inst_id, interval.start_date, interval.end_date, &interval.symbol);
                }
            }
        }
    }

    fn insert(&mut self, inst_id: InstrumentId, start: Date, end: Date, symbol: &str) {
        self.intervals
            .entry(inst_id)
            .or_default()
            .push((start, end, symbol.to_string()));
    }

    /// Symbol for an instrument on a date. Falls back to the latest known
    /// mapping when no interval covers the date.
    pub fn get_symbol(&self, instrument_id: InstrumentId, date: Date) -> Option<&str> {
        let intervals = self.intervals.get(&instrument_id)?;
        intervals
            .iter()
            .find(|(start, end, _)| date >= *start && date < *end)
            .or_else(|| intervals.iter().max_by(|a, b| (a.1, &a.2).cmp(&(b.1, &b.2))))
            .map(|(_, _, symbol)| symbol.as_str())
    }

    /// Check if an instrument ID is known
    pub fn contains_instrument(&self, instrument_id: InstrumentId) -> bool {
        self.intervals.contains_key(&instrument_id)
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}
