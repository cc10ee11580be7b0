use std::fmt;

/// Instrument identifier
pub type InstrumentId = u32;

/// Sentinel used by the feed for an unset price
pub const UNDEF_PRICE: i64 = i64::MAX;

/// Book levels carried alongside each trade (levels 0-2)
pub const BOOK_LEVELS: usize = 3;

/// Price in fixed point representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(pub i64);

impl Price {
    pub const UNDEF: Price = Price(UNDEF_PRICE);

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 1e9
    }

    pub fn is_defined(&self) -> bool {
        self.0 != UNDEF_PRICE
    }

    /// Decimal price, or `None` for the undefined sentinel
    pub fn to_f64(&self) -> Option<f64> {
        self.is_defined().then(|| self.as_f64())
    }
}

impl From<i64> for Price {
    fn from(value: i64) -> Self {
        Self(value * 1_000_000_000) // Convert to fixed point
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_f64() {
            Some(px) => write!(f, "{:.4}", px),
            None => f.write_str("UNDEF"),
        }
    }
}

/// Quantity/Size
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Quantity(pub u32);

impl Quantity {
    pub fn new(value: u32) -> Self {
        Self(value)
    }
}

impl From<u32> for Quantity {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Aggressor side of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    Ask,
    Bid,
    #[default]
    None,
}

impl Side {
    pub fn from_char(c: char) -> Self {
        match c {
            'A' => Side::Ask,
            'B' => Side::Bid,
            _ => Side::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Ask => "A",
            Side::Bid => "B",
            Side::None => "N",
        }
    }
}

/// Event action as published in the market-by-order feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    Add,
    Cancel,
    Modify,
    Clear,
    Trade,
    Fill,
    #[default]
    None,
}

impl Action {
    pub fn from_char(c: char) -> Self {
        match c {
            'A' => Action::Add,
            'C' => Action::Cancel,
            'M' => Action::Modify,
            'R' => Action::Clear,
            'T' => Action::Trade,
            'F' => Action::Fill,
            _ => Action::None,
        }
    }

    /// Executions are the only rows kept in the series
    pub fn is_execution(&self) -> bool {
        matches!(self, Action::Trade)
    }
}

/// One level of top-of-book context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BookLevel {
    pub bid_px: Price,
    pub ask_px: Price,
    pub bid_sz: Quantity,
    pub ask_sz: Quantity,
}

impl BookLevel {
    pub const EMPTY: BookLevel = BookLevel {
        bid_px: Price::UNDEF,
        ask_px: Price::UNDEF,
        bid_sz: Quantity(0),
        ask_sz: Quantity(0),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_conversion() {
        assert_eq!(Price::from(4i64).as_f64(), 4.0);
        assert_eq!(Price::new(452_250_000_000).to_f64(), Some(452.25));
        assert_eq!(Price::UNDEF.to_f64(), None);
        assert_eq!(Price::UNDEF.to_string(), "UNDEF");
    }

    #[test]
    fn test_side_and_action_codes() {
        assert_eq!(Side::from_char('A'), Side::Ask);
        assert_eq!(Side::from_char('B').as_str(), "B");
        assert_eq!(Side::from_char('x'), Side::None);

        assert!(Action::from_char('T').is_execution());
        assert!(!Action::from_char('F').is_execution());
        assert_eq!(Action::from_char('R'), Action::Clear);
    }
}
