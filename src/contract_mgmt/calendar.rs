use crate::core::{FrontMonthError, Result};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use time::{Date, Month, Weekday};

/// CME month codes in calendar order
pub const CME_MONTH_CODES: [(char, Month); 12] = [
    ('F', Month::January),
    ('G', Month::February),
    ('H', Month::March),
    ('J', Month::April),
    ('K', Month::May),
    ('M', Month::June),
    ('N', Month::July),
    ('Q', Month::August),
    ('U', Month::September),
    ('V', Month::October),
    ('X', Month::November),
    ('Z', Month::December),
];

/// A delivery month identified by its single-letter code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContractMonth {
    code: char,
    month: Month,
}

impl ContractMonth {
    /// Create a delivery month with an arbitrary code letter
    pub fn new(code: char, month: Month) -> Result<Self> {
        if !code.is_ascii_uppercase() {
            return Err(FrontMonthError::InvalidConfiguration(format!(
                "month code {:?} must be a single uppercase ASCII letter",
                code
            )));
        }
        Ok(Self { code, month })
    }

    /// Create from the standard CME month code
    pub fn from_code(code: char) -> Option<Self> {
        let code = code.to_ascii_uppercase();
        CME_MONTH_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|&(code, month)| Self { code, month })
    }

    /// Get the single-letter code
    pub fn code(&self) -> char {
        self.code
    }

    pub fn month(&self) -> Month {
        self.month
    }
}

/// The delivery months a contract family trades, e.g. H/K/N/U/Z for corn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryCycle {
    months: Vec<ContractMonth>,
}

impl DeliveryCycle {
    /// Build a cycle, rejecting empty maps and duplicated codes or months
    pub fn new(months: Vec<ContractMonth>) -> Result<Self> {
        if months.is_empty() {
            return Err(FrontMonthError::InvalidConfiguration(
                "month map must contain at least one month code".into(),
            ));
        }

        let mut codes = HashSet::new();
        let mut calendar = HashSet::new();
        for m in &months {
            if !codes.insert(m.code) {
                return Err(FrontMonthError::InvalidConfiguration(format!(
                    "month code {} appears more than once",
                    m.code
                )));
            }
            if !calendar.insert(m.month) {
                return Err(FrontMonthError::InvalidConfiguration(format!(
                    "calendar month {} is mapped by more than one code",
                    m.month
                )));
            }
        }

        Ok(Self { months })
    }

    /// Corn, wheat and other grains: Mar, May, Jul, Sep, Dec
    pub fn corn() -> Self {
        Self::from_standard_codes(&['H', 'K', 'N', 'U', 'Z'])
    }

    /// Equity index style quarterly cycle
    pub fn quarterly() -> Self {
        Self::from_standard_codes(&['H', 'M', 'U', 'Z'])
    }

    /// Every calendar month (energy and similar)
    pub fn monthly() -> Self {
        let months = CME_MONTH_CODES
            .iter()
            .map(|&(code, month)| ContractMonth { code, month })
            .collect();
        Self { months }
    }

    fn from_standard_codes(codes: &[char]) -> Self {
        let months = codes
            .iter()
            .filter_map(|&c| ContractMonth::from_code(c))
            .collect();
        Self { months }
    }

    pub fn months(&self) -> &[ContractMonth] {
        &self.months
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

impl Default for DeliveryCycle {
    fn default() -> Self {
        Self::corn()
    }
}

/// Parses `"H=3,K=5,N=7"`. A bare letter (`"H"`) takes its standard CME month.
impl FromStr for DeliveryCycle {
    type Err = FrontMonthError;

    fn from_str(s: &str) -> Result<Self> {
        let mut months = Vec::new();

        for item in s.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            let (code, number) = match item.split_once('=') {
                Some((code, number)) => (code.trim(), Some(number.trim())),
                None => (item, None),
            };

            let mut chars = code.chars();
            let (Some(letter), None) = (chars.next(), chars.next()) else {
                return Err(FrontMonthError::InvalidConfiguration(format!(
                    "month code {:?} must be exactly one letter",
                    code
                )));
            };

            let month = match number {
                Some(number) => {
                    let n: u8 = number.parse().map_err(|_| {
                        FrontMonthError::InvalidConfiguration(format!(
                            "month number {:?} for code {} is not an integer",
                            number, letter
                        ))
                    })?;
                    let month = Month::try_from(n).map_err(|_| {
                        FrontMonthError::InvalidConfiguration(format!(
                            "month number {} for code {} is outside 1-12",
                            n, letter
                        ))
                    })?;
                    ContractMonth::new(letter, month)?
                }
                None => ContractMonth::from_code(letter).ok_or_else(|| {
                    FrontMonthError::InvalidConfiguration(format!(
                        "{} is not a standard month code; use CODE=MONTH",
                        letter
                    ))
                })?,
            };
            months.push(month);
        }

        Self::new(months)
    }
}

impl fmt::Display for DeliveryCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, m) in self.months.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", m.code, u8::from(m.month))?;
        }
        Ok(())
    }
}

/// Reject expiration days that can never appear in a month
pub fn validate_expiration_day(day: u8) -> Result<()> {
    if (1..=31).contains(&day) {
        Ok(())
    } else {
        Err(FrontMonthError::InvalidConfiguration(format!(
            "expiration day {} is outside 1-31",
            day
        )))
    }
}

/// Expiration for a delivery month: the nominal day (clamped to the month's
/// length), moved back to the previous weekday when it lands on a weekend.
pub fn get_expiration_date(year: i32, month: Month, nominal_day: u8) -> Result<Date> {
    let day = nominal_day.min(month.length(year));
    let nominal = Date::from_calendar_date(year, month, day).map_err(|e| {
        FrontMonthError::InvalidConfiguration(format!(
            "cannot build expiration for {}-{}: {}",
            year, month, e
        ))
    })?;
    Ok(roll_back_over_weekend(nominal))
}

/// Step back one day at a time until the date is a weekday
pub fn roll_back_over_weekend(mut date: Date) -> Date {
    while is_weekend(date) {
        match date.previous_day() {
            Some(prev) => date = prev,
            None => break,
        }
    }
    date
}

pub fn is_weekend(date: Date) -> bool {
    matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_contract_month_from_code() {
        let h = ContractMonth::from_code('H').unwrap();
        assert_eq!(h.month(), Month::March);
        assert_eq!(ContractMonth::from_code('z').unwrap().code(), 'Z');
        assert_eq!(ContractMonth::from_code('I'), None);
        assert!(ContractMonth::new('h', Month::March).is_err());
    }

    #[test]
    fn test_presets() {
        let codes: String = DeliveryCycle::corn().months().iter().map(|m| m.code()).collect();
        assert_eq!(codes, "HKNUZ");
        assert_eq!(DeliveryCycle::quarterly().len(), 4);
        assert_eq!(DeliveryCycle::monthly().len(), 12);
        assert_eq!(DeliveryCycle::default(), DeliveryCycle::corn());
    }

    #[test]
    fn test_parse_cycle() {
        let cycle: DeliveryCycle = "H=3, K=5,N=7,U=9,Z=12".parse().unwrap();
        assert_eq!(cycle, DeliveryCycle::corn());
        assert_eq!(cycle.to_string(), "H=3,K=5,N=7,U=9,Z=12");

        let bare: DeliveryCycle = "H,M,U,Z".parse().unwrap();
        assert_eq!(bare, DeliveryCycle::quarterly());

        // Non-standard letters are fine with an explicit month
        let custom: DeliveryCycle = "A=1".parse().unwrap();
        assert_eq!(custom.months()[0].month(), Month::January);
    }

    #[test]
    fn test_parse_cycle_errors() {
        for bad in ["", "HK=3", "H=13", "H=x", "H=3,H=5", "H=3,K=3", "A"] {
            assert!(
                matches!(
                    bad.parse::<DeliveryCycle>(),
                    Err(FrontMonthError::InvalidConfiguration(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_expiration_on_weekday_is_unchanged() {
        // March 14 2024 is a Thursday
        assert_eq!(
            get_expiration_date(2024, Month::March, 14).unwrap(),
            date!(2024 - 03 - 14)
        );
    }

    #[test]
    fn test_expiration_rolls_back_over_weekend() {
        // Saturday -> Friday
        assert_eq!(
            get_expiration_date(2024, Month::September, 14).unwrap(),
            date!(2024 - 09 - 13)
        );
        // Sunday -> Friday
        assert_eq!(
            get_expiration_date(2024, Month::July, 14).unwrap(),
            date!(2024 - 07 - 12)
        );
        assert_eq!(
            get_expiration_date(2025, Month::December, 14).unwrap(),
            date!(2025 - 12 - 12)
        );
    }

    #[test]
    fn test_expiration_day_clamped_to_month_length() {
        // Feb 29 2024 is a Thursday
        assert_eq!(
            get_expiration_date(2024, Month::February, 31).unwrap(),
            date!(2024 - 02 - 29)
        );
        // Nov 30 2024 is a Saturday
        assert_eq!(
            get_expiration_date(2024, Month::November, 31).unwrap(),
            date!(2024 - 11 - 29)
        );
    }

    #[test]
    fn test_roll_can_cross_month_start() {
        // June 1 2025 is a Sunday
        assert_eq!(
            roll_back_over_weekend(date!(2025 - 06 - 01)),
            date!(2025 - 05 - 30)
        );
    }

    #[test]
    fn test_validate_expiration_day() {
        assert!(validate_expiration_day(1).is_ok());
        assert!(validate_expiration_day(31).is_ok());
        assert!(validate_expiration_day(0).is_err());
        assert!(validate_expiration_day(32).is_err());
    }
}
