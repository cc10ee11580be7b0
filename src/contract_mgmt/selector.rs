use crate::contract_mgmt::calendar::{get_expiration_date, validate_expiration_day, ContractMonth, DeliveryCycle};
use crate::core::{FrontMonthError, Result};
use std::collections::HashSet;
use std::fmt;
use time::Date;

/// How many trailing digits of the contract year go into the symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearDigits {
    /// `ZCH4`. Unambiguous only over a horizon of at most ten years.
    #[default]
    One,
    /// `ZCH24`
    Two,
}

impl YearDigits {
    pub fn from_count(count: u8) -> Result<Self> {
        match count {
            1 => Ok(YearDigits::One),
            2 => Ok(YearDigits::Two),
            n => Err(FrontMonthError::InvalidConfiguration(format!(
                "year digits must be 1 or 2, got {}",
                n
            ))),
        }
    }

    pub fn suffix(&self, year: i32) -> String {
        match self {
            YearDigits::One => year.rem_euclid(10).to_string(),
            YearDigits::Two => format!("{:02}", year.rem_euclid(100)),
        }
    }
}

/// A futures contract symbol such as `ZCH4`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContractSymbol(String);

impl ContractSymbol {
    /// Root + month code + year suffix
    pub fn new(root: &str, month: ContractMonth, year: i32, digits: YearDigits) -> Self {
        Self(format!("{}{}{}", root, month.code(), digits.suffix(year)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for ContractSymbol {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ContractSymbol {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One contract and the last date it is treated as front month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub expiration: Date,
    pub symbol: ContractSymbol,
    pub month: ContractMonth,
    pub year: i32,
}

/// Everything needed to turn a year range into contracts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleParams {
    pub root: String,
    pub cycle: DeliveryCycle,
    pub expiration_day: u8,
    pub year_digits: YearDigits,
}

impl ScheduleParams {
    pub fn validate(&self) -> Result<()> {
        if self.root.is_empty() || !self.root.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(FrontMonthError::InvalidConfiguration(format!(
                "product root {:?} must be non-empty and alphanumeric",
                self.root
            )));
        }
        if self.cycle.is_empty() {
            return Err(FrontMonthError::InvalidConfiguration(
                "month map must contain at least one month code".into(),
            ));
        }
        validate_expiration_day(self.expiration_day)
    }
}

impl Default for ScheduleParams {
    fn default() -> Self {
        Self {
            root: "ZC".to_string(),
            cycle: DeliveryCycle::corn(),
            expiration_day: 14,
            year_digits: YearDigits::One,
        }
    }
}

/// Expiration schedule ordered by expiration date
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

/// Generate every contract expiring in `[start_year, end_year]`
pub fn build_schedule(start_year: i32, end_year: i32, params: &ScheduleParams) -> Result<Schedule> {
    if start_year > end_year {
        return Err(FrontMonthError::InvalidRange {
            start: start_year,
            end: end_year,
        });
    }
    params.validate()?;

    let mut entries = Vec::with_capacity(((end_year - start_year + 1) as usize) * params.cycle.len());
    for year in start_year..=end_year {
        for &month in params.cycle.months() {
            let expiration = get_expiration_date(year, month.month(), params.expiration_day)?;
            entries.push(ScheduleEntry {
                expiration,
                symbol: ContractSymbol::new(&params.root, month, year, params.year_digits),
                month,
                year,
            });
        }
    }

    // Cycle order is insertion order, not necessarily calendar order
    entries.sort_by_key(|e| e.expiration);

    let mut seen = HashSet::with_capacity(entries.len());
    for entry in &entries {
        if !seen.insert(entry.symbol.as_str()) {
            return Err(FrontMonthError::AmbiguousSymbol {
                symbol: entry.symbol.to_string(),
            });
        }
    }

    Ok(Schedule { entries })
}

impl Schedule {
    /// Front month for `date`: the first contract whose expiration is on or
    /// after it. `None` once the date is past the schedule horizon.
    pub fn resolve_front_month(&self, date: Date) -> Option<&ContractSymbol> {
        self.front_month_entry(date).map(|e| &e.symbol)
    }

    pub fn front_month_entry(&self, date: Date) -> Option<&ScheduleEntry> {
        let idx = self.entries.partition_point(|e| e.expiration < date);
        self.entries.get(idx)
    }

    /// Look up a contract by symbol
    pub fn entry_for(&self, symbol: &str) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.symbol == symbol)
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn first(&self) -> Option<&ScheduleEntry> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&ScheduleEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use time::{Month, Weekday};

    fn corn(start: i32, end: i32) -> Schedule {
        build_schedule(start, end, &ScheduleParams::default()).unwrap()
    }

    #[test]
    fn test_contract_symbol() {
        let march = ContractMonth::from_code('H').unwrap();
        assert_eq!(ContractSymbol::new("ZC", march, 2024, YearDigits::One), "ZCH4");
        assert_eq!(ContractSymbol::new("ZC", march, 2024, YearDigits::Two), "ZCH24");
        assert_eq!(ContractSymbol::new("ES", march, 2030, YearDigits::Two), "ESH30");
        assert_eq!(ContractSymbol::new("ES", march, 2030, YearDigits::One).to_string(), "ESH0");
    }

    #[test]
    fn test_known_corn_expirations() {
        let schedule = corn(2024, 2026);
        assert_eq!(schedule.len(), 15);

        let h4 = schedule.entry_for("ZCH4").unwrap();
        assert_eq!(h4.expiration, date!(2024 - 03 - 14));

        // Sept 14 2024 is a Saturday
        let u4 = schedule.entry_for("ZCU4").unwrap();
        assert_eq!(u4.expiration, date!(2024 - 09 - 13));

        assert_eq!(schedule.first().unwrap().symbol, "ZCH4");
        assert_eq!(schedule.last().unwrap().symbol, "ZCZ6");
    }

    #[test]
    fn test_schedule_ordered_unique_and_on_weekdays() {
        for (start, end) in [(2020, 2020), (2020, 2029), (1999, 2003), (2024, 2026)] {
            let schedule = corn(start, end);
            let symbols: HashSet<_> = schedule.iter().map(|e| e.symbol.clone()).collect();
            assert_eq!(symbols.len(), schedule.len());

            for pair in schedule.entries().windows(2) {
                assert!(pair[0].expiration < pair[1].expiration);
            }
            for entry in schedule.iter() {
                assert!(!matches!(
                    entry.expiration.weekday(),
                    Weekday::Saturday | Weekday::Sunday
                ));
            }
        }
    }

    #[test]
    fn test_cycle_insertion_order_is_sorted() {
        let params = ScheduleParams {
            cycle: "Z=12,H=3,U=9".parse().unwrap(),
            ..ScheduleParams::default()
        };
        let schedule = build_schedule(2024, 2024, &params).unwrap();
        let symbols: Vec<_> = schedule.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["ZCH4", "ZCU4", "ZCZ4"]);
    }

    #[test]
    fn test_invalid_range() {
        let err = build_schedule(2026, 2024, &ScheduleParams::default()).unwrap_err();
        assert!(matches!(err, FrontMonthError::InvalidRange { start: 2026, end: 2024 }));
    }

    #[test]
    fn test_invalid_params() {
        let bad_root = ScheduleParams {
            root: String::new(),
            ..ScheduleParams::default()
        };
        assert!(matches!(
            build_schedule(2024, 2024, &bad_root),
            Err(FrontMonthError::InvalidConfiguration(_))
        ));

        let bad_day = ScheduleParams {
            expiration_day: 0,
            ..ScheduleParams::default()
        };
        assert!(matches!(
            build_schedule(2024, 2024, &bad_day),
            Err(FrontMonthError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_single_digit_collision_is_rejected() {
        let err = build_schedule(2020, 2030, &ScheduleParams::default()).unwrap_err();
        assert!(matches!(err, FrontMonthError::AmbiguousSymbol { .. }));

        let params = ScheduleParams {
            year_digits: YearDigits::Two,
            ..ScheduleParams::default()
        };
        let schedule = build_schedule(2020, 2030, &params).unwrap();
        assert_eq!(schedule.len(), 55);
        assert!(schedule.entry_for("ZCH30").is_some());
    }

    #[test]
    fn test_resolve_front_month() {
        let schedule = corn(2024, 2025);

        assert_eq!(schedule.resolve_front_month(date!(2024 - 01 - 02)).unwrap(), "ZCH4");
        assert_eq!(schedule.resolve_front_month(date!(2024 - 06 - 01)).unwrap(), "ZCN4");
        assert_eq!(schedule.resolve_front_month(date!(2024 - 12 - 20)).unwrap(), "ZCH5");
    }

    #[test]
    fn test_resolve_inclusive_boundary() {
        let schedule = corn(2024, 2025);

        // Expiration day itself still belongs to the expiring contract
        assert_eq!(schedule.resolve_front_month(date!(2024 - 03 - 14)).unwrap(), "ZCH4");
        assert_eq!(schedule.resolve_front_month(date!(2024 - 03 - 15)).unwrap(), "ZCK4");

        // Rolled expiration: Friday the 13th is the last day for ZCU4
        assert_eq!(schedule.resolve_front_month(date!(2024 - 09 - 13)).unwrap(), "ZCU4");
        assert_eq!(schedule.resolve_front_month(date!(2024 - 09 - 14)).unwrap(), "ZCZ4");
    }

    #[test]
    fn test_resolve_outside_horizon() {
        let schedule = corn(2024, 2024);
        let last = schedule.last().unwrap().expiration;
        assert_eq!(last, date!(2024 - 12 - 13));

        assert!(schedule.resolve_front_month(last).is_some());
        assert!(schedule.resolve_front_month(date!(2024 - 12 - 14)).is_none());
        assert!(schedule.resolve_front_month(date!(2031 - 01 - 01)).is_none());

        // Everything on or before the first expiration maps to the first contract
        assert_eq!(schedule.resolve_front_month(date!(1990 - 01 - 01)).unwrap(), "ZCH4");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let schedule = corn(2024, 2026);
        let mut date = date!(2024 - 01 - 01);
        while date <= date!(2026 - 12 - 31) {
            let a = schedule.resolve_front_month(date).cloned();
            let b = schedule.resolve_front_month(date).cloned();
            assert_eq!(a, b);

            // Matches a plain linear scan
            let linear = schedule.iter().find(|e| e.expiration >= date).map(|e| e.symbol.clone());
            assert_eq!(a, linear);
            date = date.next_day().unwrap();
        }
    }

    #[test]
    fn test_monthly_cycle() {
        let params = ScheduleParams {
            root: "CL".to_string(),
            cycle: DeliveryCycle::monthly(),
            expiration_day: 20,
            year_digits: YearDigits::One,
        };
        let schedule = build_schedule(2024, 2024, &params).unwrap();
        assert_eq!(schedule.len(), 12);
        let jan = schedule.first().unwrap();
        assert_eq!(jan.symbol, "CLF4");
        assert_eq!(jan.month.month(), Month::January);
        // Jan 20 2024 is a Saturday
        assert_eq!(jan.expiration, date!(2024 - 01 - 19));
    }
}
