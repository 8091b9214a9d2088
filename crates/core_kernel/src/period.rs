//! Settlement periods
//!
//! A settlement period is one calendar month; balances are netted into bills
//! once per period per organization. Periods are labelled `YYYY-MM` (e.g.,
//! "2026-01") and that label is what bills carry and what the database
//! stores.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to settlement periods
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Invalid period label: {0}")]
    InvalidLabel(String),

    #[error("Invalid month: {0}")]
    InvalidMonth(u32),
}

/// One calendar-month settlement period
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SettlementPeriod {
    year: i32,
    month: u32,
}

impl SettlementPeriod {
    /// Creates a period from a year and a 1-based month
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// Returns the period containing the given instant (UTC)
    pub fn containing(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    /// Returns the current period
    pub fn current() -> Self {
        Self::containing(Utc::now())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns the following period
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Returns the preceding period
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// First instant of the period (midnight UTC on the first of the month)
    ///
    /// This is also the moment the monthly netting run is scheduled for.
    pub fn start(&self) -> DateTime<Utc> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("validated year-month is always a valid date");
        Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
    }

    /// First instant of the following period (exclusive end bound)
    pub fn end(&self) -> DateTime<Utc> {
        self.next().start()
    }

    /// Returns true if the instant falls inside this period
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start() && at < self.end()
    }

    /// The `YYYY-MM` label used in storage and on the wire
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

impl fmt::Display for SettlementPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for SettlementPeriod {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| PeriodError::InvalidLabel(s.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| PeriodError::InvalidLabel(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| PeriodError::InvalidLabel(s.to_string()))?;
        Self::new(year, month).map_err(|_| PeriodError::InvalidLabel(s.to_string()))
    }
}

impl Serialize for SettlementPeriod {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for SettlementPeriod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| serde::de::Error::custom(format!("Invalid settlement period: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_label_round_trip() {
        let period = SettlementPeriod::new(2026, 1).unwrap();
        assert_eq!(period.label(), "2026-01");
        assert_eq!("2026-01".parse::<SettlementPeriod>().unwrap(), period);
    }

    #[test]
    fn test_invalid_labels_rejected() {
        assert!("2026-13".parse::<SettlementPeriod>().is_err());
        assert!("2026".parse::<SettlementPeriod>().is_err());
        assert!("january".parse::<SettlementPeriod>().is_err());
    }

    #[test]
    fn test_next_and_previous_wrap_year() {
        let december = SettlementPeriod::new(2025, 12).unwrap();
        assert_eq!(december.next(), SettlementPeriod::new(2026, 1).unwrap());
        assert_eq!(
            SettlementPeriod::new(2026, 1).unwrap().previous(),
            december
        );
    }

    #[test]
    fn test_period_bounds() {
        let period = SettlementPeriod::new(2026, 2).unwrap();
        assert_eq!(
            period.start(),
            Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            period.end(),
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
        );
        assert!(period.contains(Utc.with_ymd_and_hms(2026, 2, 15, 12, 0, 0).unwrap()));
        assert!(!period.contains(period.end()));
    }

    #[test]
    fn test_containing() {
        let at = Utc.with_ymd_and_hms(2026, 7, 31, 23, 59, 59).unwrap();
        assert_eq!(
            SettlementPeriod::containing(at),
            SettlementPeriod::new(2026, 7).unwrap()
        );
    }

    #[test]
    fn test_serde_as_string() {
        let period = SettlementPeriod::new(2026, 3).unwrap();
        let json = serde_json::to_string(&period).unwrap();
        assert_eq!(json, "\"2026-03\"");
        let back: SettlementPeriod = serde_json::from_str(&json).unwrap();
        assert_eq!(back, period);
    }
}
