//! Calendar month used to key envelope allocations

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month, e.g. `2025-03`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    /// Create a month, returning `None` if `month` is outside 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current month in local time
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    /// Parse "YYYY-MM", "current", "last" or "next"
    pub fn parse(s: &str) -> Result<Self, MonthParseError> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "current" | "this" | "now" => return Ok(Self::current()),
            "last" | "prev" | "previous" => return Ok(Self::current().prev()),
            "next" => return Ok(Self::current().next()),
            _ => {}
        }

        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| MonthParseError(s.to_string()))?;
        let year: i32 = year.parse().map_err(|_| MonthParseError(s.to_string()))?;
        let month: u32 = month.parse().map_err(|_| MonthParseError(s.to_string()))?;
        Self::new(year, month).ok_or_else(|| MonthParseError(s.to_string()))
    }

    pub fn prev(&self) -> Self {
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

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month (inclusive)
    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::from_date(date) == *self
    }

    /// Number of months from `self` through `other`, counting both ends
    ///
    /// Returns 0 when `other` is before `self`.
    pub fn months_through(&self, other: Month) -> i64 {
        let start = i64::from(self.year) * 12 + i64::from(self.month);
        let end = i64::from(other.year) * 12 + i64::from(other.month);
        (end - start + 1).max(0)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Error returned when a month string can't be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthParseError(pub String);

impl fmt::Display for MonthParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid month '{}': expected YYYY-MM", self.0)
    }
}

impl std::error::Error for MonthParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32) -> Month {
        Month::new(year, month).unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let m = Month::parse("2025-03").unwrap();
        assert_eq!(m, month(2025, 3));
        assert_eq!(m.to_string(), "2025-03");
        assert!(Month::parse("2025-13").is_err());
        assert!(Month::parse("March").is_err());
    }

    #[test]
    fn test_relative_keywords() {
        let current = Month::current();
        assert_eq!(Month::parse("current").unwrap(), current);
        assert_eq!(Month::parse("last").unwrap(), current.prev());
        assert_eq!(Month::parse("next").unwrap(), current.next());
    }

    #[test]
    fn test_navigation_wraps_years() {
        assert_eq!(month(2025, 1).prev(), month(2024, 12));
        assert_eq!(month(2024, 12).next(), month(2025, 1));
    }

    #[test]
    fn test_bounds() {
        let feb = month(2024, 2);
        assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(feb.contains(NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()));
        assert!(!feb.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
    }

    #[test]
    fn test_months_through() {
        assert_eq!(month(2025, 1).months_through(month(2025, 1)), 1);
        assert_eq!(month(2025, 11).months_through(month(2026, 2)), 4);
        assert_eq!(month(2025, 5).months_through(month(2025, 1)), 0);
    }
}
