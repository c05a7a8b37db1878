//! Year-month values used for ranges and filenames.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};

use crate::error::ChirpsError;

/// A calendar month. Ordered by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12)
            .contains(&month)
            .then_some(YearMonth { year, month })
    }

    /// For values already range-checked, such as parsed file names.
    pub(crate) fn from_parts(year: i32, month: u32) -> Self {
        YearMonth { year, month }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn succ(&self) -> Self {
        if self.month == 12 {
            YearMonth {
                year: self.year + 1,
                month: 1,
            }
        } else {
            YearMonth {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// First day of the month, for calendar formatting.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// `Jan 2022` style label.
    pub fn label(&self) -> String {
        match self.first_day() {
            Some(d) => d.format("%b %Y").to_string(),
            None => self.to_string(),
        }
    }

    /// Every month from `self` to `end` inclusive.
    pub fn through(self, end: YearMonth) -> impl Iterator<Item = YearMonth> {
        std::iter::successors(Some(self), |m| Some(m.succ())).take_while(move |m| *m <= end)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ChirpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let date = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
            .map_err(|_| ChirpsError::InvalidMonth(s.to_string()))?;

        Ok(YearMonth {
            year: date.year(),
            month: date.month(),
        })
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_year_month() {
        let m: YearMonth = "2022-03".parse().unwrap();
        assert_eq!(m.year(), 2022);
        assert_eq!(m.month(), 3);
        assert_eq!(m.to_string(), "2022-03");
    }

    #[test]
    fn should_reject_bad_months() {
        for s in ["2022-13", "2022", "march", "2022-00", ""] {
            assert!(
                matches!(s.parse::<YearMonth>(), Err(ChirpsError::InvalidMonth(_))),
                "{s} should not parse"
            );
        }
        assert!(YearMonth::new(2022, 0).is_none());
    }

    #[test]
    fn should_order_chronologically() {
        let dec = YearMonth::new(2021, 12).unwrap();
        let jan = YearMonth::new(2022, 1).unwrap();
        assert!(dec < jan);
        assert_eq!(dec.succ(), jan);
    }

    #[test]
    fn should_iterate_inclusive_range() {
        let start = YearMonth::new(2021, 11).unwrap();
        let end = YearMonth::new(2022, 2).unwrap();
        let months: Vec<String> = start.through(end).map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2021-11", "2021-12", "2022-01", "2022-02"]);

        assert_eq!(end.through(start).count(), 0);
    }

    #[test]
    fn should_label_month() {
        assert_eq!(YearMonth::new(1981, 1).unwrap().label(), "Jan 1981");
    }
}
