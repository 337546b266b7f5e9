//! Child age in whole years and months.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Age as completed years plus remaining completed months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Age {
    pub years: u32,
    pub months: u32,
}

impl Age {
    /// Age on `today` of someone born on `birthdate`.
    ///
    /// A month only counts once its day-of-month has been reached. A
    /// birthdate in the future yields zero.
    pub fn between(birthdate: NaiveDate, today: NaiveDate) -> Self {
        let mut years = today.year() - birthdate.year();
        let mut months = today.month() as i32 - birthdate.month() as i32;

        if months < 0 {
            years -= 1;
            months += 12;
        }

        if today.day() < birthdate.day() {
            months -= 1;
            if months < 0 {
                years -= 1;
                months += 12;
            }
        }

        if years < 0 {
            return Self::default();
        }

        Self {
            years: years as u32,
            months: months as u32,
        }
    }

    pub fn total_months(&self) -> u32 {
        self.years * 12 + self.months
    }

    pub fn is_unknown(&self) -> bool {
        self.years == 0 && self.months == 0
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.years, self.months) {
            (0, 0) => write!(f, "Unknown"),
            (0, m) => write!(f, "{} month{} old", m, plural(m)),
            (y, 0) => write!(f, "{} year{} old", y, plural(y)),
            (y, m) => write!(f, "{} year{} {} month{} old", y, plural(y), m, plural(m)),
        }
    }
}
