//! Month-start ticks for date axes

use crate::axes::{date_to_x, Tick};
use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Language used for month abbreviations in tick labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthLocale {
    /// Jan, Feb, Mar, ...
    English,
    /// Jan, Fev, Mar, Abr, Maio, ...
    #[default]
    Portuguese,
}

const ENGLISH: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const PORTUGUESE: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Maio", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

impl MonthLocale {
    /// Abbreviation of a month number in `1..=12`
    pub fn abbreviation(self, month: u32) -> &'static str {
        let idx = (month.clamp(1, 12) - 1) as usize;
        match self {
            MonthLocale::English => ENGLISH[idx],
            MonthLocale::Portuguese => PORTUGUESE[idx],
        }
    }

    /// `YYYY-Mon` label for a date
    pub fn label(self, date: NaiveDate) -> String {
        format!("{}-{}", date.year(), self.abbreviation(date.month()))
    }
}

/// Month starts at or after `first` and not after `last`, every `interval`
/// months. An `interval` of zero yields no ticks.
pub fn month_starts(first: NaiveDateTime, last: NaiveDateTime, interval: u32) -> Vec<NaiveDate> {
    let mut starts = Vec::new();
    if interval == 0 || first > last {
        return starts;
    }

    let Some(mut current) = NaiveDate::from_ymd_opt(first.year(), first.month(), 1) else {
        return starts;
    };
    if current.and_time(Default::default()) < first {
        match current.checked_add_months(Months::new(1)) {
            Some(next) => current = next,
            None => return starts,
        }
    }

    while current.and_time(Default::default()) <= last {
        starts.push(current);
        match current.checked_add_months(Months::new(interval)) {
            Some(next) => current = next,
            None => break,
        }
    }

    starts
}

/// Month-start ticks between two instants, labelled `YYYY-Mon` in `locale`.
pub fn month_ticks(
    first: NaiveDateTime,
    last: NaiveDateTime,
    interval: u32,
    locale: MonthLocale,
) -> Vec<Tick> {
    month_starts(first, last, interval)
        .into_iter()
        .map(|date| Tick {
            value: date_to_x(date.and_time(Default::default())),
            label: locale.label(date),
        })
        .collect()
}
