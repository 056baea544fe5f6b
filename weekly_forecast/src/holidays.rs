//! National holiday calendars

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Country codes with a built-in calendar
pub const SUPPORTED_COUNTRIES: [&str; 2] = ["BR", "US"];

/// A named holiday on a given date
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

/// Normalise a country code, failing for calendars that are not available.
pub fn supported_country(code: &str) -> Result<String> {
    let code = code.trim().to_uppercase();
    if SUPPORTED_COUNTRIES.contains(&code.as_str()) {
        Ok(code)
    } else {
        Err(ForecastError::Configuration(format!(
            "no holiday calendar for country '{}' (available: {})",
            code,
            SUPPORTED_COUNTRIES.join(", ")
        )))
    }
}

/// National holidays of `country` in the given years, sorted by date.
pub fn country_holidays(country: &str, years: RangeInclusive<i32>) -> Result<Vec<Holiday>> {
    let code = supported_country(country)?;
    let mut holidays = Vec::new();
    for year in years {
        let days = match code.as_str() {
            "BR" => brazil(year),
            _ => united_states(year),
        };
        holidays.extend(
            days.into_iter()
                .map(|(date, name)| Holiday {
                    date,
                    name: name.to_string(),
                }),
        );
    }
    holidays.sort();
    Ok(holidays)
}

/// Holiday names per date
pub fn holiday_index(holidays: &[Holiday]) -> BTreeMap<NaiveDate, Vec<&str>> {
    let mut index: BTreeMap<NaiveDate, Vec<&str>> = BTreeMap::new();
    for holiday in holidays {
        index.entry(holiday.date).or_default().push(&holiday.name);
    }
    index
}

/// Easter Sunday of the Gregorian calendar (anonymous computus)
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

fn fixed(year: i32, month: u32, day: u32, name: &'static str) -> Option<(NaiveDate, &'static str)> {
    NaiveDate::from_ymd_opt(year, month, day).map(|d| (d, name))
}

fn brazil(year: i32) -> Vec<(NaiveDate, &'static str)> {
    let mut days: Vec<_> = [
        fixed(year, 1, 1, "Ano novo"),
        fixed(year, 4, 21, "Tiradentes"),
        fixed(year, 5, 1, "Dia do trabalhador"),
        fixed(year, 9, 7, "Independência do Brasil"),
        fixed(year, 10, 12, "Nossa Senhora Aparecida"),
        fixed(year, 11, 2, "Finados"),
        fixed(year, 11, 15, "Proclamação da República"),
        fixed(year, 12, 25, "Natal"),
    ]
    .into_iter()
    .flatten()
    .collect();

    if let Some(easter) = easter_sunday(year) {
        let movable = [
            (-48, "Carnaval"),
            (-47, "Carnaval"),
            (-46, "Quarta-feira de cinzas"),
            (-2, "Sexta-feira santa"),
            (0, "Páscoa"),
            (60, "Corpus Christi"),
        ];
        days.extend(
            movable
                .iter()
                .map(|&(offset, name)| (easter + Duration::days(offset), name)),
        );
    }
    days
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8, name: &'static str) -> Option<(NaiveDate, &'static str)> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n).map(|d| (d, name))
}

fn last_weekday(year: i32, month: u32, weekday: Weekday, name: &'static str) -> Option<(NaiveDate, &'static str)> {
    let mut date = NaiveDate::from_weekday_of_month_opt(year, month, weekday, 4)?;
    while let Some(next) = date.checked_add_signed(Duration::weeks(1)) {
        if next.month() != month {
            break;
        }
        date = next;
    }
    Some((date, name))
}

fn united_states(year: i32) -> Vec<(NaiveDate, &'static str)> {
    let mut days = vec![
        fixed(year, 1, 1, "New Year's Day"),
        nth_weekday(year, 1, Weekday::Mon, 3, "Martin Luther King Jr. Day"),
        nth_weekday(year, 2, Weekday::Mon, 3, "Washington's Birthday"),
        last_weekday(year, 5, Weekday::Mon, "Memorial Day"),
        fixed(year, 7, 4, "Independence Day"),
        nth_weekday(year, 9, Weekday::Mon, 1, "Labor Day"),
        nth_weekday(year, 10, Weekday::Mon, 2, "Columbus Day"),
        fixed(year, 11, 11, "Veterans Day"),
        nth_weekday(year, 11, Weekday::Thu, 4, "Thanksgiving"),
        fixed(year, 12, 25, "Christmas Day"),
    ];
    if year >= 2021 {
        days.push(fixed(year, 6, 19, "Juneteenth National Independence Day"));
    }
    days.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(2019, date(2019, 4, 21))]
    #[case(2020, date(2020, 4, 12))]
    #[case(2021, date(2021, 4, 4))]
    #[case(2024, date(2024, 3, 31))]
    fn test_easter(#[case] year: i32, #[case] expected: NaiveDate) {
        assert_eq!(easter_sunday(year), Some(expected));
    }

    #[test]
    fn test_brazil_2020() {
        let holidays = country_holidays("br", 2020..=2020).unwrap();
        let index = holiday_index(&holidays);

        assert_eq!(index[&date(2020, 2, 25)], vec!["Carnaval"]);
        assert_eq!(index[&date(2020, 4, 10)], vec!["Sexta-feira santa"]);
        assert_eq!(index[&date(2020, 6, 11)], vec!["Corpus Christi"]);
        assert_eq!(index[&date(2020, 9, 7)], vec!["Independência do Brasil"]);
        assert_eq!(holidays.len(), 14);
    }

    #[test]
    fn test_united_states_2021() {
        let holidays = country_holidays("US", 2021..=2021).unwrap();
        let index = holiday_index(&holidays);

        assert_eq!(index[&date(2021, 5, 31)], vec!["Memorial Day"]);
        assert_eq!(index[&date(2021, 11, 25)], vec!["Thanksgiving"]);
        assert!(index.contains_key(&date(2021, 6, 19)));
        assert_eq!(holidays.len(), 11);
    }

    #[test]
    fn test_unknown_country() {
        assert!(matches!(
            country_holidays("XX", 2020..=2020),
            Err(ForecastError::Configuration(_))
        ));
    }
}
