//! Tick formatters
//!
//! Each formatter takes the tick value and its position and returns the
//! label. They match [`crate::TickFormatter`] so they can be installed on an
//! axis with [`crate::Axes::set_x_formatter`] or [`crate::Axes::set_y_formatter`].

/// Divide by one thousand and append `Mil`: `2500.0` → `"2.50 Mil"`.
pub fn thousand_formatter(x: f64, _pos: usize) -> String {
    format!("{:.2} Mil", x / 1e3)
}

/// Divide by one million and append `Mi`: `2_500_000.0` → `"2.50 Mi"`.
pub fn million_formatter(x: f64, _pos: usize) -> String {
    format!("{:.2} Mi", x / 1e6)
}

/// Render a fraction as a whole percentage: `0.5` → `"50%"`.
pub fn percent_formatter(x: f64, _pos: usize) -> String {
    format!("{:.0}%", x * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2500.0, "2.50 Mil")]
    #[case(0.0, "0.00 Mil")]
    #[case(-1234.0, "-1.23 Mil")]
    fn test_thousand(#[case] x: f64, #[case] expected: &str) {
        assert_eq!(thousand_formatter(x, 0), expected);
    }

    #[test]
    fn test_million() {
        assert_eq!(million_formatter(2_500_000.0, 3), "2.50 Mi");
        assert_eq!(million_formatter(10_000.0, 0), "0.01 Mi");
    }

    #[rstest]
    #[case(0.5, "50%")]
    #[case(1.0, "100%")]
    #[case(0.123, "12%")]
    fn test_percent(#[case] x: f64, #[case] expected: &str) {
        assert_eq!(percent_formatter(x, 1), expected);
    }
}
