//! Human interval grammar used by `--age`.
//!
//! An interval is any string containing `<int>h`, `<int>d`, `<int>w`,
//! `<int>m` or `<int>y` in any order, e.g. `3d`, `1y6m`, `2w12h`. Only the
//! first occurrence of each suffix counts. Parsing never fails: text that
//! matches no suffix contributes nothing, so `"soon"` is a zero interval.
//!
//! A zero interval makes every resource "older than the threshold". Callers
//! that mean "no age filter" must not pass an interval at all.

use std::fmt;
use std::sync::LazyLock;

use chrono::TimeDelta;
use regex::Regex;
use serde::{Deserialize, Serialize};

const DAYS_PER_MONTH: i64 = 30;
const DAYS_PER_YEAR: i64 = 365;

static HOURS: LazyLock<Regex> = LazyLock::new(|| unit_regex('h'));
static DAYS: LazyLock<Regex> = LazyLock::new(|| unit_regex('d'));
static WEEKS: LazyLock<Regex> = LazyLock::new(|| unit_regex('w'));
static MONTHS: LazyLock<Regex> = LazyLock::new(|| unit_regex('m'));
static YEARS: LazyLock<Regex> = LazyLock::new(|| unit_regex('y'));

fn unit_regex(suffix: char) -> Regex {
    Regex::new(&format!(r"(\d+){}", suffix)).expect("unit pattern is a valid regex")
}

/// An age specification split into its calendar components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub years: u32,
    pub months: u32,
    pub weeks: u32,
    pub days: u32,
    pub hours: u32,
}

impl Interval {
    pub fn parse(spec: &str) -> Self {
        Self {
            years: first_component(&YEARS, spec),
            months: first_component(&MONTHS, spec),
            weeks: first_component(&WEEKS, spec),
            days: first_component(&DAYS, spec),
            hours: first_component(&HOURS, spec),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Total length, with months as 30 days and years as 365 days.
    ///
    /// Saturates at `TimeDelta::MAX` rather than overflowing.
    pub fn to_duration(&self) -> TimeDelta {
        let days = i64::from(self.days)
            + DAYS_PER_MONTH * i64::from(self.months)
            + DAYS_PER_YEAR * i64::from(self.years);

        TimeDelta::try_days(days)
            .and_then(|d| d.checked_add(&TimeDelta::try_weeks(i64::from(self.weeks))?))
            .and_then(|d| d.checked_add(&TimeDelta::try_hours(i64::from(self.hours))?))
            .unwrap_or(TimeDelta::MAX)
    }

    /// Canonical text form, largest unit first. Zero renders as `0h`.
    pub fn render(&self) -> String {
        if self.is_zero() {
            return "0h".to_string();
        }

        [
            (self.years, 'y'),
            (self.months, 'm'),
            (self.weeks, 'w'),
            (self.days, 'd'),
            (self.hours, 'h'),
        ]
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, suffix)| format!("{}{}", value, suffix))
        .collect()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for Interval {
    fn from(spec: &str) -> Self {
        Self::parse(spec)
    }
}

fn first_component(regex: &Regex, spec: &str) -> u32 {
    regex
        .captures(spec)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_units() {
        assert_eq!(Interval::parse("5h").hours, 5);
        assert_eq!(Interval::parse("3d").days, 3);
        assert_eq!(Interval::parse("2w").weeks, 2);
        assert_eq!(Interval::parse("6m").months, 6);
        assert_eq!(Interval::parse("1y").years, 1);
    }

    #[test]
    fn test_parse_is_order_independent() {
        assert_eq!(Interval::parse("1y2d3h"), Interval::parse("3h2d1y"));
        assert_eq!(Interval::parse("2w1d"), Interval::parse("1d2w"));
    }

    #[test]
    fn test_parse_takes_first_occurrence_only() {
        let interval = Interval::parse("1d5d");
        assert_eq!(interval.days, 1);
    }

    #[test]
    fn test_parse_unrecognized_is_zero() {
        assert!(Interval::parse("").is_zero());
        assert!(Interval::parse("soon").is_zero());
        assert!(Interval::parse("3x").is_zero());
        assert_eq!(Interval::parse("soon").to_duration(), TimeDelta::zero());
    }

    #[test]
    fn test_parse_oversized_number_contributes_zero() {
        let interval = Interval::parse("99999999999999999999d4h");
        assert_eq!(interval.days, 0);
        assert_eq!(interval.hours, 4);
    }

    #[test]
    fn test_to_duration_composition() {
        let interval = Interval::parse("1y2m3w4d5h");
        let expected = TimeDelta::days(4 + 60 + 365) + TimeDelta::weeks(3) + TimeDelta::hours(5);
        assert_eq!(interval.to_duration(), expected);
    }

    #[test]
    fn test_to_duration_three_days() {
        assert_eq!(Interval::parse("3d").to_duration(), TimeDelta::days(3));
    }

    #[test]
    fn test_to_duration_saturates() {
        let interval = Interval {
            years: u32::MAX,
            months: u32::MAX,
            weeks: u32::MAX,
            days: u32::MAX,
            hours: u32::MAX,
        };
        assert_eq!(interval.to_duration(), TimeDelta::MAX);
    }

    #[test]
    fn test_render_canonical() {
        assert_eq!(Interval::parse("5h3d").render(), "3d5h");
        assert_eq!(Interval::parse("1y2m3w4d5h").render(), "1y2m3w4d5h");
        assert_eq!(Interval::parse("").render(), "0h");
        assert_eq!(format!("{}", Interval::parse("2w")), "2w");
    }

    #[test]
    fn test_render_round_trip_is_stable() {
        for spec in ["3d", "1y", "12h6m", "2w1d", "0d", "", "junk", "7y7m7w7d7h"] {
            let parsed = Interval::parse(spec);
            assert_eq!(Interval::parse(&parsed.render()), parsed, "spec {:?}", spec);
        }
    }
}
