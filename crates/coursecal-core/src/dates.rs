//! Day-precision date handling for course schedules.
//!
//! Everything here is a pure function of its arguments: no clock reads, no
//! logging, no I/O. Callers pass "now" in explicitly and decide what to do
//! with errors.

use std::collections::HashMap;
use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{DEFAULT_DATE_FORMAT, DEFAULT_UNDETERMINED};
use crate::types::{CourseDate, CourseRecord, CourseStatus, DailyCount, RangeCount};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// Text is neither the undetermined marker nor a date in the expected pattern.
    #[error("invalid date {input:?}: expected pattern {pattern}")]
    Parse { input: String, pattern: String },

    /// A bound is undetermined where a determined one is required, or end < start.
    #[error("invalid date range: {0}")]
    InvalidRange(String),

    /// The configured strftime pattern cannot describe a calendar day, or the
    /// undetermined marker is blank.
    #[error("unusable day format: {0}")]
    Pattern(String),
}

/// Explicit parsing/rendering rules for course dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayFormat {
    pattern: String,
    undetermined: String,
}

impl DayFormat {
    /// Build a format, rejecting patterns that cannot round-trip a date
    /// (unknown specifiers, or no year/month/day in the pattern) and blank
    /// undetermined markers.
    pub fn new(pattern: &str, undetermined: &str) -> Result<Self, DateError> {
        let undetermined = undetermined.trim();
        if undetermined.is_empty() {
            return Err(DateError::Pattern("undetermined marker is empty".to_string()));
        }
        let bad = || DateError::Pattern(format!("pattern {pattern:?}"));
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(bad());
        }
        let sample = NaiveDate::from_ymd_opt(2001, 2, 3).ok_or_else(bad)?;
        let rendered = render(sample, pattern).ok_or_else(bad)?;
        match NaiveDate::parse_from_str(&rendered, pattern) {
            Ok(back) if back == sample => {}
            _ => return Err(bad()),
        }
        Ok(Self {
            pattern: pattern.to_string(),
            undetermined: undetermined.to_string(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn undetermined(&self) -> &str {
        &self.undetermined
    }
}

impl Default for DayFormat {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_DATE_FORMAT.to_string(),
            undetermined: DEFAULT_UNDETERMINED.to_string(),
        }
    }
}

/// Ordering of [`expand_daily_counts`] output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DailyOrder {
    /// Days appear in the order a range first covered them.
    #[default]
    FirstSeen,
    /// Ascending calendar order.
    Calendar,
}

fn render(date: NaiveDate, pattern: &str) -> Option<String> {
    // DelayedFormat reports unusable specifiers through fmt::Error, which
    // `to_string` would turn into a panic.
    let mut out = String::new();
    write!(out, "{}", date.format(pattern)).ok()?;
    Some(out)
}

/// Parse a course date in the configured pattern, or the undetermined marker.
///
/// Parsing is strict: the text must be exactly what the pattern would
/// produce for that day, so `1/2/2024` is rejected under `%d/%m/%Y`.
pub fn parse_day(text: &str, format: &DayFormat) -> Result<CourseDate, DateError> {
    let text = text.trim();
    if text == format.undetermined {
        return Ok(CourseDate::Undetermined);
    }
    let err = || DateError::Parse {
        input: text.to_string(),
        pattern: format.pattern.clone(),
    };
    let date = NaiveDate::parse_from_str(text, &format.pattern).map_err(|_| err())?;
    if render(date, &format.pattern).as_deref() != Some(text) {
        return Err(err());
    }
    Ok(CourseDate::Determined(date))
}

/// Render a course date back into its configured text form.
pub fn format_day(date: CourseDate, format: &DayFormat) -> String {
    match date {
        CourseDate::Undetermined => format.undetermined.clone(),
        CourseDate::Determined(d) => {
            render(d, &format.pattern).unwrap_or_else(|| d.format("%Y-%m-%d").to_string())
        }
    }
}

fn determined_bounds(start: CourseDate, end: CourseDate) -> Result<(NaiveDate, NaiveDate), DateError> {
    let start = start
        .determined()
        .ok_or_else(|| DateError::InvalidRange("start date is undetermined".to_string()))?;
    let end = end
        .determined()
        .ok_or_else(|| DateError::InvalidRange("end date is undetermined".to_string()))?;
    if end < start {
        return Err(DateError::InvalidRange(format!(
            "end {end} is before start {start}"
        )));
    }
    Ok((start, end))
}

/// `start <= target <= end`, both bounds inclusive.
pub fn is_within_range(target: NaiveDate, start: CourseDate, end: CourseDate) -> Result<bool, DateError> {
    let (start, end) = determined_bounds(start, end)?;
    Ok(start <= target && target <= end)
}

/// Classify a course relative to `now`. Boundary days count as ongoing.
///
/// A course with a start but no end never completes once it has begun.
pub fn classify_status(now: NaiveDate, start: CourseDate, end: CourseDate) -> CourseStatus {
    let CourseDate::Determined(start) = start else {
        return CourseStatus::Tbd;
    };
    if now < start {
        return CourseStatus::Upcoming;
    }
    match end {
        CourseDate::Determined(end) if now > end => CourseStatus::Completed,
        _ => CourseStatus::Ongoing,
    }
}

/// Spread each range's count over every day it covers and sum per day.
///
/// Ranges with an undetermined bound are skipped. A determined range whose
/// end precedes its start fails the whole call.
pub fn expand_daily_counts(ranges: &[RangeCount], order: DailyOrder) -> Result<Vec<DailyCount>, DateError> {
    let mut totals: HashMap<NaiveDate, u64> = HashMap::new();
    let mut seen: Vec<NaiveDate> = Vec::new();

    for range in ranges {
        if range.start.is_undetermined() || range.end.is_undetermined() {
            continue;
        }
        let (start, end) = determined_bounds(range.start, range.end)?;
        for day in start.iter_days().take_while(|d| *d <= end) {
            let total = totals.entry(day).or_insert_with(|| {
                seen.push(day);
                0
            });
            *total += range.count;
        }
    }

    if order == DailyOrder::Calendar {
        seen.sort_unstable();
    }

    Ok(seen
        .into_iter()
        .map(|day| DailyCount {
            day,
            count: totals[&day],
        })
        .collect())
}

/// Courses running on `date`, in input order.
pub fn find_active_on(date: NaiveDate, records: &[CourseRecord]) -> Result<Vec<&CourseRecord>, DateError> {
    let mut active = Vec::new();
    for record in records {
        if record.start.is_undetermined() || record.end.is_undetermined() {
            continue;
        }
        if is_within_range(date, record.start, record.end)? {
            active.push(record);
        }
    }
    Ok(active)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32, month: u32, year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn det(day: u32, month: u32, year: i32) -> CourseDate {
        CourseDate::Determined(d(day, month, year))
    }

    fn course(id: i64, start: CourseDate, end: CourseDate) -> CourseRecord {
        CourseRecord {
            id,
            source: "Internal".into(),
            start,
            end,
            start_time: "09:00".into(),
            end_time: "17:00".into(),
            course_name: format!("Course {id}"),
            target_audience: "All".into(),
            format: "Virtual".into(),
        }
    }

    #[test]
    fn parse_default_pattern() {
        let fmt = DayFormat::default();
        assert_eq!(parse_day("29/02/2024", &fmt).unwrap(), det(29, 2, 2024));
        assert_eq!(parse_day(" 01/12/2023 ", &fmt).unwrap(), det(1, 12, 2023));
        assert_eq!(parse_day("TBD", &fmt).unwrap(), CourseDate::Undetermined);
    }

    #[test]
    fn parse_rejects_loose_or_impossible_dates() {
        let fmt = DayFormat::default();
        for bad in ["1/2/2024", "01/02/24", "2024-02-01", "31/04/2024", "29/02/2023", "", "tbd", "01/02/2024x"] {
            match parse_day(bad, &fmt) {
                Err(DateError::Parse { pattern, .. }) => assert_eq!(pattern, "%d/%m/%Y"),
                other => panic!("{bad:?} should fail to parse, got {other:?}"),
            }
        }
    }

    #[test]
    fn custom_pattern_and_marker() {
        let fmt = DayFormat::new("%Y-%m-%d", "pending").unwrap();
        assert_eq!(parse_day("2024-03-05", &fmt).unwrap(), det(5, 3, 2024));
        assert_eq!(parse_day("pending", &fmt).unwrap(), CourseDate::Undetermined);
        assert!(parse_day("05/03/2024", &fmt).is_err());
        assert_eq!(format_day(det(5, 3, 2024), &fmt), "2024-03-05");
        assert_eq!(format_day(CourseDate::Undetermined, &fmt), "pending");
    }

    #[test]
    fn unusable_patterns_are_rejected() {
        assert!(matches!(DayFormat::new("%Q", "TBD"), Err(DateError::Pattern(_))));
        assert!(matches!(DayFormat::new("%H:%M", "TBD"), Err(DateError::Pattern(_))));
        assert!(matches!(DayFormat::new("%m/%Y", "TBD"), Err(DateError::Pattern(_))));
    }

    #[test]
    fn blank_undetermined_marker_is_rejected() {
        for marker in ["", "   "] {
            let err = DayFormat::new("%d/%m/%Y", marker).unwrap_err();
            assert_eq!(err, DateError::Pattern("undetermined marker is empty".to_string()));
        }
        let fmt = DayFormat::new("%d/%m/%Y", " TBD ").unwrap();
        assert_eq!(fmt.undetermined(), "TBD");
        assert!(matches!(parse_day("", &fmt), Err(DateError::Parse { .. })));
    }

    #[test]
    fn format_day_default() {
        let fmt = DayFormat::default();
        assert_eq!(format_day(det(3, 1, 2024), &fmt), "03/01/2024");
        assert_eq!(format_day(CourseDate::Undetermined, &fmt), "TBD");
    }

    #[test]
    fn within_range_is_inclusive() {
        let (start, end) = (det(10, 1, 2024), det(20, 1, 2024));
        assert!(is_within_range(d(10, 1, 2024), start, end).unwrap());
        assert!(is_within_range(d(15, 1, 2024), start, end).unwrap());
        assert!(is_within_range(d(20, 1, 2024), start, end).unwrap());
        assert!(!is_within_range(d(9, 1, 2024), start, end).unwrap());
        assert!(!is_within_range(d(21, 1, 2024), start, end).unwrap());
    }

    #[test]
    fn within_range_matches_comparison_over_a_window() {
        let start = d(1, 1, 2024);
        let end = d(5, 1, 2024);
        for target in d(25, 12, 2023).iter_days().take(20) {
            let expected = start <= target && target <= end;
            assert_eq!(is_within_range(target, start.into(), end.into()).unwrap(), expected);
        }
    }

    #[test]
    fn within_range_rejects_undetermined_and_reversed() {
        let target = d(1, 1, 2024);
        assert!(matches!(
            is_within_range(target, CourseDate::Undetermined, det(1, 1, 2024)),
            Err(DateError::InvalidRange(_))
        ));
        assert!(matches!(
            is_within_range(target, det(1, 1, 2024), CourseDate::Undetermined),
            Err(DateError::InvalidRange(_))
        ));
        assert!(matches!(
            is_within_range(target, det(2, 1, 2024), det(1, 1, 2024)),
            Err(DateError::InvalidRange(_))
        ));
    }

    #[test]
    fn classify_follows_precedence() {
        let (start, end) = (det(10, 1, 2024), det(20, 1, 2024));
        assert_eq!(classify_status(d(9, 1, 2024), start, end), CourseStatus::Upcoming);
        assert_eq!(classify_status(d(10, 1, 2024), start, end), CourseStatus::Ongoing);
        assert_eq!(classify_status(d(15, 1, 2024), start, end), CourseStatus::Ongoing);
        assert_eq!(classify_status(d(20, 1, 2024), start, end), CourseStatus::Ongoing);
        assert_eq!(classify_status(d(21, 1, 2024), start, end), CourseStatus::Completed);
    }

    #[test]
    fn classify_tbd_wins_regardless_of_now_or_end() {
        for now in [d(1, 1, 1990), d(1, 1, 2024), d(1, 1, 2100)] {
            for end in [det(1, 1, 2000), CourseDate::Undetermined] {
                assert_eq!(classify_status(now, CourseDate::Undetermined, end), CourseStatus::Tbd);
            }
        }
    }

    #[test]
    fn classify_open_ended_course() {
        let start = det(10, 1, 2024);
        assert_eq!(classify_status(d(1, 1, 2024), start, CourseDate::Undetermined), CourseStatus::Upcoming);
        assert_eq!(classify_status(d(1, 1, 2030), start, CourseDate::Undetermined), CourseStatus::Ongoing);
    }

    #[test]
    fn expand_single_day_range() {
        let out = expand_daily_counts(&[RangeCount::new(d(1, 1, 2024), d(1, 1, 2024), 3)], DailyOrder::FirstSeen).unwrap();
        assert_eq!(out, vec![DailyCount { day: d(1, 1, 2024), count: 3 }]);
    }

    #[test]
    fn expand_accumulates_overlaps() {
        let ranges = [
            RangeCount::new(d(1, 1, 2024), d(3, 1, 2024), 1),
            RangeCount::new(d(2, 1, 2024), d(2, 1, 2024), 2),
        ];
        let out = expand_daily_counts(&ranges, DailyOrder::FirstSeen).unwrap();
        assert_eq!(
            out,
            vec![
                DailyCount { day: d(1, 1, 2024), count: 1 },
                DailyCount { day: d(2, 1, 2024), count: 3 },
                DailyCount { day: d(3, 1, 2024), count: 1 },
            ]
        );
    }

    #[test]
    fn expand_order_policies() {
        let ranges = [
            RangeCount::new(d(10, 1, 2024), d(11, 1, 2024), 1),
            RangeCount::new(d(1, 1, 2024), d(2, 1, 2024), 1),
            RangeCount::new(d(11, 1, 2024), d(12, 1, 2024), 1),
        ];
        let first_seen: Vec<_> = expand_daily_counts(&ranges, DailyOrder::FirstSeen)
            .unwrap()
            .into_iter()
            .map(|c| (c.day.format("%d").to_string(), c.count))
            .collect();
        assert_eq!(
            first_seen,
            vec![
                ("10".to_string(), 1),
                ("11".to_string(), 2),
                ("01".to_string(), 1),
                ("02".to_string(), 1),
                ("12".to_string(), 1),
            ]
        );

        let calendar = expand_daily_counts(&ranges, DailyOrder::Calendar).unwrap();
        assert!(calendar.windows(2).all(|w| w[0].day < w[1].day));
        assert_eq!(calendar.len(), 5);
    }

    #[test]
    fn expand_spans_month_and_leap_day() {
        let out = expand_daily_counts(&[RangeCount::new(d(28, 2, 2024), d(1, 3, 2024), 1)], DailyOrder::Calendar).unwrap();
        let days: Vec<_> = out.iter().map(|c| c.day).collect();
        assert_eq!(days, vec![d(28, 2, 2024), d(29, 2, 2024), d(1, 3, 2024)]);
    }

    #[test]
    fn expand_skips_undetermined_and_rejects_reversed() {
        let ranges = [
            RangeCount::new(CourseDate::Undetermined, d(3, 1, 2024), 5),
            RangeCount::new(d(3, 1, 2024), CourseDate::Undetermined, 5),
        ];
        assert!(expand_daily_counts(&ranges, DailyOrder::FirstSeen).unwrap().is_empty());

        let reversed = [RangeCount::new(d(3, 1, 2024), d(1, 1, 2024), 1)];
        assert!(matches!(
            expand_daily_counts(&reversed, DailyOrder::FirstSeen),
            Err(DateError::InvalidRange(_))
        ));
    }

    #[test]
    fn find_active_keeps_input_order_and_skips_tbd() {
        let records = vec![
            course(3, det(1, 1, 2024), det(31, 1, 2024)),
            course(1, CourseDate::Undetermined, det(31, 1, 2024)),
            course(2, det(15, 1, 2024), det(15, 1, 2024)),
            course(4, det(16, 1, 2024), det(20, 1, 2024)),
        ];
        let ids: Vec<i64> = find_active_on(d(15, 1, 2024), &records)
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn find_active_on_empty_input() {
        assert!(find_active_on(d(1, 1, 2024), &[]).unwrap().is_empty());
    }

    #[test]
    fn engine_is_deterministic() {
        let ranges = [
            RangeCount::new(d(5, 1, 2024), d(9, 1, 2024), 2),
            RangeCount::new(d(1, 1, 2024), d(6, 1, 2024), 1),
        ];
        assert_eq!(
            expand_daily_counts(&ranges, DailyOrder::FirstSeen).unwrap(),
            expand_daily_counts(&ranges, DailyOrder::FirstSeen).unwrap()
        );
        let records = vec![course(1, det(1, 1, 2024), det(2, 1, 2024))];
        assert_eq!(
            find_active_on(d(1, 1, 2024), &records).unwrap(),
            find_active_on(d(1, 1, 2024), &records).unwrap()
        );
    }
}
