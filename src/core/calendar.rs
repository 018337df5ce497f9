//! Monday-aligned week windows for the forecast horizon.

use chrono::{Datelike, Days, NaiveDate};

/// Number of weeks every forecast covers.
pub const HORIZON_WEEKS: usize = 12;

/// Inclusive seven-day span starting on a Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    pub fn starting(start: NaiveDate) -> Self {
        Self {
            start,
            end: start + Days::new(6),
        }
    }

    /// Closed-interval overlap: touching either boundary counts.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end && end >= self.start
    }
}

/// Monday of the week containing `date`. Sunday belongs to the previous Monday.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_back = date.weekday().num_days_from_monday();
    date - Days::new(u64::from(days_back))
}

/// The `HORIZON_WEEKS` week windows starting at the week of `reference`.
pub fn horizon(reference: NaiveDate) -> Vec<WeekWindow> {
    let first = week_start(reference);
    (0..HORIZON_WEEKS as u64)
        .map(|i| WeekWindow::starting(first + Days::new(i * 7)))
        .collect()
}

/// First and last day covered by a horizon.
pub fn horizon_bounds(weeks: &[WeekWindow]) -> Option<(NaiveDate, NaiveDate)> {
    Some((weeks.first()?.start, weeks.last()?.end))
}

pub fn week_label(week_number: u32) -> String {
    format!("W{}", week_number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_start_for_each_weekday() {
        // 2025-03-03 是星期一
        let monday = date(2025, 3, 3);
        for offset in 0..7 {
            let day = monday + Days::new(offset);
            assert_eq!(week_start(day), monday, "day {}", day);
        }
    }

    #[test]
    fn test_sunday_belongs_to_previous_monday() {
        let sunday = date(2025, 3, 9);
        assert_eq!(sunday.weekday(), Weekday::Sun);
        assert_eq!(week_start(sunday), date(2025, 3, 3));
    }

    #[test]
    fn test_horizon_is_twelve_contiguous_mondays() {
        for reference in [date(2024, 2, 29), date(2024, 12, 29), date(2025, 1, 1), date(2025, 6, 15)] {
            let weeks = horizon(reference);
            assert_eq!(weeks.len(), HORIZON_WEEKS);
            assert_eq!(weeks[0].start.weekday(), Weekday::Mon);
            assert!(weeks[0].start <= reference && reference <= weeks[0].end);
            for pair in weeks.windows(2) {
                assert_eq!(pair[1].start - pair[0].start, chrono::Duration::days(7));
                assert_eq!(pair[0].end + Days::new(1), pair[1].start);
            }
        }
    }

    #[test]
    fn test_horizon_bounds() {
        let weeks = horizon(date(2025, 3, 5));
        assert_eq!(
            horizon_bounds(&weeks),
            Some((date(2025, 3, 3), date(2025, 5, 25)))
        );
        assert_eq!(horizon_bounds(&[]), None);
    }

    #[test]
    fn test_overlap_boundaries() {
        let week = WeekWindow::starting(date(2025, 3, 3));
        // 剛好碰到邊界也算
        assert!(week.overlaps(date(2025, 2, 1), date(2025, 3, 3)));
        assert!(week.overlaps(date(2025, 3, 9), date(2025, 4, 1)));
        assert!(week.overlaps(date(2025, 3, 5), date(2025, 3, 5)));
        assert!(week.overlaps(date(2025, 1, 1), date(2025, 12, 31)));
        assert!(!week.overlaps(date(2025, 2, 1), date(2025, 3, 2)));
        assert!(!week.overlaps(date(2025, 3, 10), date(2025, 4, 1)));
    }
}
