use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Index of the week containing "today" on the virtual axis.
pub const ANCHOR_WEEK_INDEX: usize = 5000;

/// Total number of week slots on the virtual axis.
pub const TOTAL_WEEKS: usize = 10000;

/// Maps week indices on the virtual axis to concrete Monday-anchored dates.
///
/// The anchor Monday is captured once at construction and never moves, so the
/// index-to-date mapping stays stable even if the session runs past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekIndexer {
    anchor_monday: NaiveDate,
}

impl WeekIndexer {
    /// Anchors the axis so that `ANCHOR_WEEK_INDEX` is the week containing
    /// `today`. A Sunday anchors to the preceding Monday.
    pub fn new(today: NaiveDate) -> Self {
        let anchor_monday =
            today - Duration::days(today.weekday().num_days_from_monday() as i64);
        Self { anchor_monday }
    }

    pub fn anchor_monday(&self) -> NaiveDate {
        self.anchor_monday
    }

    /// Monday of the week at `index`.
    pub fn week_start(&self, index: usize) -> NaiveDate {
        let offset = index as i64 - ANCHOR_WEEK_INDEX as i64;
        self.anchor_monday + Duration::weeks(offset)
    }

    /// The seven days of the week at `index`, Monday first.
    pub fn days(&self, index: usize) -> [NaiveDate; 7] {
        let start = self.week_start(index);
        std::array::from_fn(|day| start + Duration::days(day as i64))
    }

    /// Index of the week slot containing `date`, clamped to the axis.
    pub fn index_of(&self, date: NaiveDate) -> usize {
        let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
        let weeks = (monday - self.anchor_monday).num_days() / 7;
        (ANCHOR_WEEK_INDEX as i64 + weeks).clamp(0, TOTAL_WEEKS as i64 - 1) as usize
    }

    /// Inclusive fetch window for the week at `index`:
    /// Monday 00:00:00.000 through Sunday 23:59:59.999.
    pub fn week_bounds(&self, index: usize) -> (NaiveDateTime, NaiveDateTime) {
        let start = self.week_start(index).and_time(NaiveTime::MIN);
        let end = start + Duration::weeks(1) - Duration::milliseconds(1);
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn anchor_week_contains_today() {
        let indexer = WeekIndexer::new(date(2024, 3, 13));

        assert_eq!(indexer.week_start(ANCHOR_WEEK_INDEX), date(2024, 3, 11));
        assert_eq!(indexer.anchor_monday(), date(2024, 3, 11));
    }

    #[test]
    fn sunday_anchors_to_preceding_monday() {
        let indexer = WeekIndexer::new(date(2024, 3, 17));

        assert_eq!(indexer.week_start(ANCHOR_WEEK_INDEX), date(2024, 3, 11));
    }

    #[test]
    fn monday_anchors_to_itself() {
        let indexer = WeekIndexer::new(date(2024, 3, 11));

        assert_eq!(indexer.week_start(ANCHOR_WEEK_INDEX), date(2024, 3, 11));
    }

    #[test]
    fn week_start_is_always_monday() {
        let indexer = WeekIndexer::new(date(2024, 3, 13));

        for index in [0, 1, 4999, 5000, 5001, 9999] {
            assert_eq!(indexer.week_start(index).weekday(), Weekday::Mon);
        }
    }

    #[test]
    fn consecutive_weeks_are_seven_days_apart() {
        let indexer = WeekIndexer::new(date(2024, 3, 13));

        for index in [0, 4999, 5000, 9998] {
            let gap = indexer.week_start(index + 1) - indexer.week_start(index);
            assert_eq!(gap, Duration::days(7));
        }
    }

    #[test]
    fn days_cover_monday_through_sunday() {
        let indexer = WeekIndexer::new(date(2024, 3, 13));
        let days = indexer.days(ANCHOR_WEEK_INDEX);

        assert_eq!(days[0], date(2024, 3, 11));
        assert_eq!(days[6], date(2024, 3, 17));
        assert_eq!(days[6].weekday(), Weekday::Sun);
    }

    #[test]
    fn index_of_round_trips() {
        let indexer = WeekIndexer::new(date(2024, 3, 13));

        assert_eq!(indexer.index_of(date(2024, 3, 13)), ANCHOR_WEEK_INDEX);
        assert_eq!(indexer.index_of(date(2024, 3, 17)), ANCHOR_WEEK_INDEX);
        assert_eq!(indexer.index_of(date(2024, 3, 18)), ANCHOR_WEEK_INDEX + 1);
        assert_eq!(indexer.index_of(date(2024, 3, 10)), ANCHOR_WEEK_INDEX - 1);
        for index in [0, 123, 5000, 9999] {
            assert_eq!(indexer.index_of(indexer.week_start(index)), index);
        }
    }

    #[test]
    fn index_of_clamps_to_axis() {
        let indexer = WeekIndexer::new(date(2024, 3, 13));
        let far_past = indexer.week_start(0) - Duration::weeks(50);
        let far_future = indexer.week_start(TOTAL_WEEKS - 1) + Duration::weeks(50);

        assert_eq!(indexer.index_of(far_past), 0);
        assert_eq!(indexer.index_of(far_future), TOTAL_WEEKS - 1);
    }

    #[test]
    fn week_bounds_span_monday_to_sunday_night() {
        let indexer = WeekIndexer::new(date(2024, 3, 13));
        let (start, end) = indexer.week_bounds(ANCHOR_WEEK_INDEX);

        assert_eq!(start.date(), date(2024, 3, 11));
        assert_eq!(start.time(), NaiveTime::MIN);
        assert_eq!(end.date(), date(2024, 3, 17));
        assert_eq!((end.hour(), end.minute(), end.second()), (23, 59, 59));
        assert_eq!(end.and_utc().timestamp_subsec_millis(), 999);
    }

    #[test]
    fn axis_boundaries_resolve() {
        let indexer = WeekIndexer::new(date(2024, 3, 13));

        let first = indexer.week_start(0);
        let last = indexer.week_start(TOTAL_WEEKS - 1);
        assert_eq!(last - first, Duration::weeks(TOTAL_WEEKS as i64 - 1));
    }
}
