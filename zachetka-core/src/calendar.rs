use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::cache::{WeekCache, WeekStatus};
use crate::deadline::DeadlinesByDay;
use crate::header::HeaderMemo;
use crate::layout::{layout_week, WeekCell};
use crate::virtualizer::{VirtualRow, Virtualizer};
use crate::week::{WeekIndexer, ANCHOR_WEEK_INDEX, TOTAL_WEEKS};

/// Extra week rows materialized beyond the viewport on each side.
pub const OVERSCAN: usize = 2;

/// A deadline fetch the caller must run for one week window.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub week_index: usize,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// One week row of a computed frame, ready to draw.
#[derive(Debug, Clone)]
pub struct WeekRow {
    pub index: usize,
    /// Offset of the row's top edge on the virtual axis.
    pub start: f64,
    pub height: f64,
    pub cells: [WeekCell; 7],
    pub status: WeekStatus,
}

/// Everything a renderer needs for one paint of the calendar.
#[derive(Debug, Clone)]
pub struct CalendarFrame {
    /// Month label derived from the weeks visible without overscan.
    pub header: String,
    pub weeks: Vec<WeekRow>,
    /// Fetches the caller must issue before the next frame.
    pub requests: Vec<FetchRequest>,
    pub is_fetching: bool,
    pub scroll_top: f64,
    pub total_size: f64,
}

/// Drives the calendar: owns the week indexer, the virtualizer, the cache and
/// the header memo, and turns scroll state plus cache contents into paintable
/// frames.
///
/// The engine performs no I/O. Each [`frame`](Self::frame) lists the fetches
/// the caller must run; outcomes come back through
/// [`apply_fetch`](Self::apply_fetch) in any order.
pub struct CalendarEngine {
    indexer: WeekIndexer,
    virtualizer: Virtualizer,
    cache: WeekCache,
    header: HeaderMemo,
    today: NaiveDate,
    scroll_top: f64,
    viewport: f64,
}

impl CalendarEngine {
    /// Anchors the calendar at `today`, with `estimate` as the assumed height
    /// of an unmeasured week row. The initial scroll puts the anchor week at
    /// the top of the viewport.
    pub fn new(today: NaiveDate, estimate: f64) -> Self {
        let indexer = WeekIndexer::new(today);
        let virtualizer = Virtualizer::new(TOTAL_WEEKS, estimate, OVERSCAN);
        let scroll_top = virtualizer.offset_of(ANCHOR_WEEK_INDEX);
        Self {
            indexer,
            virtualizer,
            cache: WeekCache::new(),
            header: HeaderMemo::new(),
            today,
            scroll_top,
            viewport: 0.0,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn indexer(&self) -> &WeekIndexer {
        &self.indexer
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn viewport(&self) -> f64 {
        self.viewport
    }

    pub fn set_viewport(&mut self, height: f64) {
        self.viewport = height.max(0.0);
        self.scroll_top = self.virtualizer.clamp_scroll(self.scroll_top, self.viewport);
    }

    pub fn scroll_to(&mut self, offset: f64) {
        self.scroll_top = self.virtualizer.clamp_scroll(offset, self.viewport);
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.scroll_to(self.scroll_top + delta);
    }

    /// Scrolls the anchor week back to the top of the viewport.
    pub fn scroll_to_today(&mut self) {
        self.scroll_to(self.virtualizer.offset_of(ANCHOR_WEEK_INDEX));
    }

    /// Scrolls just far enough to bring the week at `index` fully into view.
    pub fn ensure_week_visible(&mut self, index: usize) {
        let top = self.virtualizer.offset_of(index);
        let bottom = top + self.virtualizer.row_height(index);
        if top < self.scroll_top {
            self.scroll_to(top);
        } else if bottom > self.scroll_top + self.viewport {
            self.scroll_to(bottom - self.viewport);
        }
    }

    /// Records the rendered height of a week row.
    pub fn measure_row(&mut self, index: usize, height: f64) {
        self.virtualizer.measure(index, height);
        self.scroll_top = self.virtualizer.clamp_scroll(self.scroll_top, self.viewport);
    }

    /// Applies a fetch outcome to the week it was issued for.
    pub fn apply_fetch(
        &mut self,
        week_index: usize,
        result: Result<DeadlinesByDay, String>,
        now: Instant,
    ) {
        self.cache.complete(week_index, result, now);
    }

    /// Computes one frame: the intersecting week rows with their cached data,
    /// the fetches to issue, and the header label derived from the rows
    /// visible without overscan. Expired cache entries are dropped first.
    pub fn frame(&mut self, columns: usize, now: Instant) -> CalendarFrame {
        self.cache.evict_expired(now);

        let rows = self.virtualizer.window(self.scroll_top, self.viewport);
        let mut requests = Vec::new();
        let mut weeks = Vec::with_capacity(rows.len());
        for row in &rows {
            if self.cache.request(row.index, now) {
                let (start, end) = self.indexer.week_bounds(row.index);
                requests.push(FetchRequest {
                    week_index: row.index,
                    start,
                    end,
                });
            }
            weeks.push(WeekRow {
                index: row.index,
                start: row.start,
                height: row.height,
                cells: layout_week(&self.indexer.days(row.index), columns),
                status: self.cache.view(row.index, now),
            });
        }

        if !requests.is_empty() {
            debug!(issued = requests.len(), "frame issued week fetches");
        }

        let visible_starts = self.visible_week_starts(&rows);
        CalendarFrame {
            header: self.header.derive(&visible_starts),
            weeks,
            requests,
            is_fetching: self.cache.in_flight_count() > 0,
            scroll_top: self.scroll_top,
            total_size: self.virtualizer.total_size(),
        }
    }

    /// Week-start dates of the rows shown without overscan: the window minus
    /// its first `OVERSCAN` and last `OVERSCAN - 1` rows.
    fn visible_week_starts(&self, rows: &[VirtualRow]) -> Vec<NaiveDate> {
        let end = (rows.len() + 1).saturating_sub(OVERSCAN);
        if end <= OVERSCAN {
            return Vec::new();
        }
        rows[OVERSCAN..end]
            .iter()
            .map(|row| self.indexer.week_start(row.index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::derive_header_text;
    use std::time::Duration;

    const ESTIMATE: f64 = 168.0;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine() -> CalendarEngine {
        let mut engine = CalendarEngine::new(date(2024, 3, 13), ESTIMATE);
        engine.set_viewport(600.0);
        engine
    }

    fn week_with_day(day: NaiveDate) -> DeadlinesByDay {
        let mut by_day = DeadlinesByDay::new();
        by_day.insert(day, Vec::new());
        by_day
    }

    #[test]
    fn initial_frame_anchors_on_todays_week() {
        let mut engine = engine();
        let frame = engine.frame(4, Instant::now());

        assert_eq!(frame.scroll_top, ANCHOR_WEEK_INDEX as f64 * ESTIMATE);
        assert!(frame.weeks.iter().any(|week| week.index == ANCHOR_WEEK_INDEX));
        assert_eq!(frame.weeks[0].index, ANCHOR_WEEK_INDEX - OVERSCAN);
    }

    #[test]
    fn frame_requests_every_intersecting_week_once() {
        let mut engine = engine();
        let now = Instant::now();

        let first = engine.frame(4, now);
        assert_eq!(first.requests.len(), first.weeks.len());
        assert!(first.is_fetching);
        assert!(first.weeks.iter().all(|week| week.status.is_loading));

        // Nothing has completed, so a second frame issues nothing.
        let second = engine.frame(4, now);
        assert!(second.requests.is_empty());
        assert!(second.is_fetching);
    }

    #[test]
    fn completed_weeks_render_with_data_and_stop_fetching() {
        let mut engine = engine();
        let now = Instant::now();

        let first = engine.frame(4, now);
        for request in &first.requests {
            let monday = request.start.date();
            engine.apply_fetch(request.week_index, Ok(week_with_day(monday)), now);
        }

        let second = engine.frame(4, now);
        assert!(second.requests.is_empty());
        assert!(!second.is_fetching);
        for week in &second.weeks {
            let data = week.status.data.as_ref().unwrap();
            assert!(data.contains_key(&engine.indexer().week_start(week.index)));
        }
    }

    #[test]
    fn out_of_order_completions_land_on_their_weeks() {
        let mut engine = engine();
        let now = Instant::now();

        let mut requests = engine.frame(4, now).requests;
        requests.reverse();
        for request in &requests {
            engine.apply_fetch(request.week_index, Ok(week_with_day(request.start.date())), now);
        }

        let frame = engine.frame(4, now);
        for week in &frame.weeks {
            let data = week.status.data.as_ref().unwrap();
            assert_eq!(data.len(), 1);
            assert!(data.contains_key(&engine.indexer().week_start(week.index)));
        }
    }

    #[test]
    fn failed_week_retries_on_next_frame() {
        let mut engine = engine();
        let now = Instant::now();

        let first = engine.frame(4, now);
        let failed = first.requests[0].week_index;
        for request in &first.requests {
            let result = if request.week_index == failed {
                Err("timeout".to_string())
            } else {
                Ok(week_with_day(request.start.date()))
            };
            engine.apply_fetch(request.week_index, result, now);
        }

        let second = engine.frame(4, now);
        let retried: Vec<usize> = second.requests.iter().map(|r| r.week_index).collect();
        assert_eq!(retried, vec![failed]);

        let errored = second.weeks.iter().find(|w| w.index == failed).unwrap();
        assert!(errored.status.is_error);
    }

    #[test]
    fn stale_weeks_revalidate_but_still_serve_data() {
        let mut engine = engine();
        let fetched = Instant::now();

        let first = engine.frame(4, fetched);
        for request in &first.requests {
            engine.apply_fetch(request.week_index, Ok(week_with_day(request.start.date())), fetched);
        }

        let later = fetched + Duration::from_secs(6 * 60);
        let frame = engine.frame(4, later);
        assert_eq!(frame.requests.len(), frame.weeks.len());
        for week in &frame.weeks {
            assert!(week.status.data.is_some());
            assert!(week.status.is_stale);
            assert!(week.status.is_loading);
        }
    }

    #[test]
    fn header_comes_from_rows_visible_without_overscan() {
        let mut engine = engine();
        let frame = engine.frame(4, Instant::now());

        // Window rows minus the first two and the last one.
        let expected: Vec<NaiveDate> = frame.weeks[OVERSCAN..frame.weeks.len() - OVERSCAN + 1]
            .iter()
            .map(|week| engine.indexer().week_start(week.index))
            .collect();
        assert_eq!(frame.header, derive_header_text(&expected));
        assert_eq!(frame.header, "март / апрель 2024");
    }

    #[test]
    fn tiny_viewport_still_derives_a_header() {
        let mut engine = CalendarEngine::new(date(2024, 3, 13), ESTIMATE);
        engine.set_viewport(10.0);

        // Overscan keeps the window at six rows even for a sliver viewport,
        // and the trimmed middle lands on the anchor's month.
        let frame = engine.frame(4, Instant::now());
        assert_eq!(frame.weeks.len(), 6);
        assert_eq!(frame.header, "март 2024");
    }

    #[test]
    fn measured_rows_shift_later_offsets() {
        let mut engine = engine();
        let before = engine.frame(4, Instant::now());
        let anchor_pos = before
            .weeks
            .iter()
            .position(|week| week.index == ANCHOR_WEEK_INDEX)
            .unwrap();

        engine.measure_row(ANCHOR_WEEK_INDEX, ESTIMATE + 40.0);

        let after = engine.frame(4, Instant::now());
        let anchor = &after.weeks[anchor_pos];
        assert_eq!(anchor.height, ESTIMATE + 40.0);
        assert_eq!(
            after.weeks[anchor_pos + 1].start,
            anchor.start + ESTIMATE + 40.0
        );
        assert_eq!(after.total_size, before.total_size + 40.0);
    }

    #[test]
    fn scroll_clamps_to_the_axis() {
        let mut engine = engine();

        engine.scroll_to(-500.0);
        assert_eq!(engine.scroll_top(), 0.0);
        assert_eq!(engine.frame(4, Instant::now()).weeks[0].index, 0);

        engine.scroll_to(f64::MAX);
        let frame = engine.frame(4, Instant::now());
        assert_eq!(
            frame.weeks.last().unwrap().index,
            TOTAL_WEEKS - 1
        );
        assert_eq!(engine.scroll_top(), frame.total_size - 600.0);
    }

    #[test]
    fn ensure_week_visible_scrolls_minimally() {
        let mut engine = engine();
        let top_before = engine.scroll_top();

        // Already visible: no movement.
        engine.ensure_week_visible(ANCHOR_WEEK_INDEX + 1);
        assert_eq!(engine.scroll_top(), top_before);

        // Below the viewport: bottom edge aligns.
        engine.ensure_week_visible(ANCHOR_WEEK_INDEX + 10);
        assert_eq!(
            engine.scroll_top(),
            (ANCHOR_WEEK_INDEX + 11) as f64 * ESTIMATE - 600.0
        );

        // Above the viewport: top edge aligns.
        engine.ensure_week_visible(ANCHOR_WEEK_INDEX - 3);
        assert_eq!(
            engine.scroll_top(),
            (ANCHOR_WEEK_INDEX - 3) as f64 * ESTIMATE
        );
    }

    #[test]
    fn month_divider_appears_for_a_week_containing_the_first() {
        let mut engine = engine();
        // 2024-04-01 is the Monday three weeks past the anchor Monday.
        engine.scroll_to((ANCHOR_WEEK_INDEX + 3) as f64 * ESTIMATE);

        let frame = engine.frame(2, Instant::now());
        let week = frame
            .weeks
            .iter()
            .find(|week| week.index == ANCHOR_WEEK_INDEX + 3)
            .unwrap();
        assert_eq!(week.cells[0], WeekCell::MonthStart(date(2024, 4, 1)));
    }

    #[test]
    fn evicted_weeks_fetch_again_after_the_gc_window() {
        let mut engine = engine();
        let fetched = Instant::now();

        let first = engine.frame(4, fetched);
        for request in &first.requests {
            engine.apply_fetch(request.week_index, Ok(week_with_day(request.start.date())), fetched);
        }

        let later = fetched + Duration::from_secs(11 * 60);
        let frame = engine.frame(4, later);
        assert_eq!(frame.requests.len(), frame.weeks.len());
        for week in &frame.weeks {
            assert!(week.status.data.is_none());
            assert!(week.status.is_loading);
        }
    }
}
