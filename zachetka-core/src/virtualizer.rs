use std::collections::BTreeMap;

/// One materialized row of the virtual axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualRow {
    pub index: usize,
    /// Absolute offset of the row's top edge from the start of the axis.
    pub start: f64,
    pub height: f64,
}

/// Windowed layout over a large fixed row count.
///
/// Every row starts out `estimate` units tall; [`measure`](Self::measure)
/// records actual rendered heights, and rows after a measured row re-flow
/// accordingly. Offsets are exact prefix sums, so the window computation is
/// idempotent for a given scroll state.
#[derive(Debug, Clone)]
pub struct Virtualizer {
    count: usize,
    estimate: f64,
    overscan: usize,
    measured: BTreeMap<usize, f64>,
}

impl Virtualizer {
    pub fn new(count: usize, estimate: f64, overscan: usize) -> Self {
        Self {
            count,
            estimate,
            overscan,
            measured: BTreeMap::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Height of row `index`: measured if known, the estimate otherwise.
    pub fn row_height(&self, index: usize) -> f64 {
        self.measured.get(&index).copied().unwrap_or(self.estimate)
    }

    /// Absolute offset of the top edge of row `index`.
    pub fn offset_of(&self, index: usize) -> f64 {
        let mut offset = index as f64 * self.estimate;
        for (_, &height) in self.measured.range(..index) {
            offset += height - self.estimate;
        }
        offset
    }

    /// Total height of the virtual axis.
    pub fn total_size(&self) -> f64 {
        let mut size = self.count as f64 * self.estimate;
        for &height in self.measured.values() {
            size += height - self.estimate;
        }
        size
    }

    /// Records the rendered height of a row. Rows after it re-flow on the
    /// next [`window`](Self::window) call.
    pub fn measure(&mut self, index: usize, height: f64) {
        if index >= self.count || height <= 0.0 {
            return;
        }
        if self.row_height(index) != height {
            self.measured.insert(index, height);
        }
    }

    /// Clamps a prospective scroll offset to the scrollable range.
    pub fn clamp_scroll(&self, offset: f64, viewport: f64) -> f64 {
        let max = (self.total_size() - viewport).max(0.0);
        offset.max(0.0).min(max)
    }

    /// Rows covering `[scroll_top, scroll_top + viewport)` plus overscan.
    ///
    /// The window always takes in the first row starting at or past the
    /// viewport's bottom edge, then extends `overscan` rows on both sides,
    /// clamped to the axis. Output is ordered ascending by index.
    pub fn window(&self, scroll_top: f64, viewport: f64) -> Vec<VirtualRow> {
        if self.count == 0 {
            return Vec::new();
        }
        let top = scroll_top.max(0.0);
        let bottom = top + viewport.max(0.0);

        let first = self.row_at(top);
        let mut last = first;
        let mut edge = self.offset_of(first) + self.row_height(first);
        while last + 1 < self.count && edge < bottom {
            last += 1;
            edge += self.row_height(last);
        }
        if last + 1 < self.count {
            last += 1;
        }

        let first = first.saturating_sub(self.overscan);
        let last = (last + self.overscan).min(self.count - 1);

        let mut start = self.offset_of(first);
        (first..=last)
            .map(|index| {
                let height = self.row_height(index);
                let row = VirtualRow {
                    index,
                    start,
                    height,
                };
                start += height;
                row
            })
            .collect()
    }

    /// Greatest row whose top edge is at or above `offset`.
    fn row_at(&self, offset: f64) -> usize {
        let mut lo = 0usize;
        let mut hi = self.count - 1;
        while lo < hi {
            let mid = (lo + hi).div_ceil(2);
            if self.offset_of(mid) <= offset {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        lo
    }
}
