use chrono::{Datelike, NaiveDate};

/// One cell of a rendered week block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekCell {
    /// An ordinary day cell.
    Day(NaiveDate),
    /// A month divider standing where the 1st of the month would have been.
    MonthStart(NaiveDate),
}

impl WeekCell {
    pub fn date(&self) -> NaiveDate {
        match self {
            WeekCell::Day(date) | WeekCell::MonthStart(date) => *date,
        }
    }
}

/// Lays a week's seven days out as cells, applying the month-divider rule.
///
/// When the 1st of a month sits at position `p` and `p < columns`, the
/// divider replaces that day cell, so the 1st's own deadlines are not shown
/// for that week. With `p >= columns` the week is seven plain day cells.
pub fn layout_week(days: &[NaiveDate; 7], columns: usize) -> [WeekCell; 7] {
    let mut cells = days.map(WeekCell::Day);
    if let Some(position) = days.iter().position(|day| day.day() == 1) {
        if position < columns {
            cells[position] = WeekCell::MonthStart(days[position]);
        }
    }
    cells
}

/// Season bucket used to tint month dividers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

/// Season of a 1-based month.
pub fn season_of(month: u32) -> Season {
    match month {
        12 | 1 | 2 => Season::Winter,
        3..=5 => Season::Spring,
        6..=8 => Season::Summer,
        _ => Season::Autumn,
    }
}
