use chrono::{Datelike, NaiveDate};

/// Lowercase nominative Russian month names, January first.
const MONTH_NAMES_RU: [&str; 12] = [
    "январь",
    "февраль",
    "март",
    "апрель",
    "май",
    "июнь",
    "июль",
    "август",
    "сентябрь",
    "октябрь",
    "ноябрь",
    "декабрь",
];

/// Genitive forms, used after a day number ("21 марта").
const MONTH_GENITIVES_RU: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// Nominative Russian name of a month. `month` is 1-based, as returned by
/// [`Datelike::month`].
pub fn month_name_ru(month: u32) -> &'static str {
    MONTH_NAMES_RU[month as usize - 1]
}

/// Genitive Russian name of a month. `month` is 1-based.
pub fn month_genitive_ru(month: u32) -> &'static str {
    MONTH_GENITIVES_RU[month as usize - 1]
}

/// Derives the calendar header label from the visible week-start dates.
///
/// The label names the first and last distinct month in first-occurrence
/// order; intermediate months are dropped. The year appears once when both
/// ends share it.
pub fn derive_header_text(visible_dates: &[NaiveDate]) -> String {
    let mut months: Vec<(i32, u32)> = Vec::new();
    for date in visible_dates {
        let pair = (date.year(), date.month());
        if !months.contains(&pair) {
            months.push(pair);
        }
    }

    match months.as_slice() {
        [] => String::new(),
        [(year, month)] => format!("{} {}", month_name_ru(*month), year),
        _ => {
            let (first_year, first_month) = months[0];
            let (last_year, last_month) = months[months.len() - 1];
            if first_year == last_year {
                format!(
                    "{} / {} {}",
                    month_name_ru(first_month),
                    month_name_ru(last_month),
                    first_year
                )
            } else {
                format!(
                    "{} {} / {} {}",
                    month_name_ru(first_month),
                    first_year,
                    month_name_ru(last_month),
                    last_year
                )
            }
        }
    }
}

/// Caches the last derivation so a steady visible set costs one comparison.
#[derive(Debug, Default)]
pub struct HeaderMemo {
    last: Option<(Vec<NaiveDate>, String)>,
}

impl HeaderMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header text for `visible_dates`, recomputed only when the input
    /// differs from the previous call.
    pub fn derive(&mut self, visible_dates: &[NaiveDate]) -> String {
        match &self.last {
            Some((cached, text)) if cached.as_slice() == visible_dates => text.clone(),
            _ => {
                let text = derive_header_text(visible_dates);
                self.last = Some((visible_dates.to_vec(), text.clone()));
                text
            }
        }
    }
}
