use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Timelike, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_segmentation::UnicodeSegmentation;
use zachetka_api::Course;
use zachetka_core::{
    month_genitive_ru, month_name_ru, season_of, CalendarFrame, CourseColor, Deadline, Season,
    WeekCell, WeekRow,
};

use crate::app::{App, LoginField, Screen, Tab};

/// A day cell shows at most this many entries; past the limit it collapses to
/// two entries plus a "показать +N" line.
pub(crate) const MAX_VISIBLE_DEADLINES: usize = 3;

const MIN_CELL_HEIGHT: u16 = 4;
const CELL_GAP: u16 = 1;

const WEEKDAY_SHORT_RU: [&str; 7] = ["пн", "вт", "ср", "чт", "пт", "сб", "вс"];

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(crate) fn column_count(width: u16) -> usize {
    if width >= 120 {
        4
    } else if width >= 90 {
        3
    } else {
        2
    }
}

/// Grid height: the frame minus the tab row, the month header and the status bar.
pub(crate) fn calendar_viewport_height(height: u16) -> u16 {
    height.saturating_sub(3)
}

fn has_toggle(total: usize) -> bool {
    total > MAX_VISIBLE_DEADLINES - 1
}

fn visible_deadline_count(total: usize, expanded: bool) -> usize {
    if expanded || !has_toggle(total) {
        total
    } else {
        MAX_VISIBLE_DEADLINES - 1
    }
}

fn day_cell_height(total: usize, expanded: bool) -> u16 {
    let lines = 1 + visible_deadline_count(total, expanded) as u16 + has_toggle(total) as u16;
    lines.max(MIN_CELL_HEIGHT)
}

fn deadline_count(week: &WeekRow, date: NaiveDate) -> usize {
    week.status
        .data
        .as_ref()
        .and_then(|data| data.get(&date))
        .map(Vec::len)
        .unwrap_or(0)
}

fn cell_height(week: &WeekRow, cell: &WeekCell, expanded: &HashSet<NaiveDate>) -> u16 {
    match cell {
        WeekCell::MonthStart(_) => MIN_CELL_HEIGHT,
        WeekCell::Day(date) => {
            day_cell_height(deadline_count(week, *date), expanded.contains(date))
        }
    }
}

/// Height of each cell line of a week block, cells chunked `columns` per line.
pub(crate) fn week_line_heights(
    week: &WeekRow,
    columns: usize,
    expanded: &HashSet<NaiveDate>,
) -> Vec<u16> {
    week.cells
        .chunks(columns)
        .map(|line| {
            line.iter()
                .map(|cell| cell_height(week, cell, expanded))
                .max()
                .unwrap_or(MIN_CELL_HEIGHT)
        })
        .collect()
}

/// Rendered height of a whole week block, including the trailing gap line.
pub(crate) fn week_block_height(
    week: &WeekRow,
    columns: usize,
    expanded: &HashSet<NaiveDate>,
) -> u16 {
    week_line_heights(week, columns, expanded).iter().sum::<u16>() + CELL_GAP
}

pub fn render(frame: &mut Frame, app: &App) {
    match app.screen {
        Screen::Gate => render_gate(frame),
        Screen::Login => render_login(frame, app),
        Screen::Main => render_main(frame, app),
    }
}

fn render_gate(frame: &mut Frame) {
    let area = centered_rect(40, 20, frame.area());
    let text = Paragraph::new("Загрузка сессии...")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(text, area);
}

fn render_login(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let width = 44.min(area.width.saturating_sub(2));
    let height = 12.min(area.height.saturating_sub(2));
    let card = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Вход в систему");
    let inner = block.inner(card);
    frame.render_widget(block, card);

    let label_style = |field: LoginField| {
        if app.login.focus == field {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    let masked = "•".repeat(app.login.password.chars().count());
    let button = if app.login.submitting {
        "Вход..."
    } else {
        "Войти"
    };

    let mut lines = vec![
        Line::from(Span::styled(
            "Введите свои учетные данные для входа",
            Style::default().fg(Color::DarkGray),
        ))
        .centered(),
        Line::from(""),
        Line::from(Span::styled("Email", label_style(LoginField::Email))),
        Line::from(format!("  {}", app.login.email)),
        Line::from(Span::styled("Пароль", label_style(LoginField::Password))),
        Line::from(format!("  {}", masked)),
        Line::from(""),
        Line::from(Span::styled(
            button,
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .centered(),
    ];

    if let Some(ref error) = app.login.error {
        lines.push(Line::from(""));
        lines.push(
            Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            ))
            .centered(),
        );
    }

    frame.render_widget(Paragraph::new(lines), inner);

    if !app.login.submitting {
        let (filled, row) = match app.login.focus {
            LoginField::Email => (app.login.email.chars().count(), 3),
            LoginField::Password => (app.login.password.chars().count(), 5),
        };
        frame.set_cursor_position((inner.x + 2 + filled as u16, inner.y + row));
    }
}

fn render_main(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0]);
    match app.tab {
        Tab::Courses => render_courses(frame, app, chunks[1]),
        Tab::Calendar => render_calendar(frame, app, chunks[1]),
    }
    render_status_bar(frame, app, chunks[2]);

    if app.detail_open {
        render_detail_popup(frame, app);
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tab_style = |tab: Tab| {
        if app.tab == tab {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    let mut spans = vec![
        Span::styled("MergeMinds", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled("Курсы", tab_style(Tab::Courses)),
        Span::raw("  "),
        Span::styled("Дедлайны", tab_style(Tab::Calendar)),
    ];

    if let Some(ref session) = app.session {
        let user = format!("{} @{}", session.full_name(), session.username);
        let used: usize = spans.iter().map(Span::width).sum();
        let pad = (area.width as usize).saturating_sub(used + user.chars().count());
        spans.push(Span::raw(" ".repeat(pad)));
        spans.push(Span::styled(user, Style::default().fg(Color::DarkGray)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_calendar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let Some(ref cal) = app.frame else {
        return;
    };

    render_calendar_header(frame, app, cal, chunks[0]);
    render_week_grid(frame, app, cal, chunks[1]);
}

fn render_calendar_header(frame: &mut Frame, app: &App, cal: &CalendarFrame, area: Rect) {
    let mut spans = vec![Span::styled(
        capitalize_words(&cal.header),
        Style::default().add_modifier(Modifier::BOLD),
    )];

    if cal.is_fetching {
        let spinner = SPINNER_FRAMES[app.spinner_tick % SPINNER_FRAMES.len()];
        spans.push(Span::raw(" "));
        spans.push(Span::styled(spinner, Style::default().fg(Color::Cyan)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_week_grid(frame: &mut Frame, app: &App, cal: &CalendarFrame, area: Rect) {
    for week in &cal.weeks {
        let top = area.y as i32 + (week.start - cal.scroll_top).round() as i32;
        render_week_block(frame, app, week, area, top);
    }
}

/// Renders one week block at virtual position `top`. Cell lines that stick
/// out of the viewport are clipped; a partially visible line scrolls its
/// content so the hidden part is the one above the edge.
fn render_week_block(frame: &mut Frame, app: &App, week: &WeekRow, area: Rect, top: i32) {
    let heights = week_line_heights(week, app.columns, &app.expanded_days);
    let width = cell_width(area.width, app.columns);
    if width == 0 {
        return;
    }

    let view_top = area.y as i32;
    let view_bottom = area.bottom() as i32;

    let mut line_top = top;
    for (line_index, cells) in week.cells.chunks(app.columns).enumerate() {
        let height = heights[line_index];
        let line_bottom = line_top + height as i32;

        if line_bottom > view_top && line_top < view_bottom {
            let clip_top = (view_top - line_top).max(0) as u16;
            let visible_top = line_top.max(view_top) as u16;
            let visible_height = (line_bottom.min(view_bottom) - line_top.max(view_top)) as u16;

            for (column, cell) in cells.iter().enumerate() {
                let x = area.x + column as u16 * (width + CELL_GAP);
                let target = Rect::new(x, visible_top, width, visible_height);
                render_cell(frame, app, week, cell, target, clip_top, height);
            }
        }
        line_top = line_bottom;
    }
}

fn cell_width(area_width: u16, columns: usize) -> u16 {
    let gaps = (columns as u16).saturating_sub(1) * CELL_GAP;
    area_width.saturating_sub(gaps) / columns as u16
}

fn render_cell(
    frame: &mut Frame,
    app: &App,
    week: &WeekRow,
    cell: &WeekCell,
    target: Rect,
    clip_top: u16,
    height: u16,
) {
    let (lines, style) = match cell {
        WeekCell::MonthStart(date) => month_cell_lines(*date, height),
        WeekCell::Day(date) => day_cell_content(app, week, *date, target.width),
    };

    frame.render_widget(
        Paragraph::new(lines).style(style).scroll((clip_top, 0)),
        target,
    );
}

fn month_cell_lines(date: NaiveDate, height: u16) -> (Vec<Line<'static>>, Style) {
    let season_color = match season_of(date.month()) {
        Season::Winter => Color::LightBlue,
        Season::Spring | Season::Summer => Color::Green,
        Season::Autumn => Color::Indexed(208),
    };

    let mut lines = Vec::new();
    for _ in 0..height.saturating_sub(2) / 2 {
        lines.push(Line::from(""));
    }
    lines.push(
        Line::from(Span::styled(
            capitalize_words(month_name_ru(date.month())),
            Style::default()
                .fg(season_color)
                .add_modifier(Modifier::BOLD),
        ))
        .centered(),
    );
    lines.push(
        Line::from(Span::styled(
            date.year().to_string(),
            Style::default().fg(season_color),
        ))
        .centered(),
    );

    (lines, Style::default())
}

fn day_cell_content(
    app: &App,
    week: &WeekRow,
    date: NaiveDate,
    width: u16,
) -> (Vec<Line<'static>>, Style) {
    let is_today = date == app.engine.today();
    let is_selected = date == app.selected_day;
    let expanded = app.expanded_days.contains(&date);

    let deadlines = week
        .status
        .data
        .as_ref()
        .and_then(|data| data.get(&date))
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let style = if is_selected {
        Style::default().bg(Color::DarkGray)
    } else if is_today {
        Style::default().bg(Color::Rgb(23, 37, 84))
    } else {
        Style::default()
    };

    let number_style = if is_today {
        Style::default()
            .fg(Color::LightBlue)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let weekday = WEEKDAY_SHORT_RU[date.weekday().num_days_from_monday() as usize];
    let number = date.day().to_string();
    let pad = (width as usize).saturating_sub(weekday.chars().count() + number.chars().count());

    let mut lines = vec![Line::from(vec![
        Span::styled(weekday, Style::default().fg(Color::DarkGray)),
        Span::raw(" ".repeat(pad)),
        Span::styled(number, number_style),
    ])];

    if deadlines.is_empty() {
        if week.status.data.is_none() && week.status.is_loading {
            lines.push(Line::from(Span::styled(
                "…",
                Style::default().fg(Color::DarkGray),
            )));
        } else if week.status.data.is_none() && week.status.is_error {
            lines.push(Line::from(Span::styled(
                "нет данных",
                Style::default().fg(Color::Red),
            )));
        }
        return (lines, style);
    }

    let total = deadlines.len();
    for deadline in &deadlines[..visible_deadline_count(total, expanded)] {
        lines.push(deadline_chip(deadline, width));
    }

    if has_toggle(total) {
        let label = if expanded {
            "свернуть".to_string()
        } else {
            format!("показать +{}", total - (MAX_VISIBLE_DEADLINES - 1))
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(Color::DarkGray),
        )));
    }

    (lines, style)
}

fn deadline_chip(deadline: &Deadline, width: u16) -> Line<'static> {
    let max = width.saturating_sub(2) as usize;
    let text = truncate_graphemes(&deadline.subject_name, max);
    Line::from(Span::styled(
        format!(" {text:<max$} "),
        Style::default()
            .fg(Color::White)
            .bg(course_color(deadline.course_color)),
    ))
}

fn course_color(color: CourseColor) -> Color {
    match color {
        CourseColor::Blue => Color::Blue,
        CourseColor::Teal => Color::Cyan,
        CourseColor::Violet => Color::Magenta,
        CourseColor::Pink => Color::LightMagenta,
        CourseColor::Red => Color::Red,
        CourseColor::Orange => Color::Indexed(208),
        CourseColor::Green => Color::Green,
    }
}

fn render_courses(frame: &mut Frame, app: &App, area: Rect) {
    let card_height: u16 = 7;
    let card_width = area.width.saturating_sub(CELL_GAP) / 2;
    let mut y = area.y;

    for pair in app.courses.chunks(2).skip(app.courses_scroll) {
        if y + card_height > area.bottom() {
            break;
        }
        for (column, course) in pair.iter().enumerate() {
            let x = area.x + column as u16 * (card_width + CELL_GAP);
            render_course_card(frame, course, Rect::new(x, y, card_width, card_height));
        }
        y += card_height + 1;
    }
}

fn render_course_card(frame: &mut Frame, course: &Course, area: Rect) {
    let color = course_color(course.color);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let mut lines = vec![
        Line::from(Span::styled(
            truncate_graphemes(&course.title, width).to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Преподаватели:",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    for teacher in &course.teachers {
        let name = teacher.full_name();
        lines.push(Line::from(truncate_graphemes(&name, width).to_string()));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut hints = if app.detail_open {
        "Esc: Закрыть".to_string()
    } else {
        match app.tab {
            Tab::Calendar => {
                "←↑↓→: Дни  PgUp/PgDn: Недели  t: Сегодня  Enter: Подробнее  \
                 Space: Развернуть  Tab: Курсы  q: Выход"
                    .to_string()
            }
            Tab::Courses => "↑/↓: Прокрутка  Tab: Дедлайны  q: Выход".to_string(),
        }
    };
    if app.has_auth() && !app.detail_open {
        hints.push_str("  Ctrl+L: Выход из аккаунта");
    }

    let mut spans = vec![Span::styled(hints, Style::default().fg(Color::DarkGray))];
    if let Some(ref error) = app.last_error {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_detail_popup(frame: &mut Frame, app: &App) {
    let deadlines = app.deadlines_for(app.selected_day);
    if deadlines.is_empty() {
        return;
    }

    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let date = app.selected_day;
    let title = format!(
        "{} {} {} г.",
        date.day(),
        month_genitive_ru(date.month()),
        date.year()
    );

    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let now = Utc::now();
    let mut lines = Vec::new();
    for deadline in deadlines {
        let due = deadline.due_date.with_timezone(&chrono::Local);
        let due_style = if deadline.due_date < now {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Indexed(208))
        };

        lines.push(Line::from(Span::styled(
            deadline.subject_name.clone(),
            Style::default()
                .fg(course_color(deadline.course_color))
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(deadline.task_text.clone()));
        lines.push(Line::from(vec![
            Span::styled("Срок сдачи: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!(
                    "{} {} {} г. в {:02}:{:02}",
                    due.day(),
                    month_genitive_ru(due.month()),
                    due.year(),
                    due.hour(),
                    due.minute()
                ),
                due_style,
            ),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cuts a string to at most `max` grapheme clusters without splitting one.
fn truncate_graphemes(s: &str, max: usize) -> &str {
    match s.grapheme_indices(true).nth(max) {
        Some((index, _)) => &s[..index],
        None => s,
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
