use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

use crate::app::{App, Screen, Tab};

pub fn handle_event(app: &mut App, event: Event) {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Mouse(mouse) => handle_mouse(app, mouse),
        Event::Resize(width, height) => app.set_terminal_size(width, height),
        _ => {}
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match app.screen {
        Screen::Gate => handle_gate_key(app, key),
        Screen::Login => handle_login_key(app, key),
        Screen::Main if app.detail_open => handle_detail_key(app, key),
        Screen::Main => match app.tab {
            Tab::Calendar => handle_calendar_key(app, key),
            Tab::Courses => handle_courses_key(app, key),
        },
    }
}

fn handle_gate_key(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
        app.quit();
    }
}

fn handle_login_key(app: &mut App, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => app.quit(),
        (KeyCode::Tab | KeyCode::Up | KeyCode::Down, _) => app.login_toggle_focus(),
        (KeyCode::Enter, _) => app.submit_login(),
        (KeyCode::Backspace, _) => app.login_backspace(),
        (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => app.login_input_char(c),
        _ => {}
    }
}

fn handle_detail_key(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
        app.close_detail();
    }
}

fn handle_calendar_key(app: &mut App, key: KeyEvent) {
    match (key.code, key.modifiers) {
        // Before the plain 'l' binding below.
        (KeyCode::Char('l'), KeyModifiers::CONTROL) => app.logout(),
        (KeyCode::Esc | KeyCode::Char('q'), _) => app.quit(),
        (KeyCode::Tab, _) => app.switch_tab(),
        (KeyCode::Left | KeyCode::Char('h'), _) => app.move_selection(-1),
        (KeyCode::Right | KeyCode::Char('l'), _) => app.move_selection(1),
        (KeyCode::Up | KeyCode::Char('k'), _) => app.move_selection(-7),
        (KeyCode::Down | KeyCode::Char('j'), _) => app.move_selection(7),
        (KeyCode::PageUp, _) => app.page_calendar(-1.0),
        (KeyCode::PageDown, _) => app.page_calendar(1.0),
        (KeyCode::Home | KeyCode::Char('t'), _) => app.go_to_today(),
        (KeyCode::Enter, _) => app.open_detail(),
        (KeyCode::Char(' '), _) => app.toggle_expanded(),
        _ => {}
    }
}

fn handle_courses_key(app: &mut App, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Char('l'), KeyModifiers::CONTROL) => app.logout(),
        (KeyCode::Esc | KeyCode::Char('q'), _) => app.quit(),
        (KeyCode::Tab, _) => app.switch_tab(),
        (KeyCode::Up | KeyCode::Char('k'), _) => app.scroll_courses(-1),
        (KeyCode::Down | KeyCode::Char('j'), _) => app.scroll_courses(1),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.screen != Screen::Main {
        return;
    }

    match (mouse.kind, app.tab) {
        (MouseEventKind::ScrollDown, Tab::Calendar) => app.scroll_calendar(3.0),
        (MouseEventKind::ScrollUp, Tab::Calendar) => app.scroll_calendar(-3.0),
        (MouseEventKind::ScrollDown, Tab::Courses) => app.scroll_courses(1),
        (MouseEventKind::ScrollUp, Tab::Courses) => app.scroll_courses(-1),
        _ => {}
    }
}
