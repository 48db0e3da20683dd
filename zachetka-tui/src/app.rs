use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate, Utc};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use zachetka_api::{
    mock_courses, AnyDeadlineSource, ApiError, Course, DeadlineSource, Session, SessionState,
};
use zachetka_core::{CalendarEngine, CalendarFrame, Deadline, DeadlinesByDay, FetchRequest, TOTAL_WEEKS};

use crate::error::ZkError;
use crate::input;
use crate::ui;

/// Starting height of a week block in terminal lines, before measurement.
const ESTIMATED_WEEK_HEIGHT: f64 = 12.0;

const TICK_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Waiting for the session probe on startup.
    Gate,
    Login,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Courses,
    Calendar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
    pub submitting: bool,
}

struct WeekFetchOutcome {
    week_index: usize,
    result: Result<DeadlinesByDay, String>,
}

pub struct App {
    pub screen: Screen,
    pub tab: Tab,
    pub should_quit: bool,
    pub login: LoginForm,
    pub session: Option<Session>,
    pub courses: Vec<Course>,
    pub courses_scroll: usize,
    pub engine: CalendarEngine,
    pub frame: Option<CalendarFrame>,
    pub selected_day: NaiveDate,
    pub expanded_days: HashSet<NaiveDate>,
    pub detail_open: bool,
    pub last_error: Option<String>,
    pub spinner_tick: usize,
    pub columns: usize,
    source: Arc<AnyDeadlineSource>,
    fetch_tx: mpsc::UnboundedSender<WeekFetchOutcome>,
    fetch_rx: mpsc::UnboundedReceiver<WeekFetchOutcome>,
    session_rx: Option<oneshot::Receiver<Result<SessionState, ApiError>>>,
    login_rx: Option<oneshot::Receiver<Result<(), ApiError>>>,
    logout_rx: Option<oneshot::Receiver<Result<(), ApiError>>>,
}

impl App {
    pub fn new(source: AnyDeadlineSource, tab: Tab) -> Self {
        let today = Local::now().date_naive();
        let engine = CalendarEngine::new(today, ESTIMATED_WEEK_HEIGHT);
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();

        let mut app = Self {
            screen: Screen::Gate,
            tab,
            should_quit: false,
            login: LoginForm::default(),
            session: None,
            courses: mock_courses(),
            courses_scroll: 0,
            engine,
            frame: None,
            selected_day: today,
            expanded_days: HashSet::new(),
            detail_open: false,
            last_error: None,
            spinner_tick: 0,
            columns: 2,
            source: Arc::new(source),
            fetch_tx,
            fetch_rx,
            session_rx: None,
            login_rx: None,
            logout_rx: None,
        };

        if app.has_auth() {
            app.request_session();
        } else {
            app.session = Some(mock_session());
            app.screen = Screen::Main;
        }

        app
    }

    pub fn has_auth(&self) -> bool {
        self.source.api_client().is_some()
    }

    /// Advances timers, lands finished async work and rebuilds the visible
    /// calendar frame. Called once per event-loop iteration.
    pub fn tick(&mut self) {
        self.spinner_tick = self.spinner_tick.wrapping_add(1);
        self.poll_completions();

        if self.screen == Screen::Main && self.tab == Tab::Calendar {
            self.refresh_calendar();
        }
    }

    fn refresh_calendar(&mut self) {
        let now = Instant::now();
        let mut frame = self.engine.frame(self.columns, now);
        self.spawn_fetches(std::mem::take(&mut frame.requests));

        // Block heights depend on fetched data and expansion state. Feed the
        // rendered heights back, then rebuild the frame if anything moved.
        let mut remeasured = false;
        for week in &frame.weeks {
            let height = ui::week_block_height(week, self.columns, &self.expanded_days) as f64;
            if (height - week.height).abs() > 0.5 {
                self.engine.measure_row(week.index, height);
                remeasured = true;
            }
        }
        if remeasured {
            frame = self.engine.frame(self.columns, now);
            self.spawn_fetches(std::mem::take(&mut frame.requests));
        }

        self.frame = Some(frame);
    }

    fn spawn_fetches(&mut self, requests: Vec<FetchRequest>) {
        for request in requests {
            let source = Arc::clone(&self.source);
            let tx = self.fetch_tx.clone();

            tokio::spawn(async move {
                let result = source
                    .fetch_deadlines(request.start, request.end)
                    .await
                    .map_err(|e| e.to_string());
                let _ = tx.send(WeekFetchOutcome {
                    week_index: request.week_index,
                    result,
                });
            });
        }
    }

    fn poll_completions(&mut self) {
        let now = Instant::now();
        while let Ok(outcome) = self.fetch_rx.try_recv() {
            self.engine.apply_fetch(outcome.week_index, outcome.result, now);
        }

        if let Some(ref mut rx) = self.session_rx {
            match rx.try_recv() {
                Ok(Ok(SessionState::Authorized(session))) => {
                    debug!(username = %session.username, "session restored");
                    self.session = Some(session);
                    self.screen = Screen::Main;
                    self.session_rx = None;
                }
                Ok(Ok(SessionState::NotAuthorized)) => {
                    self.screen = Screen::Login;
                    self.session_rx = None;
                }
                Ok(Err(e)) => {
                    self.login.error = Some(e.to_string());
                    self.screen = Screen::Login;
                    self.session_rx = None;
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.screen = Screen::Login;
                    self.session_rx = None;
                }
            }
        }

        if let Some(ref mut rx) = self.login_rx {
            match rx.try_recv() {
                Ok(Ok(())) => {
                    self.login.submitting = false;
                    self.login.password.clear();
                    self.login.error = None;
                    self.login_rx = None;
                    // The login endpoint only sets the cookie, so the session
                    // itself still has to be fetched.
                    self.request_session();
                }
                Ok(Err(e)) => {
                    self.login.submitting = false;
                    self.login.error = Some(login_error_text(&e));
                    self.login_rx = None;
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.login.submitting = false;
                    self.login.error = Some("Запрос прерван".to_string());
                    self.login_rx = None;
                }
            }
        }

        if let Some(ref mut rx) = self.logout_rx {
            match rx.try_recv() {
                Ok(Ok(())) => {
                    self.session = None;
                    self.login = LoginForm::default();
                    self.screen = Screen::Login;
                    self.logout_rx = None;
                }
                Ok(Err(e)) => {
                    self.last_error = Some(e.to_string());
                    self.logout_rx = None;
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.logout_rx = None;
                }
            }
        }
    }

    fn request_session(&mut self) {
        let source = Arc::clone(&self.source);
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let Some(client) = source.api_client() else {
                return;
            };
            let result = client.fetch_session().await;
            let _ = tx.send(result);
        });

        self.session_rx = Some(rx);
        self.screen = Screen::Gate;
    }

    pub fn submit_login(&mut self) {
        if self.login.submitting {
            return;
        }

        let email = self.login.email.trim().to_string();
        let password = self.login.password.clone();
        if email.is_empty() {
            self.login.error = Some("Email обязателен".to_string());
            return;
        }
        if password.is_empty() {
            self.login.error = Some("Пароль обязателен".to_string());
            return;
        }

        let source = Arc::clone(&self.source);
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let Some(client) = source.api_client() else {
                return;
            };
            let result = client.login(&email, &password).await;
            let _ = tx.send(result);
        });

        self.login_rx = Some(rx);
        self.login.submitting = true;
        self.login.error = None;
    }

    pub fn logout(&mut self) {
        if !self.has_auth() || self.logout_rx.is_some() {
            return;
        }

        let source = Arc::clone(&self.source);
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let Some(client) = source.api_client() else {
                return;
            };
            let result = client.logout().await;
            let _ = tx.send(result);
        });

        self.logout_rx = Some(rx);
    }

    pub fn move_selection(&mut self, days: i64) {
        let (min, max) = {
            let indexer = self.engine.indexer();
            let min = indexer.week_start(0);
            let max = indexer.week_start(TOTAL_WEEKS - 1) + chrono::Duration::days(6);
            (min, max)
        };

        let target = self.selected_day + chrono::Duration::days(days);
        self.selected_day = target.clamp(min, max);
        self.detail_open = false;

        let index = self.engine.indexer().index_of(self.selected_day);
        self.engine.ensure_week_visible(index);
    }

    pub fn go_to_today(&mut self) {
        self.selected_day = self.engine.today();
        self.detail_open = false;
        self.engine.scroll_to_today();
    }

    pub fn scroll_calendar(&mut self, delta: f64) {
        self.engine.scroll_by(delta);
    }

    pub fn page_calendar(&mut self, direction: f64) {
        let viewport = self.engine.viewport();
        self.engine.scroll_by(direction * viewport);
    }

    pub fn toggle_expanded(&mut self) {
        let day = self.selected_day;
        if self.deadlines_for(day).len() < ui::MAX_VISIBLE_DEADLINES {
            return;
        }

        if !self.expanded_days.remove(&day) {
            self.expanded_days.insert(day);
        }
    }

    /// Deadlines cached for `day`, empty when its week has no data yet.
    pub fn deadlines_for(&self, day: NaiveDate) -> &[Deadline] {
        let Some(ref frame) = self.frame else {
            return &[];
        };

        let index = self.engine.indexer().index_of(day);
        frame
            .weeks
            .iter()
            .find(|week| week.index == index)
            .and_then(|week| week.status.data.as_ref())
            .and_then(|data| data.get(&day))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn open_detail(&mut self) {
        if !self.deadlines_for(self.selected_day).is_empty() {
            self.detail_open = true;
        }
    }

    pub fn close_detail(&mut self) {
        self.detail_open = false;
    }

    pub fn switch_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Courses => Tab::Calendar,
            Tab::Calendar => Tab::Courses,
        };
        self.detail_open = false;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn login_input_char(&mut self, c: char) {
        match self.login.focus {
            LoginField::Email => self.login.email.push(c),
            LoginField::Password => self.login.password.push(c),
        }
    }

    pub fn login_backspace(&mut self) {
        match self.login.focus {
            LoginField::Email => {
                self.login.email.pop();
            }
            LoginField::Password => {
                self.login.password.pop();
            }
        }
    }

    pub fn login_toggle_focus(&mut self) {
        self.login.focus = match self.login.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn set_terminal_size(&mut self, width: u16, height: u16) {
        self.columns = ui::column_count(width);
        self.engine
            .set_viewport(ui::calendar_viewport_height(height) as f64);
    }

    pub fn scroll_courses(&mut self, delta: i64) {
        let rows = (self.courses.len() + 1) / 2;
        let max = rows.saturating_sub(1) as i64;
        let next = self.courses_scroll as i64 + delta;
        self.courses_scroll = next.clamp(0, max) as usize;
    }
}

fn mock_session() -> Session {
    Session {
        avatar_url: "https://lipsum.app/random/500x500".to_string(),
        email: "t3m8ch@example.com".to_string(),
        first_name: "Артём".to_string(),
        last_name: "Кудяков".to_string(),
        patronymic: String::new(),
        username: "t3m8ch".to_string(),
        role: "STUDENT".to_string(),
        session_expires_at: Utc::now() + chrono::Duration::days(30),
    }
}

fn login_error_text(error: &ApiError) -> String {
    match error {
        ApiError::Api { status: 401, .. } => "Неверный email или пароль".to_string(),
        other => other.to_string(),
    }
}

pub async fn run(mut app: App) -> Result<(), ZkError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    app.set_terminal_size(size.width, size.height);

    let result = run_loop(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<(), ZkError> {
    loop {
        app.tick();
        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(TICK_INTERVAL)? {
            let event = event::read()?;
            input::handle_event(app, event);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
