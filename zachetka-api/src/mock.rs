use std::convert::Infallible;
use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use zachetka_core::{CourseColor, Deadline, DeadlinesByDay};

use crate::course::{Course, Teacher};
use crate::source::DeadlineSource;

const MOCK_COURSES: [(&str, CourseColor); 7] = [
    ("Языки программирования", CourseColor::Red),
    ("Базы данных", CourseColor::Blue),
    ("Современные информационные технологии", CourseColor::Green),
    ("Фронтенд", CourseColor::Orange),
    ("Операционные системы", CourseColor::Violet),
    ("Алгоритмы и структуры данных", CourseColor::Teal),
    ("Компьютерные сети", CourseColor::Pink),
];

const MOCK_TASKS: [&str; 10] = [
    "Лабораторная работа №1",
    "Лабораторная работа №2",
    "Лабораторная работа №3",
    "Домашнее задание",
    "Курсовой проект",
    "Реферат",
    "Контрольная работа",
    "Оценка лабораторной работы №3",
    "Задание №3",
    "показать +3",
];

const ID_SUFFIX_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Deadline source that fabricates plausible study deadlines, for running
/// the calendar without a platform API.
///
/// [`new`](Self::new) draws from entropy and simulates network latency;
/// [`seeded`](Self::seeded) is deterministic and latency-free, for tests.
pub struct MockDeadlineSource {
    rng: Mutex<StdRng>,
    latency: bool,
}

impl MockDeadlineSource {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            latency: true,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            latency: false,
        }
    }
}

impl Default for MockDeadlineSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DeadlineSource for MockDeadlineSource {
    type Error = Infallible;

    async fn fetch_deadlines(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<DeadlinesByDay, Infallible> {
        if self.latency {
            let delay = {
                let mut rng = self.rng.lock().unwrap();
                rng.gen_range(200..500)
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let mut rng = self.rng.lock().unwrap();
        let mut by_day = DeadlinesByDay::new();
        let mut day = start.date();
        while day <= end.date() {
            let count = deadline_count(&mut rng);
            if count > 0 {
                by_day.insert(day, (0..count).map(|_| random_deadline(&mut rng, day)).collect());
            }
            day = day + chrono::Duration::days(1);
        }

        debug!(from = %start, to = %end, days = by_day.len(), "mock deadlines generated");
        Ok(by_day)
    }
}

/// Weighted count of deadlines for one day: 30% none, then tapering up to
/// five.
fn deadline_count(rng: &mut StdRng) -> usize {
    match rng.gen_range(0.0..1.0) {
        r if r < 0.30 => 0,
        r if r < 0.50 => 1,
        r if r < 0.70 => 2,
        r if r < 0.85 => 3,
        r if r < 0.95 => 4,
        _ => 5,
    }
}

fn random_deadline(rng: &mut StdRng, day: chrono::NaiveDate) -> Deadline {
    let (subject, color) = MOCK_COURSES[rng.gen_range(0..MOCK_COURSES.len())];
    let task = MOCK_TASKS[rng.gen_range(0..MOCK_TASKS.len())];

    let hour = rng.gen_range(18..23);
    let minute = if rng.gen_bool(0.5) { 0 } else { 25 };
    let due = day
        .and_hms_opt(hour, minute, 0)
        .expect("due hour is between 18 and 22")
        .and_utc();

    let suffix: String = (0..9)
        .map(|_| ID_SUFFIX_CHARSET[rng.gen_range(0..ID_SUFFIX_CHARSET.len())] as char)
        .collect();

    Deadline {
        id: format!("{day}-{suffix}"),
        subject_name: subject.to_string(),
        task_text: task.to_string(),
        due_date: due,
        course_color: color,
    }
}

/// Course catalog shown on the courses tab, mirroring the platform's pilot
/// data: the same course under each of the seven colors.
pub fn mock_courses() -> Vec<Course> {
    let teachers = vec![
        Teacher {
            first_name: "Инна".to_string(),
            last_name: "Батраева".to_string(),
            patronymic: Some("Александровна".to_string()),
            username: "inna_batraeva".to_string(),
        },
        Teacher {
            first_name: "Мария".to_string(),
            last_name: "Сафрончик".to_string(),
            patronymic: Some("Ильинична".to_string()),
            username: "maria_safronchik".to_string(),
        },
    ];

    [
        CourseColor::Blue,
        CourseColor::Teal,
        CourseColor::Green,
        CourseColor::Violet,
        CourseColor::Pink,
        CourseColor::Red,
        CourseColor::Orange,
    ]
    .into_iter()
    .map(|color| Course {
        id: "some-uuid".to_string(),
        title: "Структуры данных и алгоритмы. Анализ сложности алгоритмов".to_string(),
        color,
        icon_name: "code-xml".to_string(),
        teachers: teachers.clone(),
    })
    .collect()
}
