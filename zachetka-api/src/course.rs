use serde::{Deserialize, Serialize};

use zachetka_core::CourseColor;

/// A course teacher as shown on a course card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub first_name: String,
    pub last_name: String,
    pub patronymic: Option<String>,
    pub username: String,
}

impl Teacher {
    /// "Фамилия Имя Отчество", skipping a missing patronymic.
    pub fn full_name(&self) -> String {
        let mut parts = vec![self.last_name.as_str(), self.first_name.as_str()];
        if let Some(patronymic) = self.patronymic.as_deref() {
            if !patronymic.is_empty() {
                parts.push(patronymic);
            }
        }
        parts.join(" ")
    }
}

/// A course listed on the courses tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub color: CourseColor,
    pub icon_name: String,
    pub teachers: Vec<Teacher>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_last_first_patronymic() {
        let teacher = Teacher {
            first_name: "Инна".to_string(),
            last_name: "Батраева".to_string(),
            patronymic: Some("Александровна".to_string()),
            username: "inna_batraeva".to_string(),
        };
        assert_eq!(teacher.full_name(), "Батраева Инна Александровна");
    }

    #[test]
    fn full_name_without_patronymic() {
        let teacher = Teacher {
            first_name: "Мария".to_string(),
            last_name: "Сафрончик".to_string(),
            patronymic: None,
            username: "maria_safronchik".to_string(),
        };
        assert_eq!(teacher.full_name(), "Сафрончик Мария");
    }
}
