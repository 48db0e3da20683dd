use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authorized user's session, as served by `GET /api/v1/auth/session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "avatarURL")]
    pub avatar_url: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: String,
    pub username: String,
    pub role: String,
    pub session_expires_at: DateTime<Utc>,
}

impl Session {
    /// "Фамилия Имя Отчество", skipping an empty patronymic.
    pub fn full_name(&self) -> String {
        [
            self.last_name.as_str(),
            self.first_name.as_str(),
            self.patronymic.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Outcome of a session probe. A 401 is a regular state here, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Authorized(Session),
    NotAuthorized,
}

/// Body of `POST /api/v1/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire_session() -> serde_json::Value {
        json!({
            "avatarURL": "https://lipsum.app/random/500x500",
            "email": "t3m8ch@example.com",
            "firstName": "Артём",
            "lastName": "Кудяков",
            "patronymic": "",
            "username": "t3m8ch",
            "role": "student",
            "sessionExpiresAt": "2024-04-13T12:00:00Z"
        })
    }

    #[test]
    fn session_parses_the_wire_shape() {
        let session: Session = serde_json::from_value(wire_session()).unwrap();

        assert_eq!(session.avatar_url, "https://lipsum.app/random/500x500");
        assert_eq!(session.first_name, "Артём");
        assert_eq!(session.username, "t3m8ch");
        assert_eq!(
            session.session_expires_at,
            "2024-04-13T12:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn session_serializes_back_to_the_same_keys() {
        let session: Session = serde_json::from_value(wire_session()).unwrap();
        let value = serde_json::to_value(&session).unwrap();

        assert!(value.get("avatarURL").is_some());
        assert!(value.get("firstName").is_some());
        assert!(value.get("sessionExpiresAt").is_some());
        assert!(value.get("avatar_url").is_none());
    }

    #[test]
    fn full_name_skips_empty_patronymic() {
        let mut session: Session = serde_json::from_value(wire_session()).unwrap();
        assert_eq!(session.full_name(), "Кудяков Артём");

        session.patronymic = "Сергеевич".to_string();
        assert_eq!(session.full_name(), "Кудяков Артём Сергеевич");
    }

    #[test]
    fn login_request_uses_plain_keys() {
        let body = LoginRequest {
            email: "user@example.com".to_string(),
            password: "secret".to_string(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, json!({"email": "user@example.com", "password": "secret"}));
    }
}
