use chrono::NaiveDateTime;
use reqwest::StatusCode;
use tracing::{debug, instrument};

use zachetka_core::DeadlinesByDay;

use crate::error::ApiError;
use crate::session::{LoginRequest, Session, SessionState};
use crate::source::DeadlineSource;

const DEFAULT_BASE_URL: &str = "http://localhost:8034";

/// Client for the student-platform API.
///
/// The session is cookie-borne, so every flow must go through one client
/// instance: the cookie jar filled by [`login`](Self::login) is what
/// authorizes the later deadline fetches.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client against the default local API address.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Probes the current session. A 401 means "not signed in" and is a
    /// regular outcome here, not an error.
    #[instrument(skip(self))]
    pub async fn fetch_session(&self) -> Result<SessionState, ApiError> {
        let response = self
            .http
            .get(format!("{}/api/v1/auth/session", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            debug!("no active session");
            return Ok(SessionState::NotAuthorized);
        }
        if !status.is_success() {
            return Err(error_from_response(status, response).await);
        }

        let session: Session = response.json().await?;
        debug!(username = %session.username, "session authorized");
        Ok(SessionState::Authorized(session))
    }

    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .http
            .post(format!("{}/api/v1/auth/login", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(status, response).await);
        }

        debug!("login succeeded");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self
            .http
            .post(format!("{}/api/v1/auth/logout", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(status, response).await);
        }

        debug!("logout succeeded");
        Ok(())
    }
}

impl DeadlineSource for ApiClient {
    type Error = ApiError;

    #[instrument(skip(self), fields(from = %start, to = %end))]
    async fn fetch_deadlines(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<DeadlinesByDay, ApiError> {
        let response = self
            .http
            .get(format!("{}/api/v1/deadlines", self.base_url))
            .query(&[
                ("from", start.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()),
                ("to", end.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(status, response).await);
        }

        let deadlines: DeadlinesByDay = response.json().await?;
        debug!(days = deadlines.len(), "deadlines fetched");
        Ok(deadlines)
    }
}

async fn error_from_response(status: StatusCode, response: reqwest::Response) -> ApiError {
    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Unknown error".to_string());
    ApiError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new().unwrap();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_client_custom_base_url() {
        let client = ApiClient::with_base_url("http://api.example.com").unwrap();
        assert_eq!(client.base_url, "http://api.example.com");
    }

    #[tokio::test]
    #[ignore = "requires a running platform API on localhost:8034"]
    async fn test_live_session_probe() {
        let client = ApiClient::new().unwrap();
        let state = client.fetch_session().await.unwrap();
        assert!(matches!(
            state,
            SessionState::NotAuthorized | SessionState::Authorized(_)
        ));
    }
}
