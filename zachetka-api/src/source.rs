use std::convert::Infallible;
use std::future::Future;

use chrono::NaiveDateTime;
use thiserror::Error;

use zachetka_core::DeadlinesByDay;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::mock::MockDeadlineSource;

/// Supplies the deadlines falling inside one date window, keyed by day.
///
/// The calendar issues one call per visible week, so implementations must be
/// safe to call concurrently for disjoint windows.
pub trait DeadlineSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch_deadlines(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> impl Future<Output = Result<DeadlinesByDay, Self::Error>> + Send;
}

#[derive(Debug, Error)]
pub enum AnySourceError {
    #[error("api error: {0}")]
    Api(#[from] ApiError),
}

impl From<Infallible> for AnySourceError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// Either deadline source the application can run against.
pub enum AnyDeadlineSource {
    Mock(MockDeadlineSource),
    Api(ApiClient),
}

impl AnyDeadlineSource {
    /// The platform client behind this source, when it is the live API.
    /// The auth flow must reuse it so the session cookie reaches every call.
    pub fn api_client(&self) -> Option<&ApiClient> {
        match self {
            AnyDeadlineSource::Api(client) => Some(client),
            AnyDeadlineSource::Mock(_) => None,
        }
    }
}

impl DeadlineSource for AnyDeadlineSource {
    type Error = AnySourceError;

    async fn fetch_deadlines(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<DeadlinesByDay, AnySourceError> {
        match self {
            AnyDeadlineSource::Mock(source) => {
                source.fetch_deadlines(start, end).await.map_err(Into::into)
            }
            AnyDeadlineSource::Api(client) => {
                client.fetch_deadlines(start, end).await.map_err(Into::into)
            }
        }
    }
}
