/// Task Service client
///
/// [`TaskApi`] is the seam between the state controller and the server;
/// [`HttpTaskApi`] implements it over reqwest. Tests substitute fakes.
///
/// User identifiers are sent as path segments and percent-encoded, so
/// display names with spaces or accents (`João Victor`) address the right
/// account.
///
/// # Example
///
/// ```no_run
/// use gantt_client::api::{HttpTaskApi, TaskApi};
///
/// # async fn example() -> Result<(), gantt_client::error::ClientError> {
/// let api = HttpTaskApi::new("http://localhost:5000/api")?;
/// let login = api.login("admin", "admin123").await?;
/// let api = api.with_token(login.token);
///
/// for task in api.list_tasks().await? {
///     println!("{} ({}%)", task.name, task.progress);
/// }
/// # Ok(())
/// # }
/// ```

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use gantt_shared::models::task::DeletedTask;
use gantt_shared::wire::{
    DeleteEnvelope, ErrorBody, LoginRequest, LoginResponse, TaskEnvelope, TaskPayload, TaskView,
    UserIdentity,
};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Display names of every account, sorted
    async fn list_users(&self) -> ClientResult<Vec<String>>;

    /// The account a handle or display name resolves to
    async fn find_user(&self, identifier: &str) -> ClientResult<UserIdentity>;

    /// Every task, ordered by start date then owner
    async fn list_tasks(&self) -> ClientResult<Vec<TaskView>>;

    async fn create_task(&self, user: &str, payload: &TaskPayload) -> ClientResult<TaskView>;

    async fn update_task(
        &self,
        user: &str,
        task_id: i32,
        payload: &TaskPayload,
    ) -> ClientResult<TaskView>;

    async fn delete_task(&self, user: &str, task_id: i32) -> ClientResult<DeletedTask>;
}

/// reqwest-backed [`TaskApi`]
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpTaskApi {
    /// Creates a client for an API root such as `http://localhost:5000/api`
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: parsed,
            token: None,
        })
    }

    /// Sends `Authorization: Bearer <token>` on every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Exchanges credentials for a token
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self
            .request(Method::POST, &["auth", "login"])?
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> ClientResult<RequestBuilder> {
        let builder = self.client.request(method, self.endpoint(segments)?);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list_users(&self) -> ClientResult<Vec<String>> {
        let response = self.request(Method::GET, &["users"])?.send().await?;
        decode(response).await
    }

    async fn find_user(&self, identifier: &str) -> ClientResult<UserIdentity> {
        let response = self
            .request(Method::GET, &["users", identifier])?
            .send()
            .await?;
        decode(response).await
    }

    async fn list_tasks(&self) -> ClientResult<Vec<TaskView>> {
        let response = self.request(Method::GET, &["tasks"])?.send().await?;
        decode(response).await
    }

    async fn create_task(&self, user: &str, payload: &TaskPayload) -> ClientResult<TaskView> {
        let response = self
            .request(Method::POST, &["tasks", user])?
            .json(payload)
            .send()
            .await?;
        let envelope: TaskEnvelope = decode(response).await?;
        Ok(envelope.task)
    }

    async fn update_task(
        &self,
        user: &str,
        task_id: i32,
        payload: &TaskPayload,
    ) -> ClientResult<TaskView> {
        let id = task_id.to_string();
        let response = self
            .request(Method::PUT, &["tasks", user, &id])?
            .json(payload)
            .send()
            .await?;
        let envelope: TaskEnvelope = decode(response).await?;
        Ok(envelope.task)
    }

    async fn delete_task(&self, user: &str, task_id: i32) -> ClientResult<DeletedTask> {
        let id = task_id.to_string();
        let response = self
            .request(Method::DELETE, &["tasks", user, &id])?
            .send()
            .await?;
        let envelope: DeleteEnvelope = decode(response).await?;
        Ok(envelope.deleted_task)
    }
}

/// Decodes a success body, or turns the `{"error"}` body into [`ClientError::Api`]
async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("Unknown error").to_string(),
    };
    tracing::debug!(status = status.as_u16(), %message, "Request rejected");
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_display_names() {
        let api = HttpTaskApi::new("http://localhost:5000/api").unwrap();
        let url = api.endpoint(&["tasks", "João Victor", "7"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/tasks/Jo%C3%A3o%20Victor/7"
        );
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let api = HttpTaskApi::new("http://localhost:5000/api/").unwrap();
        let url = api.endpoint(&["users"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/users");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpTaskApi::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpTaskApi::new("mailto:team@example.com"),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
