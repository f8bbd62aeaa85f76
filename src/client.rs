use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Request};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content type sent with the custom joke body.
pub const CUSTOM_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Name pair posted to `/jokes/custom`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
    pub first: String,
    pub last: String,
}

impl Person {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
        }
    }
}

/// The three joke requests a page can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JokeAction {
    Random,
    Personal,
    Custom,
}

impl JokeAction {
    pub const ALL: [JokeAction; 3] = [JokeAction::Random, JokeAction::Personal, JokeAction::Custom];

    pub fn path(&self) -> &'static str {
        match self {
            JokeAction::Random => "/jokes/random",
            JokeAction::Personal => "/jokes/personal",
            JokeAction::Custom => "/jokes/custom",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            JokeAction::Random | JokeAction::Personal => Method::GET,
            JokeAction::Custom => Method::POST,
        }
    }

    /// Id of the page element replaced by this action's reply.
    pub fn target(&self) -> &'static str {
        match self {
            JokeAction::Random => "rJoke",
            JokeAction::Personal => "pJoke",
            JokeAction::Custom => "cJoke",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            JokeAction::Random => "Random",
            JokeAction::Personal => "Personal",
            JokeAction::Custom => "Custom",
        }
    }
}

/// A finished HTTP exchange. Any status is a reply; only 200 is a success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

#[derive(Debug, Error)]
pub enum JokeError {
    /// The request could not be built, so nothing was sent.
    #[error("failed to dispatch {action:?} request: {source}")]
    Dispatch {
        action: JokeAction,
        #[source]
        source: reqwest::Error,
    },

    /// The request was sent but never produced a full reply.
    #[error("{action:?} request did not complete: {source}")]
    Transport {
        action: JokeAction,
        #[source]
        source: reqwest::Error,
    },

    #[error("no element with id '{0}' on the page")]
    MissingTarget(&'static str),

    #[error("failed to encode custom joke body: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct JokeClient {
    client: Client,
    base_url: String,
}

impl JokeClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        // The builder only fails when the TLS backend cannot initialise.
        let client = builder.build().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default HTTP client");
            Client::new()
        });

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, action: JokeAction) -> String {
        format!("{}{}", self.base_url, action.path())
    }

    /// Builds the request for `action` without sending it.
    ///
    /// `person` is only used by [`JokeAction::Custom`].
    pub fn prepare(
        &self,
        action: JokeAction,
        person: Option<&Person>,
    ) -> Result<Request, JokeError> {
        let mut builder = self.client.request(action.method(), self.url_for(action));

        if action == JokeAction::Custom {
            let body = serde_json::to_string(&person.cloned().unwrap_or_default())?;
            builder = builder
                .header(CONTENT_TYPE, HeaderValue::from_static(CUSTOM_CONTENT_TYPE))
                .body(body);
        }

        builder
            .build()
            .map_err(|source| JokeError::Dispatch { action, source })
    }

    /// Sends a prepared request and waits for the whole body.
    pub async fn execute(&self, action: JokeAction, request: Request) -> Result<Reply, JokeError> {
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|source| JokeError::Transport { action, source })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| JokeError::Transport { action, source })?;

        Ok(Reply { status, body })
    }

    pub async fn send(
        &self,
        action: JokeAction,
        person: Option<&Person>,
    ) -> Result<Reply, JokeError> {
        let request = self.prepare(action, person)?;
        self.execute(action, request).await
    }

    pub async fn random_joke(&self) -> Result<Reply, JokeError> {
        self.send(JokeAction::Random, None).await
    }

    pub async fn personal_joke(&self) -> Result<Reply, JokeError> {
        self.send(JokeAction::Personal, None).await
    }

    pub async fn custom_joke(&self, person: &Person) -> Result<Reply, JokeError> {
        self.send(JokeAction::Custom, Some(person)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_serializes_like_the_page_script() {
        let body = serde_json::to_string(&Person::new("Chuck", "Norris")).unwrap();
        assert_eq!(body, r#"{"first":"Chuck","last":"Norris"}"#);
    }

    #[test]
    fn test_person_blank_fields_are_kept() {
        let body = serde_json::to_string(&Person::default()).unwrap();
        assert_eq!(body, r#"{"first":"","last":""}"#);
    }

    #[test]
    fn test_url_for_strips_trailing_slash() {
        let client = JokeClient::new("http://localhost:3000/");
        assert_eq!(client.url_for(JokeAction::Random), "http://localhost:3000/jokes/random");
        assert_eq!(client.url_for(JokeAction::Custom), "http://localhost:3000/jokes/custom");
    }

    #[test]
    fn test_prepare_custom_sets_header_and_body() {
        let client = JokeClient::new("http://localhost:3000");
        let request = client
            .prepare(JokeAction::Custom, Some(&Person::new("Ada", "")))
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            "application/json;charset=UTF-8"
        );
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"{"first":"Ada","last":""}"#);
    }

    #[test]
    fn test_prepare_get_has_no_body() {
        let client = JokeClient::new("http://localhost:3000");
        let request = client.prepare(JokeAction::Personal, None).unwrap();
        assert_eq!(request.method(), Method::GET);
        assert!(request.body().is_none());
        assert!(request.url().query().is_none());
    }

    #[test]
    fn test_prepare_malformed_url_is_dispatch_error() {
        let client = JokeClient::new("not a url");
        let err = client.prepare(JokeAction::Random, None).unwrap_err();
        assert!(matches!(err, JokeError::Dispatch { action: JokeAction::Random, .. }));
    }

    #[test]
    fn test_only_200_is_ok() {
        assert!(Reply { status: 200, body: String::new() }.is_ok());
        assert!(!Reply { status: 201, body: String::new() }.is_ok());
        assert!(!Reply { status: 404, body: String::new() }.is_ok());
    }
}
