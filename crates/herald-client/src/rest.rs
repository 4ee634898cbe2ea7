//! Notifications REST API.
//!
//! Separate from the live pipeline: paged history, mark-as-read, and
//! creation over plain HTTP. A notification delivered live should also
//! show up here eventually; nothing stronger is promised.

use herald_core::{NotificationDraft, NotificationRecord};
use serde::Deserialize;

/// One page of results, in the server's paging shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    /// Zero-based page index.
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.number + 1 >= self.total_pages
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Clone)]
pub struct NotificationApi {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl NotificationApi {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token: token.into(),
        }
    }

    /// Page through a user's notifications, newest first.
    pub async fn list(
        &self,
        user_id: u64,
        page: u32,
        size: u32,
    ) -> Result<Page<NotificationRecord>, RestError> {
        let response = self
            .http
            .get(self.endpoint(&format!("/notifications/user/{user_id}")))
            .query(&[("page", page), ("size", size)])
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn mark_read(&self, id: u64) -> Result<(), RestError> {
        let response = self
            .http
            .put(self.endpoint(&format!("/notifications/{id}/read")))
            .bearer_auth(&self.token)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    pub async fn create(
        &self,
        draft: &NotificationDraft,
    ) -> Result<NotificationRecord, RestError> {
        let response = self
            .http
            .post(self.endpoint("/notifications"))
            .bearer_auth(&self.token)
            .json(draft)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, RestError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RestError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn trims_trailing_slash() {
        let api = NotificationApi::new("http://api.local/", "t");
        assert_eq!(
            api.endpoint("/notifications"),
            "http://api.local/notifications"
        );
    }

    #[test]
    fn last_page() {
        let page: Page<NotificationRecord> =
            serde_json::from_str(r#"{"content":[],"totalPages":2,"number":1}"#).unwrap();
        assert!(page.is_last());
    }

    #[tokio::test]
    async fn list_sends_paging_and_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notifications/user/2"))
            .and(query_param("page", "0"))
            .and(query_param("size", "10"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"id": 4, "content": "hi", "userId": 2}],
                "totalElements": 1,
                "totalPages": 1,
                "number": 0,
                "size": 10
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = NotificationApi::new(server.uri(), "tok-1");
        let page = api.list(2, 0, 10).await.unwrap();
        assert_eq!(page.content, vec![NotificationRecord::new(4, "hi", 2)]);
        assert_eq!(page.total_elements, 1);
        assert!(page.is_last());
    }

    #[tokio::test]
    async fn create_posts_the_draft() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notifications"))
            .and(header("authorization", "Bearer tok-1"))
            .and(body_partial_json(json!({
                "content": "Task moved",
                "userId": 3,
                "category": "task"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 9,
                "content": "Task moved",
                "userId": 3,
                "category": "task"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = NotificationApi::new(server.uri(), "tok-1");
        let mut draft = NotificationDraft::new("Task moved", 3);
        draft.category = "task".into();
        let record = api.create(&draft).await.unwrap();
        assert_eq!(record.id, 9);
        assert_eq!(record.category, "task");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/notifications/9/read"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string(r#"{"error":"missing"}"#),
            )
            .mount(&server)
            .await;

        let api = NotificationApi::new(server.uri(), "tok-1");
        let err = api.mark_read(9).await.unwrap_err();
        match err {
            RestError::Status { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("missing"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn mark_read_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/notifications/9/read"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let api = NotificationApi::new(format!("{}/", server.uri()), "tok-1");
        api.mark_read(9).await.unwrap();
    }
}
