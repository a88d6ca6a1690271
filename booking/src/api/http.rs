//! `reqwest` client for the lesson service.

use super::{ApiError, ApiFuture, ApiResult, LessonApi};
use crate::catalog::{LessonRecord, normalize_records};
use crate::checkout::{OrderReceipt, OrderRequest};
use crate::config::BookingConfig;
use crate::types::{Lesson, LessonId};
use futures::FutureExt;
use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Lesson service over HTTP
///
/// Every request carries the client-wide timeout, so a hung call resolves
/// as [`ApiError::Timeout`].
#[derive(Clone, Debug)]
pub struct HttpLessonApi {
    client: Client,
    base_url: Url,
}

#[derive(Serialize)]
struct SpacesUpdate {
    spaces: u32,
}

impl HttpLessonApi {
    /// Create a client for the service at `base_url`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` is not an absolute
    /// http(s) URL, or [`ApiError::Network`] if the TLS backend fails to
    /// initialise.
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let parsed =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_owned()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// See [`HttpLessonApi::new`].
    pub fn from_config(config: &BookingConfig) -> ApiResult<Self> {
        Self::new(&config.backend_url, config.request_timeout)
    }

    /// Base URL requests are resolved against
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn transport_error(error: &reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout
    } else if error.is_decode() {
        ApiError::Decode(error.to_string())
    } else {
        ApiError::Network(error.to_string())
    }
}

/// Send a request and return the body of a successful response
async fn execute(request: RequestBuilder) -> ApiResult<String> {
    let response = request.send().await.map_err(|e| transport_error(&e))?;
    let status = response.status();
    let body = response.text().await.map_err(|e| transport_error(&e))?;

    if status.is_success() {
        Ok(body)
    } else {
        let message = error_message(&body)
            .or_else(|| status.canonical_reason().map(str::to_owned))
            .unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

/// `{"error": "..."}` or `{"message": "..."}` from an error body, else the
/// body itself
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => ["error", "message"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str).map(str::to_owned))
            .or_else(|| Some(trimmed.to_owned())),
        _ => Some(trimmed.to_owned()),
    }
}

fn decode_lessons(body: &str) -> ApiResult<Vec<Lesson>> {
    serde_json::from_str::<Vec<LessonRecord>>(body)
        .map(normalize_records)
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Order id from a confirmation body; an `{error}` body is a rejection even
/// with a success status
fn decode_receipt(body: &str) -> ApiResult<OrderReceipt> {
    if body.trim().is_empty() {
        return Ok(OrderReceipt::default());
    }
    let value: Value = serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;

    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Err(ApiError::Status {
            status: 200,
            message: message.to_owned(),
        });
    }

    let order_id = ["_id", "id", "orderId", "insertedId"].iter().find_map(|key| {
        match value.get(*key)? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    });
    Ok(OrderReceipt { order_id })
}

impl LessonApi for HttpLessonApi {
    fn fetch_lessons(&self) -> ApiFuture<Vec<Lesson>> {
        let request = self.endpoint(&["api", "lessons"]).map(|url| self.client.get(url));
        async move {
            let body = execute(request?).await?;
            let lessons = decode_lessons(&body)?;
            tracing::debug!(count = lessons.len(), "Fetched lessons");
            Ok(lessons)
        }
        .boxed()
    }

    fn search(&self, query: &str) -> ApiFuture<Vec<Lesson>> {
        let request = self
            .endpoint(&["api", "search"])
            .map(|url| self.client.get(url).query(&[("q", query)]));
        async move {
            let body = execute(request?).await?;
            decode_lessons(&body)
        }
        .boxed()
    }

    fn update_spaces(&self, lesson_id: &LessonId, spaces: u32) -> ApiFuture<()> {
        let request = self
            .endpoint(&["api", "lessons", lesson_id.as_str()])
            .map(|url| self.client.put(url).json(&SpacesUpdate { spaces }));
        let lesson_id = lesson_id.clone();
        async move {
            execute(request?).await?;
            tracing::debug!(%lesson_id, spaces, "Updated lesson spaces");
            Ok(())
        }
        .boxed()
    }

    fn submit_order(&self, order: &OrderRequest) -> ApiFuture<OrderReceipt> {
        let request = self
            .endpoint(&["api", "orders"])
            .map(|url| self.client.post(url).json(order));
        async move {
            let body = execute(request?).await?;
            decode_receipt(&body)
        }
        .boxed()
    }
}
