//! Remote lesson service.
//!
//! The reducer never calls the service directly: effects go through the
//! [`LessonApi`] held by the environment, so tests swap in
//! [`InMemoryLessonApi`] and production uses [`HttpLessonApi`].

use crate::checkout::{OrderReceipt, OrderRequest};
use crate::types::{Lesson, LessonId};
use futures::future::BoxFuture;
use thiserror::Error;

mod http;
mod mock;

pub use http::HttpLessonApi;
pub use mock::{ApiCall, Endpoint, InMemoryLessonApi};

/// Result of a service call
pub type ApiResult<T> = Result<T, ApiError>;

/// Boxed future returned by [`LessonApi`] methods
pub type ApiFuture<T> = BoxFuture<'static, ApiResult<T>>;

/// Errors talking to the lesson service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Connection or transport failure
    #[error("Request failed: {0}")]
    Network(String),

    /// No response within the request timeout
    #[error("Request timed out")]
    Timeout,

    /// The service answered with an error
    #[error("Service error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message from the `{error}` body, or the raw body
        message: String,
    },

    /// The response body could not be read
    #[error("Response parsing failed: {0}")]
    Decode(String),

    /// The configured base URL cannot address the service
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Whether trying again later may succeed
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }
}

/// Operations the booking front-end needs from the lesson service
pub trait LessonApi: Send + Sync {
    /// `GET /api/lessons`
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request or decoding fails.
    fn fetch_lessons(&self) -> ApiFuture<Vec<Lesson>>;

    /// `GET /api/search?q=<query>`
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the request or decoding fails.
    fn search(&self, query: &str) -> ApiFuture<Vec<Lesson>>;

    /// `PUT /api/lessons/{id}` with `{"spaces": n}`
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the service rejects the update.
    fn update_spaces(&self, lesson_id: &LessonId, spaces: u32) -> ApiFuture<()>;

    /// `POST /api/orders`
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the service rejects the order.
    fn submit_order(&self, order: &OrderRequest) -> ApiFuture<OrderReceipt>;
}
