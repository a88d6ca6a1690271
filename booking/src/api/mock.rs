//! In-memory lesson service for tests and offline runs.

use super::{ApiError, ApiFuture, ApiResult, LessonApi};
use crate::catalog::matches_query;
use crate::checkout::{OrderReceipt, OrderRequest};
use crate::types::{Lesson, LessonId};
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Service endpoint, used to inject failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET /api/lessons`
    Lessons,
    /// `GET /api/search`
    Search,
    /// `PUT /api/lessons/{id}`
    UpdateSpaces,
    /// `POST /api/orders`
    Orders,
}

/// A request received by [`InMemoryLessonApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    /// Lessons fetched
    FetchLessons,
    /// Search issued
    Search(String),
    /// Spaces written
    UpdateSpaces {
        /// Lesson updated
        lesson_id: LessonId,
        /// Count written
        spaces: u32,
    },
    /// Order submitted
    SubmitOrder(OrderRequest),
}

impl ApiCall {
    const fn endpoint(&self) -> Endpoint {
        match self {
            Self::FetchLessons => Endpoint::Lessons,
            Self::Search(_) => Endpoint::Search,
            Self::UpdateSpaces { .. } => Endpoint::UpdateSpaces,
            Self::SubmitOrder(_) => Endpoint::Orders,
        }
    }
}

#[derive(Debug)]
struct Failure {
    error: ApiError,
    /// `None` fails every call until cleared
    remaining: Option<usize>,
}

#[derive(Debug, Default)]
struct Backend {
    lessons: Vec<Lesson>,
    calls: Vec<ApiCall>,
    failures: HashMap<Endpoint, Failure>,
    latency: HashMap<Endpoint, Duration>,
    next_order: u64,
}

impl Backend {
    fn take_failure(&mut self, endpoint: Endpoint) -> Option<ApiError> {
        let failure = self.failures.get_mut(&endpoint)?;
        let error = failure.error.clone();
        let exhausted = match failure.remaining.as_mut() {
            None => false,
            Some(n) => {
                *n = n.saturating_sub(1);
                *n == 0
            },
        };
        if exhausted {
            self.failures.remove(&endpoint);
        }
        Some(error)
    }
}

/// Lesson service held in memory
///
/// Records every call, applies space updates to its own copy of the lessons
/// and can be told to fail or slow down per endpoint. Cloning shares the
/// same backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLessonApi {
    backend: Arc<Mutex<Backend>>,
}

impl InMemoryLessonApi {
    /// Service holding `lessons`
    #[must_use]
    pub fn new(lessons: Vec<Lesson>) -> Self {
        Self {
            backend: Arc::new(Mutex::new(Backend {
                lessons,
                ..Backend::default()
            })),
        }
    }

    fn backend(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fail every call to `endpoint` with `error` until [`Self::recover`]
    pub fn fail(&self, endpoint: Endpoint, error: ApiError) {
        self.backend()
            .failures
            .insert(endpoint, Failure { error, remaining: None });
    }

    /// Fail the next `times` calls to `endpoint` with `error`
    pub fn fail_times(&self, endpoint: Endpoint, error: ApiError, times: usize) {
        if times == 0 {
            return;
        }
        self.backend().failures.insert(
            endpoint,
            Failure {
                error,
                remaining: Some(times),
            },
        );
    }

    /// Stop failing calls to `endpoint`
    pub fn recover(&self, endpoint: Endpoint) {
        self.backend().failures.remove(&endpoint);
    }

    /// Delay every response from `endpoint`
    pub fn set_latency(&self, endpoint: Endpoint, latency: Duration) {
        self.backend().latency.insert(endpoint, latency);
    }

    /// Replace the service's lessons
    pub fn set_lessons(&self, lessons: Vec<Lesson>) {
        self.backend().lessons = lessons;
    }

    /// Space count the service holds for a lesson
    #[must_use]
    pub fn remote_spaces(&self, lesson_id: &LessonId) -> Option<u32> {
        self.backend()
            .lessons
            .iter()
            .find(|lesson| &lesson.id == lesson_id)
            .map(|lesson| lesson.spaces)
    }

    /// Every call received, in order
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.backend().calls.clone()
    }

    /// Number of calls received by `endpoint`
    #[must_use]
    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.backend()
            .calls
            .iter()
            .filter(|call| call.endpoint() == endpoint)
            .count()
    }

    /// Orders received, including rejected ones
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.backend()
            .calls
            .iter()
            .filter_map(|call| match call {
                ApiCall::SubmitOrder(order) => Some(order.clone()),
                _ => None,
            })
            .collect()
    }

    /// Record `call`, then answer it with `respond` unless a failure is
    /// injected for its endpoint
    fn handle<T, F>(&self, call: ApiCall, respond: F) -> ApiFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Backend) -> ApiResult<T>,
    {
        let endpoint = call.endpoint();
        let (result, latency) = {
            let mut backend = self.backend();
            backend.calls.push(call);
            let result = match backend.take_failure(endpoint) {
                Some(error) => Err(error),
                None => respond(&mut *backend),
            };
            (result, backend.latency.get(&endpoint).copied())
        };

        async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            result
        }
        .boxed()
    }
}

impl LessonApi for InMemoryLessonApi {
    fn fetch_lessons(&self) -> ApiFuture<Vec<Lesson>> {
        self.handle(ApiCall::FetchLessons, |backend| Ok(backend.lessons.clone()))
    }

    fn search(&self, query: &str) -> ApiFuture<Vec<Lesson>> {
        let needle = query.to_owned();
        self.handle(ApiCall::Search(needle.clone()), move |backend| {
            Ok(backend
                .lessons
                .iter()
                .filter(|lesson| matches_query(lesson, &needle))
                .cloned()
                .collect())
        })
    }

    fn update_spaces(&self, lesson_id: &LessonId, spaces: u32) -> ApiFuture<()> {
        let call = ApiCall::UpdateSpaces {
            lesson_id: lesson_id.clone(),
            spaces,
        };
        self.handle(call, |backend| {
            let lesson = backend
                .lessons
                .iter_mut()
                .find(|lesson| &lesson.id == lesson_id)
                .ok_or_else(|| ApiError::Status {
                    status: 404,
                    message: "Lesson not found".to_owned(),
                })?;
            lesson.spaces = spaces;
            Ok(())
        })
    }

    fn submit_order(&self, order: &OrderRequest) -> ApiFuture<OrderReceipt> {
        self.handle(ApiCall::SubmitOrder(order.clone()), |backend| {
            backend.next_order += 1;
            Ok(OrderReceipt {
                order_id: Some(format!("order-{}", backend.next_order)),
            })
        })
    }
}
