//! Dependencies injected into the booking reducer.

use crate::api::LessonApi;
use crate::catalog::demo_lessons;
use crate::config::BookingConfig;
use crate::types::Lesson;
use lesson_booking_core::environment::{Clock, IdGenerator, SystemClock};
use lesson_booking_runtime::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;

/// Cart line ids backed by random UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidLineIds;

impl IdGenerator for UuidLineIds {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Environment for [`BookingReducer`](super::BookingReducer)
///
/// Production wires [`HttpLessonApi`](crate::api::HttpLessonApi),
/// [`SystemClock`] and [`UuidLineIds`]; tests use the in-memory service, a
/// fixed clock and sequential ids.
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Lesson service
    pub api: Arc<dyn LessonApi>,
    /// Time source for order dates
    pub clock: Arc<dyn Clock>,
    /// Source of cart line ids
    pub line_ids: Arc<dyn IdGenerator>,
    /// Backoff for space writes
    pub sync_retry: RetryPolicy,
    /// How long an order confirmation stays visible
    pub confirmation_display: Duration,
    /// Lessons installed when the first load fails; empty disables the fallback
    pub fallback_lessons: Vec<Lesson>,
}

impl BookingEnvironment {
    /// Environment with default policies around the given collaborators
    #[must_use]
    pub fn new(
        api: Arc<dyn LessonApi>,
        clock: Arc<dyn Clock>,
        line_ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            api,
            clock,
            line_ids,
            sync_retry: RetryPolicy::default(),
            confirmation_display: Duration::from_secs(3),
            fallback_lessons: Vec::new(),
        }
    }

    /// Production environment for `config`
    #[must_use]
    pub fn from_config(config: &BookingConfig, api: Arc<dyn LessonApi>) -> Self {
        let environment = Self::new(api, Arc::new(SystemClock), Arc::new(UuidLineIds))
            .with_sync_retry(config.sync_retry_policy())
            .with_confirmation_display(config.confirmation_display);
        if config.demo_fallback {
            environment.with_fallback_lessons(demo_lessons())
        } else {
            environment
        }
    }

    /// Replace the space-write backoff
    #[must_use]
    pub fn with_sync_retry(mut self, policy: RetryPolicy) -> Self {
        self.sync_retry = policy;
        self
    }

    /// Replace the confirmation display time
    #[must_use]
    pub fn with_confirmation_display(mut self, display: Duration) -> Self {
        self.confirmation_display = display;
        self
    }

    /// Lessons to show when the service is unreachable on first load
    #[must_use]
    pub fn with_fallback_lessons(mut self, lessons: Vec<Lesson>) -> Self {
        self.fallback_lessons = lessons;
        self
    }
}

impl std::fmt::Debug for BookingEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingEnvironment")
            .field("sync_retry", &self.sync_retry)
            .field("confirmation_display", &self.confirmation_display)
            .field("fallback_lessons", &self.fallback_lessons.len())
            .finish_non_exhaustive()
    }
}
