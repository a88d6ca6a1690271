//! # Lesson Booking
//!
//! Client-side state for browsing and booking music lessons: the lesson
//! list with search and sort, a cart, checkout, and the reconciliation that
//! keeps local space counts, cart quantities and the lesson service in step.
//!
//! ## Modules
//!
//! - [`types`]: lesson and cart values, [`Money`](types::Money)
//! - [`catalog`]: local lesson set and record normalization
//! - [`cart`], [`checkout`], [`sorting`]: the pieces of the booking screen
//! - [`outbox`]: serialized per-lesson space writes
//! - [`api`]: the lesson service ([`LessonApi`](api::LessonApi)) over HTTP or in memory
//! - [`reconciler`]: the [`BookingReducer`](reconciler::BookingReducer) tying it together
//! - [`config`]: environment-variable configuration
//!
//! ## Example
//!
//! ```no_run
//! use lesson_booking::api::{InMemoryLessonApi, LessonApi};
//! use lesson_booking::catalog::demo_lessons;
//! use lesson_booking::config::BookingConfig;
//! use lesson_booking::reconciler::{
//!     BookingAction, BookingEnvironment, BookingReducer, BookingState,
//! };
//! use lesson_booking_runtime::Store;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), lesson_booking_runtime::StoreError> {
//! let api: Arc<dyn LessonApi> = Arc::new(InMemoryLessonApi::new(demo_lessons()));
//! let env = BookingEnvironment::from_config(&BookingConfig::default(), api);
//! let store = Store::new(BookingState::default(), BookingReducer::new(), env);
//!
//! store.send(BookingAction::RefreshLessons).await?.wait().await;
//! store.send(BookingAction::AddToCart { lesson_id: "1".into() }).await?.wait().await;
//!
//! let items = store.state(BookingState::total_items).await;
//! assert_eq!(items, 1);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod outbox;
pub mod reconciler;
pub mod sorting;
pub mod types;

pub use config::BookingConfig;
pub use reconciler::{BookingAction, BookingEnvironment, BookingReducer, BookingState, BookingStore};
pub use types::{CartLine, Lesson, LessonId, LineId, Money};
