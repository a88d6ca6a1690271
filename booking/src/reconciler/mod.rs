//! Cart/inventory reconciliation for the booking screen.
//!
//! # Architecture
//!
//! ```text
//! UI event → Store::send(BookingAction)
//!              ↓
//!            BookingReducer (state behind the store's write lock)
//!              ├─ cart line and lesson spaces change together
//!              └─ new space count queued in the SyncOutbox
//!              ↓
//!            Effects: PUT spaces (with backoff), GET lessons, POST order
//!              ↓
//!            Completion actions fed back into the reducer
//! ```
//!
//! Local counts are optimistic. A write the service keeps rejecting is
//! logged and the lesson marked as drifted; the next successful refresh
//! replaces local counts with the service's.

pub mod actions;
pub mod environment;
pub mod reducer;
pub mod state;
pub mod submit;

pub use actions::BookingAction;
pub use environment::{BookingEnvironment, UuidLineIds};
pub use reducer::BookingReducer;
pub use state::{BookingState, SearchState, SortState, Submission};
pub use submit::{OrderOutcome, submit_order};

/// Store running the booking reducer
pub type BookingStore =
    lesson_booking_runtime::Store<BookingState, BookingAction, BookingEnvironment, BookingReducer>;
