//! Actions for the booking reducer.

use crate::api::ApiError;
use crate::checkout::{CheckoutField, OrderReceipt};
use crate::sorting::SortCriterion;
use crate::types::{Lesson, LessonId, LineId};

/// Everything the booking reducer reacts to
///
/// Commands come from the UI; events are fed back by effects once the
/// lesson service answers.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingAction {
    // ========== Commands ==========
    /// Reload every lesson from the service
    RefreshLessons,

    /// Search the service; a blank query shows the full catalog again
    Search {
        /// Text typed by the user
        query: String,
    },

    /// Sort the visible lessons by another attribute
    SetSortCriterion {
        /// Attribute to sort by
        criterion: SortCriterion,
    },

    /// Flip between ascending and descending
    ToggleSortOrder,

    /// Book one space of a lesson
    AddToCart {
        /// Lesson to book
        lesson_id: LessonId,
    },

    /// Drop a cart line and give its spaces back
    RemoveFromCart {
        /// Line to drop
        line_id: LineId,
    },

    /// Edit a checkout field
    UpdateCheckout {
        /// Field edited
        field: CheckoutField,
        /// New value
        value: String,
    },

    /// Send the cart as an order
    SubmitOrder,

    /// Clear the current notice
    DismissNotice,

    /// Hide the order confirmation
    DismissConfirmation,

    // ========== Events ==========
    /// Lessons arrived from the service
    LessonsLoaded {
        /// Lessons in service order
        lessons: Vec<Lesson>,
    },

    /// Lessons could not be loaded
    LessonsLoadFailed {
        /// Why
        error: ApiError,
    },

    /// Search results arrived
    SearchResultsLoaded {
        /// Query the results answer
        query: String,
        /// Matching lessons
        lessons: Vec<Lesson>,
    },

    /// Search request failed
    SearchFailed {
        /// Query that failed
        query: String,
        /// Why
        error: ApiError,
    },

    /// The service accepted a space count
    SpacesSynced {
        /// Lesson updated
        lesson_id: LessonId,
        /// Count written
        spaces: u32,
    },

    /// A space count could not be written after every retry
    SpacesSyncFailed {
        /// Lesson whose write was abandoned
        lesson_id: LessonId,
        /// Count that was not written
        spaces: u32,
        /// Last error
        error: ApiError,
    },

    /// The service accepted the order
    OrderPlaced {
        /// What the service returned
        receipt: OrderReceipt,
    },

    /// The service rejected the order or could not be reached
    OrderFailed {
        /// Why
        error: ApiError,
    },
}
