//! Booking state and the values derived from it.

use crate::cart::{Cart, CartError};
use crate::catalog::Catalog;
use crate::checkout::{
    CheckoutInfo, OrderConfirmation, OrderRequest, SubmitRejection, ValidationErrors,
};
use crate::outbox::SyncOutbox;
use crate::sorting::{SortCriterion, SortOrder, sort_lessons};
use crate::types::{Lesson, LessonId, LineId, Money};
use chrono::{DateTime, Utc};
use lesson_booking_core::environment::IdGenerator;

/// Active search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    /// Query as typed; empty when no search is active
    pub query: String,
    /// Results for `query`, as returned by the service
    pub results: Vec<Lesson>,
}

impl SearchState {
    /// Whether the list shows search results instead of the catalog
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty()
    }
}

/// Current sort
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    /// Attribute
    pub criterion: SortCriterion,
    /// Direction
    pub order: SortOrder,
}

/// Order submission progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Submission {
    /// No order in flight
    #[default]
    Idle,
    /// An order is with the service
    Submitting {
        /// Spaces in the order
        items: u32,
        /// Order total
        total: Money,
    },
}

/// Everything the booking screen shows
///
/// Only [`BookingReducer`](super::BookingReducer) mutates this state; the
/// UI reads it through [`Store::state`](lesson_booking_runtime::Store::state).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingState {
    /// Local copy of the lessons
    pub catalog: Catalog,
    /// Lessons being booked
    pub cart: Cart,
    /// Active search
    pub search: SearchState,
    /// Current sort
    pub sort: SortState,
    /// Checkout form
    pub checkout: CheckoutInfo,
    /// Per-field checkout errors shown next to the form
    pub form_errors: ValidationErrors,
    /// Order submission progress
    pub submission: Submission,
    /// Space counts not yet written to the service
    pub outbox: SyncOutbox,
    /// A lesson load is in flight
    pub loading: bool,
    /// Message for the user, e.g. why an order was not sent
    pub notice: Option<String>,
    /// Confirmation of the last order
    pub confirmation: Option<OrderConfirmation>,
}

impl BookingState {
    /// State holding `lessons` and nothing else
    #[must_use]
    pub fn with_lessons(lessons: Vec<Lesson>) -> Self {
        Self {
            catalog: Catalog::new(lessons),
            ..Self::default()
        }
    }

    /// Σ price × quantity over the cart
    #[must_use]
    pub fn cart_total(&self) -> Money {
        self.cart.total()
    }

    /// Σ quantity over the cart
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.cart.total_items()
    }

    /// Name and phone valid and something to order
    #[must_use]
    pub fn is_checkout_valid(&self) -> bool {
        !self.cart.is_empty() && self.checkout.validate().is_ok()
    }

    /// Whether an order is with the service
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self.submission, Submission::Submitting { .. })
    }

    /// Lessons the list shows, before sorting
    ///
    /// Search results when a search is active, else the catalog. Results
    /// show the catalog's current space counts when it holds the lesson.
    #[must_use]
    pub fn visible_lessons(&self) -> Vec<Lesson> {
        if self.search.is_active() {
            self.search
                .results
                .iter()
                .map(|result| self.catalog.get(&result.id).unwrap_or(result).clone())
                .collect()
        } else {
            self.catalog.lessons().to_vec()
        }
    }

    /// Visible lessons in the current sort
    #[must_use]
    pub fn sorted_lessons(&self) -> Vec<Lesson> {
        sort_lessons(&self.visible_lessons(), self.sort.criterion, self.sort.order)
    }

    /// Take one space of a lesson into the cart; returns the spaces left
    ///
    /// # Errors
    ///
    /// [`CartError::OrderInFlight`], [`CartError::UnknownLesson`] or
    /// [`CartError::InventoryExhausted`]; nothing changes in any case.
    pub fn reserve(
        &mut self,
        lesson_id: &LessonId,
        line_ids: &dyn IdGenerator,
    ) -> Result<u32, CartError> {
        if self.is_submitting() {
            return Err(CartError::OrderInFlight);
        }
        let lesson = self
            .catalog
            .get_mut(lesson_id)
            .ok_or_else(|| CartError::UnknownLesson(lesson_id.clone()))?;
        if lesson.spaces == 0 {
            return Err(CartError::InventoryExhausted(lesson_id.clone()));
        }

        lesson.spaces -= 1;
        self.cart.add_one(lesson, || LineId::new(line_ids.next_id()));
        Ok(lesson.spaces)
    }

    /// Drop a cart line and return its spaces to the lesson
    ///
    /// Returns the lesson and its new space count, or `None` when the lesson
    /// is no longer in the catalog.
    ///
    /// # Errors
    ///
    /// [`CartError::OrderInFlight`] while the cart is being ordered, or
    /// [`CartError::UnknownLine`] when no line has `line_id`.
    pub fn release(&mut self, line_id: &LineId) -> Result<Option<(LessonId, u32)>, CartError> {
        if self.is_submitting() {
            return Err(CartError::OrderInFlight);
        }
        let line = self.cart.remove(line_id)?;
        Ok(self.catalog.get_mut(&line.lesson_id).map(|lesson| {
            lesson.spaces = lesson.spaces.saturating_add(line.quantity);
            (line.lesson_id, lesson.spaces)
        }))
    }

    /// Order payload for the current cart and form
    ///
    /// # Errors
    ///
    /// A [`SubmitRejection`] when an order is in flight, the cart is empty or
    /// the form is invalid.
    pub fn prepare_order(
        &self,
        order_date: DateTime<Utc>,
    ) -> Result<OrderRequest, SubmitRejection> {
        if self.is_submitting() {
            return Err(SubmitRejection::InFlight);
        }
        if self.cart.is_empty() {
            return Err(SubmitRejection::EmptyCart);
        }
        self.checkout.validate()?;
        Ok(OrderRequest::new(&self.checkout, &self.cart, order_date))
    }

    /// Install freshly loaded lessons
    ///
    /// Counts still waiting in the outbox override the loaded ones, since the
    /// service has not seen them yet.
    pub fn install_lessons(&mut self, lessons: Vec<Lesson>) {
        self.catalog.replace(lessons);
        let unacknowledged: Vec<(LessonId, u32)> = self
            .outbox
            .unacknowledged()
            .map(|(id, spaces)| (id.clone(), spaces))
            .collect();
        for (lesson_id, spaces) in unacknowledged {
            if let Some(lesson) = self.catalog.get_mut(&lesson_id) {
                lesson.spaces = spaces;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::demo_lessons;
    use lesson_booking_testing::SequentialIds;

    #[test]
    fn test_reserve_and_release_conserve_spaces() {
        let mut state = BookingState::with_lessons(demo_lessons());
        let ids = SequentialIds::default();
        let piano = LessonId::from("1");

        assert_eq!(state.reserve(&piano, &ids), Ok(4));
        assert_eq!(state.reserve(&piano, &ids), Ok(3));
        assert_eq!(state.cart.quantity_for(&piano), 2);

        let line = state.cart.lines()[0].line_id.clone();
        assert_eq!(state.release(&line), Ok(Some((piano.clone(), 5))));
        assert!(state.cart.is_empty());
        assert_eq!(state.release(&line), Err(CartError::UnknownLine(line)));
    }

    #[test]
    fn test_reserve_rejects_exhausted_and_unknown_lessons() {
        let mut state = BookingState::with_lessons(demo_lessons());
        let ids = SequentialIds::default();
        state.catalog.get_mut(&"4".into()).unwrap().spaces = 0;

        assert_eq!(
            state.reserve(&"4".into(), &ids),
            Err(CartError::InventoryExhausted("4".into()))
        );
        assert_eq!(
            state.reserve(&"99".into(), &ids),
            Err(CartError::UnknownLesson("99".into()))
        );
        assert!(state.cart.is_empty());
    }

    #[test]
    fn test_cart_is_locked_while_submitting() {
        let mut state = BookingState::with_lessons(demo_lessons());
        let ids = SequentialIds::default();
        state.reserve(&"1".into(), &ids).unwrap();
        let line = state.cart.lines()[0].line_id.clone();
        state.submission = Submission::Submitting {
            items: 1,
            total: Money::from_pounds(50),
        };

        assert_eq!(state.reserve(&"1".into(), &ids), Err(CartError::OrderInFlight));
        assert_eq!(state.release(&line), Err(CartError::OrderInFlight));
        assert_eq!(state.cart.quantity_for(&"1".into()), 1);
        assert_eq!(state.catalog.get(&"1".into()).unwrap().spaces, 4);
    }

    #[test]
    fn test_search_results_show_live_counts() {
        let mut state = BookingState::with_lessons(demo_lessons());
        let ids = SequentialIds::default();
        state.reserve(&"2".into(), &ids).unwrap();

        let mut stale = state.catalog.get(&"2".into()).unwrap().clone();
        stale.spaces = 5;
        state.search = SearchState {
            query: "guitar".into(),
            results: vec![stale],
        };

        let visible = state.visible_lessons();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].spaces, 4);
    }

    #[test]
    fn test_pending_writes_shadow_loaded_counts() {
        let mut state = BookingState::with_lessons(demo_lessons());
        state.outbox.enqueue("3".into(), 1);

        state.install_lessons(demo_lessons());
        assert_eq!(state.catalog.get(&"3".into()).unwrap().spaces, 1);
        assert_eq!(state.catalog.get(&"4".into()).unwrap().spaces, 5);
    }
}
