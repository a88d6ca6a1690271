//! Reducer keeping lesson spaces, the cart and the lesson service in step.

use super::{BookingAction, BookingEnvironment, BookingState, SearchState, Submission};
use crate::api::ApiError;
use crate::checkout::{
    CheckoutField, CheckoutInfo, OrderConfirmation, OrderRequest, SubmitRejection, ValidationErrors,
};
use crate::outbox::SpaceWrite;
use lesson_booking_core::{effect::Effect, reducer::Reducer};
use lesson_booking_runtime::retry::retry_with_predicate;
use smallvec::{SmallVec, smallvec};
use std::sync::Arc;

/// Reducer for the booking screen
///
/// Adding or removing a cart line and the matching change to the lesson's
/// spaces happen in one `reduce` call, so no reader ever sees one without
/// the other. The new count is then written to the service through the
/// sync outbox.
pub struct BookingReducer;

impl BookingReducer {
    /// Create a new booking reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for BookingReducer {
    fn default() -> Self {
        Self::new()
    }
}

type Effects = SmallVec<[Effect<BookingAction>; 4]>;

fn fetch_lessons(env: &BookingEnvironment) -> Effect<BookingAction> {
    let api = Arc::clone(&env.api);
    Effect::future(async move {
        Some(match api.fetch_lessons().await {
            Ok(lessons) => BookingAction::LessonsLoaded { lessons },
            Err(error) => BookingAction::LessonsLoadFailed { error },
        })
    })
}

fn search(env: &BookingEnvironment, query: String) -> Effect<BookingAction> {
    let api = Arc::clone(&env.api);
    Effect::future(async move {
        Some(match api.search(&query).await {
            Ok(lessons) => BookingAction::SearchResultsLoaded { query, lessons },
            Err(error) => BookingAction::SearchFailed { query, error },
        })
    })
}

/// Write a space count, retrying transient failures with backoff
fn sync_spaces(env: &BookingEnvironment, write: SpaceWrite) -> Effect<BookingAction> {
    let api = Arc::clone(&env.api);
    let policy = env.sync_retry.clone();
    let SpaceWrite { lesson_id, spaces } = write;
    Effect::future(async move {
        let result = retry_with_predicate(
            &policy,
            || api.update_spaces(&lesson_id, spaces),
            ApiError::is_transient,
        )
        .await;
        Some(match result {
            Ok(()) => BookingAction::SpacesSynced { lesson_id, spaces },
            Err(error) => BookingAction::SpacesSyncFailed {
                lesson_id,
                spaces,
                error,
            },
        })
    })
}

fn submit_order(env: &BookingEnvironment, order: OrderRequest) -> Effect<BookingAction> {
    let api = Arc::clone(&env.api);
    Effect::future(async move {
        Some(match api.submit_order(&order).await {
            Ok(receipt) => BookingAction::OrderPlaced { receipt },
            Err(error) => BookingAction::OrderFailed { error },
        })
    })
}

fn sync_effects(env: &BookingEnvironment, write: Option<SpaceWrite>) -> Effects {
    match write {
        Some(write) => smallvec![sync_spaces(env, write)],
        None => smallvec![Effect::None],
    }
}

impl Reducer for BookingReducer {
    type State = BookingState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    #[allow(clippy::too_many_lines)] // one arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Catalog ==========
            BookingAction::RefreshLessons => {
                state.loading = true;
                smallvec![fetch_lessons(env)]
            },

            BookingAction::LessonsLoaded { lessons } => {
                tracing::info!(count = lessons.len(), "Lessons loaded");
                state.loading = false;
                state.install_lessons(lessons);
                state.outbox.clear_drift();
                smallvec![Effect::None]
            },

            BookingAction::LessonsLoadFailed { error } => {
                state.loading = false;
                if state.catalog.is_empty() && !env.fallback_lessons.is_empty() {
                    tracing::warn!(%error, "Could not load lessons, showing demo catalog");
                    state.install_lessons(env.fallback_lessons.clone());
                } else {
                    tracing::warn!(%error, "Could not load lessons, keeping current catalog");
                }
                smallvec![Effect::None]
            },

            // ========== Search and sort ==========
            BookingAction::Search { query } => {
                if query.trim().is_empty() {
                    state.search = SearchState::default();
                    return smallvec![Effect::None];
                }
                state.search.query.clone_from(&query);
                smallvec![search(env, query)]
            },

            BookingAction::SearchResultsLoaded { query, lessons } => {
                if query == state.search.query {
                    state.search.results = lessons;
                } else {
                    tracing::debug!(%query, "Dropping results for a superseded search");
                }
                smallvec![Effect::None]
            },

            BookingAction::SearchFailed { query, error } => {
                if query == state.search.query {
                    tracing::warn!(%query, %error, "Search failed, filtering locally");
                    state.search.results = state.catalog.search_locally(&query);
                } else {
                    tracing::debug!(%query, "Dropping failure of a superseded search");
                }
                smallvec![Effect::None]
            },

            BookingAction::SetSortCriterion { criterion } => {
                state.sort.criterion = criterion;
                smallvec![Effect::None]
            },

            BookingAction::ToggleSortOrder => {
                state.sort.order = state.sort.order.toggled();
                smallvec![Effect::None]
            },

            // ========== Cart ==========
            BookingAction::AddToCart { lesson_id } => {
                match state.reserve(&lesson_id, env.line_ids.as_ref()) {
                    Ok(spaces) => {
                        tracing::debug!(%lesson_id, spaces, "Added lesson to cart");
                        let write = state.outbox.enqueue(lesson_id, spaces);
                        sync_effects(env, write)
                    },
                    Err(error) => {
                        tracing::debug!(%error, "Ignoring add to cart");
                        smallvec![Effect::None]
                    },
                }
            },

            BookingAction::RemoveFromCart { line_id } => match state.release(&line_id) {
                Ok(Some((lesson_id, spaces))) => {
                    tracing::debug!(%line_id, %lesson_id, spaces, "Removed line from cart");
                    let write = state.outbox.enqueue(lesson_id, spaces);
                    sync_effects(env, write)
                },
                Ok(None) => {
                    tracing::debug!(%line_id, "Removed line for a lesson no longer listed");
                    smallvec![Effect::None]
                },
                Err(error) => {
                    tracing::debug!(%error, "Ignoring remove from cart");
                    smallvec![Effect::None]
                },
            },

            // ========== Space sync ==========
            BookingAction::SpacesSynced { lesson_id, spaces } => {
                tracing::debug!(%lesson_id, spaces, "Service accepted space count");
                let write = state.outbox.confirm(&lesson_id, spaces);
                sync_effects(env, write)
            },

            BookingAction::SpacesSyncFailed {
                lesson_id,
                spaces,
                error,
            } => {
                tracing::warn!(
                    %lesson_id,
                    spaces,
                    %error,
                    "Could not write space count; keeping local count until next refresh"
                );
                metrics::counter!("booking.space_sync.failed").increment(1);
                let write = state.outbox.fail(&lesson_id, spaces);
                sync_effects(env, write)
            },

            // ========== Checkout ==========
            BookingAction::UpdateCheckout { field, value } => {
                state.checkout.set(field, value);
                if field != CheckoutField::Email {
                    state.form_errors = state.checkout.field_errors();
                }
                smallvec![Effect::None]
            },

            BookingAction::SubmitOrder => match state.prepare_order(env.clock.now()) {
                Ok(order) => {
                    let (items, total) = (order.total_items(), order.total);
                    tracing::info!(items, total = %total, "Submitting order");
                    state.submission = Submission::Submitting { items, total };
                    state.notice = None;
                    smallvec![submit_order(env, order)]
                },
                Err(SubmitRejection::InFlight) => {
                    tracing::debug!("Ignoring submit while an order is in flight");
                    smallvec![Effect::None]
                },
                Err(rejection) => {
                    tracing::info!(%rejection, "Order not submitted");
                    if let SubmitRejection::Invalid(errors) = &rejection {
                        state.form_errors = errors.clone();
                    }
                    state.notice = Some(rejection.to_string());
                    smallvec![Effect::None]
                },
            },

            BookingAction::OrderPlaced { receipt } => {
                let Submission::Submitting { items, total } = state.submission else {
                    tracing::warn!("Order confirmation arrived with no order in flight");
                    return smallvec![Effect::None];
                };
                let confirmation = OrderConfirmation {
                    order_id: receipt.order_id,
                    items,
                    total,
                };
                tracing::info!(
                    order_id = ?confirmation.order_id,
                    items,
                    total = %total,
                    "Order placed"
                );
                metrics::counter!("booking.orders", "outcome" => "placed").increment(1);

                state.cart.clear();
                state.checkout = CheckoutInfo::default();
                state.form_errors = ValidationErrors::default();
                state.submission = Submission::Idle;
                state.confirmation = Some(confirmation);
                state.loading = true;

                smallvec![
                    fetch_lessons(env),
                    Effect::delay(env.confirmation_display, BookingAction::DismissConfirmation),
                ]
            },

            BookingAction::OrderFailed { error } => {
                tracing::error!(%error, "Order submission failed");
                metrics::counter!("booking.orders", "outcome" => "failed").increment(1);
                state.submission = Submission::Idle;
                state.notice = Some(format!("Error submitting order. Please try again. ({error})"));
                smallvec![Effect::None]
            },

            BookingAction::DismissNotice => {
                state.notice = None;
                smallvec![Effect::None]
            },

            BookingAction::DismissConfirmation => {
                state.confirmation = None;
                smallvec![Effect::None]
            },
        }
    }
}
