//! Submitting the cart through a running store.

use super::{BookingAction, BookingStore};
use crate::api::ApiError;
use crate::checkout::{OrderConfirmation, SubmitRejection};
use lesson_booking_runtime::StoreError;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;

/// How a submitted order ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    /// The service accepted the order
    Placed(OrderConfirmation),
    /// Nothing was sent; the message says why
    Rejected(String),
    /// The service refused the order or could not be reached
    Failed(ApiError),
}

/// Send [`BookingAction::SubmitOrder`] and wait until the order settles
///
/// The outcome comes from the completion action the store broadcasts, so it
/// does not depend on how long the confirmation stays in state.
///
/// # Errors
///
/// [`StoreError`] when the store is shutting down or the effects do not
/// settle within `timeout`.
pub async fn submit_order(
    store: &BookingStore,
    timeout: Duration,
) -> Result<OrderOutcome, StoreError> {
    let mut actions = store.subscribe_actions();
    let (items, total) = store.state(|s| (s.total_items(), s.cart_total())).await;

    let mut handle = store.send(BookingAction::SubmitOrder).await?;
    handle.wait_with_timeout(timeout).await?;

    loop {
        match actions.try_recv() {
            Ok(BookingAction::OrderPlaced { receipt }) => {
                return Ok(OrderOutcome::Placed(OrderConfirmation {
                    order_id: receipt.order_id,
                    items,
                    total,
                }));
            },
            Ok(BookingAction::OrderFailed { error }) => return Ok(OrderOutcome::Failed(error)),
            Ok(_) | Err(TryRecvError::Lagged(_)) => {},
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }

    let notice = store.state(|s| s.notice.clone()).await;
    Ok(OrderOutcome::Rejected(
        notice.unwrap_or_else(|| SubmitRejection::InFlight.to_string()),
    ))
}
