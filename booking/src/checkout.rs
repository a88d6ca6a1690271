//! Checkout form, validation and the order payload.

use crate::cart::Cart;
use crate::types::{LessonId, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Message shown for a name with anything but letters and whitespace
pub const NAME_ERROR: &str = "Name must contain only letters";

/// Message shown for a phone number with anything but digits
pub const PHONE_ERROR: &str = "Phone must contain only numbers";

/// Contact details entered at checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutInfo {
    /// Customer name
    pub name: String,
    /// Customer phone number
    pub phone: String,
    /// Customer email, optional
    pub email: String,
}

/// One field of [`CheckoutInfo`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutField {
    /// `name`
    Name,
    /// `phone`
    Phone,
    /// `email`
    Email,
}

impl CheckoutInfo {
    /// Overwrite one field
    pub fn set(&mut self, field: CheckoutField, value: String) {
        match field {
            CheckoutField::Name => self.name = value,
            CheckoutField::Phone => self.phone = value,
            CheckoutField::Email => self.email = value,
        }
    }

    /// Per-field problems with the current values
    #[must_use]
    pub fn field_errors(&self) -> ValidationErrors {
        ValidationErrors {
            name: (!is_valid_name(&self.name)).then(|| NAME_ERROR.to_owned()),
            phone: (!is_valid_phone(&self.phone)).then(|| PHONE_ERROR.to_owned()),
        }
    }

    /// Check name and phone
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when either field is invalid.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let errors = self.field_errors();
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Letters and whitespace only, at least one character
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
}

/// Digits only, at least one
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    !phone.is_empty() && phone.chars().all(|c| c.is_ascii_digit())
}

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Problem with the name, if any
    pub name: Option<String>,
    /// Problem with the phone number, if any
    pub phone: Option<String>,
}

impl ValidationErrors {
    /// Whether every field is valid
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = [self.name.as_deref(), self.phone.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Why an order was not sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitRejection {
    /// An order is already being submitted
    #[error("An order is already being submitted")]
    InFlight,

    /// Nothing to order
    #[error("Your cart is empty")]
    EmptyCart,

    /// The checkout form has errors
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),
}

/// One ordered lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Lesson booked
    pub lesson_id: LessonId,
    /// Subject at the time of booking
    pub subject: String,
    /// Price per space at the time of booking
    pub price: Money,
    /// Spaces booked
    pub quantity: u32,
}

/// Body of `POST /api/orders`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Customer name
    pub name: String,
    /// Customer phone
    pub phone: String,
    /// Customer email, possibly empty
    pub email: String,
    /// Lines ordered
    pub lessons: Vec<OrderLine>,
    /// Σ price × quantity
    pub total: Money,
    /// When the order was placed
    pub order_date: DateTime<Utc>,
}

impl OrderRequest {
    /// Build the payload for `cart` and `info`
    #[must_use]
    pub fn new(info: &CheckoutInfo, cart: &Cart, order_date: DateTime<Utc>) -> Self {
        Self {
            name: info.name.clone(),
            phone: info.phone.clone(),
            email: info.email.clone(),
            lessons: cart
                .lines()
                .iter()
                .map(|line| OrderLine {
                    lesson_id: line.lesson_id.clone(),
                    subject: line.subject.clone(),
                    price: line.price,
                    quantity: line.quantity,
                })
                .collect(),
            total: cart.total(),
            order_date,
        }
    }

    /// Σ quantity
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lessons.iter().map(|line| line.quantity).sum()
    }
}

/// What the service returned for an accepted order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderReceipt {
    /// Order id, when the service reports one
    pub order_id: Option<String>,
}

/// Confirmation shown after an order is accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    /// Order id, when the service reported one
    pub order_id: Option<String>,
    /// Spaces ordered
    pub items: u32,
    /// Amount ordered
    pub total: Money,
}

impl OrderConfirmation {
    /// Text shown to the customer
    #[must_use]
    pub fn message(&self) -> String {
        match &self.order_id {
            Some(id) => format!(
                "Order {id} submitted successfully! ({} for {})",
                self.items, self.total
            ),
            None => format!("Order submitted successfully! ({} for {})", self.items, self.total),
        }
    }
}
