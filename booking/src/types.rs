//! Value types shared by the catalog, cart and checkout modules.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Identifier of a lesson as issued by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonId(String);

impl LessonId {
    /// Create a lesson id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as sent on the wire
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LessonId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for LessonId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a cart line, generated locally and never equal to a lesson id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(String);

impl LineId {
    /// Create a line id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LineId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// A non-negative amount of money in pence
///
/// The service speaks decimal pounds; whole amounts are written as integers
/// (`50`) and fractional ones as decimals (`45.5`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    /// Zero pounds
    pub const ZERO: Self = Self(0);

    /// Amount from pence
    #[must_use]
    pub const fn from_pence(pence: u64) -> Self {
        Self(pence)
    }

    /// Amount from whole pounds
    #[must_use]
    pub const fn from_pounds(pounds: u64) -> Self {
        Self(pounds.saturating_mul(100))
    }

    /// Amount in pence
    #[must_use]
    pub const fn pence(self) -> u64 {
        self.0
    }

    /// Amount in pounds, as sent on the wire
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // prices never approach 2^52 pence
    pub fn as_pounds(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `self × quantity`, saturating
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity)))
    }

    /// Parse a decimal pound amount, rejecting negative and non-finite values
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn from_pounds_f64(pounds: f64) -> Option<Self> {
        if !pounds.is_finite() || pounds < 0.0 {
            return None;
        }
        let pence = (pounds * 100.0).round();
        if pence > u64::MAX as f64 {
            return None;
        }
        Some(Self(pence as u64))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (pounds, pence) = (self.0 / 100, self.0 % 100);
        if pence == 0 {
            write!(f, "£{pounds}")
        } else {
            write!(f, "£{pounds}.{pence:02}")
        }
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_u64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.as_pounds())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative amount of pounds")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Ok(Money::from_pounds(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        u64::try_from(v)
            .map(Money::from_pounds)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Money::from_pounds_f64(v).ok_or_else(|| E::invalid_value(de::Unexpected::Float(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.trim()
            .parse::<f64>()
            .ok()
            .and_then(Money::from_pounds_f64)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

/// A bookable lesson as held in the local catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lesson {
    /// Unique id issued by the service
    pub id: LessonId,
    /// Instrument or subject taught
    pub subject: String,
    /// Where the lesson takes place
    pub location: String,
    /// Price per space
    pub price: Money,
    /// Spaces still available
    pub spaces: u32,
    /// Display icon, opaque to the reconciler
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Display image, opaque to the reconciler
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One lesson in the cart with the quantity booked
///
/// Subject, location, price and display fields are a snapshot taken when the
/// line was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// Local line id
    pub line_id: LineId,
    /// Lesson this line books
    pub lesson_id: LessonId,
    /// Snapshot of the lesson subject
    pub subject: String,
    /// Snapshot of the lesson location
    pub location: String,
    /// Snapshot of the lesson price
    pub price: Money,
    /// Snapshot of the lesson icon
    pub icon: Option<String>,
    /// Snapshot of the lesson image
    pub image: Option<String>,
    /// Spaces booked, never zero
    pub quantity: u32,
}

impl CartLine {
    /// Start a line for one space of `lesson`
    #[must_use]
    pub fn for_lesson(line_id: LineId, lesson: &Lesson) -> Self {
        Self {
            line_id,
            lesson_id: lesson.id.clone(),
            subject: lesson.subject.clone(),
            location: lesson.location.clone(),
            price: lesson.price,
            icon: lesson.icon.clone(),
            image: lesson.image.clone(),
            quantity: 1,
        }
    }

    /// Price × quantity
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.price.times(self.quantity)
    }
}
