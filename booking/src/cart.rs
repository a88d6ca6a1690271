//! Shopping cart: at most one line per lesson.

use crate::types::{CartLine, Lesson, LessonId, LineId, Money};
use thiserror::Error;

/// Why a cart operation did nothing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The lesson has no spaces left
    #[error("lesson {0} has no spaces left")]
    InventoryExhausted(LessonId),

    /// The lesson is not in the catalog
    #[error("lesson {0} is not in the catalog")]
    UnknownLesson(LessonId),

    /// No cart line has this id
    #[error("cart line {0} does not exist")]
    UnknownLine(LineId),

    /// The cart is locked while its order is with the service
    #[error("the cart cannot change while an order is being submitted")]
    OrderInFlight,
}

/// Ordered cart lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Lines in the order they were first added
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line booking `lesson_id`, if any
    #[must_use]
    pub fn line_for_lesson(&self, lesson_id: &LessonId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.lesson_id == lesson_id)
    }

    /// Spaces of `lesson_id` held by the cart
    #[must_use]
    pub fn quantity_for(&self, lesson_id: &LessonId) -> u32 {
        self.line_for_lesson(lesson_id).map_or(0, |line| line.quantity)
    }

    /// Σ price × quantity
    #[must_use]
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Σ quantity
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Book one more space of `lesson`
    ///
    /// Increments the existing line, or appends a new line with the id
    /// produced by `new_line_id`. The caller decrements the lesson's spaces.
    pub fn add_one(&mut self, lesson: &Lesson, new_line_id: impl FnOnce() -> LineId) -> &CartLine {
        let position = match self.lines.iter().position(|line| line.lesson_id == lesson.id) {
            Some(position) => {
                self.lines[position].quantity += 1;
                position
            },
            None => {
                self.lines.push(CartLine::for_lesson(new_line_id(), lesson));
                self.lines.len() - 1
            },
        };
        &self.lines[position]
    }

    /// Remove a whole line
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownLine`] if no line has `line_id`.
    pub fn remove(&mut self, line_id: &LineId) -> Result<CartLine, CartError> {
        let position = self
            .lines
            .iter()
            .position(|line| &line.line_id == line_id)
            .ok_or_else(|| CartError::UnknownLine(line_id.clone()))?;
        Ok(self.lines.remove(position))
    }

    /// Remove every line
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
