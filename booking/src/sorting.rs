//! Sorting of the lesson list shown to the user.

use crate::types::Lesson;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Attribute lessons are sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortCriterion {
    /// Subject, string order
    #[default]
    Subject,
    /// Location, string order
    Location,
    /// Price, numeric order
    Price,
    /// Available spaces, numeric order
    Spaces,
}

impl SortCriterion {
    fn compare(self, a: &Lesson, b: &Lesson) -> Ordering {
        match self {
            Self::Subject => a.subject.cmp(&b.subject),
            Self::Location => a.location.cmp(&b.location),
            Self::Price => a.price.cmp(&b.price),
            Self::Spaces => a.spaces.cmp(&b.spaces),
        }
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Subject => "subject",
            Self::Location => "location",
            Self::Price => "price",
            Self::Spaces => "spaces",
        })
    }
}

impl FromStr for SortCriterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "subject" => Ok(Self::Subject),
            "location" => Ok(Self::Location),
            "price" => Ok(Self::Price),
            "spaces" | "availability" => Ok(Self::Spaces),
            other => Err(format!("unknown sort criterion: {other}")),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first
    #[default]
    Ascending,
    /// Largest first
    Descending,
}

impl SortOrder {
    /// The other direction
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Sort lessons by `criterion` in `order`
///
/// Lessons with equal keys come out in reverse input order, whichever the
/// direction.
#[must_use]
pub fn sort_lessons(lessons: &[Lesson], criterion: SortCriterion, order: SortOrder) -> Vec<Lesson> {
    let mut indexed: Vec<(usize, &Lesson)> = lessons.iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| {
        let by_key = criterion.compare(a, b);
        let by_key = match order {
            SortOrder::Ascending => by_key,
            SortOrder::Descending => by_key.reverse(),
        };
        by_key.then_with(|| ib.cmp(ia))
    });
    indexed.into_iter().map(|(_, lesson)| lesson.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Money;

    fn lesson(id: &str, subject: &str, price: u64, spaces: u32) -> Lesson {
        Lesson {
            id: id.into(),
            subject: subject.into(),
            location: "Leeds".into(),
            price: Money::from_pounds(price),
            spaces,
            icon: None,
            image: None,
        }
    }

    fn ids(lessons: &[Lesson]) -> Vec<&str> {
        lessons.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn test_string_and_numeric_orders() {
        let lessons = vec![
            lesson("a", "Piano", 50, 5),
            lesson("b", "Cello", 9, 1),
            lesson("c", "Drums", 100, 3),
        ];

        let by_subject = sort_lessons(&lessons, SortCriterion::Subject, SortOrder::Ascending);
        assert_eq!(ids(&by_subject), vec!["b", "c", "a"]);

        // 9 < 50 < 100 numerically, not as text
        let by_price = sort_lessons(&lessons, SortCriterion::Price, SortOrder::Ascending);
        assert_eq!(ids(&by_price), vec!["b", "a", "c"]);

        let by_spaces = sort_lessons(&lessons, SortCriterion::Spaces, SortOrder::Descending);
        assert_eq!(ids(&by_spaces), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_ties_come_out_in_reverse_input_order() {
        let lessons = vec![
            lesson("first", "Guitar", 40, 5),
            lesson("other", "Banjo", 20, 5),
            lesson("second", "Guitar", 40, 5),
            lesson("third", "Guitar", 40, 5),
        ];

        let ascending = sort_lessons(&lessons, SortCriterion::Subject, SortOrder::Ascending);
        assert_eq!(ids(&ascending), vec!["other", "third", "second", "first"]);

        let descending = sort_lessons(&lessons, SortCriterion::Subject, SortOrder::Descending);
        assert_eq!(ids(&descending), vec!["third", "second", "first", "other"]);

        let all_tied = sort_lessons(&lessons, SortCriterion::Spaces, SortOrder::Ascending);
        assert_eq!(ids(&all_tied), vec!["third", "second", "other", "first"]);
    }

    #[test]
    fn test_parse_and_toggle() {
        assert_eq!("Price".parse::<SortCriterion>(), Ok(SortCriterion::Price));
        assert!("colour".parse::<SortCriterion>().is_err());
        assert_eq!(SortOrder::Ascending.toggled(), SortOrder::Descending);
        assert_eq!(SortOrder::default().toggled().toggled(), SortOrder::Ascending);
    }
}
