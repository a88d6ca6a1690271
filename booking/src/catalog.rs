//! Local lesson catalog.
//!
//! Lessons are kept in the order the service returned them, with an index
//! by id. A refresh replaces the whole set.

use crate::types::{Lesson, LessonId, Money};
use serde::Deserialize;
use std::collections::HashMap;

/// Lesson record as returned by the service
///
/// The service may identify a record with `_id`, `id`, or both, as a string
/// or a number; `_id` wins.
#[derive(Debug, Clone, Deserialize)]
pub struct LessonRecord {
    #[serde(rename = "_id", default)]
    primary_id: Option<RawId>,
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    price: Money,
    #[serde(default)]
    spaces: i64,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_lesson_id(self) -> Option<LessonId> {
        match self {
            Self::Text(text) if text.is_empty() => None,
            Self::Text(text) => Some(LessonId::from(text)),
            Self::Number(number) => Some(LessonId::from(number.to_string())),
        }
    }
}

impl LessonRecord {
    /// Normalize into a [`Lesson`]; `None` when the record carries no id
    #[must_use]
    pub fn into_lesson(self) -> Option<Lesson> {
        let id = self
            .primary_id
            .and_then(RawId::into_lesson_id)
            .or_else(|| self.id.and_then(RawId::into_lesson_id))?;

        Some(Lesson {
            id,
            subject: self.subject,
            location: self.location,
            price: self.price,
            spaces: u32::try_from(self.spaces.max(0)).unwrap_or(u32::MAX),
            icon: self.icon,
            image: self.image,
        })
    }
}

/// Normalize service records, skipping those without an id
#[must_use]
pub fn normalize_records(records: Vec<LessonRecord>) -> Vec<Lesson> {
    let total = records.len();
    let lessons: Vec<Lesson> = records.into_iter().filter_map(LessonRecord::into_lesson).collect();
    if lessons.len() < total {
        tracing::warn!(skipped = total - lessons.len(), "Skipped lesson records without an id");
    }
    lessons
}

/// Lessons in fetch order, indexed by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    lessons: Vec<Lesson>,
    index: HashMap<LessonId, usize>,
}

impl Catalog {
    /// Build a catalog; later duplicates of an id are dropped
    #[must_use]
    pub fn new(lessons: Vec<Lesson>) -> Self {
        let mut catalog = Self::default();
        catalog.replace(lessons);
        catalog
    }

    /// Replace every lesson
    pub fn replace(&mut self, lessons: Vec<Lesson>) {
        self.lessons.clear();
        self.index.clear();
        for lesson in lessons {
            if self.index.contains_key(&lesson.id) {
                tracing::warn!(lesson_id = %lesson.id, "Dropping duplicate lesson id");
                continue;
            }
            self.index.insert(lesson.id.clone(), self.lessons.len());
            self.lessons.push(lesson);
        }
    }

    /// Look up a lesson
    #[must_use]
    pub fn get(&self, id: &LessonId) -> Option<&Lesson> {
        self.index.get(id).map(|&i| &self.lessons[i])
    }

    /// Look up a lesson for mutation
    pub fn get_mut(&mut self, id: &LessonId) -> Option<&mut Lesson> {
        self.index.get(id).map(|&i| &mut self.lessons[i])
    }

    /// Lessons in fetch order
    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    /// Number of lessons
    #[must_use]
    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    /// Whether the catalog holds no lessons
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Local stand-in for the search endpoint
    #[must_use]
    pub fn search_locally(&self, query: &str) -> Vec<Lesson> {
        self.lessons
            .iter()
            .filter(|lesson| matches_query(lesson, query))
            .cloned()
            .collect()
    }
}

/// Case-insensitive substring match on subject or location, or a plain
/// substring of the price or space count written out as numbers
#[must_use]
pub fn matches_query(lesson: &Lesson, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    lesson.subject.to_lowercase().contains(&needle)
        || lesson.location.to_lowercase().contains(&needle)
        || price_text(lesson.price).contains(&needle)
        || lesson.spaces.to_string().contains(&needle)
}

fn price_text(price: Money) -> String {
    match serde_json::to_string(&price) {
        Ok(text) => text,
        Err(_) => price.pence().to_string(),
    }
}

/// Lessons shown when the service cannot be reached on first load
#[must_use]
pub fn demo_lessons() -> Vec<Lesson> {
    const DEMO: [(&str, &str, u64, &str); 10] = [
        ("Piano", "London", 50, "fa-music"),
        ("Guitar", "Manchester", 40, "fa-guitar"),
        ("Violin", "Birmingham", 45, "fa-violin"),
        ("Drums", "Liverpool", 35, "fa-drum"),
        ("Singing", "Leeds", 30, "fa-microphone"),
        ("Saxophone", "Bristol", 55, "fa-saxophone"),
        ("Flute", "Glasgow", 38, "fa-flute"),
        ("Trumpet", "Edinburgh", 42, "fa-trumpet"),
        ("Cello", "Cardiff", 48, "fa-cello"),
        ("Clarinet", "Belfast", 36, "fa-clarinet"),
    ];

    DEMO.iter()
        .enumerate()
        .map(|(i, &(subject, location, pounds, icon))| Lesson {
            id: LessonId::from((i + 1).to_string()),
            subject: subject.to_owned(),
            location: location.to_owned(),
            price: Money::from_pounds(pounds),
            spaces: 5,
            icon: Some(icon.to_owned()),
            image: None,
        })
        .collect()
}
