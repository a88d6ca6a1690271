//! Property tests: cart operations never create or lose a space, and
//! sorting only reorders.

#![allow(clippy::unwrap_used)]

use lesson_booking::api::InMemoryLessonApi;
use lesson_booking::catalog::demo_lessons;
use lesson_booking::sorting::{SortCriterion, SortOrder, sort_lessons};
use lesson_booking::{
    BookingAction, BookingEnvironment, BookingReducer, BookingState, Lesson, LessonId, LineId,
    Money,
};
use lesson_booking_core::reducer::Reducer;
use lesson_booking_testing::{SequentialIds, test_clock};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Remove(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..4).prop_map(Op::Add),
        1 => (0usize..6).prop_map(Op::Remove),
    ]
}

fn small_catalog(spaces: &[u32]) -> Vec<Lesson> {
    demo_lessons()
        .into_iter()
        .zip(spaces)
        .map(|(lesson, &spaces)| Lesson { spaces, ..lesson })
        .collect()
}

fn env() -> BookingEnvironment {
    BookingEnvironment::new(
        Arc::new(InMemoryLessonApi::default()),
        Arc::new(test_clock()),
        Arc::new(SequentialIds::default()),
    )
}

fn action(state: &BookingState, op: &Op) -> BookingAction {
    match *op {
        Op::Add(i) => BookingAction::AddToCart {
            lesson_id: LessonId::from((i + 1).to_string()),
        },
        Op::Remove(i) => {
            let lines = state.cart.lines();
            if lines.is_empty() {
                BookingAction::RemoveFromCart { line_id: LineId::new("none") }
            } else {
                BookingAction::RemoveFromCart {
                    line_id: lines[i % lines.len()].line_id.clone(),
                }
            }
        },
    }
}

fn lesson() -> impl Strategy<Value = Lesson> {
    (
        prop::sample::select(vec!["Piano", "Guitar", "Drums"]),
        prop::sample::select(vec!["London", "Leeds"]),
        0u64..5,
        0u32..4,
    )
        .prop_map(|(subject, location, pounds, spaces)| Lesson {
            id: LessonId::from(format!("{subject}-{location}-{pounds}-{spaces}")),
            subject: subject.into(),
            location: location.into(),
            price: Money::from_pounds(pounds),
            spaces,
            icon: None,
            image: None,
        })
}

fn criterion() -> impl Strategy<Value = SortCriterion> {
    prop_oneof![
        Just(SortCriterion::Subject),
        Just(SortCriterion::Location),
        Just(SortCriterion::Price),
        Just(SortCriterion::Spaces),
    ]
}

proptest! {
    /// Spaces left plus spaces in the cart always equal the starting count.
    #[test]
    fn cart_operations_conserve_spaces(
        initial in prop::collection::vec(0u32..4, 4),
        ops in prop::collection::vec(op(), 0..40),
    ) {
        let reducer = BookingReducer::new();
        let env = env();
        let mut state = BookingState::with_lessons(small_catalog(&initial));

        for op in &ops {
            let action = action(&state, op);
            let _ = reducer.reduce(&mut state, action, &env);

            for (i, &start) in initial.iter().enumerate() {
                let id = LessonId::from((i + 1).to_string());
                let left = state.catalog.get(&id).unwrap().spaces;
                prop_assert_eq!(left + state.cart.quantity_for(&id), start);
            }

            let lessons: HashSet<&LessonId> =
                state.cart.lines().iter().map(|line| &line.lesson_id).collect();
            prop_assert_eq!(lessons.len(), state.cart.lines().len());
            prop_assert!(state.cart.lines().iter().all(|line| line.quantity >= 1));
            prop_assert_eq!(
                state.total_items(),
                state.cart.lines().iter().map(|line| line.quantity).sum::<u32>()
            );
            prop_assert_eq!(
                state.cart_total(),
                state.cart.lines().iter().map(|line| line.price.times(line.quantity)).sum::<Money>()
            );
        }
    }

    /// Sorting returns the same lessons, ordered by the chosen key.
    #[test]
    fn sorting_only_reorders(
        lessons in prop::collection::vec(lesson(), 0..12),
        criterion in criterion(),
        descending in any::<bool>(),
    ) {
        let order = if descending { SortOrder::Descending } else { SortOrder::Ascending };
        let sorted = sort_lessons(&lessons, criterion, order);

        prop_assert_eq!(sorted.len(), lessons.len());
        let mut before: Vec<&LessonId> = lessons.iter().map(|l| &l.id).collect();
        let mut after: Vec<&LessonId> = sorted.iter().map(|l| &l.id).collect();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);

        for pair in sorted.windows(2) {
            let ordering = match criterion {
                SortCriterion::Subject => pair[0].subject.cmp(&pair[1].subject),
                SortCriterion::Location => pair[0].location.cmp(&pair[1].location),
                SortCriterion::Price => pair[0].price.cmp(&pair[1].price),
                SortCriterion::Spaces => pair[0].spaces.cmp(&pair[1].spaces),
            };
            if descending {
                prop_assert!(ordering.is_ge());
            } else {
                prop_assert!(ordering.is_le());
            }
        }
    }
}
