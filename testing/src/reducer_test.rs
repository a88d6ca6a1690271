//! Ergonomic testing utilities for reducers
//!
//! This module provides a fluent API for testing reducers with readable Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use lesson_booking_core::{effect::Effect, reducer::Reducer};

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// Several actions may be given with `when_action`; they are reduced in
/// order and effect assertions see the effects of the last one.
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    actions: Vec<A>,
    state_assertions: Vec<StateAssertion<S>>,
    effect_assertions: Vec<EffectAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            actions: Vec::new(),
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Add an action to reduce (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the effects of the last action (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set,
    /// or if any assertions fail.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        assert!(!self.actions.is_empty(), "At least one action must be set with when_action()");

        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        let mut effects = Vec::new();
        for action in self.actions {
            effects = self.reducer.reduce(&mut state, action, &env).into_vec();
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }

        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

/// Helper assertions for effects
pub mod assertions {
    use lesson_booking_core::effect::Effect;

    /// Assert that the effects do nothing
    ///
    /// # Panics
    ///
    /// Panics if any effect would perform work.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }

    /// Count `Future` effects, looking inside parallel and sequential groups
    #[must_use]
    pub fn count_future_effects<A>(effects: &[Effect<A>]) -> usize {
        effects
            .iter()
            .map(|effect| match effect {
                Effect::Future(_) => 1,
                Effect::Parallel(inner) | Effect::Sequential(inner) => count_future_effects(inner),
                Effect::None | Effect::Delay { .. } => 0,
            })
            .sum()
    }

    /// Assert that effects contain at least one Future effect
    ///
    /// # Panics
    ///
    /// Panics if no Future effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            count_future_effects(effects) > 0,
            "Expected at least one Future effect, but none found"
        );
    }

    /// Assert that effects contain a Delay effect and return its action
    ///
    /// # Panics
    ///
    /// Panics if no Delay effect is found.
    #[allow(clippy::panic)] // Test assertion
    pub fn delayed_action<A>(effects: &[Effect<A>]) -> &A {
        effects
            .iter()
            .find_map(|effect| match effect {
                Effect::Delay { action, .. } => Some(action.as_ref()),
                _ => None,
            })
            .unwrap_or_else(|| panic!("Expected a Delay effect, but none found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_booking_core::effect::Effect;
    use lesson_booking_core::reducer::Reducer;
    use smallvec::{SmallVec, smallvec};
    use std::time::Duration;

    #[derive(Clone, Debug)]
    struct SlotState {
        free: u32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum SlotAction {
        Take,
        Release,
        Expire,
    }

    struct SlotReducer;

    impl Reducer for SlotReducer {
        type State = SlotState;
        type Action = SlotAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                SlotAction::Take => {
                    state.free -= 1;
                    smallvec![Effect::delay(Duration::from_secs(1), SlotAction::Expire)]
                },
                SlotAction::Release | SlotAction::Expire => {
                    state.free += 1;
                    smallvec![Effect::None]
                },
            }
        }
    }

    #[test]
    fn test_reducer_test_single_action() {
        ReducerTest::new(SlotReducer)
            .with_env(())
            .given_state(SlotState { free: 2 })
            .when_action(SlotAction::Take)
            .then_state(|state| assert_eq!(state.free, 1))
            .then_effects(|effects| {
                assert_eq!(assertions::delayed_action(effects), &SlotAction::Expire);
            })
            .run();
    }

    #[test]
    fn test_reducer_test_action_sequence() {
        ReducerTest::new(SlotReducer)
            .with_env(())
            .given_state(SlotState { free: 2 })
            .when_action(SlotAction::Take)
            .when_action(SlotAction::Release)
            .then_state(|state| assert_eq!(state.free, 2))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_count_future_effects_descends_into_groups() {
        let effects: Vec<Effect<SlotAction>> = vec![
            Effect::future(async { None }),
            Effect::merge(vec![Effect::None, Effect::future(async { None })]),
        ];
        assert_eq!(assertions::count_future_effects(&effects), 2);
        assertions::assert_effects_count(&effects, 2);
    }
}
