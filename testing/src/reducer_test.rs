//! Given-When-Then harness for reducers.
//!
//! A scenario starts from a state (or the default state), optionally replays
//! setup actions through the reducer, then applies one action under test and
//! checks the resulting state and effects in the order the checks were added.

#![allow(clippy::module_name_repetitions)]

use robotask_core::{effect::Effect, reducer::Reducer};
use std::fmt::Debug;
use std::time::Duration;

enum Check<S, A> {
    State(Box<dyn FnOnce(&S)>),
    Effects(Box<dyn FnOnce(&[Effect<A>])>),
}

/// Reducer scenario builder
///
/// ```ignore
/// use robotask_testing::ReducerTest;
///
/// let state = ReducerTest::new(AppReducer::new())
///     .with_env(env)
///     .given_actions([AppAction::add("Scan sector 7")])
///     .when_action(AppAction::ToggleTask { id: TaskId::new(1) })
///     .then_state(|state| assert_eq!(state.tasks.completed_count(), 1))
///     .then_schedules(DEFAULT_NOTIFICATION_TIMEOUT, expiry(2))
///     .run();
/// ```
pub struct ReducerTest<R: Reducer> {
    reducer: R,
    environment: Option<R::Environment>,
    state: Option<R::State>,
    setup: Vec<R::Action>,
    action: Option<R::Action>,
    checks: Vec<Check<R::State, R::Action>>,
}

impl<R: Reducer> ReducerTest<R> {
    /// Start a scenario for `reducer`
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            state: None,
            setup: Vec::new(),
            action: None,
            checks: Vec::new(),
        }
    }

    /// Environment the reducer runs with
    #[must_use]
    pub fn with_env(mut self, env: R::Environment) -> Self {
        self.environment = Some(env);
        self
    }

    /// Starting state; the default state is used when this is not called
    #[must_use]
    pub fn given_state(mut self, state: R::State) -> Self {
        self.state = Some(state);
        self
    }

    /// Actions reduced before the action under test; their effects are discarded
    #[must_use]
    pub fn given_actions<I>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = R::Action>,
    {
        self.setup.extend(actions);
        self
    }

    /// The action under test
    #[must_use]
    pub fn when_action(mut self, action: R::Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Check the state after the action under test
    #[must_use]
    pub fn then_state<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&R::State) + 'static,
    {
        self.checks.push(Check::State(Box::new(check)));
        self
    }

    /// Check the effects returned for the action under test
    #[must_use]
    pub fn then_effects<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&[Effect<R::Action>]) + 'static,
    {
        self.checks.push(Check::Effects(Box::new(check)));
        self
    }

    /// Expect exactly one scheduled action: `action` after `after`
    #[must_use]
    pub fn then_schedules(self, after: Duration, action: R::Action) -> Self
    where
        R::Action: PartialEq + Debug + 'static,
    {
        self.then_effects(move |effects| {
            assert_eq!(assertions::scheduled(effects), vec![(after, &action)]);
        })
    }

    /// Run the scenario and return the final state
    ///
    /// # Panics
    ///
    /// Panics if no environment or action was given, or if a check fails.
    #[allow(clippy::panic)]
    pub fn run(self) -> R::State
    where
        R::State: Default,
    {
        let Some(env) = self.environment else {
            panic!("scenario has no environment; call with_env()");
        };
        let Some(action) = self.action else {
            panic!("scenario has no action under test; call when_action()");
        };

        let mut state = self.state.unwrap_or_default();
        for setup in self.setup {
            let _ = self.reducer.reduce(&mut state, setup, &env);
        }

        let effects = self.reducer.reduce(&mut state, action, &env);

        for check in self.checks {
            match check {
                Check::State(check) => check(&state),
                Check::Effects(check) => check(&effects),
            }
        }
        state
    }
}

/// Effect inspection helpers
pub mod assertions {
    use robotask_core::effect::Effect;
    use std::time::Duration;

    /// Assert that nothing was returned but `Effect::None`
    ///
    /// # Panics
    ///
    /// Panics if any other effect is present.
    #[allow(clippy::panic)]
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "expected no effects, got {effects:?}"
        );
    }

    /// Assert the number of top-level effects
    ///
    /// # Panics
    ///
    /// Panics if the count differs.
    #[allow(clippy::panic)]
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(effects.len(), expected, "unexpected number of effects");
    }

    /// Assert that at least one action is scheduled
    ///
    /// # Panics
    ///
    /// Panics if no `Delay` effect is found at any depth.
    #[allow(clippy::panic)]
    pub fn assert_has_delay_effect<A>(effects: &[Effect<A>]) {
        assert!(!scheduled(effects).is_empty(), "expected a delayed action");
    }

    /// Every `(delay, action)` pair scheduled by `Delay` effects, depth first
    ///
    /// Delays inside a `Sequential` group are reported as written, not
    /// accumulated.
    #[must_use]
    pub fn scheduled<A>(effects: &[Effect<A>]) -> Vec<(Duration, &A)> {
        let mut found = Vec::new();
        for effect in effects {
            match effect {
                Effect::Delay { duration, action } => found.push((*duration, action.as_ref())),
                Effect::Parallel(inner) | Effect::Sequential(inner) => {
                    found.extend(scheduled(inner));
                },
                Effect::None | Effect::Future(_) => {},
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robotask_core::{SmallVec, smallvec};

    #[derive(Clone, Debug, Default)]
    struct Beacon {
        pings: u32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum BeaconAction {
        Ping,
        Silence,
    }

    struct BeaconReducer;

    impl Reducer for BeaconReducer {
        type State = Beacon;
        type Action = BeaconAction;
        type Environment = Duration;

        fn reduce(
            &self,
            state: &mut Beacon,
            action: BeaconAction,
            interval: &Duration,
        ) -> SmallVec<[Effect<BeaconAction>; 4]> {
            match action {
                BeaconAction::Ping => {
                    state.pings += 1;
                    smallvec![Effect::delay(*interval, BeaconAction::Silence)]
                },
                BeaconAction::Silence => smallvec![Effect::None],
            }
        }
    }

    #[test]
    fn setup_actions_build_on_given_state() {
        let state = ReducerTest::new(BeaconReducer)
            .with_env(Duration::from_secs(1))
            .given_state(Beacon { pings: 10 })
            .given_actions([BeaconAction::Ping, BeaconAction::Ping])
            .when_action(BeaconAction::Ping)
            .then_state(|state| assert_eq!(state.pings, 13))
            .then_schedules(Duration::from_secs(1), BeaconAction::Silence)
            .run();

        assert_eq!(state.pings, 13);
    }

    #[test]
    fn default_state_when_none_given() {
        ReducerTest::new(BeaconReducer)
            .with_env(Duration::from_secs(1))
            .when_action(BeaconAction::Silence)
            .then_state(|state| assert_eq!(state.pings, 0))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn scheduled_searches_groups() {
        let effects = [Effect::merge(vec![
            Effect::None,
            Effect::chain(vec![Effect::delay(Duration::from_secs(2), BeaconAction::Ping)]),
        ])];

        assertions::assert_has_delay_effect(&effects);
        assertions::assert_effects_count(&effects, 1);
        assert_eq!(
            assertions::scheduled(&effects),
            vec![(Duration::from_secs(2), &BeaconAction::Ping)]
        );
    }
}
