//! # Robotask Testing
//!
//! Testing utilities and helpers for the Robotask reducer architecture.
//!
//! This crate provides:
//! - Deterministic [`Clock`] implementations
//! - [`ReducerTest`], a Given-When-Then builder for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use robotask_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(AppReducer::new())
//!     .with_env(AppEnvironment::new(Arc::new(test_clock()), DEFAULT_NOTIFICATION_TIMEOUT))
//!     .given_state(AppState::default())
//!     .when_action(AppAction::add("Charge batteries"))
//!     .then_state(|state| assert_eq!(state.tasks.len(), 1))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use robotask_core::environment::Clock;

/// Ergonomic Given-When-Then testing for reducers
pub mod reducer_test;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use chrono::Duration;
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use robotask_testing::mocks::FixedClock;
    /// use robotask_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when told to
    ///
    /// Each call to [`ManualClock::advance`] moves time forward, which lets
    /// tests create tasks with distinct, ordered timestamps.
    #[derive(Debug)]
    pub struct ManualClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        /// Create a clock starting at `start`
        #[must_use]
        pub const fn new(start: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(start),
            }
        }

        /// Move the clock forward by `step`
        pub fn advance(&self, step: Duration) {
            let mut time = self.time.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            *time += step;
        }

        /// Move the clock to an absolute time
        pub fn set(&self, to: DateTime<Utc>) {
            let mut time = self.time.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            *time = to;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
        }
    }

    /// The instant every test clock starts at (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default()
    }

    /// Create a default fixed clock for tests
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(epoch())
    }

    /// Create a manual clock starting at [`epoch`]
    #[must_use]
    pub fn manual_clock() -> ManualClock {
        ManualClock::new(epoch())
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, ManualClock, epoch, manual_clock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
