//! Transient status messages.
//!
//! At most one notification is shown at a time. Each one carries a
//! generation number; the auto-dismiss timer of a notification that has
//! since been replaced finds a different generation and does nothing.

use chrono::{DateTime, Utc};
use robotask_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer, smallvec};
use robotask_macros::Action;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// How long a notification stays up unless dismissed or replaced
pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(4);

/// Severity of a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Neutral status
    Info,
    /// Operation succeeded
    Success,
    /// Operation rejected
    Error,
    /// Needs attention
    Warning,
}

impl NotificationKind {
    /// Icon shown in front of the message
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Info => "🤖",
            Self::Success => "✅",
            Self::Error => "🚫",
            Self::Warning => "⚠️",
        }
    }
}

/// A notification currently on screen
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Distinguishes this notification from any it replaced
    pub generation: u64,
    /// Text to show
    pub message: String,
    /// Severity
    pub kind: NotificationKind,
    /// When it appeared
    pub shown_at: DateTime<Utc>,
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind.icon(), self.message)
    }
}

/// Notification channel state
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NotificationState {
    current: Option<Notification>,
    generation: u64,
}

impl NotificationState {
    /// The notification on screen, if any
    #[must_use]
    pub const fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }
}

/// Actions for the notification channel
#[derive(Action, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationAction {
    /// Command: Show a message, replacing whatever is shown
    #[command]
    Notify {
        /// Text to show
        message: String,
        /// Severity
        kind: NotificationKind,
    },

    /// Command: Hide the current message
    #[command]
    Dismiss,

    /// Event: The auto-dismiss timer for `generation` fired
    #[event]
    Expired {
        /// Generation the timer was started for
        generation: u64,
    },
}

/// Dependencies of the notification channel
#[derive(Clone)]
pub struct NotificationEnvironment {
    /// Clock for `shown_at`
    pub clock: Arc<dyn Clock>,
    /// Auto-dismiss delay
    pub timeout: Duration,
}

impl NotificationEnvironment {
    /// Creates an environment with the given auto-dismiss delay
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self { clock, timeout }
    }
}

/// Reducer for the notification channel
#[derive(Clone, Copy, Debug, Default)]
pub struct NotificationReducer;

impl Reducer for NotificationReducer {
    type State = NotificationState;
    type Action = NotificationAction;
    type Environment = NotificationEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            NotificationAction::Notify { message, kind } => {
                state.generation += 1;
                let generation = state.generation;

                if let Some(previous) = state.current.take() {
                    tracing::trace!(superseded = previous.generation, "Replacing notification");
                }
                tracing::debug!(generation, ?kind, %message, "Showing notification");

                state.current = Some(Notification {
                    generation,
                    message,
                    kind,
                    shown_at: env.clock.now(),
                });

                smallvec![Effect::delay(
                    env.timeout,
                    NotificationAction::Expired { generation },
                )]
            },
            NotificationAction::Dismiss => {
                state.current = None;
                SmallVec::new()
            },
            NotificationAction::Expired { generation } => {
                if state.current.as_ref().is_some_and(|n| n.generation == generation) {
                    state.current = None;
                } else {
                    tracing::trace!(generation, "Ignoring stale notification timer");
                }
                SmallVec::new()
            },
        }
    }
}
