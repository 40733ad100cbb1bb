//! Reducer logic for the application.
//!
//! Every command performs one task-list operation, records its outcome and
//! posts a notification describing it. Failed commands leave the task list
//! unchanged and set `last_error`.

use crate::notification::{
    NotificationAction, NotificationEnvironment, NotificationKind, NotificationReducer,
};
use crate::types::{
    AppAction, AppState, LENGTH_WARNING_THRESHOLD, MAX_TASK_LEN, Task, TaskError,
    ValidationError,
};
use robotask_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer};
use std::sync::Arc;
use std::time::Duration;

/// Environment dependencies for the application reducer
#[derive(Clone)]
pub struct AppEnvironment {
    /// Clock for task timestamps
    pub clock: Arc<dyn Clock>,
    /// Notification channel dependencies
    pub notifications: NotificationEnvironment,
}

impl AppEnvironment {
    /// Creates an environment sharing one clock between tasks and notifications
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, notification_timeout: Duration) -> Self {
        Self {
            notifications: NotificationEnvironment::new(Arc::clone(&clock), notification_timeout),
            clock,
        }
    }
}

/// Reducer for the application
#[derive(Clone, Copy, Debug, Default)]
pub struct AppReducer;

impl AppReducer {
    /// Creates a new `AppReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Shows `message` through the notification channel
    fn notify(
        state: &mut AppState,
        env: &AppEnvironment,
        message: String,
        kind: NotificationKind,
    ) -> SmallVec<[Effect<AppAction>; 4]> {
        Self::notification(state, env, NotificationAction::Notify { message, kind })
    }

    /// Runs the notification reducer and lifts its effects
    fn notification(
        state: &mut AppState,
        env: &AppEnvironment,
        action: NotificationAction,
    ) -> SmallVec<[Effect<AppAction>; 4]> {
        NotificationReducer
            .reduce(&mut state.notification, action, &env.notifications)
            .into_iter()
            .map(|effect| effect.map(AppAction::Notification))
            .collect()
    }

    /// Success message for an added task, warning when it is close to the limit
    fn added(task: &Task) -> (String, NotificationKind) {
        let message = format!("Task #{} added to mission queue!", task.id);
        match task.text.chars().count() {
            len if len > LENGTH_WARNING_THRESHOLD => (
                format!("{message} ({len}/{MAX_TASK_LEN} characters)"),
                NotificationKind::Warning,
            ),
            _ => (message, NotificationKind::Success),
        }
    }

    /// Records a failed command and reports it
    fn reject(
        state: &mut AppState,
        env: &AppEnvironment,
        error: TaskError,
    ) -> SmallVec<[Effect<AppAction>; 4]> {
        tracing::warn!(%error, "Command rejected");
        let message = match &error {
            TaskError::Validation(ValidationError::Empty) => {
                "ERROR: Please enter a todo item!".to_string()
            },
            TaskError::Validation(ValidationError::TooLong { max, .. }) => {
                format!("ERROR: Todo item too long (max {max} characters)!")
            },
            TaskError::NotFound(id) => format!("ERROR: Task #{id} not found"),
        };
        state.last_error = Some(error);
        Self::notify(state, env, message, NotificationKind::Error)
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::debug!(action = action.name(), "Reducing");

        match action {
            AppAction::AddTask { draft } => match state.tasks.add_draft(draft, env.clock.now()) {
                Ok(task) => {
                    tracing::info!(id = %task.id, text = %task.text, "Task added");
                    state.last_error = None;
                    let (message, kind) = Self::added(&task);
                    Self::notify(state, env, message, kind)
                },
                Err(error) => Self::reject(state, env, error),
            },

            AppAction::ToggleTask { id } => match state.tasks.toggle(id) {
                Ok(task) => {
                    let status = if task.completed { "completed" } else { "pending" };
                    tracing::info!(id = %task.id, status, "Task updated");
                    state.last_error = None;
                    Self::notify(
                        state,
                        env,
                        format!("Task #{} marked as {status}", task.id),
                        NotificationKind::Info,
                    )
                },
                Err(error) => Self::reject(state, env, error),
            },

            AppAction::RemoveTask { id } => match state.tasks.remove(id) {
                Ok(task) => {
                    tracing::info!(id = %task.id, text = %task.text, "Task deleted");
                    state.last_error = None;
                    Self::notify(
                        state,
                        env,
                        format!("Task #{} terminated from system!", task.id),
                        NotificationKind::Success,
                    )
                },
                Err(error) => Self::reject(state, env, error),
            },

            AppAction::CompleteAll => {
                state.last_error = None;
                match state.tasks.complete_all() {
                    0 => Self::notify(
                        state,
                        env,
                        "All tasks already completed!".to_string(),
                        NotificationKind::Info,
                    ),
                    count => {
                        tracing::info!(count, "Completed all pending tasks");
                        Self::notify(
                            state,
                            env,
                            format!("All {count} task(s) marked as completed!"),
                            NotificationKind::Success,
                        )
                    },
                }
            },

            AppAction::ClearCompleted => {
                state.last_error = None;
                match state.tasks.clear_completed() {
                    0 => Self::notify(
                        state,
                        env,
                        "No completed tasks to clear!".to_string(),
                        NotificationKind::Info,
                    ),
                    count => {
                        tracing::info!(count, "Cleared completed tasks");
                        Self::notify(
                            state,
                            env,
                            format!("{count} completed task(s) cleared from system!"),
                            NotificationKind::Success,
                        )
                    },
                }
            },

            AppAction::Notification(action) => Self::notification(state, env, action),
        }
    }
}
