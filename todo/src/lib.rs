//! Robot-themed to-do list manager.
//!
//! The whole application is one [`AppReducer`] driven by a
//! [`robotask_runtime::Store`]. Commands mutate the [`TaskStore`] and post a
//! notification; the notification's auto-dismiss timer is a delayed effect
//! that feeds an expiry event back into the store.
//!
//! # Quick Start
//!
//! ```no_run
//! use robotask::{AppAction, AppEnvironment, AppReducer, AppState, TextListing};
//! use robotask::notification::DEFAULT_NOTIFICATION_TIMEOUT;
//! use robotask_core::environment::SystemClock;
//! use robotask_runtime::Store;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = AppEnvironment::new(Arc::new(SystemClock), DEFAULT_NOTIFICATION_TIMEOUT);
//! let store = Store::new(AppState::new(), AppReducer::new(), env);
//!
//! store.send(AppAction::add("Recharge power core")).await?;
//!
//! let listing = store.state(|s| TextListing::of(&s.tasks).to_string()).await;
//! println!("{listing}");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod notification;
pub mod reducer;
pub mod render;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use notification::{
    Notification, NotificationAction, NotificationEnvironment, NotificationKind,
    NotificationReducer, NotificationState,
};
pub use reducer::{AppEnvironment, AppReducer};
pub use render::{HtmlListing, Summary, TextListing, summary, view};
pub use store::{CorruptStore, TaskStore};
pub use types::{
    AppAction, AppState, Priority, Task, TaskDraft, TaskError, TaskId, ValidationError,
};
