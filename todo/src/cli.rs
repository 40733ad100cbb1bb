//! Line-oriented command parsing for the interactive binary.

use crate::types::{AppAction, AppState, Priority, TaskDraft, TaskId};
use thiserror::Error;

/// Help text printed by the `help` command
pub const HELP: &str = "\
Commands:
  add [!low|!normal|!high] [@category] <text>   add a task
  toggle <id>                                   flip a task between pending and completed
  rm <id>                                       delete a task
  done-all                                      mark every pending task completed
  clear                                         delete every completed task
  list                                          show the task list
  html                                          show the task list as HTML
  dismiss                                       hide the current notification
  time                                          show the system time
  help                                          show this help
  quit                                          exit";

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a task
    Add(TaskDraft),
    /// Toggle a task
    Toggle(TaskId),
    /// Delete a task
    Remove(TaskId),
    /// Complete every pending task
    CompleteAll,
    /// Delete every completed task
    ClearCompleted,
    /// Print the text listing
    List,
    /// Print the HTML listing
    Html,
    /// Hide the current notification
    Dismiss,
    /// Print the system time
    Time,
    /// Print help
    Help,
    /// Exit
    Quit,
}

/// Unparsable input line
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// Nothing but whitespace
    #[error("no command given")]
    Blank,

    /// First word is not a command
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    /// Command needs a task id
    #[error("'{0}' needs a task id")]
    MissingId(&'static str),

    /// Task id is not a number
    #[error("'{0}' is not a task id")]
    BadId(String),

    /// Priority marker is not a known priority
    #[error("{0}")]
    BadPriority(String),
}

impl std::str::FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Blank),
            "add" | "a" => parse_draft(rest).map(Self::Add),
            "toggle" | "t" => parse_id("toggle", rest).map(Self::Toggle),
            "rm" | "remove" | "delete" => parse_id("rm", rest).map(Self::Remove),
            "done-all" | "complete-all" => Ok(Self::CompleteAll),
            "clear" => Ok(Self::ClearCompleted),
            "list" | "ls" => Ok(Self::List),
            "html" => Ok(Self::Html),
            "dismiss" => Ok(Self::Dismiss),
            "time" => Ok(Self::Time),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Parses `[!priority] [@category] text`; text validation is left to the store
fn parse_draft(rest: &str) -> Result<TaskDraft, CommandError> {
    let mut priority = Priority::default();
    let mut category = None;
    let mut text = rest;

    loop {
        let (word, remainder) = text
            .split_once(char::is_whitespace)
            .map_or((text, ""), |(word, remainder)| (word, remainder.trim_start()));

        if let Some(level) = word.strip_prefix('!').filter(|level| !level.is_empty()) {
            priority = level.parse().map_err(CommandError::BadPriority)?;
        } else if let Some(label) = word.strip_prefix('@').filter(|label| !label.is_empty()) {
            category = Some(label.to_string());
        } else {
            break;
        }
        text = remainder;
    }

    let draft = TaskDraft::new(text).with_priority(priority);
    Ok(match category {
        Some(category) => draft.with_category(category),
        None => draft,
    })
}

fn parse_id(command: &'static str, rest: &str) -> Result<TaskId, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingId(command));
    }
    rest.parse().map_err(|_| CommandError::BadId(rest.to_string()))
}

impl Command {
    /// The store action this command sends, if it changes state
    #[must_use]
    pub fn into_action(self) -> Option<AppAction> {
        match self {
            Self::Add(draft) => Some(AppAction::AddTask { draft }),
            Self::Toggle(id) => Some(AppAction::ToggleTask { id }),
            Self::Remove(id) => Some(AppAction::RemoveTask { id }),
            Self::CompleteAll => Some(AppAction::CompleteAll),
            Self::ClearCompleted => Some(AppAction::ClearCompleted),
            Self::Dismiss => Some(AppAction::Notification(
                crate::notification::NotificationAction::Dismiss,
            )),
            Self::List | Self::Html | Self::Time | Self::Help | Self::Quit => None,
        }
    }
}

/// The yes/no question to ask before running `command`, if it needs one
///
/// Destructive commands are confirmed only when they would actually change
/// something. Commands that would fail or do nothing go straight through so
/// the user still sees the resulting notification.
#[must_use]
pub fn confirmation_prompt(command: &Command, state: &AppState) -> Option<String> {
    match command {
        Command::Remove(id) => state.tasks.get(*id).map(|task| {
            format!(
                "CONFIRM MISSION TERMINATION\nTask #{}: \"{}\"\n\
                 This action cannot be undone. Proceed?",
                task.id, task.text
            )
        }),
        Command::ClearCompleted => match state.tasks.completed_count() {
            0 => None,
            count => Some(format!(
                "CLEAR COMPLETED MISSIONS\n\
                 This will remove {count} completed task(s). Proceed with cleanup?"
            )),
        },
        Command::CompleteAll => match state.tasks.pending_count() {
            0 => None,
            count => Some(format!(
                "COMPLETE ALL MISSIONS\nThis will mark {count} task(s) as completed. Proceed?"
            )),
        },
        _ => None,
    }
}

/// Whether a reply to a confirmation prompt means yes
#[must_use]
pub fn is_yes(reply: &str) -> bool {
    matches!(reply.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_CATEGORY;
    use robotask_testing::epoch;

    fn parse(line: &str) -> Result<Command, CommandError> {
        line.parse()
    }

    #[test]
    fn parses_simple_commands() {
        assert_eq!(parse("  list "), Ok(Command::List));
        assert_eq!(parse("DONE-ALL"), Ok(Command::CompleteAll));
        assert_eq!(parse("clear"), Ok(Command::ClearCompleted));
        assert_eq!(parse("q"), Ok(Command::Quit));
        assert_eq!(parse(""), Err(CommandError::Blank));
        assert_eq!(parse("fly"), Err(CommandError::Unknown("fly".into())));
    }

    #[test]
    fn parses_ids() {
        assert_eq!(parse("toggle 3"), Ok(Command::Toggle(TaskId::new(3))));
        assert_eq!(parse("rm #12"), Ok(Command::Remove(TaskId::new(12))));
        assert_eq!(parse("rm"), Err(CommandError::MissingId("rm")));
        assert_eq!(parse("toggle x"), Err(CommandError::BadId("x".into())));
    }

    #[test]
    fn parses_add_with_markers() {
        let Ok(Command::Add(draft)) = parse("add !high @security  Patrol the perimeter") else {
            unreachable!("valid add line");
        };
        assert_eq!(draft.text, "Patrol the perimeter");
        assert_eq!(draft.priority, Priority::High);
        assert_eq!(draft.category, "security");
    }

    #[test]
    fn add_keeps_raw_text_for_validation() {
        assert_eq!(parse("add"), Ok(Command::Add(TaskDraft::new(""))));

        let Ok(Command::Add(draft)) = parse("add Buy 3 bolts @ the store") else {
            unreachable!("valid add line");
        };
        assert_eq!(draft.text, "Buy 3 bolts @ the store");
        assert_eq!(draft.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn bad_priority_is_reported() {
        assert_eq!(
            parse("add !urgent Fix arm"),
            Err(CommandError::BadPriority("unknown priority 'urgent'".into()))
        );
    }

    #[test]
    fn read_only_commands_send_nothing() {
        assert_eq!(Command::List.into_action(), None);
        assert_eq!(Command::Quit.into_action(), None);
        assert_eq!(Command::CompleteAll.into_action(), Some(AppAction::CompleteAll));
    }

    #[test]
    fn prompts_only_when_something_would_change() {
        let mut state = AppState::new();
        assert!(confirmation_prompt(&Command::Remove(TaskId::new(1)), &state).is_none());
        assert!(confirmation_prompt(&Command::ClearCompleted, &state).is_none());
        assert!(confirmation_prompt(&Command::CompleteAll, &state).is_none());

        assert!(state.tasks.add("Weld hull", epoch()).is_ok());
        let prompt = confirmation_prompt(&Command::Remove(TaskId::new(1)), &state);
        assert!(prompt.is_some_and(|p| p.contains("Task #1: \"Weld hull\"")));
        assert!(confirmation_prompt(&Command::ClearCompleted, &state).is_none());
        assert!(
            confirmation_prompt(&Command::CompleteAll, &state)
                .is_some_and(|p| p.contains("mark 1 task(s)"))
        );
        assert!(confirmation_prompt(&Command::Toggle(TaskId::new(1)), &state).is_none());
    }

    #[test]
    fn yes_answers() {
        assert!(is_yes(" Y "));
        assert!(is_yes("yes"));
        assert!(!is_yes(""));
        assert!(!is_yes("nope"));
    }
}
