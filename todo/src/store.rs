//! The task list and all of its mutations.

use crate::types::{MAX_TASK_LEN, Task, TaskDraft, TaskError, TaskId, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Ordered collection of tasks plus the id counter
///
/// Tasks are kept in insertion order. The counter only ever grows, so ids
/// of deleted tasks are never handed out again. Every failing operation
/// leaves the store untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "StoredTasks")]
pub struct TaskStore {
    tasks: Vec<Task>,
    last_id: u64,
    latest_created_at: Option<DateTime<Utc>>,
}

/// A serialized task list that would break the store's invariants
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CorruptStore {
    /// Two tasks share an id
    #[error("duplicate task #{0}")]
    DuplicateId(TaskId),

    /// An id is zero or was never handed out by the counter
    #[error("task #{id} is outside the assigned range 1..={last_id}")]
    IdOutOfRange {
        /// Offending id
        id: TaskId,
        /// Stored counter value
        last_id: u64,
    },

    /// Task text fails validation or is not trimmed
    #[error("task #{id} has invalid text")]
    InvalidText {
        /// Offending id
        id: TaskId,
        /// Why the text is rejected, if it is not just untrimmed
        reason: Option<ValidationError>,
    },
}

/// Unchecked wire form of [`TaskStore`]
#[derive(Deserialize)]
struct StoredTasks {
    tasks: Vec<Task>,
    last_id: u64,
    latest_created_at: Option<DateTime<Utc>>,
}

impl TryFrom<StoredTasks> for TaskStore {
    type Error = CorruptStore;

    fn try_from(stored: StoredTasks) -> Result<Self, Self::Error> {
        let StoredTasks {
            tasks,
            last_id,
            latest_created_at,
        } = stored;

        let mut seen = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            let id = task.id;
            if id.get() == 0 || id.get() > last_id {
                return Err(CorruptStore::IdOutOfRange { id, last_id });
            }
            if !seen.insert(id) {
                return Err(CorruptStore::DuplicateId(id));
            }
            match validate_text(&task.text) {
                Ok(text) if text == task.text => {},
                Ok(_) => return Err(CorruptStore::InvalidText { id, reason: None }),
                Err(reason) => {
                    return Err(CorruptStore::InvalidText {
                        id,
                        reason: Some(reason),
                    });
                },
            }
        }

        let newest = tasks.iter().map(|t| t.created_at).max();
        Ok(Self {
            tasks,
            last_id,
            latest_created_at: latest_created_at.max(newest),
        })
    }
}

impl TaskStore {
    /// Creates an empty store
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tasks: Vec::new(),
            last_id: 0,
            latest_created_at: None,
        }
    }

    /// Adds a task with default priority and category
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Validation`] if the trimmed text is empty or longer
    /// than [`MAX_TASK_LEN`] characters.
    pub fn add(&mut self, text: &str, now: DateTime<Utc>) -> Result<Task, TaskError> {
        self.add_draft(TaskDraft::new(text), now)
    }

    /// Adds a task from a draft
    ///
    /// Creation timestamps never go backwards: if `now` is earlier than the
    /// newest timestamp handed out so far, that timestamp is reused.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Validation`] if the trimmed text is empty or longer
    /// than [`MAX_TASK_LEN`] characters.
    pub fn add_draft(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> Result<Task, TaskError> {
        let text = validate_text(&draft.text)?;

        let created_at = self.latest_created_at.map_or(now, |latest| latest.max(now));
        self.last_id += 1;

        let task = Task {
            id: TaskId::new(self.last_id),
            text: text.to_string(),
            completed: false,
            created_at,
            priority: draft.priority,
            category: draft.category,
        };

        self.latest_created_at = Some(created_at);
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Flips a task between pending and completed
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] if no task has this id.
    pub fn toggle(&mut self, id: TaskId) -> Result<Task, TaskError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))?;
        task.completed = !task.completed;
        Ok(task.clone())
    }

    /// Deletes a task permanently
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] if no task has this id.
    pub fn remove(&mut self, id: TaskId) -> Result<Task, TaskError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))?;
        Ok(self.tasks.remove(index))
    }

    /// Marks every pending task completed, returning how many changed
    pub fn complete_all(&mut self) -> usize {
        let mut changed = 0;
        for task in self.tasks.iter_mut().filter(|t| !t.completed) {
            task.completed = true;
            changed += 1;
        }
        changed
    }

    /// Deletes every completed task, returning how many were removed
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        before - self.tasks.len()
    }

    /// Looks up a task by id
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks in insertion order
    #[must_use]
    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    /// Iterates tasks in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    /// Number of tasks
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the store holds no tasks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of completed tasks
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Number of pending tasks
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.len() - self.completed_count()
    }

    /// The id the next successful add will receive
    #[must_use]
    pub const fn next_id(&self) -> TaskId {
        TaskId::new(self.last_id + 1)
    }
}

impl<'a> IntoIterator for &'a TaskStore {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Trims `raw` and checks its length in characters
fn validate_text(raw: &str) -> Result<&str, ValidationError> {
    let text = raw.trim();
    let len = text.chars().count();

    if len == 0 {
        return Err(ValidationError::Empty);
    }
    if len > MAX_TASK_LEN {
        return Err(ValidationError::TooLong {
            len,
            max: MAX_TASK_LEN,
        });
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Priority;
    use chrono::Duration;
    use proptest::prelude::*;
    use robotask_testing::epoch;

    fn store_with(texts: &[&str]) -> TaskStore {
        let mut store = TaskStore::new();
        for (offset, text) in (0_i64..).zip(texts) {
            let added = store.add(text, epoch() + Duration::seconds(offset));
            assert!(added.is_ok());
        }
        store
    }

    #[test]
    fn add_trims_and_assigns_sequential_ids() {
        let mut store = TaskStore::new();

        let first = store.add("  Charge batteries  ", epoch());
        let second = store.add("Calibrate sensors", epoch());

        assert_eq!(first.as_ref().map(|t| t.text.as_str()), Ok("Charge batteries"));
        assert_eq!(first.map(|t| t.id), Ok(TaskId::new(1)));
        assert_eq!(second.map(|t| t.id), Ok(TaskId::new(2)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn new_task_uses_draft_metadata() {
        let mut store = TaskStore::new();
        let draft = TaskDraft::new("Patrol perimeter")
            .with_priority(Priority::High)
            .with_category("security");

        let Ok(task) = store.add_draft(draft, epoch()) else {
            unreachable!("valid draft");
        };

        assert!(!task.completed);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.category, "security");
        assert_eq!(task.created_at, epoch());
    }

    #[test]
    fn add_rejects_empty_and_whitespace() {
        let mut store = store_with(&["existing"]);

        assert_eq!(
            store.add("", epoch()),
            Err(TaskError::Validation(ValidationError::Empty))
        );
        assert_eq!(
            store.add(" \t ", epoch()),
            Err(TaskError::Validation(ValidationError::Empty))
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.next_id(), TaskId::new(2));
    }

    #[test]
    fn add_enforces_length_limit_in_characters() {
        let mut store = TaskStore::new();

        assert!(store.add(&"a".repeat(100), epoch()).is_ok());
        assert_eq!(
            store.add(&"a".repeat(101), epoch()),
            Err(TaskError::Validation(ValidationError::TooLong { len: 101, max: 100 }))
        );
        // Multi-byte characters count once each.
        assert!(store.add(&"é".repeat(100), epoch()).is_ok());
        // Surrounding whitespace does not count.
        assert!(store.add(&format!("  {}  ", "b".repeat(100)), epoch()).is_ok());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn ids_are_never_reused_after_delete() {
        let mut store = store_with(&["one", "two", "three"]);

        assert!(store.remove(TaskId::new(3)).is_ok());
        assert!(store.remove(TaskId::new(2)).is_ok());

        let next = store.add("four", epoch());
        assert_eq!(next.map(|t| t.id), Ok(TaskId::new(4)));
    }

    #[test]
    fn created_at_never_goes_backwards() {
        let mut store = TaskStore::new();
        let later = epoch() + Duration::seconds(10);

        assert!(store.add("first", later).is_ok());
        let second = store.add("second", epoch());

        assert_eq!(second.map(|t| t.created_at), Ok(later));
    }

    #[test]
    fn toggle_is_its_own_inverse() {
        let mut store = store_with(&["x"]);
        let id = TaskId::new(1);

        assert_eq!(store.toggle(id).map(|t| t.completed), Ok(true));
        assert_eq!(store.toggle(id).map(|t| t.completed), Ok(false));
        assert_eq!(store.get(id).map(|t| t.completed), Some(false));
    }

    #[test]
    fn toggle_missing_id_changes_nothing() {
        let mut store = store_with(&["a", "b"]);
        let before = store.as_slice().to_vec();

        assert_eq!(
            store.toggle(TaskId::new(99)),
            Err(TaskError::NotFound(TaskId::new(99)))
        );
        assert_eq!(store.as_slice(), before.as_slice());
    }

    #[test]
    fn remove_returns_deleted_task() {
        let mut store = store_with(&["a", "b"]);

        let removed = store.remove(TaskId::new(1));
        assert_eq!(removed.map(|t| t.text), Ok("a".to_string()));
        assert!(store.get(TaskId::new(1)).is_none());
        assert_eq!(
            store.remove(TaskId::new(1)),
            Err(TaskError::NotFound(TaskId::new(1)))
        );
    }

    #[test]
    fn complete_all_counts_only_pending() {
        let mut store = store_with(&["a", "b", "c"]);
        assert!(store.toggle(TaskId::new(2)).is_ok());

        assert_eq!(store.complete_all(), 2);
        assert_eq!(store.pending_count(), 0);
        assert_eq!(store.complete_all(), 0);
    }

    #[test]
    fn clear_completed_removes_exactly_completed() {
        let mut store = store_with(&["a", "b", "c"]);
        assert!(store.toggle(TaskId::new(1)).is_ok());
        assert!(store.toggle(TaskId::new(3)).is_ok());

        assert_eq!(store.clear_completed(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(TaskId::new(2)).map(|t| t.text.as_str()), Some("b"));
        assert_eq!(store.clear_completed(), 0);
    }

    const VALID_TEXT: &str = "[a-zA-Z0-9 ]{0,20}[a-zA-Z0-9][a-zA-Z0-9 ]{0,79}";

    proptest! {
        #[test]
        fn valid_text_always_gets_next_id(
            texts in prop::collection::vec(VALID_TEXT, 1..20),
            deletions in prop::collection::vec(any::<bool>(), 20),
        ) {
            let mut store = TaskStore::new();
            let mut highest = 0;

            for (text, delete) in texts.iter().zip(deletions) {
                let task = store.add(text, epoch());
                prop_assert!(task.is_ok());
                let id = task.map(|t| t.id.get()).unwrap_or_default();
                prop_assert_eq!(id, highest + 1);
                highest = id;

                if delete {
                    prop_assert!(store.remove(TaskId::new(id)).is_ok());
                }
            }
        }

        #[test]
        fn overlong_text_is_always_rejected(extra in 1_usize..50) {
            let mut store = TaskStore::new();
            let text = "x".repeat(MAX_TASK_LEN + extra);
            let rejected = matches!(
                store.add(&text, epoch()),
                Err(TaskError::Validation(ValidationError::TooLong { .. }))
            );
            prop_assert!(rejected);
            prop_assert!(store.is_empty());
        }
    }

    mod serialization {
        use super::*;

        fn task_json(id: u64, text: &str) -> String {
            format!(
                concat!(
                    r#"{{"id":{},"text":"{}","completed":false,"#,
                    r#""created_at":"2025-01-01T00:00:00Z","#,
                    r#""priority":"normal","category":"general"}}"#,
                ),
                id, text
            )
        }

        fn load(tasks: &[String], last_id: u64) -> Result<TaskStore, serde_json::Error> {
            let json = format!(
                r#"{{"tasks":[{}],"last_id":{last_id},"latest_created_at":null}}"#,
                tasks.join(",")
            );
            serde_json::from_str(&json)
        }

        #[test]
        fn saved_store_loads_back() {
            let mut store = store_with(&["a", "b", "c"]);
            assert!(store.remove(TaskId::new(3)).is_ok());

            let Ok(json) = serde_json::to_string(&store) else {
                unreachable!("store serializes");
            };
            let Ok(mut loaded) = serde_json::from_str::<TaskStore>(&json) else {
                unreachable!("store serialized by itself must load");
            };

            assert_eq!(loaded.as_slice(), store.as_slice());
            assert_eq!(loaded.add("d", epoch()).map(|t| t.id), Ok(TaskId::new(4)));
        }

        #[test]
        fn duplicate_ids_are_rejected() {
            let result = load(&[task_json(1, "a"), task_json(1, "b")], 1);
            assert!(result.is_err_and(|e| e.to_string().contains("duplicate task #1")));
        }

        #[test]
        fn ids_beyond_counter_are_rejected() {
            assert!(load(&[task_json(1, "a")], 0).is_err());
            assert!(load(&[task_json(0, "a")], 3).is_err());
        }

        #[test]
        fn invalid_text_is_rejected() {
            assert!(load(&[task_json(1, "")], 1).is_err());
            assert!(load(&[task_json(1, " padded ")], 1).is_err());
            assert!(load(&[task_json(1, &"x".repeat(101))], 1).is_err());
        }

        #[test]
        fn loaded_timestamps_do_not_go_backwards() {
            let Ok(mut loaded) = load(&[task_json(1, "a")], 1) else {
                unreachable!("valid store");
            };
            let earlier = epoch() - Duration::seconds(10);

            assert_eq!(loaded.add("b", earlier).map(|t| t.created_at), Ok(epoch()));
        }
    }
}
