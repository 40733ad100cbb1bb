//! Read-only projections of the task list and their presentation.
//!
//! [`view`] and [`summary`] are pure functions of the task list. The
//! [`TextListing`] and [`HtmlListing`] adapters only ever consume their
//! output, never the store itself.

use crate::types::Task;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

const EMPTY_TITLE: &str = "No active missions in database";
const EMPTY_HINT: &str = "Add a task to begin your robot mission planning";
const CELEBRATION: &str = "ALL MISSIONS COMPLETED! EXCELLENT WORK, AGENT!";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Aggregate counters for a task list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of tasks
    pub total: usize,
    /// Number of completed tasks
    pub completed: usize,
    /// Number of pending tasks
    pub active: usize,
    /// `completed / total` as a rounded percentage, 0 for an empty list
    pub completion_rate: u8,
}

impl Summary {
    /// Whether every task is done (and there is at least one)
    #[must_use]
    pub const fn all_done(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// Orders tasks for display
///
/// Pending tasks come first, then completed ones. Within each group the
/// newest task comes first. Tasks with equal timestamps keep their relative
/// insertion order.
#[must_use]
pub fn view<'a, I>(tasks: I) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut ordered: Vec<&Task> = tasks.into_iter().collect();
    ordered.sort_by_key(|t| (t.completed, Reverse(t.created_at)));
    ordered
}

/// Counts tasks by status
#[must_use]
pub fn summary<'a, I>(tasks: I) -> Summary
where
    I: IntoIterator<Item = &'a Task>,
{
    let (total, completed) = tasks
        .into_iter()
        .fold((0_usize, 0_usize), |(total, completed), task| {
            (total + 1, completed + usize::from(task.completed))
        });

    Summary {
        total,
        completed,
        active: total - completed,
        completion_rate: completion_rate(completed, total),
    }
}

/// Rounded percentage, halves rounding up
fn completion_rate(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rate = (completed * 200 + total) / (total * 2);
    u8::try_from(rate).unwrap_or(100)
}

const fn status_label(task: &Task) -> &'static str {
    if task.completed {
        "MISSION COMPLETE"
    } else {
        "ACTIVE MISSION"
    }
}

/// Plain-text listing for terminals
#[derive(Debug, Clone)]
pub struct TextListing<'a> {
    tasks: Vec<&'a Task>,
    summary: Summary,
}

impl<'a> TextListing<'a> {
    /// Builds a listing from an ordered view and its summary
    #[must_use]
    pub const fn new(tasks: Vec<&'a Task>, summary: Summary) -> Self {
        Self { tasks, summary }
    }

    /// Builds a listing straight from a task collection
    #[must_use]
    pub fn of<I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = &'a Task> + Clone,
    {
        Self::new(view(tasks.clone()), summary(tasks))
    }
}

impl fmt::Display for TextListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tasks.is_empty() {
            writeln!(f, "🤖 {EMPTY_TITLE}")?;
            return writeln!(f, "   {EMPTY_HINT}");
        }

        for task in &self.tasks {
            let icon = if task.completed { "✅" } else { "⚡" };
            writeln!(f, "{icon} TASK #{} [{}] {}", task.id, status_label(task), task.text)?;
            writeln!(
                f,
                "     📅 {}  🏷️ {}  ⚡ {}",
                task.created_at.format(TIMESTAMP_FORMAT),
                task.category.to_uppercase(),
                task.priority.as_str().to_uppercase(),
            )?;
        }

        let s = &self.summary;
        writeln!(
            f,
            "TOTAL {}  COMPLETED {}  ACTIVE {}  PROGRESS {}%",
            s.total, s.completed, s.active, s.completion_rate
        )?;
        if s.all_done() {
            writeln!(f, "🎉 {CELEBRATION} 🎉")?;
        }
        Ok(())
    }
}

/// HTML fragment listing
///
/// Task text and category are escaped; everything else is generated.
#[derive(Debug, Clone)]
pub struct HtmlListing<'a> {
    tasks: Vec<&'a Task>,
    summary: Summary,
}

impl<'a> HtmlListing<'a> {
    /// Builds a listing from an ordered view and its summary
    #[must_use]
    pub const fn new(tasks: Vec<&'a Task>, summary: Summary) -> Self {
        Self { tasks, summary }
    }

    /// Builds a listing straight from a task collection
    #[must_use]
    pub fn of<I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = &'a Task> + Clone,
    {
        Self::new(view(tasks.clone()), summary(tasks))
    }
}

impl fmt::Display for HtmlListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tasks.is_empty() {
            return writeln!(
                f,
                "<div class=\"todo-empty\"><div>{EMPTY_TITLE}</div><div>{EMPTY_HINT}</div></div>"
            );
        }

        writeln!(f, "<div class=\"todo-items-container\">")?;
        for task in &self.tasks {
            let state = if task.completed { "completed" } else { "pending" };
            let action = if task.completed { "Reopen" } else { "Complete" };
            writeln!(
                f,
                "  <div class=\"robot-todo-item {state}\" data-id=\"{id}\">\n    \
                 <strong>TASK #{id}</strong> <span class=\"status\">{label}</span>\n    \
                 <div class=\"text\">{text}</div>\n    \
                 <div class=\"meta\"><span>{created}</span>\
                 <span>{category}</span><span>{priority}</span></div>\n    \
                 <button data-action=\"toggle\">{action}</button>\
                 <button data-action=\"delete\">Delete</button>\n  \
                 </div>",
                id = task.id,
                label = status_label(task),
                text = Escaped(&task.text),
                created = task.created_at.format(TIMESTAMP_FORMAT),
                category = Escaped(&task.category.to_uppercase()),
                priority = task.priority.as_str().to_uppercase(),
            )?;
        }
        writeln!(f, "</div>")?;

        let s = &self.summary;
        writeln!(
            f,
            "<div class=\"todo-stats\"><div class=\"total\">{}</div>\
             <div class=\"completed\">{}</div>\
             <div class=\"active\">{}</div><div class=\"progress\">{}%</div></div>",
            s.total, s.completed, s.active, s.completion_rate
        )?;
        if s.all_done() {
            writeln!(f, "<div class=\"celebration\">{CELEBRATION}</div>")?;
        }
        Ok(())
    }
}

/// Writes a string with HTML special characters escaped
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&#39;")?,
                c => write!(f, "{c}")?,
            }
        }
        Ok(())
    }
}
