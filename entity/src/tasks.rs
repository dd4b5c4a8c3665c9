use crate::attendees::Attendee;
use crate::events::Event;
use crate::lazy::{EntityName, Lazy};
use crate::Id;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Id,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub deadline: Option<NaiveDate>,
    /// Owning event. Usually an unloaded proxy when the task comes from storage.
    #[serde(skip)]
    pub event: Lazy<Event>,
    #[serde(skip)]
    pub assigned_attendee: Option<Lazy<Attendee>>,
}

impl EntityName for Task {
    const NAME: &'static str = "Task";
}

/// Partial update for a `Task`.
///
/// A `None` field leaves the stored value untouched; there is no way to clear
/// a field through a patch. This is the intended update convention, not an
/// omission: clients send only what changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub deadline: Option<NaiveDate>,
}

impl TaskPatch {
    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = Some(title);
        }
        if let Some(description) = self.description {
            task.description = Some(description);
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = Some(deadline);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_task() -> Task {
        Task {
            id: Id::new_v4(),
            title: Some("Pack".to_string()),
            description: Some("Bring the banners".to_string()),
            completed: false,
            deadline: NaiveDate::from_ymd_opt(2026, 5, 1),
            event: Lazy::unloaded(Id::new_v4()),
            assigned_attendee: None,
        }
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut task = stored_task();
        let before = task.clone();

        TaskPatch::default().apply_to(&mut task);

        assert_eq!(task, before);
    }

    #[test]
    fn patch_updates_completed_and_keeps_title() {
        let mut task = stored_task();

        TaskPatch {
            completed: Some(true),
            ..Default::default()
        }
        .apply_to(&mut task);

        assert!(task.completed);
        assert_eq!(task.title.as_deref(), Some("Pack"));
        assert_eq!(task.description.as_deref(), Some("Bring the banners"));
    }

    #[test]
    fn deserialized_task_has_unloaded_event() {
        let task: Task = serde_json::from_str(
            r#"{"id":"00000000-0000-0000-0000-000000000000","title":"Pack","description":null,"deadline":null}"#,
        )
        .unwrap();

        assert!(!task.event.is_loaded());
        assert!(!task.completed);
    }
}
